//! Fetches the images a deck references before rendering.

use deck_core::{is_remote_reference, local_asset_path, Error, ImageData, Result, Slide};
use deck_pptx::RenderAssets;
use std::path::Path;
use std::time::Duration;

/// Largest image body accepted from a remote host.
pub const MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;

/// Downloads remote slide images with a deadline and a size cap.
#[derive(Debug, Clone)]
pub struct ImageFetcher {
    http: reqwest::Client,
    timeout: Duration,
    max_bytes: u64,
}

impl ImageFetcher {
    pub fn new(timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            timeout,
            max_bytes: MAX_IMAGE_BYTES,
        }
    }

    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    /// Download one image, failing once the deadline passes or the body
    /// grows past the cap.
    pub async fn download(&self, url: &str) -> Result<Vec<u8>> {
        tokio::time::timeout(self.timeout, self.fetch(url))
            .await
            .map_err(|_| {
                Error::MissingAsset(format!("{}: no response within {:?}", url, self.timeout))
            })?
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let failed = |e: reqwest::Error| Error::MissingAsset(format!("{}: {}", url, e));
        let too_large =
            || Error::MissingAsset(format!("{}: larger than {} bytes", url, self.max_bytes));

        let mut response = self
            .http
            .get(url.trim())
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(failed)?;
        if response.content_length().is_some_and(|len| len > self.max_bytes) {
            return Err(too_large());
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(failed)? {
            if (body.len() + chunk.len()) as u64 > self.max_bytes {
                return Err(too_large());
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }
}

/// Load every image referenced by `slides`.
///
/// URLs are downloaded through `fetcher`; other references are files below
/// `asset_dir`. Without an asset directory only URLs can be used.
pub async fn collect(
    fetcher: &ImageFetcher,
    asset_dir: Option<&Path>,
    slides: &[Slide],
) -> Result<RenderAssets> {
    let mut assets = RenderAssets::new();
    for source in RenderAssets::references(slides) {
        let bytes = if is_remote_reference(&source) {
            fetcher.download(&source).await?
        } else {
            let root = asset_dir.ok_or_else(|| {
                Error::MissingAsset(format!("{} (no asset directory configured)", source))
            })?;
            let path = local_asset_path(root, &source)?;
            tokio::fs::read(&path)
                .await
                .map_err(|e| Error::MissingAsset(format!("{}: {}", path.display(), e)))?
        };
        log::debug!("Loaded image {} ({} bytes)", source, bytes.len());
        let image = ImageData::from_bytes(bytes, &source)?;
        assets.insert(source, image);
    }
    Ok(assets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpListener;

    const PNG: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0];

    fn fetcher() -> ImageFetcher {
        ImageFetcher::new(Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_collect_local_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("cat.png"), PNG).unwrap();

        let mut slide = Slide::new("Pic");
        slide.image = Some("cat.png".into());

        let assets = collect(&fetcher(), Some(dir.path()), &[slide])
            .await
            .unwrap();
        assert!(assets.contains("cat.png"));
    }

    #[tokio::test]
    async fn test_collect_rejects_escapes_and_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let images = fetcher();

        for source in ["../cat.png", "missing.png"] {
            let mut slide = Slide::new("Pic");
            slide.image = Some(source.into());
            let result = collect(&images, Some(dir.path()), &[slide]).await;
            assert!(matches!(result, Err(Error::MissingAsset(_))), "{source}");
        }

        let mut slide = Slide::new("Pic");
        slide.image = Some("cat.png".into());
        assert!(matches!(
            collect(&images, None, &[slide]).await,
            Err(Error::MissingAsset(_))
        ));
    }

    #[tokio::test]
    async fn test_collect_rejects_non_images() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"hello").unwrap();

        let mut slide = Slide::new("Pic");
        slide.image = Some("notes.txt".into());

        let result = collect(&fetcher(), Some(dir.path()), &[slide]).await;
        assert!(matches!(result, Err(Error::UnsupportedImage(_))));
    }

    #[tokio::test]
    async fn test_download_gives_up_on_silent_hosts() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut open = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                open.push(socket);
            }
        });

        let mut slide = Slide::new("Pic");
        slide.image = Some(format!("http://{}/cat.png", addr));
        let fetcher = ImageFetcher::new(Duration::from_millis(200));

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            collect(&fetcher, None, &[slide]),
        )
        .await
        .expect("collect should not hang");
        assert!(matches!(result, Err(Error::MissingAsset(_))));
    }

    #[tokio::test]
    async fn test_download_rejects_oversized_bodies() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            let mut request = [0u8; 1024];
            let _ = tokio::io::AsyncReadExt::read(&mut socket, &mut request).await;
            let body = [PNG, &[0u8; 64][..]].concat();
            let head = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: image/png\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            let _ = socket.write_all(head.as_bytes()).await;
            let _ = socket.write_all(&body).await;
        });

        let fetcher = fetcher().with_max_bytes(16);
        let result = fetcher.download(&format!("http://{}/big.png", addr)).await;
        match result {
            Err(Error::MissingAsset(msg)) => assert!(msg.contains("larger than 16 bytes"), "{msg}"),
            other => panic!("expected MissingAsset, got {:?}", other.map(|b| b.len())),
        }
    }
}
