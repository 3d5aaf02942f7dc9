//! One JSON file per topic key.

use async_trait::async_trait;
use deck_core::{normalize_slides, Error, Result, Slide, SlideInput, TopicKey};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::DeckStore;

/// Stores each deck as `{root}/{key}.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        log::info!("Deck storage at {}", root.display());
        Ok(Self { root })
    }

    /// Storage directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File holding the deck for `key`.
    pub fn path_for(&self, key: &TopicKey) -> PathBuf {
        self.root.join(key.file_name("json"))
    }
}

#[async_trait]
impl DeckStore for FileStore {
    async fn save(&self, key: &TopicKey, slides: &[Slide]) -> Result<()> {
        let path = self.path_for(key);
        let json = serde_json::to_string_pretty(slides)?;
        tokio::fs::write(&path, json).await?;
        log::debug!("Saved {} slides to {}", slides.len(), path.display());
        Ok(())
    }

    async fn load(&self, key: &TopicKey) -> Result<Vec<Slide>> {
        let path = self.path_for(key);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(Error::DeckNotFound(key.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        // Files may have been edited by hand, so read them loosely and
        // restore the canonical shape.
        let inputs: Vec<SlideInput> = serde_json::from_str(&raw)?;
        Ok(normalize_slides(inputs, true))
    }

    async fn exists(&self, key: &TopicKey) -> Result<bool> {
        Ok(tokio::fs::try_exists(self.path_for(key)).await?)
    }
}
