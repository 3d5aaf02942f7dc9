//! Domain types for representing generated decks.

use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

/// Title used when a slide arrives without one.
pub const DEFAULT_TITLE: &str = "Untitled Slide";

/// Background used when a slide arrives without a theme.
pub const DEFAULT_THEME: &str = "#FFFFFF";

/// Title and body colour used when a slide arrives without one.
pub const DEFAULT_TEXT_COLOR: &str = "#000000";

/// A single slide in its canonical, stored shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slide {
    /// Slide heading.
    pub title: String,

    /// Bullet lines and fenced code blocks, in order.
    pub content: Vec<String>,

    /// Background colour (`#RRGGBB`) or background image URL/path.
    pub theme: String,

    /// Title text colour.
    pub title_color: String,

    /// Body text colour.
    pub content_color: String,

    /// Optional picture shown beside the body text.
    pub image: Option<String>,
}

impl Slide {
    /// Create a slide with the given title and default styling.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: Vec::new(),
            theme: DEFAULT_THEME.to_string(),
            title_color: DEFAULT_TEXT_COLOR.to_string(),
            content_color: DEFAULT_TEXT_COLOR.to_string(),
            image: None,
        }
    }

    /// Append a content entry.
    pub fn push_content(&mut self, entry: impl Into<String>) {
        self.content.push(entry.into());
    }

    /// Classified view over the content entries.
    pub fn lines(&self) -> impl Iterator<Item = ContentLine<'_>> {
        self.content.iter().map(|c| ContentLine::classify(c))
    }

    /// Whether the theme names an image rather than a colour.
    pub fn has_background_image(&self) -> bool {
        is_image_reference(&self.theme)
    }
}

/// Slide data as submitted by clients, with every field optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideInput {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<Vec<String>>,
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub title_color: Option<String>,
    #[serde(default)]
    pub content_color: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

impl From<Slide> for SlideInput {
    fn from(slide: Slide) -> Self {
        Self {
            title: Some(slide.title),
            content: Some(slide.content),
            theme: Some(slide.theme),
            title_color: Some(slide.title_color),
            content_color: Some(slide.content_color),
            image: slide.image,
        }
    }
}

/// One content entry, classified for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentLine<'a> {
    /// A plain bullet or sentence.
    Bullet(&'a str),
    /// A fenced code block, without its fences.
    Code {
        language: Option<&'a str>,
        body: &'a str,
    },
}

impl<'a> ContentLine<'a> {
    /// Classify a stored content entry.
    ///
    /// Code blocks are stored as a single multi-line entry that starts with
    /// a ```` ``` ```` fence line.
    pub fn classify(entry: &'a str) -> Self {
        let Some(rest) = entry.strip_prefix("```") else {
            return Self::Bullet(entry);
        };
        let Some((info, body)) = rest.split_once('\n') else {
            return Self::Bullet(entry);
        };

        let language = Some(info.trim()).filter(|l| !l.is_empty());
        let body = match body.rsplit_once('\n') {
            Some((inner, last)) if last.trim_start().starts_with("```") => inner,
            None if body.trim_start().starts_with("```") => "",
            _ => body,
        };

        Self::Code { language, body }
    }

    /// Build the stored form of a code block.
    pub fn code_block(language: Option<&str>, lines: &[String]) -> String {
        let mut out = String::from("```");
        if let Some(lang) = language {
            out.push_str(lang);
        }
        out.push('\n');
        for line in lines {
            out.push_str(line);
            out.push('\n');
        }
        out.push_str("```");
        out
    }
}

/// File extensions that mark a theme string as an image path.
const IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];

/// Whether a theme string references an image rather than a colour.
///
/// Only URLs and paths with an image extension count; anything else
/// (`"#112233"`, `"lightblue"`) is a colour.
pub fn is_image_reference(value: &str) -> bool {
    let v = value.trim();
    if is_remote_reference(v) {
        return true;
    }
    Path::new(v)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// Whether an image reference is fetched over HTTP rather than read from disk.
pub fn is_remote_reference(source: &str) -> bool {
    let s = source.trim();
    s.starts_with("http://") || s.starts_with("https://")
}

/// Resolve a local image reference below `root`.
///
/// Absolute paths and paths that climb out of `root` are rejected.
pub fn local_asset_path(root: &Path, source: &str) -> Result<PathBuf> {
    let relative = Path::new(source.trim());
    let inside = relative
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    if source.trim().is_empty() || !inside {
        return Err(Error::MissingAsset(format!("{} (outside the asset directory)", source)));
    }
    Ok(root.join(relative))
}

/// Image formats the renderers can embed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
}

impl ImageFormat {
    /// Detect format from file magic bytes.
    pub fn from_magic(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(Self::Png);
        }
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }
        if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            return Some(Self::Gif);
        }
        None
    }

    /// File extension used inside the PPTX media folder.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Gif => "gif",
        }
    }

    /// MIME type.
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
        }
    }
}

/// Image bytes ready to embed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
}

impl ImageData {
    /// Wrap raw bytes, detecting the format from the header.
    pub fn from_bytes(bytes: Vec<u8>, source: &str) -> Result<Self> {
        let format = ImageFormat::from_magic(&bytes)
            .ok_or_else(|| Error::UnsupportedImage(source.to_string()))?;
        Ok(Self { bytes, format })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slide_json_uses_camel_case() {
        let slide = Slide::new("Intro");
        let json = serde_json::to_value(&slide).unwrap();

        assert_eq!(json["title"], "Intro");
        assert_eq!(json["titleColor"], "#000000");
        assert_eq!(json["contentColor"], "#000000");
        assert_eq!(json["theme"], "#FFFFFF");
        assert!(json["image"].is_null());
    }

    #[test]
    fn test_local_asset_path() {
        let root = Path::new("/srv/assets");
        assert_eq!(
            local_asset_path(root, "img/cat.png").unwrap(),
            PathBuf::from("/srv/assets/img/cat.png")
        );
        for bad in ["../secret.png", "img/../../x.png", "/etc/passwd", "  "] {
            assert!(
                matches!(local_asset_path(root, bad), Err(Error::MissingAsset(_))),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn test_remote_reference() {
        assert!(is_remote_reference("https://example.com/a.png"));
        assert!(is_remote_reference(" http://example.com/a.png"));
        assert!(!is_remote_reference("img/a.png"));
    }

    #[test]
    fn test_slide_input_accepts_partial_json() {
        let input: SlideInput = serde_json::from_str(r#"{"title":"Only title"}"#).unwrap();
        assert_eq!(input.title.as_deref(), Some("Only title"));
        assert!(input.content.is_none());
        assert!(input.image.is_none());
    }

    #[test]
    fn test_classify_bullet() {
        assert_eq!(
            ContentLine::classify("- point a"),
            ContentLine::Bullet("- point a")
        );
        // Inline fences without a newline stay plain text.
        assert_eq!(
            ContentLine::classify("```x```"),
            ContentLine::Bullet("```x```")
        );
    }

    #[test]
    fn test_classify_code_block() {
        let entry = "```python\nprint('hi')\n    return 1\n```";
        assert_eq!(
            ContentLine::classify(entry),
            ContentLine::Code {
                language: Some("python"),
                body: "print('hi')\n    return 1",
            }
        );
    }

    #[test]
    fn test_code_block_round_trips_through_classify() {
        let lines = vec!["fn main() {".to_string(), "}".to_string()];
        let stored = ContentLine::code_block(Some("rust"), &lines);
        assert_eq!(stored, "```rust\nfn main() {\n}\n```");
        assert_eq!(
            ContentLine::classify(&stored),
            ContentLine::Code {
                language: Some("rust"),
                body: "fn main() {\n}",
            }
        );
    }

    #[test]
    fn test_empty_code_block() {
        let stored = ContentLine::code_block(None, &[]);
        assert_eq!(
            ContentLine::classify(&stored),
            ContentLine::Code {
                language: None,
                body: "",
            }
        );
    }

    #[test]
    fn test_image_format_from_magic() {
        assert_eq!(
            ImageFormat::from_magic(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0]),
            Some(ImageFormat::Png)
        );
        assert_eq!(
            ImageFormat::from_magic(&[0xFF, 0xD8, 0xFF, 0xE0]),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(ImageFormat::from_magic(b"GIF89a..."), Some(ImageFormat::Gif));
        assert_eq!(ImageFormat::from_magic(b"<html>"), None);
    }

    #[test]
    fn test_image_data_rejects_unknown_bytes() {
        assert!(matches!(
            ImageData::from_bytes(b"not an image".to_vec(), "x.txt"),
            Err(Error::UnsupportedImage(_))
        ));
    }

    #[test]
    fn test_background_image_detection() {
        let mut slide = Slide::new("A");
        assert!(!slide.has_background_image());
        slide.theme = "https://example.com/bg.png".to_string();
        assert!(slide.has_background_image());
        slide.theme = "dde6ed".to_string();
        assert!(!slide.has_background_image());
        slide.theme = "lightblue".to_string();
        assert!(!slide.has_background_image());
        slide.theme = "backgrounds/Waves.JPG".to_string();
        assert!(slide.has_background_image());
        slide.theme = "notes.txt".to_string();
        assert!(!slide.has_background_image());
    }
}
