//! Error types shared by parsing, storage and rendering.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building, storing or rendering a deck.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to read or write a file.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to serialize or deserialize deck JSON.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// The AI response contained no recognizable slide headers.
    #[error("Invalid AI response format")]
    InvalidAiResponse,

    /// The topic does not produce a usable storage key.
    #[error("Invalid topic: {0}")]
    InvalidTopic(String),

    /// No deck is stored under the given topic key.
    #[error("No slides found for topic '{0}'")]
    DeckNotFound(String),

    /// The requested slide count is outside the configured bounds.
    #[error("Slide count {count} is outside {min}..={max}")]
    SlideCountOutOfRange { count: u32, min: u32, max: u32 },

    /// An image referenced by a slide was not supplied to the renderer.
    #[error("Missing image asset: {0}")]
    MissingAsset(String),

    /// Image bytes are not a supported format.
    #[error("Unsupported image format: {0}")]
    UnsupportedImage(String),

    /// ZIP archive error (for PPTX).
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML error (for PPTX).
    #[error("XML error: {0}")]
    XmlError(String),

    /// PDF generation error.
    #[error("PDF error: {0}")]
    PdfError(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}
