//! PPTX (Office Open XML) output for generated decks.
//!
//! A .pptx file is a ZIP archive of XML parts. [`PptxRenderer`] writes one,
//! [`PptxReader`] lists the slides and text of an existing one.

pub mod assets;
pub mod reader;
mod templates;
pub mod writer;

pub use assets::RenderAssets;
pub use reader::{PptxReader, SlideSummary};
pub use writer::PptxRenderer;

/// MIME type of a .pptx file.
pub const PPTX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation";
