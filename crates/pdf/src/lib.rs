//! PDF export for generated decks.
//!
//! Each slide becomes a landscape page the size of the slide with its
//! background colour, title and wrapped body text. Bodies that overflow
//! continue on extra pages. Only the builtin PDF fonts are used and images
//! are not embedded.

mod renderer;
pub mod text;

pub use renderer::PdfRenderer;

/// MIME type of a PDF file.
pub const PDF_CONTENT_TYPE: &str = "application/pdf";
