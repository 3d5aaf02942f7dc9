//! Core domain types, AI response parsing, prompt building and slide
//! normalization for generated presentation decks.

pub mod config;
pub mod error;
pub mod normalize;
pub mod parser;
pub mod prompt;
pub mod types;

pub use config::{BoxSpec, GatewayConfig, LayoutConfig, ServiceConfig, SlideCountBounds};
pub use error::{Error, Result};
pub use normalize::{normalize_slide, normalize_slides, parse_hex_color, TopicKey};
pub use parser::ResponseParser;
pub use prompt::PromptBuilder;
pub use types::{
    is_image_reference, is_remote_reference, local_asset_path, ContentLine, ImageData, ImageFormat,
    Slide, SlideInput,
};
