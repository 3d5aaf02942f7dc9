//! Image bytes supplied to the renderer.

use deck_core::{Error, ImageData, Result, Slide};
use std::collections::HashMap;

/// Images referenced by a deck, keyed by the string used in the slide.
#[derive(Debug, Clone, Default)]
pub struct RenderAssets {
    images: HashMap<String, ImageData>,
}

impl RenderAssets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the bytes for an image reference.
    pub fn insert(&mut self, source: impl Into<String>, image: ImageData) {
        self.images.insert(source.into(), image);
    }

    /// Look up an image reference.
    pub fn get(&self, source: &str) -> Result<&ImageData> {
        self.images
            .get(source)
            .ok_or_else(|| Error::MissingAsset(source.to_string()))
    }

    pub fn contains(&self, source: &str) -> bool {
        self.images.contains_key(source)
    }

    /// Every image reference in a deck (slide pictures and image themes),
    /// without duplicates, in first-use order.
    pub fn references(slides: &[Slide]) -> Vec<String> {
        let mut refs: Vec<String> = Vec::new();
        for slide in slides {
            let candidates = [
                slide.has_background_image().then(|| slide.theme.clone()),
                slide.image.clone(),
            ];
            for source in candidates.into_iter().flatten() {
                if !refs.contains(&source) {
                    refs.push(source);
                }
            }
        }
        refs
    }
}
