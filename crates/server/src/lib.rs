//! HTTP surface of the deck service.
//!
//! Handlers share an [`AppState`] holding the deck store, the text
//! generator and the service configuration. Both the store and the
//! generator are trait objects so tests can run the whole API in memory.

pub mod assets;
pub mod error;
pub mod routes;

use axum::http::{header, HeaderValue, Method};
use deck_core::{PromptBuilder, ServiceConfig};
use deck_gemini::TextGenerator;
use deck_store::DeckStore;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;

pub use assets::ImageFetcher;
pub use error::ApiError;
pub use routes::router;

/// Shared state for all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DeckStore>,
    pub generator: Arc<dyn TextGenerator>,
    pub config: Arc<ServiceConfig>,
    pub prompts: Arc<PromptBuilder>,
    /// Downloads remote slide images.
    pub images: ImageFetcher,
    /// Directory that local image references are resolved against.
    pub asset_dir: Option<PathBuf>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn DeckStore>,
        generator: Arc<dyn TextGenerator>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            store,
            generator,
            prompts: Arc::new(PromptBuilder::from_config(&config)),
            images: ImageFetcher::new(Duration::from_secs(config.gateway.timeout_secs)),
            config: Arc::new(config),
            asset_dir: None,
        }
    }

    pub fn with_asset_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.asset_dir = Some(dir.into());
        self
    }
}

/// CORS policy: one allowed origin, or anything when none is configured.
pub fn cors_layer(origin: Option<&str>) -> anyhow::Result<CorsLayer> {
    let Some(origin) = origin.map(str::trim).filter(|o| !o.is_empty()) else {
        return Ok(CorsLayer::permissive());
    };
    let origin: HeaderValue = origin
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid CORS origin '{}': {}", origin, e))?;
    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]))
}
