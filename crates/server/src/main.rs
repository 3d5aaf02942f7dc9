//! Deck service binary.

use anyhow::{Context, Result};
use clap::Parser;
use deck_core::ServiceConfig;
use deck_gemini::GeminiClient;
use deck_server::{cors_layer, router, AppState};
use deck_store::{DeckStore, FileStore, MemoryStore};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Generate slide decks with Gemini and export them as PPTX or PDF.
#[derive(Parser, Debug)]
#[command(name = "deck-server")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Google Gemini API key
    #[arg(long, env = "GOOGLE_GEMINI_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Address to listen on
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: IpAddr,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    port: u16,

    /// Directory holding one JSON file per deck
    #[arg(long, env = "DECK_STORAGE_DIR", default_value = "generated_ppts")]
    storage_dir: PathBuf,

    /// Keep decks in memory instead of on disk
    #[arg(long)]
    memory: bool,

    /// JSON service configuration (slide bounds, layout, gateway)
    #[arg(short, long, env = "DECK_CONFIG")]
    config: Option<PathBuf>,

    /// Directory that local slide image paths are resolved against
    #[arg(long, env = "DECK_ASSET_DIR")]
    asset_dir: Option<PathBuf>,

    /// Single allowed CORS origin (default: any)
    #[arg(long, env = "CORS_ORIGIN")]
    cors_origin: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    let config = match &args.config {
        Some(path) => ServiceConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ServiceConfig::default(),
    };

    let generator = GeminiClient::new(args.api_key.as_str(), &config.gateway)
        .context("Failed to set up the Gemini client")?;

    let store: Arc<dyn DeckStore> = if args.memory {
        log::warn!("Using in-memory storage; decks are lost on exit");
        Arc::new(MemoryStore::new())
    } else {
        let store = FileStore::open(&args.storage_dir).await.with_context(|| {
            format!("Failed to create storage directory {}", args.storage_dir.display())
        })?;
        log::info!("Storing decks in {}", store.root().display());
        Arc::new(store)
    };

    let mut state = AppState::new(store, Arc::new(generator), config);
    if let Some(dir) = &args.asset_dir {
        state = state.with_asset_dir(dir);
    }

    let app = router(state).layer(cors_layer(args.cors_origin.as_deref())?);

    let addr = SocketAddr::new(args.host, args.port);
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    log::info!("Server running on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
