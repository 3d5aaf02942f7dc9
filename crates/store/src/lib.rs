//! Deck storage keyed by topic.
//!
//! Each save replaces the whole deck for its key. There is no locking, so
//! concurrent writers to one key race and the last one wins.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use deck_core::{Result, Slide, TopicKey};

/// Persistent map from topic key to deck.
#[async_trait]
pub trait DeckStore: Send + Sync {
    /// Replace the deck stored under `key`.
    async fn save(&self, key: &TopicKey, slides: &[Slide]) -> Result<()>;

    /// Load the deck stored under `key`.
    ///
    /// Returns [`deck_core::Error::DeckNotFound`] when nothing is stored.
    async fn load(&self, key: &TopicKey) -> Result<Vec<Slide>>;

    /// Whether a deck is stored under `key`.
    async fn exists(&self, key: &TopicKey) -> Result<bool>;
}
