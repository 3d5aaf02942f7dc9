//! In-process store for tests and throwaway servers.

use async_trait::async_trait;
use deck_core::{Error, Result, Slide, TopicKey};
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::DeckStore;

/// Deck store kept in a map; contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    decks: RwLock<HashMap<TopicKey, Vec<Slide>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored decks.
    pub async fn len(&self) -> usize {
        self.decks.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.decks.read().await.is_empty()
    }
}

#[async_trait]
impl DeckStore for MemoryStore {
    async fn save(&self, key: &TopicKey, slides: &[Slide]) -> Result<()> {
        self.decks.write().await.insert(key.clone(), slides.to_vec());
        Ok(())
    }

    async fn load(&self, key: &TopicKey) -> Result<Vec<Slide>> {
        self.decks
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| Error::DeckNotFound(key.to_string()))
    }

    async fn exists(&self, key: &TopicKey) -> Result<bool> {
        Ok(self.decks.read().await.contains_key(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_then_load() {
        let store = MemoryStore::new();
        let key = TopicKey::from_topic("Rust Basics").unwrap();
        let slides = vec![Slide::new("Ownership")];

        assert!(!store.exists(&key).await.unwrap());
        store.save(&key, &slides).await.unwrap();

        assert!(store.exists(&key).await.unwrap());
        assert_eq!(store.load(&key).await.unwrap(), slides);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_load_missing() {
        let store = MemoryStore::new();
        let key = TopicKey::from_topic("nothing").unwrap();
        assert!(matches!(
            store.load(&key).await,
            Err(Error::DeckNotFound(k)) if k == "nothing"
        ));
    }

    #[tokio::test]
    async fn test_save_overwrites() {
        let store = MemoryStore::new();
        let key = TopicKey::from_topic("t").unwrap();
        store.save(&key, &[Slide::new("old")]).await.unwrap();
        store.save(&key, &[Slide::new("new"), Slide::new("two")]).await.unwrap();

        let loaded = store.load(&key).await.unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].title, "new");
    }
}
