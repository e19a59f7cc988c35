use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::layout::PracticeState;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Repository contract for the persisted practice state.
#[async_trait]
pub trait PracticeStateRepository: Send + Sync {
    /// Load the full state. Missing or corrupt keys read as defaults.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn load_state(&self) -> Result<PracticeState, StorageError>;

    /// Overwrite every key with the values in `state` in one write.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the state cannot be encoded or stored.
    async fn save_state(&self, state: &PracticeState) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    entries: Arc<Mutex<BTreeMap<String, String>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed raw key/value pairs, bypassing encoding.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn insert_raw(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.to_string(), value.to_string());
        Ok(())
    }

    /// Raw stored value for `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn raw(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }
}

#[async_trait]
impl PracticeStateRepository for InMemoryRepository {
    async fn load_state(&self) -> Result<PracticeState, StorageError> {
        let guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(PracticeState::from_entries(&guard))
    }

    async fn save_state(&self, state: &PracticeState) -> Result<(), StorageError> {
        let encoded = state.to_entries()?;
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        for (key, value) in encoded {
            guard.insert(key.to_string(), value);
        }
        Ok(())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub practice: Arc<dyn PracticeStateRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let practice: Arc<dyn PracticeStateRepository> = Arc::new(InMemoryRepository::new());
        Self { practice }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{CURRENT_INDEX_KEY, MODE_KEY};
    use pinyin_core::model::{ItemId, PracticeMode};
    use pinyin_core::stats::Outcome;
    use pinyin_core::time::fixed_now;

    fn sample_state() -> PracticeState {
        let id = ItemId::new("hsk1-002");
        let mut state = PracticeState::default();
        state.stats = state.stats.apply(&id, Outcome::Incorrect);
        state.progress.record(&id, false, fixed_now());
        state.practiced_words.insert(id);
        state.current_index = 7;
        state.settings.mode = PracticeMode::Random;
        state
    }

    #[tokio::test]
    async fn round_trips_state() {
        let repo = InMemoryRepository::new();
        let state = sample_state();
        repo.save_state(&state).await.unwrap();

        let loaded = repo.load_state().await.unwrap();
        assert_eq!(loaded, state);
        assert_eq!(loaded.progress.get("hsk1-002").unwrap().incorrect_count, 1);
    }

    #[tokio::test]
    async fn saving_defaults_overwrites_every_key() {
        let repo = InMemoryRepository::new();
        repo.save_state(&sample_state()).await.unwrap();
        repo.save_state(&PracticeState::default()).await.unwrap();

        assert_eq!(repo.load_state().await.unwrap(), PracticeState::default());
        assert_eq!(repo.raw(CURRENT_INDEX_KEY).unwrap().as_deref(), Some("0"));
    }

    #[tokio::test]
    async fn corrupt_entry_loads_as_default() {
        let repo = InMemoryRepository::new();
        repo.insert_raw(MODE_KEY, "\"shuffle\"").unwrap();
        let loaded = repo.load_state().await.unwrap();
        assert_eq!(loaded.settings.mode, PracticeMode::Sequential);
    }

    #[tokio::test]
    async fn storage_facade_uses_shared_backend() {
        let storage = Storage::in_memory();
        storage.practice.save_state(&sample_state()).await.unwrap();
        let clone = storage.clone();
        assert_eq!(clone.practice.load_state().await.unwrap().current_index, 7);
    }
}
