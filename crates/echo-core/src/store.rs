//! Durable CRUD over the prompt library.
//!
//! The whole library lives under a single key as a JSON array, newest first.
//! Every mutation rewrites that key. The in-memory copy is kept even when a
//! write fails, so the panel stays usable with unsaved changes. While such
//! changes are pending, a refresh writes them back instead of reading.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{PanelError, StorageError};
use crate::prompt::{PromptLibrary, PromptRecord};
use crate::storage::StorageArea;

/// Key the library is stored under unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "echoPrompts";

pub struct PromptStore {
    area: Arc<dyn StorageArea>,
    key: String,
    library: PromptLibrary,
    unsaved: bool,
}

impl PromptStore {
    pub fn new(area: Arc<dyn StorageArea>, key: impl Into<String>) -> Self {
        Self {
            area,
            key: key.into(),
            library: Vec::new(),
            unsaved: false,
        }
    }

    /// Re-read the persisted library. Missing or corrupt data reads as an
    /// empty library. When the area itself fails, the in-memory library is
    /// kept as it is.
    pub async fn load(&mut self) -> PromptLibrary {
        if let Err(e) = self.refresh().await {
            warn!(key = %self.key, error = %e, "failed to read prompt library, keeping in-memory copy");
        }
        self.library.clone()
    }

    /// Bring the in-memory library in line with storage.
    ///
    /// Pending unsaved changes are written back rather than replaced. On
    /// error the in-memory library is left untouched.
    pub async fn refresh(&mut self) -> Result<(), StorageError> {
        if self.unsaved {
            self.save(&self.library).await?;
            self.unsaved = false;
            debug!(count = self.library.len(), "wrote back unsaved prompt library");
            return Ok(());
        }

        self.library = match self.area.get(&self.key).await? {
            Some(raw) => match serde_json::from_str::<PromptLibrary>(&raw) {
                Ok(library) => library,
                Err(e) => {
                    warn!(key = %self.key, error = %e, "stored prompt library is unreadable");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };
        debug!(count = self.library.len(), "loaded prompt library");
        Ok(())
    }

    /// Overwrite the persisted library with `library`. An empty library
    /// removes the key, which reads back the same way.
    pub async fn save(&self, library: &PromptLibrary) -> Result<(), StorageError> {
        if library.is_empty() {
            self.area.remove(&self.key).await?;
        } else {
            let raw = serde_json::to_string(library)?;
            self.area.set(&self.key, raw).await?;
        }
        debug!(count = library.len(), "saved prompt library");
        Ok(())
    }

    pub async fn append(&mut self, record: PromptRecord) -> Result<(), StorageError> {
        self.library.insert(0, record);
        self.persist().await
    }

    pub async fn remove_at(&mut self, index: usize) -> Result<PromptRecord, PanelError> {
        if index >= self.library.len() {
            return Err(PanelError::Index {
                index,
                len: self.library.len(),
            });
        }
        let removed = self.library.remove(index);
        self.persist().await?;
        Ok(removed)
    }

    async fn persist(&mut self) -> Result<(), StorageError> {
        let result = self.save(&self.library).await;
        self.unsaved = result.is_err();
        result
    }

    /// The in-memory library, which may be ahead of storage after a failed save.
    pub fn library(&self) -> &[PromptRecord] {
        &self.library
    }

    pub fn get(&self, index: usize) -> Option<&PromptRecord> {
        self.library.get(index)
    }

    pub fn len(&self) -> usize {
        self.library.len()
    }

    pub fn is_empty(&self) -> bool {
        self.library.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryArea;
    use chrono::Utc;

    fn record(description: &str) -> PromptRecord {
        PromptRecord::new(description, &format!("{} body", description), "test", Utc::now())
    }

    fn store_with(area: &Arc<MemoryArea>) -> PromptStore {
        let area: Arc<dyn StorageArea> = area.clone();
        PromptStore::new(area, DEFAULT_STORAGE_KEY)
    }

    #[tokio::test]
    async fn test_load_without_data_is_empty() {
        let area = Arc::new(MemoryArea::new());
        let mut store = store_with(&area);
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_load_tolerates_corrupt_data_and_unavailable_area() {
        let area = Arc::new(MemoryArea::new());
        area.set(DEFAULT_STORAGE_KEY, "{not json".to_string()).await.unwrap();
        let mut store = store_with(&area);
        assert!(store.load().await.is_empty());

        area.set_available(false);
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_failed_read_keeps_library_and_later_save_keeps_all() {
        let area = Arc::new(MemoryArea::new());
        let mut store = store_with(&area);
        for name in ["a", "b", "c"] {
            store.append(record(name)).await.unwrap();
        }

        area.set_available(false);
        assert!(store.refresh().await.is_err());
        assert_eq!(store.load().await.len(), 3);

        area.set_available(true);
        store.append(record("d")).await.unwrap();
        let persisted: Vec<_> = store_with(&area)
            .load()
            .await
            .into_iter()
            .map(|r| r.description)
            .collect();
        assert_eq!(persisted, vec!["d", "c", "b", "a"]);
    }

    #[tokio::test]
    async fn test_round_trip_after_every_mutation() {
        let area = Arc::new(MemoryArea::new());
        let mut store = store_with(&area);
        store.load().await;

        for name in ["a", "b", "c", "d"] {
            store.append(record(name)).await.unwrap();
            let expected = store.library().to_vec();
            assert_eq!(store_with(&area).load().await, expected);
        }
        for index in [2, 0, 1] {
            store.remove_at(index).await.unwrap();
            let expected = store.library().to_vec();
            assert_eq!(store_with(&area).load().await, expected);
        }
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_remove_keeps_relative_order() {
        let area = Arc::new(MemoryArea::new());
        let mut store = store_with(&area);
        for name in ["a", "b", "c", "d", "e"] {
            store.append(record(name)).await.unwrap();
        }
        // newest first: e d c b a
        let removed = store.remove_at(2).await.unwrap();
        assert_eq!(removed.description, "c");
        let order: Vec<_> = store.library().iter().map(|r| r.description.as_str()).collect();
        assert_eq!(order, vec!["e", "d", "b", "a"]);
    }

    #[tokio::test]
    async fn test_removing_last_record_clears_the_key() {
        let area = Arc::new(MemoryArea::new());
        let mut store = store_with(&area);
        store.append(record("only")).await.unwrap();
        assert!(area.get(DEFAULT_STORAGE_KEY).await.unwrap().is_some());

        store.remove_at(0).await.unwrap();
        assert_eq!(area.get(DEFAULT_STORAGE_KEY).await.unwrap(), None);
        assert!(store_with(&area).load().await.is_empty());
    }

    #[tokio::test]
    async fn test_remove_out_of_bounds_is_index_error() {
        let area = Arc::new(MemoryArea::new());
        let mut store = store_with(&area);
        store.append(record("only")).await.unwrap();

        let err = store.remove_at(1).await.unwrap_err();
        assert!(matches!(err, PanelError::Index { index: 1, len: 1 }));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_save_keeps_in_memory_change() {
        let area = Arc::new(MemoryArea::new());
        let mut store = store_with(&area);
        area.set_available(false);

        let err = store.append(record("unsaved")).await.unwrap_err();
        assert!(matches!(err, StorageError::Unavailable(_)));
        assert_eq!(store.len(), 1);

        area.set_available(true);
        assert!(store_with(&area).load().await.is_empty());

        // The next refresh writes the pending change back instead of dropping it.
        assert_eq!(store.load().await.len(), 1);
        assert_eq!(store_with(&area).load().await.len(), 1);
    }
}
