use async_trait::async_trait;
use dashmap::DashMap;

use joingate_core::{FileId, FileRecord};
use joingate_state::error::StateError;
use joingate_state::store::RecordStore;

/// In-memory [`RecordStore`] backed by a [`DashMap`].
///
/// Records live for the lifetime of the process. This implementation is
/// fully synchronous internally; the async trait methods return immediately.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    data: DashMap<FileId, FileRecord>,
}

impl MemoryRecordStore {
    /// Create a new, empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn upsert(&self, record: &FileRecord) -> Result<(), StateError> {
        self.data.insert(record.file_id.clone(), record.clone());
        Ok(())
    }

    async fn get(&self, file_id: &FileId) -> Result<Option<FileRecord>, StateError> {
        Ok(self.data.get(file_id).map(|entry| entry.value().clone()))
    }

    async fn delete(&self, file_id: &FileId) -> Result<bool, StateError> {
        Ok(self.data.remove(file_id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use joingate_core::{ChatRef, MediaKind};
    use joingate_state::testing::run_store_conformance_tests;

    use super::*;

    #[tokio::test]
    async fn conformance() {
        let store = MemoryRecordStore::new();
        run_store_conformance_tests(&store).await.unwrap();
    }

    #[tokio::test]
    async fn concurrent_upserts_all_land() {
        let store = Arc::new(MemoryRecordStore::new());
        let mut handles = Vec::new();

        for i in 0..32 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                let record = FileRecord::new(
                    FileId::generate(),
                    ChatRef::Id(-1),
                    i,
                    MediaKind::Document,
                    1,
                );
                store.upsert(&record).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.len(), 32);
    }
}
