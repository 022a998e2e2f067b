use async_trait::async_trait;
use joingate_core::{FileId, FileRecord};

use crate::error::StateError;

/// Persistence for archived file records.
///
/// Implementations must be `Send + Sync` and safe for concurrent access.
/// Records are written once at ingestion and only read afterwards; `delete`
/// exists for administrative removal.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert or replace the record for `record.file_id`.
    async fn upsert(&self, record: &FileRecord) -> Result<(), StateError>;

    /// Fetch a record. Returns `None` if it does not exist.
    async fn get(&self, file_id: &FileId) -> Result<Option<FileRecord>, StateError>;

    /// Remove a record. Returns `true` if it existed.
    async fn delete(&self, file_id: &FileId) -> Result<bool, StateError>;
}
