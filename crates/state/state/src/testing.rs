use joingate_core::{ChatRef, FileId, FileRecord, MediaKind};

use crate::error::StateError;
use crate::store::RecordStore;

fn test_record(kind: MediaKind, archive_message_id: i64) -> FileRecord {
    FileRecord::new(
        FileId::generate(),
        ChatRef::Id(-100_200_300),
        archive_message_id,
        kind,
        42,
    )
}

/// Run the full record store conformance test suite.
///
/// Call this from your backend's test module with a fresh store instance.
///
/// # Errors
///
/// Returns an error if any backend operation fails.
pub async fn run_store_conformance_tests(store: &dyn RecordStore) -> Result<(), StateError> {
    test_get_missing(store).await?;
    test_upsert_and_get(store).await?;
    test_upsert_replaces(store).await?;
    test_caption_survives(store).await?;
    test_delete(store).await?;
    test_records_are_independent(store).await?;
    Ok(())
}

async fn test_get_missing(store: &dyn RecordStore) -> Result<(), StateError> {
    let missing = store.get(&FileId::generate()).await?;
    assert!(missing.is_none(), "get on missing record should return None");
    Ok(())
}

async fn test_upsert_and_get(store: &dyn RecordStore) -> Result<(), StateError> {
    let record = test_record(MediaKind::Document, 10);
    store.upsert(&record).await?;
    let fetched = store.get(&record.file_id).await?;
    assert_eq!(fetched.as_ref(), Some(&record));
    Ok(())
}

async fn test_upsert_replaces(store: &dyn RecordStore) -> Result<(), StateError> {
    let mut record = test_record(MediaKind::Video, 11);
    store.upsert(&record).await?;
    record.archive_message_id = 12;
    store.upsert(&record).await?;
    let fetched = store.get(&record.file_id).await?;
    assert_eq!(
        fetched.map(|r| r.archive_message_id),
        Some(12),
        "upsert should replace the existing record"
    );
    Ok(())
}

async fn test_caption_survives(store: &dyn RecordStore) -> Result<(), StateError> {
    let record =
        test_record(MediaKind::Photo, 13).with_caption(Some("<b>bold</b> &amp; more".into()));
    store.upsert(&record).await?;
    let fetched = store.get(&record.file_id).await?;
    assert_eq!(
        fetched.and_then(|r| r.caption).as_deref(),
        Some("<b>bold</b> &amp; more")
    );
    Ok(())
}

async fn test_delete(store: &dyn RecordStore) -> Result<(), StateError> {
    let record = test_record(MediaKind::Audio, 14);
    store.upsert(&record).await?;
    assert!(store.delete(&record.file_id).await?, "delete should report an existing record");
    assert!(store.get(&record.file_id).await?.is_none(), "get after delete should return None");
    assert!(
        !store.delete(&record.file_id).await?,
        "delete on a missing record should return false"
    );
    Ok(())
}

async fn test_records_are_independent(store: &dyn RecordStore) -> Result<(), StateError> {
    let a = test_record(MediaKind::Voice, 15);
    let b = test_record(MediaKind::Voice, 16);
    store.upsert(&a).await?;
    store.upsert(&b).await?;
    store.delete(&a.file_id).await?;
    assert!(store.get(&a.file_id).await?.is_none());
    assert_eq!(store.get(&b.file_id).await?.as_ref(), Some(&b));
    Ok(())
}
