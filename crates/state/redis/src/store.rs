use async_trait::async_trait;
use deadpool_redis::{Config, Pool, Runtime};
use redis::AsyncCommands;
use tracing::debug;

use joingate_core::{FileId, FileRecord};
use joingate_state::error::StateError;
use joingate_state::key::RecordKey;
use joingate_state::store::RecordStore;

use crate::config::RedisConfig;

/// Redis-backed implementation of [`RecordStore`].
///
/// Each record is stored as a JSON string under `{prefix}:file:{file_id}`
/// with no expiry. Connections come from a `deadpool-redis` pool.
pub struct RedisRecordStore {
    pool: Pool,
    prefix: String,
}

impl RedisRecordStore {
    /// Create a new `RedisRecordStore` from the provided configuration.
    ///
    /// No connection is opened until the first operation.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Connection`] if the pool cannot be created.
    pub fn new(config: &RedisConfig) -> Result<Self, StateError> {
        let cfg = Config::from_url(&config.url);
        let pool = cfg
            .builder()
            .map(|b| {
                b.max_size(config.pool_size)
                    .wait_timeout(Some(config.connection_timeout))
                    .runtime(Runtime::Tokio1)
                    .build()
            })
            .map_err(|e| StateError::Connection(e.to_string()))?
            .map_err(|e| StateError::Connection(e.to_string()))?;

        Ok(Self {
            pool,
            prefix: config.prefix.clone(),
        })
    }

    fn key(&self, file_id: &FileId) -> String {
        RecordKey::new(&self.prefix, file_id).canonical()
    }

    /// Obtain a connection from the pool.
    async fn conn(&self) -> Result<deadpool_redis::Connection, StateError> {
        self.pool
            .get()
            .await
            .map_err(|e| StateError::Connection(e.to_string()))
    }
}

#[async_trait]
impl RecordStore for RedisRecordStore {
    async fn upsert(&self, record: &FileRecord) -> Result<(), StateError> {
        let key = self.key(&record.file_id);
        let value = serde_json::to_string(record)?;
        let mut conn = self.conn().await?;

        let () = conn
            .set(&key, value)
            .await
            .map_err(|e| StateError::Backend(e.to_string()))?;

        debug!(%key, "stored file record");
        Ok(())
    }

    async fn get(&self, file_id: &FileId) -> Result<Option<FileRecord>, StateError> {
        let key = self.key(file_id);
        let mut conn = self.conn().await?;

        let raw: Option<String> = conn
            .get(&key)
            .await
            .map_err(|e| StateError::Backend(e.to_string()))?;

        raw.map(|json| serde_json::from_str(&json).map_err(StateError::from))
            .transpose()
    }

    async fn delete(&self, file_id: &FileId) -> Result<bool, StateError> {
        let key = self.key(file_id);
        let mut conn = self.conn().await?;

        let deleted: i64 = conn
            .del(&key)
            .await
            .map_err(|e| StateError::Backend(e.to_string()))?;

        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_use_prefix() {
        let store = RedisRecordStore::new(&RedisConfig {
            prefix: "pfx".into(),
            ..RedisConfig::default()
        })
        .unwrap();
        let id = FileId::parse("abc").unwrap();
        assert_eq!(store.key(&id), "pfx:file:abc");
    }

    #[test]
    fn invalid_url_is_rejected() {
        let result = RedisRecordStore::new(&RedisConfig {
            url: "not a url".into(),
            ..RedisConfig::default()
        });
        assert!(matches!(result, Err(StateError::Connection(_))));
    }
}
