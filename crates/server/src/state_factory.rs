use std::sync::Arc;

use joingate_state::RecordStore;
use joingate_state_memory::MemoryRecordStore;
use tracing::info;

use crate::config::{ConfigError, StateConfig};
use crate::error::ServerError;

/// Create the record store selected by `config.backend`.
pub fn create_record_store(
    config: &StateConfig,
) -> Result<Arc<dyn RecordStore>, ServerError> {
    let store: Arc<dyn RecordStore> = match config.backend.as_str() {
        "memory" => Arc::new(MemoryRecordStore::new()),
        #[cfg(feature = "redis")]
        "redis" => {
            let url = config
                .url
                .clone()
                .ok_or(ConfigError::Missing("state.url"))?;
            let redis_config = joingate_state_redis::RedisConfig {
                url,
                prefix: config.prefix.clone(),
                pool_size: config.pool_size,
                ..Default::default()
            };
            Arc::new(joingate_state_redis::RedisRecordStore::new(&redis_config)?)
        }
        other => {
            return Err(ConfigError::Invalid {
                field: "state.backend",
                reason: format!(
                    "backend \"{other}\" is unknown or not compiled in (available: {})",
                    available_backends().join(", ")
                ),
            }
            .into());
        }
    };

    info!(backend = %config.backend, "record store initialized");
    Ok(store)
}

/// Backends compiled into this binary.
pub fn available_backends() -> Vec<&'static str> {
    let mut backends = vec!["memory"];
    if cfg!(feature = "redis") {
        backends.push("redis");
    }
    backends
}
