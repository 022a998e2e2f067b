use serde::Deserialize;

/// Configuration for the record store backend.
#[derive(Debug, Deserialize)]
pub struct StateConfig {
    /// Which backend to use: `"memory"` or `"redis"`.
    #[serde(default = "default_backend")]
    pub backend: String,

    /// Connection URL for the backend (e.g. `redis://localhost:6379`).
    pub url: Option<String>,

    /// Key prefix for backends that support it.
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Connection pool size for backends that pool.
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            url: None,
            prefix: default_prefix(),
            pool_size: default_pool_size(),
        }
    }
}

fn default_backend() -> String {
    "memory".to_owned()
}

fn default_prefix() -> String {
    "joingate".to_owned()
}

fn default_pool_size() -> usize {
    10
}
