//! Log subscriber initialization.
//!
//! Installs a [`tracing_subscriber`] registry with an `EnvFilter` and a `fmt`
//! layer. `RUST_LOG` wins over the configured level so a single run can be
//! made verbose without editing the config file.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::LoggingConfig;

/// Build the filter for `config`, preferring `RUST_LOG` when set.
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level))
}

/// Initialize the global tracing subscriber.
///
/// Calling this twice is harmless: the second subscriber is discarded.
pub fn init(config: &LoggingConfig) {
    let fmt_layer = tracing_subscriber::fmt::layer().with_ansi(config.ansi);

    let result = tracing_subscriber::registry()
        .with(env_filter(config))
        .with(fmt_layer)
        .try_init();

    if let Err(e) = result {
        tracing::debug!(error = %e, "tracing subscriber already installed");
    }
}
