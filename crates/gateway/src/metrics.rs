use std::sync::atomic::{AtomicU64, Ordering};

use crate::outcome::GateOutcome;

/// Atomic counters tracking gate outcomes.
///
/// All counters use relaxed ordering. For a consistent point-in-time view,
/// call [`snapshot`](Self::snapshot).
#[derive(Debug, Default)]
pub struct GatewayMetrics {
    pub welcomed: AtomicU64,
    pub prompts_shown: AtomicU64,
    pub invalid_tokens: AtomicU64,
    pub files_not_found: AtomicU64,
    pub delivery_failures: AtomicU64,
    pub delivered: AtomicU64,
    pub ignored: AtomicU64,
    pub still_not_joined: AtomicU64,
    pub archive_failures: AtomicU64,
    pub saved: AtomicU64,
    /// Units of work aborted by a record store failure.
    pub store_errors: AtomicU64,
}

impl GatewayMetrics {
    /// Count one outcome.
    pub fn record(&self, outcome: &GateOutcome) {
        let counter = match outcome {
            GateOutcome::Welcomed => &self.welcomed,
            GateOutcome::PromptShown => &self.prompts_shown,
            GateOutcome::InvalidToken => &self.invalid_tokens,
            GateOutcome::FileNotFound => &self.files_not_found,
            GateOutcome::DeliveryFailed => &self.delivery_failures,
            GateOutcome::Delivered { .. } => &self.delivered,
            GateOutcome::Ignored => &self.ignored,
            GateOutcome::StillNotJoined => &self.still_not_joined,
            GateOutcome::ArchiveFailed => &self.archive_failures,
            GateOutcome::Saved { .. } => &self.saved,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment the store error counter.
    pub fn increment_store_errors(&self) {
        self.store_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Take a point-in-time snapshot of all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            welcomed: self.welcomed.load(Ordering::Relaxed),
            prompts_shown: self.prompts_shown.load(Ordering::Relaxed),
            invalid_tokens: self.invalid_tokens.load(Ordering::Relaxed),
            files_not_found: self.files_not_found.load(Ordering::Relaxed),
            delivery_failures: self.delivery_failures.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            ignored: self.ignored.load(Ordering::Relaxed),
            still_not_joined: self.still_not_joined.load(Ordering::Relaxed),
            archive_failures: self.archive_failures.load(Ordering::Relaxed),
            saved: self.saved.load(Ordering::Relaxed),
            store_errors: self.store_errors.load(Ordering::Relaxed),
        }
    }
}

/// A plain data snapshot of [`GatewayMetrics`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub welcomed: u64,
    pub prompts_shown: u64,
    pub invalid_tokens: u64,
    pub files_not_found: u64,
    pub delivery_failures: u64,
    pub delivered: u64,
    pub ignored: u64,
    pub still_not_joined: u64,
    pub archive_failures: u64,
    pub saved: u64,
    pub store_errors: u64,
}
