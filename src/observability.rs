//! Observability (metrics, tracing)

use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "warn";

/// Install the global fmt subscriber.
///
/// Honors `RUST_LOG`; falls back to `warn`. Logs go to stderr so that
/// stdout carries only results.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Metrics handle for recording job counters
#[derive(Debug, Default)]
pub struct Metrics {
    jobs_dispatched: AtomicU64,
    jobs_succeeded: AtomicU64,
    jobs_failed: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn job_dispatched(&self) {
        self.jobs_dispatched.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(counter = "jobs_dispatched", "Metric incremented");
    }

    pub fn job_succeeded(&self) {
        self.jobs_succeeded.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(counter = "jobs_succeeded", "Metric incremented");
    }

    pub fn job_failed(&self) {
        self.jobs_failed.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(counter = "jobs_failed", "Metric incremented");
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            jobs_dispatched: self.jobs_dispatched.load(Ordering::Relaxed),
            jobs_succeeded: self.jobs_succeeded.load(Ordering::Relaxed),
            jobs_failed: self.jobs_failed.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    pub jobs_dispatched: u64,
    pub jobs_succeeded: u64,
    pub jobs_failed: u64,
}

impl MetricsSnapshot {
    /// Jobs dispatched but not yet reported back
    pub fn in_flight(&self) -> u64 {
        self.jobs_dispatched
            .saturating_sub(self.jobs_succeeded + self.jobs_failed)
    }
}
