//! Fetch-and-hash worker pool
//!
//! Workers pull [`Job`]s from a shared bounded queue, fetch the URL, digest
//! the body and push exactly one [`JobResult`] per job onto the result channel.

pub mod http;
pub mod runner;

use std::time::Duration;
use time::OffsetDateTime;

use crate::digest::DigestError;

pub use http::{Fetch, HttpConfig, HttpFetcher};
pub use runner::{SharedJobs, WorkerContext, run_worker};

/// One indexed URL awaiting fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub index: usize,
    pub url: String,
}

/// Outcome of processing one [`Job`]
#[derive(Debug, Clone)]
pub struct JobResult {
    pub index: usize,
    pub url: String,
    /// Hex digest on success
    pub outcome: Result<String, DigestError>,
    pub started_at: OffsetDateTime,
    pub finished_at: OffsetDateTime,
}

impl JobResult {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn elapsed(&self) -> Duration {
        (self.finished_at - self.started_at)
            .try_into()
            .unwrap_or(Duration::ZERO)
    }

    /// Value stored in a run's mapping: the digest, or `"failed: <message>"`
    pub fn display_value(&self) -> String {
        match &self.outcome {
            Ok(hash) => hash.clone(),
            Err(e) => format!("failed: {}", e),
        }
    }
}
