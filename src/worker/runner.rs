//! Worker loop - processes individual jobs from the shared queue

use super::http::Fetch;
use super::{Job, JobResult};
use crate::digest::{ContentDigest, DigestError};
use crate::observability::Metrics;
use std::sync::Arc;
use std::time::Duration;
use time::OffsetDateTime;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, warn};

/// Job queue receiver shared by all workers of a run.
///
/// tokio's mpsc is single-consumer, so workers take turns holding the
/// receiver; the lock is released before a job is processed.
pub type SharedJobs = Arc<Mutex<mpsc::Receiver<Job>>>;

/// Read-only state every worker of a run needs
#[derive(Clone)]
pub struct WorkerContext {
    pub fetcher: Arc<dyn Fetch>,
    pub digest: Arc<dyn ContentDigest>,
    pub timeout: Duration,
    pub metrics: Arc<Metrics>,
}

/// Drain the shared queue until it is closed and empty.
///
/// Emits exactly one [`JobResult`] per job taken. Stops early only when the
/// result channel has no receiver left.
pub async fn run_worker(
    worker_id: usize,
    ctx: WorkerContext,
    jobs: SharedJobs,
    results: mpsc::Sender<JobResult>,
) {
    debug!(worker_id, "Worker started");

    loop {
        let next = { jobs.lock().await.recv().await };
        let Some(job) = next else {
            break;
        };

        let result = process_job(&ctx, job).await;

        if results.send(result).await.is_err() {
            warn!(worker_id, "Result channel closed, stopping worker");
            break;
        }
    }

    debug!(worker_id, "Worker finished");
}

/// Fetch and digest a single job, stamping start and finish times
pub async fn process_job(ctx: &WorkerContext, job: Job) -> JobResult {
    let started_at = OffsetDateTime::now_utc();
    let outcome = fetch_and_hash(
        ctx.fetcher.as_ref(),
        ctx.digest.as_ref(),
        &job.url,
        ctx.timeout,
    )
    .await;
    let finished_at = OffsetDateTime::now_utc();

    match &outcome {
        Ok(hash) => {
            ctx.metrics.job_succeeded();
            debug!(index = job.index, url = %job.url, hash, "Job completed");
        }
        Err(e) => {
            ctx.metrics.job_failed();
            warn!(index = job.index, url = %job.url, error = %e, kind = ?e.kind(), "Job failed");
        }
    }

    JobResult {
        index: job.index,
        url: job.url,
        outcome,
        started_at,
        finished_at,
    }
}

/// One fetch attempt followed by a digest over the complete body
pub async fn fetch_and_hash(
    fetcher: &dyn Fetch,
    digest: &dyn ContentDigest,
    url: &str,
    timeout: Duration,
) -> Result<String, DigestError> {
    let body = fetcher.fetch(url, timeout).await?;
    digest.digest(&body)
}
