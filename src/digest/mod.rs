//! Concurrent fetch-and-hash engine
//!
//! [`Digester`] fans a list of URLs out to a fixed pool of workers and fans
//! their results back in to a single mapping.
//!
//! ```no_run
//! use digester::Digester;
//! use std::num::NonZeroUsize;
//!
//! # async fn demo() -> Result<(), digester::DigestError> {
//! let digester = Digester::new(NonZeroUsize::new(4).unwrap())?;
//! let hashes = digester.run(&["https://example.com"]).await;
//! for (url, hash) in &hashes {
//!     println!("{}: {}", url, hash);
//! }
//! # Ok(())
//! # }
//! ```

mod error;
mod hasher;
mod report;

pub use error::{DigestError, ErrorKind};
pub use hasher::{Algorithm, ContentDigest, Md5Digest, Sha256Digest};
pub use report::RunReport;

use std::collections::HashMap;
use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;
use time::OffsetDateTime;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info, warn};

use crate::observability::{Metrics, MetricsSnapshot};
use crate::worker::{Fetch, HttpConfig, HttpFetcher, Job, JobResult, SharedJobs, WorkerContext, run_worker};

/// Per-request timeout applied until [`Digester::set_timeout`] is called
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Orchestrator owning the worker count, request timeout and the shared
/// fetch/digest capabilities.
pub struct Digester {
    parallel: NonZeroUsize,
    timeout: Duration,
    fetcher: Arc<dyn Fetch>,
    digest: Arc<dyn ContentDigest>,
    metrics: Arc<Metrics>,
}

impl Digester {
    /// Digester backed by a default HTTP client and MD5
    pub fn new(parallel: NonZeroUsize) -> Result<Self, DigestError> {
        let fetcher = HttpFetcher::new(HttpConfig::default())?;
        Ok(Self::with_components(
            parallel,
            Arc::new(fetcher),
            Arc::new(Md5Digest),
        ))
    }

    /// Digester with caller-supplied fetch and digest capabilities
    pub fn with_components(
        parallel: NonZeroUsize,
        fetcher: Arc<dyn Fetch>,
        digest: Arc<dyn ContentDigest>,
    ) -> Self {
        Self {
            parallel,
            timeout: DEFAULT_TIMEOUT,
            fetcher,
            digest,
            metrics: Arc::new(Metrics::new()),
        }
    }

    pub fn parallel(&self) -> NonZeroUsize {
        self.parallel
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Replace the per-request timeout used by subsequent runs
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    pub fn algorithm(&self) -> &'static str {
        self.digest.algorithm()
    }

    /// Counters accumulated over every run of this digester
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Fetch every URL and map it to its hex digest or `"failed: <message>"`.
    ///
    /// Always returns one entry per distinct URL; never fails as a whole.
    pub async fn run<S: AsRef<str>>(&self, urls: &[S]) -> HashMap<String, String> {
        self.run_report(urls).await.into_mapping()
    }

    /// Like [`Digester::run`], but keeps every job outcome in input order
    pub async fn run_report<S: AsRef<str>>(&self, urls: &[S]) -> RunReport {
        let started_at = OffsetDateTime::now_utc();
        let total = urls.len();

        if total == 0 {
            return RunReport {
                results: Vec::new(),
                started_at,
                finished_at: started_at,
            };
        }

        let parallel = self.parallel.get();
        info!(urls = total, parallel, timeout = ?self.timeout, algorithm = self.algorithm(), "Run started");

        let (job_tx, job_rx) = mpsc::channel::<Job>(parallel);
        let (result_tx, mut result_rx) = mpsc::channel::<JobResult>(parallel);
        let jobs: SharedJobs = Arc::new(Mutex::new(job_rx));

        let ctx = WorkerContext {
            fetcher: Arc::clone(&self.fetcher),
            digest: Arc::clone(&self.digest),
            timeout: self.timeout,
            metrics: Arc::clone(&self.metrics),
        };

        for worker_id in 0..parallel {
            tokio::spawn(run_worker(
                worker_id,
                ctx.clone(),
                Arc::clone(&jobs),
                result_tx.clone(),
            ));
        }
        // Workers now hold the only result senders and queue handles, so the
        // result channel closes once every worker has exited.
        drop(result_tx);
        drop(jobs);

        let pending: Vec<Job> = urls
            .iter()
            .enumerate()
            .map(|(index, url)| Job {
                index,
                url: url.as_ref().to_string(),
            })
            .collect();

        let metrics = Arc::clone(&self.metrics);
        let feeder = tokio::spawn(async move {
            for job in pending {
                let index = job.index;
                if job_tx.send(job).await.is_err() {
                    warn!(index, "Job queue closed before dispatch completed");
                    break;
                }
                metrics.job_dispatched();
            }
            debug!("All jobs dispatched, closing queue");
        });

        let mut slots: Vec<Option<JobResult>> = (0..total).map(|_| None).collect();
        let mut received = 0;

        while received < total {
            let Some(result) = result_rx.recv().await else {
                warn!(received, total, "Result channel closed before every job reported");
                break;
            };

            debug!(index = result.index, elapsed_ms = result.elapsed().as_millis() as u64, "Result received");
            let index = result.index;
            slots[index] = Some(result);
            received += 1;
        }

        if let Err(e) = feeder.await {
            warn!(error = %e, "Job feeder task failed");
        }

        let results: Vec<JobResult> = slots
            .into_iter()
            .zip(urls)
            .enumerate()
            .map(|(index, (slot, url))| slot.unwrap_or_else(|| lost_result(index, url.as_ref())))
            .collect();

        let report = RunReport {
            results,
            started_at,
            finished_at: OffsetDateTime::now_utc(),
        };

        info!(
            urls = total,
            succeeded = report.succeeded(),
            failed = report.failed(),
            elapsed_ms = report.elapsed().as_millis() as u64,
            "Run finished"
        );

        report
    }
}

impl fmt::Debug for Digester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Digester")
            .field("parallel", &self.parallel)
            .field("timeout", &self.timeout)
            .field("algorithm", &self.digest.algorithm())
            .finish_non_exhaustive()
    }
}

fn lost_result(index: usize, url: &str) -> JobResult {
    let now = OffsetDateTime::now_utc();
    JobResult {
        index,
        url: url.to_string(),
        outcome: Err(DigestError::WorkerLost),
        started_at: now,
        finished_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bytes::Bytes;
    use std::time::Instant;

    /// Serves `url` bytes as the body after an optional delay
    struct EchoFetch {
        delay: Duration,
    }

    #[async_trait]
    impl Fetch for EchoFetch {
        async fn fetch(&self, url: &str, _timeout: Duration) -> Result<Bytes, DigestError> {
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if url.ends_with("/missing") {
                return Err(DigestError::Status(404));
            }
            Ok(Bytes::copy_from_slice(url.as_bytes()))
        }
    }

    /// Panics for one URL, standing in for a crashed worker
    struct PanickingFetch;

    #[async_trait]
    impl Fetch for PanickingFetch {
        async fn fetch(&self, url: &str, _timeout: Duration) -> Result<Bytes, DigestError> {
            if url.ends_with("/panic") {
                panic!("fetcher blew up");
            }
            Ok(Bytes::from_static(b"ok"))
        }
    }

    fn digester(parallel: usize, delay: Duration) -> Digester {
        Digester::with_components(
            NonZeroUsize::new(parallel).unwrap(),
            Arc::new(EchoFetch { delay }),
            Arc::new(Md5Digest),
        )
    }

    fn md5_hex(body: &str) -> String {
        Md5Digest.digest(body.as_bytes()).unwrap()
    }

    #[test]
    fn test_new_uses_default_timeout() {
        let d = Digester::new(NonZeroUsize::new(3).unwrap()).unwrap();
        assert_eq!(d.parallel().get(), 3);
        assert_eq!(d.timeout(), DEFAULT_TIMEOUT);
        assert_eq!(d.algorithm(), "md5");
    }

    #[test]
    fn test_set_timeout() {
        let mut d = digester(1, Duration::ZERO);
        d.set_timeout(DEFAULT_TIMEOUT * 2);
        assert_eq!(d.timeout(), Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_empty_input() {
        let d = digester(2, Duration::ZERO);
        let urls: [&str; 0] = [];
        let output = d.run(&urls).await;
        assert!(output.is_empty());
        assert_eq!(d.metrics().jobs_dispatched, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_every_url_reported() {
        for parallel in [1, 2, 3, 8] {
            let d = digester(parallel, Duration::from_millis(1));
            let urls: Vec<String> = (0..20).map(|i| format!("http://host.test/{}", i)).collect();

            let output = d.run(&urls).await;

            assert_eq!(output.len(), urls.len(), "parallel = {}", parallel);
            for url in &urls {
                assert_eq!(output[url], md5_hex(url));
            }
            assert_eq!(d.metrics().jobs_dispatched, 20);
            assert_eq!(d.metrics().in_flight(), 0);
        }
    }

    #[tokio::test]
    async fn test_failures_are_folded_into_mapping() {
        let d = digester(2, Duration::ZERO);
        let output = d
            .run(&["http://host.test/ok", "http://host.test/missing"])
            .await;

        assert_eq!(output["http://host.test/ok"], md5_hex("http://host.test/ok"));
        assert_eq!(
            output["http://host.test/missing"],
            "failed: remote returned rsp code 404"
        );
        assert_eq!(d.metrics().jobs_failed, 1);
    }

    #[tokio::test]
    async fn test_report_preserves_input_order() {
        let d = digester(3, Duration::ZERO);
        let urls = ["http://a.test", "http://b.test", "http://a.test", "http://c.test"];

        let report = d.run_report(&urls).await;

        assert_eq!(report.len(), 4);
        for (index, result) in report.results.iter().enumerate() {
            assert_eq!(result.index, index);
            assert_eq!(result.url, urls[index]);
        }
        assert_eq!(report.into_mapping().len(), 3);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_parallel_workers_overlap() {
        let latency = Duration::from_millis(200);
        let d = digester(4, latency);
        let urls: Vec<String> = (0..4).map(|i| format!("http://slow.test/{}", i)).collect();

        let started = Instant::now();
        let output = d.run(&urls).await;
        let elapsed = started.elapsed();

        assert_eq!(output.len(), 4);
        assert!(elapsed < latency * 2, "took {:?}", elapsed);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_crashed_worker_does_not_hang_run() {
        let d = Digester::with_components(
            NonZeroUsize::new(2).unwrap(),
            Arc::new(PanickingFetch),
            Arc::new(Md5Digest),
        );
        let urls = ["http://a.test/ok", "http://b.test/panic", "http://c.test/ok"];

        let output = d.run(&urls).await;

        assert_eq!(output.len(), 3);
        assert_eq!(output["http://a.test/ok"], md5_hex("ok"));
        assert_eq!(output["http://c.test/ok"], md5_hex("ok"));
        assert_eq!(
            output["http://b.test/panic"],
            "failed: worker stopped before reporting a result"
        );
    }
}
