use std::collections::HashMap;
use std::time::Duration;
use time::OffsetDateTime;

use crate::worker::JobResult;

/// Every job outcome of one run, ordered by input index
#[derive(Debug, Clone)]
pub struct RunReport {
    pub results: Vec<JobResult>,
    pub started_at: OffsetDateTime,
    pub finished_at: OffsetDateTime,
}

impl RunReport {
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.len() - self.succeeded()
    }

    pub fn elapsed(&self) -> Duration {
        (self.finished_at - self.started_at)
            .try_into()
            .unwrap_or(Duration::ZERO)
    }

    /// Collapse into URL -> digest or `"failed: <message>"`.
    ///
    /// Keyed by URL, so for a repeated URL only the outcome of its last
    /// occurrence in the input survives.
    pub fn into_mapping(self) -> HashMap<String, String> {
        let mut output = HashMap::with_capacity(self.results.len());

        for result in self.results {
            let value = result.display_value();
            output.insert(result.url, value);
        }

        output
    }
}
