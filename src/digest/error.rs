use std::time::Duration;
use thiserror::Error;

/// Failure of a single fetch-and-hash job.
///
/// Every variant belongs to one of three kinds (see [`ErrorKind`]); the
/// `Display` output is what ends up after `"failed: "` in a run's mapping.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DigestError {
    #[error("{0}")]
    Transport(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("remote returned rsp code {0}")]
    Status(u16),

    #[error("failed to build HTTP client: {0}")]
    Client(String),

    #[error("failed to read response body ({0})")]
    Body(String),

    #[error("failed to compute digest: {0}")]
    Hash(String),

    #[error("worker stopped before reporting a result")]
    WorkerLost,
}

/// Coarse classification of a [`DigestError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Transport failure or a status code >= 400
    Http,
    /// Response body could not be read
    Byte,
    /// Digest computation failed; unused by MD5 and SHA-256
    Hash,
    /// The job never produced a result
    Internal,
}

impl DigestError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DigestError::Transport(_)
            | DigestError::Timeout(_)
            | DigestError::Status(_)
            | DigestError::Client(_) => ErrorKind::Http,
            DigestError::Body(_) => ErrorKind::Byte,
            DigestError::Hash(_) => ErrorKind::Hash,
            DigestError::WorkerLost => ErrorKind::Internal,
        }
    }
}
