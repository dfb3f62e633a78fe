//! Content digest algorithms

use md5::Md5;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::Arc;

use super::error::DigestError;

/// Computes a hex-encoded digest over a complete response body.
pub trait ContentDigest: Send + Sync {
    /// Short algorithm name, used in logs
    fn algorithm(&self) -> &'static str;

    fn digest(&self, body: &[u8]) -> Result<String, DigestError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Md5Digest;

impl ContentDigest for Md5Digest {
    fn algorithm(&self) -> &'static str {
        "md5"
    }

    fn digest(&self, body: &[u8]) -> Result<String, DigestError> {
        let mut hasher = Md5::new();
        hasher.update(body);
        Ok(hex::encode(hasher.finalize()))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Digest;

impl ContentDigest for Sha256Digest {
    fn algorithm(&self) -> &'static str {
        "sha256"
    }

    fn digest(&self, body: &[u8]) -> Result<String, DigestError> {
        let mut hasher = Sha256::new();
        hasher.update(body);
        Ok(hex::encode(hasher.finalize()))
    }
}

/// Digest algorithm selectable from configuration and the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    #[default]
    Md5,
    Sha256,
}

impl Algorithm {
    pub fn digest(self) -> Arc<dyn ContentDigest> {
        match self {
            Algorithm::Md5 => Arc::new(Md5Digest),
            Algorithm::Sha256 => Arc::new(Sha256Digest),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Algorithm::Md5 => f.write_str("md5"),
            Algorithm::Sha256 => f.write_str("sha256"),
        }
    }
}
