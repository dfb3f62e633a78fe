//! Configuration management for the digester
//!
//! This module provides a layered configuration system that loads settings from:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. Environment variables (highest priority)
//!
//! Command-line flags are applied on top by the binary.
//!
//! # Usage
//!
//! ```no_run
//! use digester::config::Config;
//!
//! let config = Config::load().expect("Failed to load configuration");
//! println!("Workers: {}", config.parallel());
//! ```
//!
//! # Environment Variables
//!
//! Configuration can be overridden using environment variables with the pattern:
//! `DIGESTER__<section>__<key>`
//!
//! Examples:
//! - `DIGESTER__RUN__PARALLEL=32`
//! - `DIGESTER__RUN__REQUEST_TIMEOUT=750ms`
//! - `DIGESTER__HTTP__USER_AGENT=my-agent/1.0`
//!
//! # Configuration File
//!
//! By default, the configuration is loaded from `config/digester.toml` when it
//! exists. This can be overridden using the `DIGESTER_CONFIG` environment variable.

mod models;
mod sources;
mod validation;

pub use crate::humanize::HumanDuration;
pub use models::{Config, DEFAULT_PARALLEL, HttpSettings, RunConfig};
pub use validation::ValidationError;

use std::num::NonZeroUsize;
use thiserror::Error;

use crate::digest::{DigestError, Digester};
use crate::worker::HttpFetcher;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),
}

impl Config {
    /// Load configuration from all sources (file + environment)
    ///
    /// Invalid values are replaced by defaults (see [`Config::normalize`]).
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file is malformed or a value
    /// cannot be parsed.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = sources::load()?;
        config.normalize();
        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: std::path::PathBuf) -> Result<Self, ConfigError> {
        let mut config = sources::load_from_sources(path)?;
        config.normalize();
        Ok(config)
    }

    /// Replace invalid values with defaults, returning what was replaced
    pub fn normalize(&mut self) -> Vec<ValidationError> {
        validation::normalize(self)
    }

    /// Worker count, falling back to [`DEFAULT_PARALLEL`] for non-positive values
    pub fn parallel(&self) -> NonZeroUsize {
        usize::try_from(self.run.parallel)
            .ok()
            .and_then(NonZeroUsize::new)
            .or_else(|| NonZeroUsize::new(DEFAULT_PARALLEL))
            .unwrap_or(NonZeroUsize::MIN)
    }

    /// Build a digester from this configuration
    pub fn digester(&self) -> Result<Digester, DigestError> {
        let fetcher = HttpFetcher::new(self.http.to_http_config())?;
        let mut digester = Digester::with_components(
            self.parallel(),
            std::sync::Arc::new(fetcher),
            self.run.algorithm.digest(),
        );
        digester.set_timeout(self.run.request_timeout.as_duration());
        Ok(digester)
    }
}
