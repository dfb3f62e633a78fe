use crate::digest::Algorithm;
use crate::humanize::HumanDuration;
use crate::worker::HttpConfig;
use serde::{Deserialize, Serialize};

/// Parallelism used when none (or an invalid one) is configured
pub const DEFAULT_PARALLEL: usize = 10;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub http: HttpSettings,
}

/// Run configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RunConfig {
    /// Signed so that non-positive input can be detected and replaced
    #[serde(default = "default_parallel")]
    pub parallel: i64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout: HumanDuration,
    #[serde(default)]
    pub algorithm: Algorithm,
}

/// Transport settings shared by every request
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpSettings {
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: HumanDuration,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            parallel: default_parallel(),
            request_timeout: default_request_timeout(),
            algorithm: Algorithm::default(),
        }
    }
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            connect_timeout: default_connect_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl HttpSettings {
    pub fn to_http_config(&self) -> HttpConfig {
        HttpConfig {
            connect_timeout: self.connect_timeout.as_duration(),
            user_agent: self.user_agent.clone(),
        }
    }
}

pub(super) fn default_parallel() -> i64 {
    DEFAULT_PARALLEL as i64
}

pub(super) fn default_request_timeout() -> HumanDuration {
    HumanDuration(crate::digest::DEFAULT_TIMEOUT)
}

pub(super) fn default_connect_timeout() -> HumanDuration {
    HumanDuration::from_secs(10)
}

pub(super) fn default_user_agent() -> String {
    HttpConfig::default().user_agent
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.run.parallel, 10);
        assert_eq!(config.run.request_timeout.as_duration(), Duration::from_secs(5));
        assert_eq!(config.run.algorithm, Algorithm::Md5);
        assert_eq!(config.http.connect_timeout.as_duration(), Duration::from_secs(10));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
[run]
parallel = 3
algorithm = "sha256"
            "#,
        )
        .unwrap();

        assert_eq!(config.run.parallel, 3);
        assert_eq!(config.run.algorithm, Algorithm::Sha256);
        assert_eq!(config.run.request_timeout, default_request_timeout());
        assert_eq!(config.http.user_agent, default_user_agent());
    }

    #[test]
    fn test_http_settings_conversion() {
        let settings = HttpSettings {
            connect_timeout: HumanDuration::from_millis(1500),
            user_agent: "custom-agent/1.0".to_string(),
        };

        let http = settings.to_http_config();
        assert_eq!(http.connect_timeout, Duration::from_millis(1500));
        assert_eq!(http.user_agent, "custom-agent/1.0");
    }
}
