use super::models::{self, Config};
use thiserror::Error;

/// A configured value that was rejected and replaced by its default
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("parallel must be positive (got {value}), using {fallback}")]
    NonPositiveParallel { value: i64, fallback: i64 },

    #[error("{field} must be non-zero, using {fallback}")]
    ZeroTimeout { field: &'static str, fallback: String },

    #[error("user_agent must not be empty, using '{fallback}'")]
    EmptyUserAgent { fallback: String },
}

/// Replace invalid values with their defaults.
///
/// Invalid configuration never aborts a run; every replacement is returned
/// (and logged) so callers can report it.
pub fn normalize(config: &mut Config) -> Vec<ValidationError> {
    let mut adjustments = Vec::new();

    normalize_parallel(config, &mut adjustments);
    normalize_timeouts(config, &mut adjustments);
    normalize_user_agent(config, &mut adjustments);

    for adjustment in &adjustments {
        tracing::warn!(%adjustment, "Invalid configuration value replaced");
    }

    adjustments
}

fn normalize_parallel(config: &mut Config, adjustments: &mut Vec<ValidationError>) {
    if config.run.parallel <= 0 {
        let fallback = models::default_parallel();
        adjustments.push(ValidationError::NonPositiveParallel {
            value: config.run.parallel,
            fallback,
        });
        config.run.parallel = fallback;
    }
}

fn normalize_timeouts(config: &mut Config, adjustments: &mut Vec<ValidationError>) {
    if config.run.request_timeout.is_zero() {
        let fallback = models::default_request_timeout();
        adjustments.push(ValidationError::ZeroTimeout {
            field: "request_timeout",
            fallback: fallback.to_string(),
        });
        config.run.request_timeout = fallback;
    }

    if config.http.connect_timeout.is_zero() {
        let fallback = models::default_connect_timeout();
        adjustments.push(ValidationError::ZeroTimeout {
            field: "connect_timeout",
            fallback: fallback.to_string(),
        });
        config.http.connect_timeout = fallback;
    }
}

fn normalize_user_agent(config: &mut Config, adjustments: &mut Vec<ValidationError>) {
    if config.http.user_agent.trim().is_empty() {
        let fallback = models::default_user_agent();
        adjustments.push(ValidationError::EmptyUserAgent {
            fallback: fallback.clone(),
        });
        config.http.user_agent = fallback;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::humanize::HumanDuration;

    #[test]
    fn test_valid_config_untouched() {
        let mut config = Config::default();
        config.run.parallel = 3;

        assert!(normalize(&mut config).is_empty());
        assert_eq!(config.run.parallel, 3);
    }

    #[test]
    fn test_non_positive_parallel_falls_back() {
        for value in [0, -1, -250] {
            let mut config = Config::default();
            config.run.parallel = value;

            let adjustments = normalize(&mut config);
            assert_eq!(
                adjustments,
                vec![ValidationError::NonPositiveParallel { value, fallback: 10 }]
            );
            assert_eq!(config.run.parallel, 10);
        }
    }

    #[test]
    fn test_zero_timeouts_fall_back() {
        let mut config = Config::default();
        config.run.request_timeout = HumanDuration::default();
        config.http.connect_timeout = HumanDuration::default();

        let adjustments = normalize(&mut config);
        assert_eq!(adjustments.len(), 2);
        assert_eq!(config.run.request_timeout, HumanDuration::from_secs(5));
        assert_eq!(config.http.connect_timeout, HumanDuration::from_secs(10));
    }

    #[test]
    fn test_blank_user_agent_falls_back() {
        let mut config = Config::default();
        config.http.user_agent = "   ".to_string();

        let adjustments = normalize(&mut config);
        assert!(matches!(
            adjustments.as_slice(),
            [ValidationError::EmptyUserAgent { .. }]
        ));
        assert!(config.http.user_agent.starts_with("digester/"));
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let mut config = Config::default();
        config.run.parallel = -4;

        assert_eq!(normalize(&mut config).len(), 1);
        assert!(normalize(&mut config).is_empty());
    }
}
