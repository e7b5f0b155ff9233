//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (windows, intervals, thresholds > 0 and bounded)
//! - Check that trusted ranges parse as CIDRs or addresses
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;

use crate::config::schema::AppConfig;
use crate::health::liveness::MAX_PROBE_PERIOD;
use crate::security::cors::parse_method;
use crate::security::rate_limit::MAX_WINDOW;
use crate::security::trusted_proxy::parse_range;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("rate_limit.max_requests must be greater than zero")]
    ZeroMaxRequests,

    #[error("rate_limit.window_secs must be greater than zero")]
    ZeroWindow,

    #[error("rate_limit.window_secs must be at most {max}")]
    WindowTooLarge { max: u64 },

    #[error("liveness.interval_secs must be greater than zero")]
    ZeroProbeInterval,

    #[error("liveness.interval_secs must be at most {max}")]
    ProbeIntervalTooLarge { max: u64 },

    #[error("liveness.probe_timeout_secs must be greater than zero")]
    ZeroProbeTimeout,

    #[error("liveness.probe_timeout_secs must be at most {max}")]
    ProbeTimeoutTooLarge { max: u64 },

    #[error("liveness.failure_threshold must be at least 1")]
    ZeroFailureThreshold,

    #[error("invalid trusted range '{0}'")]
    InvalidTrustedRange(String),

    #[error("proxy.forwarded_header must not be empty")]
    EmptyForwardedHeader,

    #[error("cors.allow_methods contains invalid method '{0}'")]
    InvalidCorsMethod(String),

    #[error("store.command_timeout_ms must be greater than zero")]
    ZeroCommandTimeout,
}

/// Validate a loaded configuration, collecting every problem found.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.rate_limit.max_requests == 0 {
        errors.push(ValidationError::ZeroMaxRequests);
    }
    if config.rate_limit.window_secs == 0 {
        errors.push(ValidationError::ZeroWindow);
    } else if config.rate_limit.window_secs > MAX_WINDOW.as_secs() {
        errors.push(ValidationError::WindowTooLarge {
            max: MAX_WINDOW.as_secs(),
        });
    }
    if config.liveness.interval_secs == 0 {
        errors.push(ValidationError::ZeroProbeInterval);
    } else if config.liveness.interval_secs > MAX_PROBE_PERIOD.as_secs() {
        errors.push(ValidationError::ProbeIntervalTooLarge {
            max: MAX_PROBE_PERIOD.as_secs(),
        });
    }
    if config.liveness.probe_timeout_secs == 0 {
        errors.push(ValidationError::ZeroProbeTimeout);
    } else if config.liveness.probe_timeout_secs > MAX_PROBE_PERIOD.as_secs() {
        errors.push(ValidationError::ProbeTimeoutTooLarge {
            max: MAX_PROBE_PERIOD.as_secs(),
        });
    }
    if config.liveness.failure_threshold == 0 {
        errors.push(ValidationError::ZeroFailureThreshold);
    }
    if config.store.command_timeout_ms == 0 {
        errors.push(ValidationError::ZeroCommandTimeout);
    }

    for range in &config.proxy.trusted_ranges {
        if parse_range(range).is_none() {
            errors.push(ValidationError::InvalidTrustedRange(range.clone()));
        }
    }

    if config.proxy.forwarded_header.trim().is_empty() {
        errors.push(ValidationError::EmptyForwardedHeader);
    }

    for method in &config.cors.allow_methods {
        if parse_method(method).is_none() {
            errors.push(ValidationError::InvalidCorsMethod(method.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn collects_every_error() {
        let mut config = AppConfig::default();
        config.rate_limit.max_requests = 0;
        config.liveness.failure_threshold = 0;
        config.proxy.trusted_ranges.push("not-a-range".into());

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.contains(&ValidationError::ZeroMaxRequests));
        assert!(errors.contains(&ValidationError::ZeroFailureThreshold));
        assert!(errors.contains(&ValidationError::InvalidTrustedRange("not-a-range".into())));
    }

    #[test]
    fn huge_periods_are_rejected() {
        let mut config = AppConfig::default();
        config.rate_limit.window_secs = u64::MAX;
        config.liveness.interval_secs = u64::MAX;
        config.liveness.probe_timeout_secs = MAX_PROBE_PERIOD.as_secs() + 1;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::WindowTooLarge { max: MAX_WINDOW.as_secs() },
                ValidationError::ProbeIntervalTooLarge { max: MAX_PROBE_PERIOD.as_secs() },
                ValidationError::ProbeTimeoutTooLarge { max: MAX_PROBE_PERIOD.as_secs() },
            ]
        );
    }

    #[test]
    fn periods_at_the_bound_are_accepted() {
        let mut config = AppConfig::default();
        config.rate_limit.window_secs = MAX_WINDOW.as_secs();
        config.liveness.interval_secs = MAX_PROBE_PERIOD.as_secs();
        config.liveness.probe_timeout_secs = MAX_PROBE_PERIOD.as_secs();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn cors_methods_are_checked_like_the_layer_reads_them() {
        let mut config = AppConfig::default();
        config.cors.allow_methods = vec![" GET".into(), "get".into(), "options ".into()];
        assert!(validate_config(&config).is_ok());

        config.cors.allow_methods = vec!["GE T".into(), " ".into()];
        assert_eq!(
            validate_config(&config).unwrap_err(),
            vec![
                ValidationError::InvalidCorsMethod("GE T".into()),
                ValidationError::InvalidCorsMethod(" ".into()),
            ]
        );
    }

    #[test]
    fn bare_addresses_are_valid_ranges() {
        let mut config = AppConfig::default();
        config.proxy.trusted_ranges = vec!["127.0.0.1".into(), "::1".into()];
        assert!(validate_config(&config).is_ok());
    }
}
