//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {name}: {value:?}")]
    InvalidEnv { name: &'static str, value: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration: defaults, then the TOML file if one is given, then
/// environment overrides. The result is validated before it is returned.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => AppConfig::default(),
    };

    apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply the deployment environment on top of a config.
///
/// `lookup` resolves a variable name; empty values count as unset.
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(address) = var("REDIS") {
        config.store.address = address;
    }
    if let Some(username) = var("REDIS_USERNAME") {
        config.store.username = Some(username);
    }
    if let Some(password) = var("REDIS_PASSWORD") {
        config.store.password = Some(password);
    }
    if let Some(value) = var("REDIS_TLS") {
        config.store.tls = parse_flag("REDIS_TLS", &value)?;
    }
    if let Some(value) = var("REDIS_SECURE_SKIP") {
        if parse_flag("REDIS_SECURE_SKIP", &value)? {
            config.store.tls = true;
            config.store.insecure_skip_verify = true;
        }
    }
    if let Some(value) = var("PORT") {
        config.listener.port = value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
            name: "PORT",
            value: value.clone(),
        })?;
    }
    if let Some(value) = var("TRUSTED_PROXIES") {
        config.proxy.trusted_ranges = value
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
    }
    if let Some(url) = var("PUBLIC_URL") {
        config.content.public_url = url;
    }

    Ok(())
}

fn parse_flag(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidEnv {
            name,
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn port_defaults_to_3000() {
        let mut config = AppConfig::default();
        apply_env_overrides(&mut config, env(&[("PORT", "")])).unwrap();
        assert_eq!(config.listener.port, 3000);
    }

    #[test]
    fn env_overrides_store_and_listener() {
        let mut config = AppConfig::default();
        apply_env_overrides(
            &mut config,
            env(&[
                ("REDIS", "cache.internal:6380"),
                ("REDIS_USERNAME", "capy"),
                ("REDIS_PASSWORD", "s3cret"),
                ("REDIS_SECURE_SKIP", "true"),
                ("PORT", "8080"),
                ("TRUSTED_PROXIES", "10.0.0.0/8, 192.168.1.1"),
            ]),
        )
        .unwrap();

        assert_eq!(config.store.address, "cache.internal:6380");
        assert_eq!(config.store.username.as_deref(), Some("capy"));
        assert_eq!(config.store.password.as_deref(), Some("s3cret"));
        assert!(config.store.tls);
        assert!(config.store.insecure_skip_verify);
        assert_eq!(config.listener.port, 8080);
        assert_eq!(config.proxy.trusted_ranges, vec!["10.0.0.0/8", "192.168.1.1"]);
    }

    #[test]
    fn secure_skip_false_leaves_tls_off() {
        let mut config = AppConfig::default();
        apply_env_overrides(&mut config, env(&[("REDIS_SECURE_SKIP", "false")])).unwrap();
        assert!(!config.store.tls);
        assert!(!config.store.insecure_skip_verify);
    }

    #[test]
    fn invalid_port_is_rejected() {
        let mut config = AppConfig::default();
        let err = apply_env_overrides(&mut config, env(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { name: "PORT", .. }));
    }

    #[test]
    fn toml_sections_are_optional() {
        let config: AppConfig = toml::from_str(
            r#"
            [rate_limit]
            max_requests = 20

            [liveness]
            failure_threshold = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.rate_limit.max_requests, 20);
        assert_eq!(config.rate_limit.window_secs, 30);
        assert_eq!(config.liveness.failure_threshold, 3);
        assert_eq!(config.listener.port, 3000);
    }
}
