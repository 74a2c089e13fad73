//! Environment configuration.

use std::env;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_MAX_DB_CONNECTIONS: u32 = 10;
const DEFAULT_PENDING_MAX_AGE_SECS: u64 = 24 * 60 * 60;
const DEFAULT_PURGE_INTERVAL_SECS: u64 = 60 * 60;
const DEFAULT_SESSION_IDLE_SECS: u64 = 2 * 60 * 60;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub max_db_connections: u32,
    pub generator_url: String,
    pub bind_address: String,
    pub port: u16,
    pub pending_dir: PathBuf,
    pub pending_max_age: Duration,
    pub purge_interval: Duration,
    pub session_idle: Duration,
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from any variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            max_db_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_DB_CONNECTIONS)?,
            generator_url: required("RECEIPT_GENERATOR_URL")?,
            bind_address: lookup("BIND_ADDRESS").unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string()),
            port: parse_or(&lookup, "PORT", DEFAULT_PORT)?,
            pending_dir: lookup("PENDING_FILE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| env::temp_dir().join("tax-receipts")),
            pending_max_age: parse_secs(
                &lookup,
                "PENDING_FILE_MAX_AGE_SECS",
                DEFAULT_PENDING_MAX_AGE_SECS,
            )?,
            purge_interval: parse_secs(
                &lookup,
                "PENDING_PURGE_INTERVAL_SECS",
                DEFAULT_PURGE_INTERVAL_SECS,
            )?,
            session_idle: parse_secs(&lookup, "SESSION_IDLE_SECS", DEFAULT_SESSION_IDLE_SECS)?,
            cors_origins: lookup("CORS_ALLOWED_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(str::trim)
                        .filter(|o| !o.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
        })
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}

/// Whole seconds, must be non-zero.
fn parse_secs<F>(lookup: &F, name: &'static str, default: u64) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match parse_or(lookup, name, default)? {
        0 => Err(ConfigError::Invalid {
            name,
            value: "0".to_string(),
        }),
        secs => Ok(Duration::from_secs(secs)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults_apply_when_optional_vars_missing() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/receipts"),
            ("RECEIPT_GENERATOR_URL", "http://generator:9000"),
        ]))
        .unwrap();

        assert_eq!(config.bind_address, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.pending_max_age, Duration::from_secs(86400));
        assert_eq!(config.purge_interval, Duration::from_secs(3600));
        assert_eq!(config.session_idle, Duration::from_secs(7200));
        assert!(config.pending_dir.ends_with("tax-receipts"));
        assert!(config.cors_origins.is_empty());
    }

    #[test]
    fn test_missing_database_url_is_reported() {
        let result =
            AppConfig::from_lookup(lookup_from(&[("RECEIPT_GENERATOR_URL", "http://g")]));

        assert_eq!(result.unwrap_err(), ConfigError::Missing("DATABASE_URL"));
    }

    #[test]
    fn test_invalid_port_is_reported() {
        let result = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/receipts"),
            ("RECEIPT_GENERATOR_URL", "http://g"),
            ("PORT", "eighty"),
        ]));

        assert_eq!(
            result.unwrap_err(),
            ConfigError::Invalid {
                name: "PORT",
                value: "eighty".to_string()
            }
        );
    }

    #[test]
    fn test_cors_origins_are_split_and_trimmed() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/receipts"),
            ("RECEIPT_GENERATOR_URL", "http://g"),
            ("CORS_ALLOWED_ORIGINS", "http://a.org, http://b.org,,"),
            ("PENDING_FILE_DIR", "/var/tmp/receipts"),
        ]))
        .unwrap();

        assert_eq!(config.cors_origins, vec!["http://a.org", "http://b.org"]);
        assert_eq!(config.pending_dir, PathBuf::from("/var/tmp/receipts"));
    }

    #[test]
    fn test_zero_durations_are_rejected() {
        for name in [
            "PENDING_PURGE_INTERVAL_SECS",
            "PENDING_FILE_MAX_AGE_SECS",
            "SESSION_IDLE_SECS",
        ] {
            let result = AppConfig::from_lookup(lookup_from(&[
                ("DATABASE_URL", "postgres://localhost/receipts"),
                ("RECEIPT_GENERATOR_URL", "http://g"),
                (name, "0"),
            ]));

            assert_eq!(
                result.unwrap_err(),
                ConfigError::Invalid {
                    name,
                    value: "0".to_string()
                }
            );
        }
    }
}
