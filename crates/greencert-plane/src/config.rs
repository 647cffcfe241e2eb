//! Process configuration
//!
//! Read once at startup from `GREENCERT_*` environment variables.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `GREENCERT_PORT` | `8080` |
//! | `GREENCERT_LOG_LEVEL` | `info` |
//! | `GREENCERT_DATABASE_URL` | unset (in-memory store) |
//! | `GREENCERT_PUBLIC_URL` | `http://localhost:8080` |
//! | `GREENCERT_VERIFY_URL` | `<public_url>/verify` |
//! | `GREENCERT_LEDGER_TIMEOUT_SECS` | `30` |
//! | `GREENCERT_OBJECT_DIR` | unset (in-memory objects) |

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::Level;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} has invalid value {value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaneConfig {
    pub port: u16,
    pub log_level: Level,
    pub database_url: Option<String>,
    pub public_url: String,
    pub verify_url: String,
    pub ledger_timeout: Duration,
    pub object_dir: Option<PathBuf>,
}

impl Default for PlaneConfig {
    fn default() -> Self {
        let public_url = "http://localhost:8080".to_string();
        Self {
            port: 8080,
            log_level: Level::INFO,
            database_url: None,
            verify_url: format!("{}/verify", public_url),
            public_url,
            ledger_timeout: Duration::from_secs(30),
            object_dir: None,
        }
    }
}

fn invalid(var: &'static str, value: &str, reason: impl ToString) -> ConfigError {
    ConfigError::Invalid {
        var,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

impl PlaneConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from any variable source; empty values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let port = match get("GREENCERT_PORT") {
            Some(v) => v
                .parse::<u16>()
                .map_err(|e| invalid("GREENCERT_PORT", &v, e))?,
            None => defaults.port,
        };

        let log_level = match get("GREENCERT_LOG_LEVEL") {
            Some(v) => v
                .parse::<Level>()
                .map_err(|e| invalid("GREENCERT_LOG_LEVEL", &v, e))?,
            None => defaults.log_level,
        };

        let public_url = match get("GREENCERT_PUBLIC_URL") {
            Some(v) => {
                if !(v.starts_with("http://") || v.starts_with("https://")) {
                    return Err(invalid(
                        "GREENCERT_PUBLIC_URL",
                        &v,
                        "must start with http:// or https://",
                    ));
                }
                v.trim_end_matches('/').to_string()
            }
            None => defaults.public_url,
        };

        let verify_url = get("GREENCERT_VERIFY_URL")
            .map(|v| v.trim_end_matches('/').to_string())
            .unwrap_or_else(|| format!("{}/verify", public_url));

        let ledger_timeout = match get("GREENCERT_LEDGER_TIMEOUT_SECS") {
            Some(v) => {
                let secs = v
                    .parse::<u64>()
                    .map_err(|e| invalid("GREENCERT_LEDGER_TIMEOUT_SECS", &v, e))?;
                if secs == 0 {
                    return Err(invalid(
                        "GREENCERT_LEDGER_TIMEOUT_SECS",
                        &v,
                        "must be greater than zero",
                    ));
                }
                Duration::from_secs(secs)
            }
            None => defaults.ledger_timeout,
        };

        Ok(Self {
            port,
            log_level,
            database_url: get("GREENCERT_DATABASE_URL"),
            public_url,
            verify_url,
            ledger_timeout,
            object_dir: get("GREENCERT_OBJECT_DIR").map(PathBuf::from),
        })
    }

    /// Base URL under which QR objects are served
    pub fn qr_base(&self) -> String {
        format!("{}/v1/qr", self.public_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<PlaneConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        PlaneConfig::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn test_defaults() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg, PlaneConfig::default());
        assert_eq!(cfg.verify_url, "http://localhost:8080/verify");
        assert_eq!(cfg.qr_base(), "http://localhost:8080/v1/qr");
    }

    #[test]
    fn test_verify_url_follows_public_url() {
        let cfg = config(&[("GREENCERT_PUBLIC_URL", "https://certs.example.org/")]).unwrap();
        assert_eq!(cfg.public_url, "https://certs.example.org");
        assert_eq!(cfg.verify_url, "https://certs.example.org/verify");
    }

    #[test]
    fn test_invalid_port() {
        let err = config(&[("GREENCERT_PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "GREENCERT_PORT", .. }));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        assert!(config(&[("GREENCERT_LEDGER_TIMEOUT_SECS", "0")]).is_err());
        let cfg = config(&[("GREENCERT_LEDGER_TIMEOUT_SECS", "5")]).unwrap();
        assert_eq!(cfg.ledger_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_empty_values_are_unset() {
        let cfg = config(&[("GREENCERT_DATABASE_URL", ""), ("GREENCERT_LOG_LEVEL", "debug")]).unwrap();
        assert_eq!(cfg.database_url, None);
        assert_eq!(cfg.log_level, Level::DEBUG);
    }
}
