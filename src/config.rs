use crate::backend::BackendKind;
use crate::env::{
    env_or, BACKEND_ENV, BIND_ENV, LOG_FORMAT_ENV, LOG_GROUP_PREFIX_ENV, MAX_BODY_BYTES_ENV,
    RETENTION_DAYS_ENV, SECRET_TOKEN_ENV, SNS_TOPIC_ARN_ENV,
};
use crate::error::ConfigError;
use crate::init::LogFormat;
use std::net::SocketAddr;
use std::str::FromStr;

pub const DEFAULT_LOG_GROUP_PREFIX: &str = "/log-relay";
pub const DEFAULT_RETENTION_DAYS: u32 = 90;
pub const DEFAULT_TOPIC: &str = "Default_Topic";
pub const DEFAULT_SECRET_TOKEN: &str = "default-secret-token";
pub const DEFAULT_BIND: &str = "0.0.0.0:8080";
/// Matches the largest single event CloudWatch Logs accepts.
pub const DEFAULT_MAX_BODY_BYTES: usize = 256 * 1024;

/// Process-wide settings, read once at start-up and shared read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    pub log_group_prefix: String,
    pub retention_days: u32,
    pub alert_topic: String,
    pub secret_token: String,
    pub bind: SocketAddr,
    pub backend: BackendKind,
    pub max_body_bytes: usize,
    pub log_format: LogFormat,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            log_group_prefix: DEFAULT_LOG_GROUP_PREFIX.to_string(),
            retention_days: DEFAULT_RETENTION_DAYS,
            alert_topic: DEFAULT_TOPIC.to_string(),
            secret_token: DEFAULT_SECRET_TOKEN.to_string(),
            bind: SocketAddr::from(([0, 0, 0, 0], 8080)),
            backend: BackendKind::Aws,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            log_format: LogFormat::Text,
        }
    }
}

impl RelayConfig {
    /// Load from the process environment, using defaults for unset keys.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` to resolve each variable name.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let retention_days: u32 = parse(
            RETENTION_DAYS_ENV,
            get(RETENTION_DAYS_ENV, &DEFAULT_RETENTION_DAYS.to_string()),
        )?;
        if retention_days == 0 {
            return Err(ConfigError::InvalidValue {
                key: RETENTION_DAYS_ENV,
                value: retention_days.to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(Self {
            log_group_prefix: get(LOG_GROUP_PREFIX_ENV, DEFAULT_LOG_GROUP_PREFIX),
            retention_days,
            alert_topic: get(SNS_TOPIC_ARN_ENV, DEFAULT_TOPIC),
            secret_token: get(SECRET_TOKEN_ENV, DEFAULT_SECRET_TOKEN),
            bind: parse(BIND_ENV, get(BIND_ENV, DEFAULT_BIND))?,
            backend: parse(BACKEND_ENV, get(BACKEND_ENV, "aws"))?,
            max_body_bytes: parse(
                MAX_BODY_BYTES_ENV,
                get(MAX_BODY_BYTES_ENV, &DEFAULT_MAX_BODY_BYTES.to_string()),
            )?,
            log_format: parse(LOG_FORMAT_ENV, get(LOG_FORMAT_ENV, "text"))?,
        })
    }
}

/// Only the log output format, for setting up logging before the rest of
/// the configuration is validated.
pub fn log_format_from_env() -> LogFormat {
    env_or(LOG_FORMAT_ENV, "text").parse().unwrap_or(LogFormat::Text)
}

fn parse<T>(key: &'static str, value: String) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key,
        reason: e.to_string(),
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let cfg = RelayConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg, RelayConfig::default());
    }

    #[test]
    fn reads_overrides() {
        let cfg = RelayConfig::from_lookup(lookup(&[
            (LOG_GROUP_PREFIX_ENV, "/acme"),
            (RETENTION_DAYS_ENV, "14"),
            (SNS_TOPIC_ARN_ENV, "arn:aws:sns:us-east-1:123:alerts"),
            (SECRET_TOKEN_ENV, "s3cret"),
            (BIND_ENV, "127.0.0.1:9000"),
            (BACKEND_ENV, "memory"),
            (MAX_BODY_BYTES_ENV, "1024"),
            (LOG_FORMAT_ENV, "json"),
        ]))
        .unwrap();

        assert_eq!(cfg.log_group_prefix, "/acme");
        assert_eq!(cfg.retention_days, 14);
        assert_eq!(cfg.alert_topic, "arn:aws:sns:us-east-1:123:alerts");
        assert_eq!(cfg.secret_token, "s3cret");
        assert_eq!(cfg.bind, "127.0.0.1:9000".parse().unwrap());
        assert_eq!(cfg.backend, BackendKind::Memory);
        assert_eq!(cfg.max_body_bytes, 1024);
        assert_eq!(cfg.log_format, LogFormat::Json);
    }

    #[test]
    fn rejects_bad_retention() {
        let err = RelayConfig::from_lookup(lookup(&[(RETENTION_DAYS_ENV, "ninety")])).unwrap_err();
        assert!(err.to_string().contains(RETENTION_DAYS_ENV));
        assert!(RelayConfig::from_lookup(lookup(&[(RETENTION_DAYS_ENV, "0")])).is_err());
    }
}
