//! Environment variable names read by [`RelayConfig::from_env`].
//!
//! [`RelayConfig::from_env`]: crate::config::RelayConfig::from_env

/// Prefix of every log group, e.g. `/log-relay` gives `/log-relay/billing`.
pub const LOG_GROUP_PREFIX_ENV: &str = "LOG_GROUP_PREFIX";

/// Retention, in days, applied to newly created log groups.
pub const RETENTION_DAYS_ENV: &str = "RETENTION_DAYS";

/// Topic that ERROR/FATAL alerts are published to.
pub const SNS_TOPIC_ARN_ENV: &str = "SNS_TOPIC_ARN";

/// Shared secret expected in the `x-custom-auth` header.
pub const SECRET_TOKEN_ENV: &str = "SECRET_TOKEN";

/// Socket address the HTTP server binds to.
pub const BIND_ENV: &str = "LOG_RELAY_BIND";

/// Backend pair to use: `aws` or `memory`.
pub const BACKEND_ENV: &str = "LOG_RELAY_BACKEND";

/// Upper bound on accepted request bodies.
pub const MAX_BODY_BYTES_ENV: &str = "LOG_RELAY_MAX_BODY_BYTES";

/// `text` or `json` output for the relay's own logs.
pub const LOG_FORMAT_ENV: &str = "LOG_RELAY_LOG_FORMAT";

/// Read an environment variable or fall back to a provided default.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
