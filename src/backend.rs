use crate::alert::AlertSink;
use crate::memory::{MemoryAlertSink, MemoryLogSink};
use crate::sink::LogSink;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Supported backend pairs that can be selected via config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// CloudWatch Logs for storage, SNS for alerts.
    Aws,
    /// Process memory for both; nothing leaves the process.
    Memory,
}

impl FromStr for BackendKind {
    type Err = BackendKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "aws" | "cloudwatch" => Ok(BackendKind::Aws),
            "memory" | "mem" => Ok(BackendKind::Memory),
            _ => Err(BackendKindError::Unknown(s.to_string())),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Aws => f.write_str("aws"),
            BackendKind::Memory => f.write_str("memory"),
        }
    }
}

/// Error type returned when parsing a backend name.
#[derive(thiserror::Error, Debug)]
pub enum BackendKindError {
    #[error("unknown backend {0:?}, expected \"aws\" or \"memory\"")]
    Unknown(String),
}

/// Error type returned when building backends from configuration.
#[derive(thiserror::Error, Debug)]
pub enum BackendBuildError {
    #[error("aws feature is not enabled")]
    AwsFeatureDisabled,
}

/// The storage and notification collaborators handed to the handler.
#[derive(Clone)]
pub struct Backends {
    pub logs: Arc<dyn LogSink>,
    pub alerts: Arc<dyn AlertSink>,
}

impl Backends {
    pub fn memory() -> Self {
        Backends {
            logs: Arc::new(MemoryLogSink::new()),
            alerts: Arc::new(MemoryAlertSink::new()),
        }
    }
}

/// Create the backend pair for `kind`.
///
/// AWS clients take region and credentials from the standard AWS
/// environment/profile chain.
pub async fn make_backends(kind: BackendKind) -> Result<Backends, BackendBuildError> {
    match kind {
        BackendKind::Aws => {
            #[cfg(feature = "aws")]
            {
                use crate::aws::{CloudWatchLogsSink, SnsAlertSink};

                let sdk_config = aws_config::load_from_env().await;
                Ok(Backends {
                    logs: Arc::new(CloudWatchLogsSink::from_conf(&sdk_config)),
                    alerts: Arc::new(SnsAlertSink::from_conf(&sdk_config)),
                })
            }

            #[cfg(not(feature = "aws"))]
            {
                Err(BackendBuildError::AwsFeatureDisabled)
            }
        }
        BackendKind::Memory => Ok(Backends::memory()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_backend_names() {
        assert_eq!("aws".parse::<BackendKind>().unwrap(), BackendKind::Aws);
        assert_eq!("CloudWatch".parse::<BackendKind>().unwrap(), BackendKind::Aws);
        assert_eq!("memory".parse::<BackendKind>().unwrap(), BackendKind::Memory);
        assert!("kafka".parse::<BackendKind>().is_err());
    }

    #[tokio::test]
    async fn memory_backends_build_without_credentials() {
        let backends = make_backends(BackendKind::Memory).await.unwrap();
        backends.logs.ensure_group("/g", 1).await.unwrap();
        backends.alerts.publish("t", "s", "b").await.unwrap();
    }
}
