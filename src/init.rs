use std::str::FromStr;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{fmt, EnvFilter, Registry};

/// Output format of the relay's own logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "plain" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format {other:?}, expected \"text\" or \"json\"")),
        }
    }
}

/// Logging setup.
///
/// **Fields**
/// - `format`: human-readable lines or one JSON object per event.
/// - `default_directive`: filter used when `RUST_LOG` is unset or
///   unparseable, e.g. `info` or `log_relay=debug,info`.
#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub format: LogFormat,
    pub default_directive: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Text,
            default_directive: "info".to_string(),
        }
    }
}

/// Install the global `tracing` subscriber.
///
/// **Returns**
/// - `Err(..)` if a global subscriber was already installed.
pub fn init_logging_with_config(config: LoggingConfig) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_directive));
    let registry = Registry::default().with(filter);

    // The fmt layer has a different type per format, so build the
    // subscriber once per variant.
    match config.format {
        LogFormat::Json => registry.with(fmt::layer().json()).try_init(),
        LogFormat::Text => registry.with(fmt::layer()).try_init(),
    }
}

/// [`init_logging_with_config`] with the default filter and `format`.
pub fn init_logging(format: LogFormat) -> Result<(), TryInitError> {
    init_logging_with_config(LoggingConfig {
        format,
        ..LoggingConfig::default()
    })
}
