use crate::record::{display_value, LogRecord, LEVEL};
use serde_json::Value;
use std::fmt;

/// Levels that raise an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Fatal,
}

impl Severity {
    /// Classify a raw `level` value. Absent levels count as empty.
    ///
    /// Returns `None` for anything that does not qualify for alerting.
    pub fn classify(level: Option<&Value>) -> Option<Self> {
        let level = level.map(display_value).unwrap_or_default();
        match level.to_uppercase().as_str() {
            "ERROR" => Some(Severity::Error),
            "FATAL" => Some(Severity::Fatal),
            _ => None,
        }
    }

    pub fn of(record: &LogRecord) -> Option<Self> {
        Self::classify(record.get(LEVEL))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "ERROR",
            Severity::Fatal => "FATAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn error_and_fatal_qualify_in_any_case() {
        for level in ["error", "Error", "ERROR", "eRrOr"] {
            assert_eq!(Severity::classify(Some(&json!(level))), Some(Severity::Error));
        }
        for level in ["fatal", "FATAL", "Fatal"] {
            assert_eq!(Severity::classify(Some(&json!(level))), Some(Severity::Fatal));
        }
    }

    #[test]
    fn everything_else_is_ignored() {
        for level in ["", "info", "warn", "WARNING", "errors", " error"] {
            assert_eq!(Severity::classify(Some(&json!(level))), None, "{level:?}");
        }
        assert_eq!(Severity::classify(None), None);
        assert_eq!(Severity::classify(Some(&json!(3))), None);
    }
}
