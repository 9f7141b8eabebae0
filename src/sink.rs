use async_trait::async_trait;

/// Error returned by a [`LogSink`] backend.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SinkError {
    /// The group or stream being created is already there. Callers that
    /// only need the resource to exist treat this as success.
    #[error("resource already exists: {0}")]
    AlreadyExists(String),

    #[error("log sink operation failed: {0}")]
    Backend(String),

    #[error("failed to serialize log record: {0}")]
    Serialize(String),
}

impl From<serde_json::Error> for SinkError {
    fn from(err: serde_json::Error) -> Self {
        SinkError::Serialize(err.to_string())
    }
}

/// Durable, append-only log storage organised as groups of streams.
///
/// Implementations talk to a concrete backend (CloudWatch Logs, memory,
/// etc). Every call is attempted exactly once; retry policy, if any,
/// belongs to the backend client.
#[async_trait]
pub trait LogSink: Send + Sync {
    /// Create the log group `name`.
    ///
    /// **Returns**
    /// - `Ok(())` if the group was created. `retention_days` is applied
    ///   to the new group as part of creation.
    /// - `Err(SinkError::AlreadyExists(..))` if the group was already
    ///   present. Its retention is left untouched.
    /// - `Err(..)` for any other backend failure.
    async fn ensure_group(&self, name: &str, retention_days: u32) -> Result<(), SinkError>;

    /// Create the stream `stream` inside `group`, with the same
    /// `AlreadyExists` convention as [`LogSink::ensure_group`].
    async fn ensure_stream(&self, group: &str, stream: &str) -> Result<(), SinkError>;

    /// Append one entry to an existing stream.
    ///
    /// `timestamp_ms` is milliseconds since the Unix epoch; `message` is
    /// the payload text stored verbatim.
    async fn append(
        &self,
        group: &str,
        stream: &str,
        timestamp_ms: i64,
        message: &str,
    ) -> Result<(), SinkError>;
}
