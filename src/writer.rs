use crate::destination::Destination;
use crate::record::LogRecord;
use crate::sink::{LogSink, SinkError};
use chrono::Utc;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, error};

/// Persists records into their routed group/stream through a [`LogSink`].
///
/// Failures never escape as panics; they are logged here and handed back
/// as a value so the caller can decide to ignore them.
#[derive(Clone)]
pub struct LogWriter {
    sink: Arc<dyn LogSink>,
    prefix: String,
    retention_days: u32,
}

impl LogWriter {
    pub fn new(sink: Arc<dyn LogSink>, prefix: impl Into<String>, retention_days: u32) -> Self {
        Self {
            sink,
            prefix: prefix.into(),
            retention_days,
        }
    }

    /// Route `record` and append it as one entry.
    ///
    /// **Returns**
    /// - `Ok(destination)` once the entry was appended.
    /// - `Err(..)` if routing, creation or the append failed, including a
    ///   panicking backend. The error has already been logged.
    pub async fn write(&self, record: &LogRecord) -> Result<Destination, SinkError> {
        let result = AssertUnwindSafe(self.try_write(record))
            .catch_unwind()
            .await
            .unwrap_or_else(|_| Err(SinkError::Backend("log sink panicked".to_string())));
        match &result {
            Ok(dest) => debug!(group = %dest.group, stream = %dest.stream, "log entry appended"),
            Err(e) => error!(error = %e, "failed to write log entry"),
        }
        result
    }

    async fn try_write(&self, record: &LogRecord) -> Result<Destination, SinkError> {
        let dest = Destination::for_today(record, &self.prefix).ok_or_else(|| {
            SinkError::Backend("record has no service_name to route on".to_string())
        })?;

        existing_ok(self.sink.ensure_group(&dest.group, self.retention_days).await)?;
        existing_ok(self.sink.ensure_stream(&dest.group, &dest.stream).await)?;

        let message = record.to_json()?;
        let timestamp_ms = Utc::now().timestamp_millis();
        self.sink
            .append(&dest.group, &dest.stream, timestamp_ms, &message)
            .await?;

        Ok(dest)
    }
}

fn existing_ok(result: Result<(), SinkError>) -> Result<(), SinkError> {
    match result {
        Err(SinkError::AlreadyExists(_)) => Ok(()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryLogSink, SinkOp};
    use crate::record::{CLIENT_NAME, SERVICE_NAME};
    use async_trait::async_trait;

    struct PanickingSink;

    #[async_trait]
    impl LogSink for PanickingSink {
        async fn ensure_group(&self, _name: &str, _retention_days: u32) -> Result<(), SinkError> {
            panic!("backend client bug");
        }

        async fn ensure_stream(&self, _group: &str, _stream: &str) -> Result<(), SinkError> {
            Ok(())
        }

        async fn append(&self, _: &str, _: &str, _: i64, _: &str) -> Result<(), SinkError> {
            Ok(())
        }
    }

    fn record() -> LogRecord {
        let mut record = LogRecord::default();
        record.insert(SERVICE_NAME, "billing");
        record.insert(CLIENT_NAME, "acme");
        record.insert("message", "disk full");
        record
    }

    #[tokio::test]
    async fn creates_destination_and_appends() {
        let sink = Arc::new(MemoryLogSink::new());
        let writer = LogWriter::new(sink.clone(), "/relay", 30);

        let dest = writer.write(&record()).await.unwrap();
        assert_eq!(dest.group, "/relay/billing");
        assert_eq!(dest.stream, "acme");

        assert_eq!(sink.retention("/relay/billing"), Some(30));
        let entries = sink.entries("/relay/billing", "acme");
        assert_eq!(entries.len(), 1);
        assert_eq!(
            entries[0].message,
            r#"{"service_name":"billing","client_name":"acme","message":"disk full"}"#
        );
        assert!(entries[0].timestamp_ms > 0);
    }

    #[tokio::test]
    async fn existing_group_and_stream_are_reused() {
        let sink = Arc::new(MemoryLogSink::new());
        LogWriter::new(sink.clone(), "/relay", 30)
            .write(&record())
            .await
            .unwrap();
        // Retention is only set at creation time.
        LogWriter::new(sink.clone(), "/relay", 7)
            .write(&record())
            .await
            .unwrap();

        assert_eq!(sink.retention("/relay/billing"), Some(30));
        assert_eq!(sink.entries("/relay/billing", "acme").len(), 2);
    }

    #[tokio::test]
    async fn failures_come_back_as_values() {
        let sink = Arc::new(MemoryLogSink::new().fail_on(SinkOp::EnsureStream));
        let writer = LogWriter::new(sink.clone(), "/relay", 30);

        let err = writer.write(&record()).await.unwrap_err();
        assert!(matches!(err, SinkError::Backend(_)));
        assert!(sink.entries("/relay/billing", "acme").is_empty());
    }

    #[tokio::test]
    async fn panicking_sink_becomes_backend_error() {
        let writer = LogWriter::new(Arc::new(PanickingSink), "/relay", 30);
        let err = writer.write(&record()).await.unwrap_err();
        assert_eq!(err, SinkError::Backend("log sink panicked".to_string()));
    }
}
