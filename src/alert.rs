use crate::format::format_fields;
use crate::record::LogRecord;
use crate::severity::Severity;
use async_trait::async_trait;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{error, info};

/// Notification backends cap subjects at this many characters.
pub const MAX_SUBJECT_CHARS: usize = 100;
const ELLIPSIS: &str = "...";

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AlertError {
    #[error("alert publish failed: {0}")]
    Publish(String),
}

/// Publish-by-topic notification backend.
#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn publish(&self, topic: &str, subject: &str, body: &str) -> Result<(), AlertError>;
}

/// Subject and body of an alert raised for a single record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertMessage {
    pub subject: String,
    pub body: String,
}

impl AlertMessage {
    /// Build the alert for `record`, or `None` if its level does not
    /// qualify.
    pub fn from_record(record: &LogRecord) -> Option<Self> {
        let severity = Severity::of(record)?;
        let service_name = record.service_name().unwrap_or("unknown");

        let subject = truncate_subject(&format!("{} {} Notification", service_name, severity));

        let fields = format_fields(record);
        let body = match record.client_name() {
            Some(client) => format!("Client: {}\n\n{}", client, fields),
            None => fields,
        };

        Some(Self { subject, body })
    }
}

/// Shorten `subject` to [`MAX_SUBJECT_CHARS`] characters, ending in `...`
/// when anything was cut.
pub fn truncate_subject(subject: &str) -> String {
    if subject.chars().count() <= MAX_SUBJECT_CHARS {
        return subject.to_string();
    }
    let keep = MAX_SUBJECT_CHARS - ELLIPSIS.len();
    let mut out: String = subject.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}

/// What happened to a record handed to [`AlertDispatcher::dispatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Level did not qualify; nothing was sent.
    Skipped,
    Published,
    /// Publishing was attempted and failed or panicked. Already logged.
    Failed(AlertError),
}

/// Raises alerts for ERROR/FATAL records on a single configured topic.
#[derive(Clone)]
pub struct AlertDispatcher {
    sink: Arc<dyn AlertSink>,
    topic: String,
}

impl AlertDispatcher {
    pub fn new(sink: Arc<dyn AlertSink>, topic: impl Into<String>) -> Self {
        Self {
            sink,
            topic: topic.into(),
        }
    }

    pub async fn dispatch(&self, record: &LogRecord) -> Dispatch {
        let Some(alert) = AlertMessage::from_record(record) else {
            return Dispatch::Skipped;
        };

        let published = AssertUnwindSafe(self.sink.publish(&self.topic, &alert.subject, &alert.body))
            .catch_unwind()
            .await
            .unwrap_or_else(|_| Err(AlertError::Publish("alert sink panicked".to_string())));

        match published {
            Ok(()) => {
                info!(topic = %self.topic, subject = %alert.subject, "alert published");
                Dispatch::Published
            }
            Err(e) => {
                error!(topic = %self.topic, error = %e, "error sending alert");
                Dispatch::Failed(e)
            }
        }
    }
}
