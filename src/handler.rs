use crate::alert::{AlertDispatcher, Dispatch};
use crate::backend::Backends;
use crate::config::RelayConfig;
use crate::destination::Destination;
use crate::error::Rejection;
use crate::record::{LogRecord, SERVICE_NAME};
use crate::sink::SinkError;
use crate::writer::LogWriter;
use bytes::Bytes;
use futures::FutureExt;
use http::StatusCode;
use serde_json::json;
use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Header carrying the shared secret. Matched case-insensitively.
pub const AUTH_HEADER: &str = "x-custom-auth";

const SAVED_MESSAGE: &str = "Log saved to CloudWatch.";

/// One inbound ingestion request.
#[derive(Debug, Clone, Default)]
pub struct IngestRequest {
    /// Keyed by lowercased header name.
    headers: HashMap<String, String>,
    /// Raw body; a missing body is read as `{}`.
    pub body: Option<Bytes>,
}

impl IngestRequest {
    pub fn new(body: impl Into<Bytes>) -> Self {
        Self {
            headers: HashMap::new(),
            body: Some(body.into()),
        }
    }

    /// Add a header. Names are case-insensitive; a later value replaces an
    /// earlier one under any spelling of the same name.
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestResponse {
    pub status: StatusCode,
    pub content_type: &'static str,
    pub body: String,
}

impl IngestResponse {
    pub fn text(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: "text/plain; charset=utf-8",
            body: body.into(),
        }
    }

    pub fn json(status: StatusCode, body: serde_json::Value) -> Self {
        Self {
            status,
            content_type: "application/json",
            body: body.to_string(),
        }
    }

    pub fn message(status: StatusCode, message: &str) -> Self {
        Self::json(status, json!({ "message": message }))
    }

    pub fn error(status: StatusCode, error: impl AsRef<str>) -> Self {
        Self::json(status, json!({ "error": error.as_ref() }))
    }
}

/// Result of the two best-effort steps for an accepted record.
#[derive(Debug)]
pub struct Delivery {
    pub stored: Result<Destination, SinkError>,
    pub alert: Dispatch,
}

/// Authenticates, validates and fans a single log event out to storage and
/// alerting.
///
/// Cheap to clone; every clone shares the same read-only configuration and
/// backends, so one instance can serve any number of concurrent requests.
#[derive(Clone)]
pub struct Handler {
    secret_token: Arc<str>,
    writer: LogWriter,
    dispatcher: AlertDispatcher,
}

impl Handler {
    pub fn new(config: &RelayConfig, backends: Backends) -> Self {
        Self {
            secret_token: Arc::from(config.secret_token.as_str()),
            writer: LogWriter::new(
                backends.logs,
                config.log_group_prefix.clone(),
                config.retention_days,
            ),
            dispatcher: AlertDispatcher::new(backends.alerts, config.alert_topic.clone()),
        }
    }

    pub async fn handle(&self, request: &IngestRequest) -> IngestResponse {
        match self.process(request).await {
            Ok(response) => response,
            Err(rejection) => rejection.into_response(),
        }
    }

    async fn process(&self, request: &IngestRequest) -> Result<IngestResponse, Rejection> {
        self.authenticate(request)?;
        let record = parse_record(request)?;

        let delivery = guarded(self.deliver(&record)).await?;

        match &delivery.stored {
            Ok(dest) => info!(
                group = %dest.group,
                stream = %dest.stream,
                alert = ?delivery.alert,
                "log accepted"
            ),
            Err(_) => info!(alert = ?delivery.alert, "log accepted without storage"),
        }

        Ok(IngestResponse::message(StatusCode::OK, SAVED_MESSAGE))
    }

    /// Check the shared secret. Only the headers are looked at.
    pub fn authenticate(&self, request: &IngestRequest) -> Result<(), Rejection> {
        match request.header(AUTH_HEADER) {
            Some(token) if token == &*self.secret_token => Ok(()),
            _ => {
                info!("denied unauthorized request");
                Err(Rejection::Unauthorized)
            }
        }
    }

    /// Store, then alert. Neither step's failure stops the other.
    async fn deliver(&self, record: &LogRecord) -> Delivery {
        let stored = self.writer.write(record).await;
        let alert = self.dispatcher.dispatch(record).await;
        Delivery { stored, alert }
    }
}

/// Last-resort net around the post-validation path: a panic that escaped
/// both best-effort steps becomes a generic 500.
async fn guarded<F: Future>(fut: F) -> Result<F::Output, Rejection> {
    AssertUnwindSafe(fut).catch_unwind().await.map_err(|_| {
        error!("unexpected failure while processing log");
        Rejection::Internal
    })
}

fn parse_record(request: &IngestRequest) -> Result<LogRecord, Rejection> {
    let body = request.body.as_deref().unwrap_or(&b"{}"[..]);
    let record = LogRecord::from_slice(body).map_err(|e| {
        warn!(error = %e, "failed to parse request body");
        Rejection::InvalidJson
    })?;

    if record.service_name().is_none() {
        return Err(Rejection::MissingField(SERVICE_NAME));
    }
    Ok(record)
}
