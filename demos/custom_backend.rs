use std::sync::Arc;

use async_trait::async_trait;
use log_relay::{
    alert::{AlertError, AlertSink},
    backend::Backends,
    config::RelayConfig,
    handler::{Handler, IngestRequest, AUTH_HEADER},
    init::{init_logging, LogFormat},
    sink::{LogSink, SinkError},
};

/// Example of plugging in completely custom backends by implementing the
/// `LogSink` and `AlertSink` traits directly. Imagine these talk to some
/// in-house storage and paging system.
struct StdoutLogSink;

#[async_trait]
impl LogSink for StdoutLogSink {
    async fn ensure_group(&self, name: &str, retention_days: u32) -> Result<(), SinkError> {
        println!("[storage] ensure group {name} (retention {retention_days}d)");
        Ok(())
    }

    async fn ensure_stream(&self, group: &str, stream: &str) -> Result<(), SinkError> {
        println!("[storage] ensure stream {group}/{stream}");
        Ok(())
    }

    async fn append(
        &self,
        group: &str,
        stream: &str,
        timestamp_ms: i64,
        message: &str,
    ) -> Result<(), SinkError> {
        println!("[storage] {group}/{stream} @{timestamp_ms}: {message}");
        Ok(())
    }
}

struct StdoutPager;

#[async_trait]
impl AlertSink for StdoutPager {
    async fn publish(&self, topic: &str, subject: &str, body: &str) -> Result<(), AlertError> {
        println!("[pager:{topic}] {subject}\n{body}");
        Ok(())
    }
}

#[tokio::main]
async fn main() {
    let _ = init_logging(LogFormat::Text);

    let config = RelayConfig::default();
    let handler = Handler::new(
        &config,
        Backends {
            logs: Arc::new(StdoutLogSink),
            alerts: Arc::new(StdoutPager),
        },
    );

    let request = IngestRequest::new(
        r#"{"service_name":"billing","level":"FATAL","client_name":"acme","message":"disk full"}"#,
    )
    .with_header(AUTH_HEADER, config.secret_token.clone());

    let response = handler.handle(&request).await;
    println!("{} {}", response.status, response.body);
}
