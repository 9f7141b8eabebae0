use std::sync::Arc;

use log_relay::{
    backend::Backends,
    config::RelayConfig,
    handler::{Handler, IngestRequest, AUTH_HEADER},
    init::{init_logging, LogFormat},
    memory::{MemoryAlertSink, MemoryLogSink},
};

/// Runs a handful of requests through the relay with in-memory backends
/// and prints where everything ended up.
#[tokio::main]
async fn main() {
    let _ = init_logging(LogFormat::Json);

    let logs = Arc::new(MemoryLogSink::new());
    let alerts = Arc::new(MemoryAlertSink::new());
    let config = RelayConfig {
        secret_token: "demo".to_string(),
        ..RelayConfig::default()
    };
    let handler = Handler::new(
        &config,
        Backends {
            logs: logs.clone(),
            alerts: alerts.clone(),
        },
    );

    let bodies = [
        r#"{"service_name":"billing","level":"info","client_name":"acme","message":"invoice sent"}"#,
        r#"{"service_name":"billing","level":"error","client_name":"acme","message":"card declined","retries":3}"#,
        r#"{"service_name":"search","level":"warn","message":"slow query"}"#,
        r#"{"level":"fatal"}"#,
        "definitely not json",
    ];

    for body in bodies {
        let request = IngestRequest::new(body).with_header(AUTH_HEADER, "demo");
        let response = handler.handle(&request).await;
        println!("{} {}", response.status, response.body);
    }

    let unauthorized = IngestRequest::new(bodies[0]).with_header(AUTH_HEADER, "guess");
    println!("{}", handler.handle(&unauthorized).await.body);

    println!(
        "acme entries: {}",
        logs.entries(&format!("{}/billing", config.log_group_prefix), "acme").len()
    );
    for alert in alerts.published() {
        println!("--- {}\n{}", alert.subject, alert.body);
    }
}
