use anyhow::Context;
use tracing::info;

use log_relay::backend::make_backends;
use log_relay::config::{log_format_from_env, RelayConfig};
use log_relay::handler::Handler;
use log_relay::init::init_logging;
use log_relay::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging(log_format_from_env()).context("failed to install tracing subscriber")?;

    let config = RelayConfig::from_env().context("invalid configuration")?;
    info!(
        backend = %config.backend,
        log_group_prefix = %config.log_group_prefix,
        retention_days = config.retention_days,
        alert_topic = %config.alert_topic,
        "starting log relay"
    );

    let backends = make_backends(config.backend)
        .await
        .context("failed to build backends")?;
    let handler = Handler::new(&config, backends);
    let router = server::router(handler, config.max_body_bytes);

    server::serve(config.bind, router)
        .await
        .context("http server failed")?;
    Ok(())
}
