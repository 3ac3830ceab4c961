use std::sync::Arc;

use anyhow::Context;

use baro_api::app::{build_app, services::build_services};
use baro_api::config::ApiConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    baro_observability::init();

    let config = ApiConfig::from_env()?;
    let services = build_services(&config).context("failed to build services")?;
    let app = build_app(Arc::new(services));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app).await?;
    Ok(())
}
