use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use siteprobe_api::{router, AppState};
use siteprobe_common::Config;
use siteprobe_core::backend;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("siteprobe=info".parse()?))
        .init();

    let config = Config::from_env()?;
    config.log_redacted();

    let state = Arc::new(AppState {
        analyzer: backend::analyzer(&config)?,
    });
    let app = router(state);

    let addr = format!("{}:{}", config.api_host, config.api_port);
    info!("Siteprobe API starting on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
