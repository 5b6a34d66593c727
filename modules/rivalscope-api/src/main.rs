use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use rivalscope_api::{app, AppState};
use rivalscope_common::Config;
use rivalscope_scout::bootstrap::build_pipeline;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("rivalscope=info".parse()?))
        .init();

    let config = Config::from_env()?;
    config.log_redacted();

    let pipeline = build_pipeline(&config, None);
    if let Err(e) = &pipeline {
        warn!(error = %e, "Pipeline is not fully configured; analyze requests will fail");
    }
    let state = Arc::new(AppState::new(pipeline));

    let router = app(state, config.max_upload_bytes);

    let addr = format!("{}:{}", config.api_host, config.api_port);
    info!("RivalScope API starting on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
