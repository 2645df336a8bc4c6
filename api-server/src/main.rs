use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use vortex_api::config::Config;
use vortex_api::AppState;

/// How often expired rate-limit windows are dropped.
const PRUNE_INTERVAL: Duration = Duration::from_secs(60);

fn log_endpoints(port: u16) {
    tracing::info!("Available endpoints:");
    for line in [
        "GET  /health - Health check",
        "POST /api/auth/privy - Social login",
        "POST /api/wallet/create - Create smart wallet",
        "POST /api/transaction/send - Send transaction",
        "POST /api/session/create - Grant session key",
        "GET  /api/prediction/list - List predictions",
        "GET  /api/system/status - System status",
    ] {
        tracing::info!("  {line}");
    }
    tracing::info!("Health check: http://localhost:{port}/health");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    let port = config.port;
    let state = Arc::new(AppState::new(config));

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!(
        %addr,
        environment = %state.config.environment,
        seeded = state.config.seed.is_some(),
        "API server listening"
    );
    if state.config.is_development() {
        log_endpoints(port);
    }

    let prune_state = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(PRUNE_INTERVAL);
        loop {
            interval.tick().await;
            prune_state.limiter.prune();
        }
    });

    vortex_api::serve(listener, state)
        .await
        .context("server error")
}
