use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::info;

mod config;
mod dashboard;
mod live_feed;
mod predictor;
mod teams;

use config::Config;
use dashboard::AppState;
use live_feed::{CricApiClient, LiveFeed};
use predictor::{ChaseModel, Evaluator, Timeline, WinModel};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    let model: Arc<dyn WinModel> = Arc::new(ChaseModel::new());
    info!("Win model loaded: {}", model.name());
    let evaluator = Evaluator::new(model);

    // Live feed is optional: without an API key the tracker runs in
    // manual-entry mode only.
    let feed: Option<Arc<dyn LiveFeed>> = match &config.cric_api_key {
        Some(key) => {
            let client = CricApiClient::new(
                key,
                Some(&config.cric_api_url),
                Duration::from_secs(config.feed_timeout_secs),
            )?;
            info!(
                "🟢 Live mode available via {} ({})",
                client.name(),
                config.cric_api_url
            );
            Some(Arc::new(client))
        }
        None => {
            info!("🟡 No CRIC_API_KEY configured – manual entry only");
            None
        }
    };

    let state = AppState {
        evaluator,
        feed,
        timeline: Mutex::new(Timeline::new()),
        live_gate: tokio::sync::Mutex::new(()),
        poll_interval_secs: config.poll_interval_secs,
        default_target: config.default_target,
    };

    let app = dashboard::router(state);
    let addr: SocketAddr = config.dashboard_addr.parse()?;
    info!("Dashboard listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Run dashboard server (blocks until shutdown)
    axum::serve(listener, app).await?;

    Ok(())
}
