mod api;
mod middleware;
mod scheduler;

use anyhow::Context;
use stormwatch_engine::{DashboardSession, StoreFeed};
use stormwatch_locator::{LocatorClient, StatusHistoryStore};
use stormwatch_nws::{NwsClient, OverlayClient};
use tracing_subscriber::EnvFilter;

use crate::api::{build_app, AppState, Feeds};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = stormwatch_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let nws = NwsClient::with_base_url(
        &config.nws_base_url,
        &config.user_agent,
        config.request_timeout_secs,
        config.max_retries,
        config.retry_backoff_base_ms,
    )
    .context("failed to build NWS client")?;
    let locator = LocatorClient::new(
        config.locations_url.clone(),
        config.request_timeout_secs,
        &config.user_agent,
    )
    .context("failed to build store-locator client")?;
    let overlays = OverlayClient::new(
        &config.hurricane_cones_url,
        &config.radar_maps_url,
        &config.user_agent,
        config.request_timeout_secs,
        config.max_retries,
        config.retry_backoff_base_ms,
    )
    .context("failed to build overlay client")?;
    // The feed and the history endpoint share one store, and with it the
    // reconcile lock.
    let history = StatusHistoryStore::new(config.status_history_path.clone());
    let feed = StoreFeed::new(locator, history.clone());

    let state = AppState::new(
        DashboardSession::from_config(&config)?,
        nws,
        feed,
        Feeds { overlays, history },
    );

    let initial = state.clone();
    tokio::spawn(async move {
        scheduler::run_refresh(&initial, false).await;
    });
    let _scheduler = scheduler::build_scheduler(state.clone(), &config.refresh_cron).await?;

    let app = build_app(state);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, env = %config.env, "stormwatch server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
