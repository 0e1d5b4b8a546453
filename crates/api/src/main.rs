use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sitecache_api::background::sweep;
use sitecache_api::cache::MemoryCacheStore;
use sitecache_api::config::ServerConfig;
use sitecache_api::content::{self, DataServiceClient};
use sitecache_api::router::build_app_router;
use sitecache_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    // LOG_FORMAT=json switches to one JSON object per line.
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sitecache_api=debug,tower_http=debug".into()),
        )
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json_logs).then(|| tracing_subscriber::fmt::layer()))
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    let missing = config.missing_secrets();
    if !missing.is_empty() {
        tracing::warn!(
            ?missing,
            "Secrets not configured; the matching endpoints will reject every request"
        );
    }

    // --- Cache + content source ---
    let store = Arc::new(MemoryCacheStore::new());
    let source = DataServiceClient::new(
        config.data_service_url.clone(),
        content::client::DEFAULT_TIMEOUT,
    )
    .expect("Failed to build data service client");
    tracing::info!(data_service_url = %config.data_service_url, "Content source configured");

    // --- App state ---
    let state = AppState::new(config.clone(), store, Arc::new(source));

    // --- Scheduled sweeps ---
    let sweep_cancel = CancellationToken::new();
    let sweep_handle = if config.sweep_schedule_enabled {
        let engine = Arc::clone(&state.engine);
        let cancel = sweep_cancel.clone();
        Some(tokio::spawn(async move {
            sweep::run(engine, cancel).await;
        }))
    } else {
        tracing::info!("In-process sweep schedule disabled; relying on the cron endpoint");
        None
    };

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    sweep_cancel.cancel();
    if let Some(handle) = sweep_handle {
        let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
        tracing::info!("Sweep scheduler stopped");
    }

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
