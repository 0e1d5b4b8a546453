//! Producer-side worker: turns committed record changes into outbound
//! webhook deliveries, and hosts the registration admin commands.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sitecache_db::DbPool;
use sitecache_events::{
    ChangeBus, ChangeListener, DispatchConfig, Dispatcher, PgWebhookRegistry, WebhookDelivery,
};

mod admin;

use admin::{Cli, Command};

/// How long background tasks get to finish after shutdown is requested.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let command = Cli::parse().into_command();
    dotenvy::dotenv().ok();

    // --- Tracing ---
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sitecache_worker=debug,sitecache_events=debug".into()),
        )
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json_logs).then(|| tracing_subscriber::fmt::layer()))
        .init();

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let pool = sitecache_db::create_pool(&database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connection pool created");

    sitecache_db::health_check(&pool)
        .await
        .context("Database health check failed")?;

    sitecache_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied");

    match command {
        Command::Run => run(pool).await,
        other => admin::execute(&pool, other).await,
    }
}

/// Listen for record changes and dispatch them until a shutdown signal
/// arrives or the listener connection is lost for good.
async fn run(pool: DbPool) -> anyhow::Result<()> {
    let config = DispatchConfig::from_env();
    tracing::info!(
        timeout_secs = config.timeout.as_secs(),
        bus_capacity = config.bus_capacity,
        "Loaded dispatch configuration"
    );

    let bus = Arc::new(ChangeBus::new(config.bus_capacity));
    let registry = Arc::new(PgWebhookRegistry::new(pool.clone()));
    let delivery = WebhookDelivery::new(config.timeout).context("Failed to build HTTP client")?;
    let dispatcher = Arc::new(Dispatcher::new(registry, delivery));

    let cancel = CancellationToken::new();

    // Subscribe before the listener starts so no event is published unseen.
    let dispatcher_handle = tokio::spawn(dispatcher.run(bus.subscribe(), cancel.clone()));

    let listener_handle = tokio::spawn({
        let bus = Arc::clone(&bus);
        let cancel = cancel.clone();
        async move {
            let result = ChangeListener::run(&pool, bus, cancel.clone()).await;
            if let Err(e) = &result {
                tracing::error!(error = %e, "Change listener stopped");
            }
            cancel.cancel();
            result
        }
    });
    tracing::info!("Worker started (change listener, webhook dispatcher)");

    tokio::select! {
        () = shutdown_signal() => {}
        () = cancel.cancelled() => {}
    }

    // --- Shutdown ---
    cancel.cancel();
    let listener_result = tokio::time::timeout(SHUTDOWN_TIMEOUT, listener_handle).await;
    let _ = tokio::time::timeout(SHUTDOWN_TIMEOUT, dispatcher_handle).await;
    tracing::info!("Worker stopped");

    if let Ok(Ok(Err(e))) = listener_result {
        return Err(e).context("Change listener failed");
    }
    Ok(())
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
