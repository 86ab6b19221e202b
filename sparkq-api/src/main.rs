//! # SparkQ API Server
//!
//! Single binary serving the HTTP API, the static dashboard assets, and the
//! two background reapers (auto-fail, purge) on the same process lifecycle.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p sparkq-api
//! ```

use sparkq_api::{app, lockfile::Lockfile, reapers};
use sparkq_core::{
    config::{self, FileConfig},
    db::{migrations, pool},
    store::Store,
};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sparkq_api=info,tower_http=info,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("SparkQ API Server v{} starting...", sparkq_core::VERSION);

    let file_config = FileConfig::load()?;
    tracing::info!("configuration loaded");

    let db_path = std::path::PathBuf::from(&file_config.database.path);
    let lockfile = Lockfile::acquire(&db_path)
        .map_err(|e| anyhow::anyhow!("failed to acquire lockfile: {e}"))?;
    tracing::info!(path = %db_path.display(), "lockfile acquired");

    let db_config = pool::DatabaseConfig {
        path: file_config.database.path.clone(),
        ..Default::default()
    };
    let pools = pool::create_pools(db_config).await?;
    tracing::info!("database connection pools initialized");

    migrations::run_migrations(&pools.write).await?;
    tracing::info!("database migrations completed");

    config::seed_if_needed(&pools.write, &file_config).await?;

    let store = Store::new(pools);
    store.ensure_default_project().await?;

    let shutdown = CancellationToken::new();
    reapers::auto_fail::spawn(
        sparkq_core::scheduler::Scheduler::new(store.clone()),
        file_config.queue_runner.auto_fail_interval_seconds,
        shutdown.clone(),
    );
    reapers::purge::spawn(
        store.clone(),
        file_config.purge.older_than_days,
        reapers::purge::DEFAULT_INTERVAL_SECONDS,
        shutdown.clone(),
    );

    let host = file_config.server.host.clone();
    let port = file_config.server.port;
    let state = app::AppState::new(store, file_config, lockfile);
    let router = app::build_router(state);

    let bind_addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(address = %bind_addr, "server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    tracing::info!("server shut down gracefully");
    Ok(())
}

async fn shutdown_signal(shutdown: CancellationToken) {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install CTRL+C signal handler");
    tracing::info!("shutdown signal received, shutting down...");
    shutdown.cancel();
}
