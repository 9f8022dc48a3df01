//! # Attendly API Server
//!
//! HTTP API for multi-organization attendance tracking.
//!
//! ## Startup
//!
//! 1. Load configuration from the environment (and `.env`)
//! 2. Build the storage facade for the selected backend
//! 3. Apply schema migrations when the remote backend is selected
//! 4. Move pre-multi-tenant local data into a default organization, once
//! 5. Serve until Ctrl-C
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p attendly-api
//! ```

use attendly_api::{
    app::{build_router, AppState},
    config::Config,
};
use attendly_shared::db::migrations::run_migrations;
use attendly_shared::migration::LegacyMigrator;
use attendly_shared::storage::Storage;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "attendly_api=debug,attendly_shared=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Attendly API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;
    let storage = Storage::new(&config.storage)?;

    if let Some(remote) = storage.remote_store() {
        let pool = remote.pool().await?;
        run_migrations(pool).await?;
    }

    let report = LegacyMigrator::new(storage.local_store().clone()).run();
    match (&report.error, report.migrated) {
        (Some(error), _) => tracing::warn!(%error, "Legacy migration failed; will retry on next start"),
        (None, true) => tracing::info!(
            organization_id = report.organization_id.as_deref().unwrap_or_default(),
            "Legacy data migrated"
        ),
        (None, false) => tracing::debug!("No legacy migration needed"),
    }

    let bind_address = config.bind_address();
    let app = build_router(AppState::new(storage, config));

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, exiting...");
}
