//! Serve command - waits for the database, migrates, then serves HTTP.

use std::sync::Arc;

use accountd_shared::{
    credentials::CredentialManager,
    db::{
        migrations::run_migrations,
        pool::{close_pool, create_pool},
        readiness::wait_for_database,
    },
    store::postgres::PgCredentialStore,
};
use anyhow::Context;

use crate::{
    app::{build_router, AppState},
    config::Config,
};

/// Execute the serve command
pub async fn execute(config: Config) -> anyhow::Result<()> {
    wait_for_database(&config.database.url, config.db_wait_interval()).await?;

    let pool = create_pool(config.pool_config()).await?;
    run_migrations(&pool).await?;

    let credentials = CredentialManager::new(Arc::new(PgCredentialStore::new(pool.clone())));

    let addr = config.bind_address();
    let app = build_router(AppState::new(credentials, config));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    close_pool(pool).await;
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections...");
}
