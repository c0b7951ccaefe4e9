//! Migrate command - database migration management.

use accountd_shared::db::{
    migrations::{migration_status, run_migrations},
    pool::{close_pool, create_pool},
};

use crate::{cli::MigrateArgs, config::Config};

/// Execute the migrate command
pub async fn execute(args: MigrateArgs, config: Config) -> anyhow::Result<()> {
    let pool = create_pool(config.pool_config()).await?;

    if !args.status {
        tracing::info!("Running pending migrations...");
        run_migrations(&pool).await?;
    }

    let status = migration_status(&pool).await?;
    println!(
        "{} of {} migrations applied ({} pending), latest version: {}",
        status.applied_migrations,
        status.known_migrations,
        status.pending(),
        status
            .latest_version
            .map(|v| v.to_string())
            .unwrap_or_else(|| "none".to_string()),
    );

    close_pool(pool).await;
    Ok(())
}
