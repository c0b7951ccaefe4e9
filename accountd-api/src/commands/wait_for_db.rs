//! Wait-for-db command - blocks until the database is reachable.

use accountd_shared::db::readiness::wait_for_database;

use crate::config::Config;

/// Execute the wait-for-db command
pub async fn execute(config: Config) -> anyhow::Result<()> {
    let report = wait_for_database(&config.database.url, config.db_wait_interval()).await?;

    tracing::debug!(attempts = report.attempts, "Database wait finished");
    Ok(())
}
