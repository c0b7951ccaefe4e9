/// Database layer for accountd
///
/// # Modules
///
/// - `pool`: PostgreSQL connection pool management with health checks
/// - `migrations`: embedded schema migrations
/// - `readiness`: startup probe that waits for the database to accept connections
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use accountd_shared::db::{migrations::run_migrations, pool::{create_pool, DatabaseConfig}, readiness::wait_for_database};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let url = std::env::var("DATABASE_URL")?;
///
///     wait_for_database(&url, Duration::from_secs(2)).await?;
///     let pool = create_pool(DatabaseConfig::with_url(url)).await?;
///     run_migrations(&pool).await?;
///     Ok(())
/// }
/// ```

pub mod migrations;
pub mod pool;
pub mod readiness;
