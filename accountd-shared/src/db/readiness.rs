/// Dependency readiness probing
///
/// At container start the database may still be booting. The probe calls a
/// check repeatedly, sleeping a fixed interval after every connection-class
/// failure, until the check passes. Any other failure is returned at once.
///
/// There is no attempt limit and no overall timeout: a dependency that never
/// comes up blocks the caller forever.
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use accountd_shared::db::readiness::wait_for_database;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let report = wait_for_database("postgresql://localhost/accountd", Duration::from_secs(2)).await?;
/// println!("database ready after {} attempt(s)", report.attempts);
/// # Ok(())
/// # }
/// ```

use std::{future::Future, io::Write, str::FromStr, time::Duration};

use sqlx::{
    postgres::{PgConnectOptions, PgConnection},
    ConnectOptions, Connection,
};
use tracing::{info, warn};

/// Interval between attempts when none is configured
pub const DEFAULT_PROBE_INTERVAL: Duration = Duration::from_secs(2);

/// Outcome of a single readiness check
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    /// The dependency could not be reached yet; the probe retries
    #[error("dependency unavailable: {0}")]
    Connection(String),

    /// Anything else; the probe gives up immediately
    #[error("readiness check failed: {0}")]
    Fatal(String),
}

impl ProbeError {
    /// Whether the probe should retry after this error
    pub fn is_connection(&self) -> bool {
        matches!(self, ProbeError::Connection(_))
    }
}

impl From<sqlx::Error> for ProbeError {
    fn from(err: sqlx::Error) -> Self {
        if is_connection_error(&err) {
            ProbeError::Connection(err.to_string())
        } else {
            ProbeError::Fatal(err.to_string())
        }
    }
}

/// Classifies a sqlx error as connection-class
///
/// Transport failures, pool exhaustion and the SQLSTATEs a starting server
/// reports (class `08`, `57P03` cannot_connect_now, `3D000` database not yet
/// created by the init scripts) are connection-class. Configuration,
/// authentication and protocol errors are not.
pub fn is_connection_error(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => true,
        sqlx::Error::Database(db_err) => db_err
            .code()
            .map(|code| code.starts_with("08") || code == "57P03" || code == "3D000")
            .unwrap_or(false),
        _ => false,
    }
}

/// Summary of a successful wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeReport {
    /// Number of times the check ran, including the successful one
    pub attempts: u32,
}

/// Polls a check until it passes
#[derive(Debug, Clone)]
pub struct ReadinessProbe {
    /// Human-readable dependency name used in progress lines
    name: String,

    /// Sleep between attempts
    interval: Duration,
}

impl ReadinessProbe {
    pub fn new(name: impl Into<String>, interval: Duration) -> Self {
        Self {
            name: name.into(),
            interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Runs `check` until it returns `Ok`
    ///
    /// Progress lines go to `out`; failing to write them never aborts the
    /// wait.
    ///
    /// # Errors
    ///
    /// Returns the first `ProbeError::Fatal` produced by `check`.
    pub async fn wait<F, Fut, W>(&self, mut check: F, out: &mut W) -> Result<ProbeReport, ProbeError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<(), ProbeError>>,
        W: Write,
    {
        let _ = writeln!(out, "Waiting for {}...", self.name.to_lowercase());
        info!(dependency = %self.name, "Waiting for dependency");

        let mut attempts = 0u32;
        loop {
            attempts += 1;

            match check().await {
                Ok(()) => break,
                Err(ProbeError::Connection(reason)) => {
                    warn!(
                        dependency = %self.name,
                        attempt = attempts,
                        retry_in = ?self.interval,
                        reason = %reason,
                        "Dependency unavailable"
                    );
                    let _ = writeln!(out, "{} unavailable, waiting {:?}...", self.name, self.interval);
                    tokio::time::sleep(self.interval).await;
                }
                Err(fatal) => {
                    warn!(dependency = %self.name, attempt = attempts, error = %fatal, "Readiness check failed");
                    return Err(fatal);
                }
            }
        }

        let _ = writeln!(out, "{} available!", self.name);
        let _ = out.flush();
        info!(dependency = %self.name, attempts, "Dependency available");

        Ok(ProbeReport { attempts })
    }
}

/// Waits until `check` passes, reporting progress on stdout
pub async fn wait_until_ready<F, Fut>(check: F, interval: Duration) -> Result<ProbeReport, ProbeError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<(), ProbeError>>,
{
    ReadinessProbe::new("Dependency", interval)
        .wait(check, &mut std::io::stdout())
        .await
}

/// Waits until the PostgreSQL server at `url` accepts a connection and answers a ping
///
/// Each attempt opens a fresh connection so every failure is observed
/// directly rather than absorbed by pool retries.
///
/// # Errors
///
/// A malformed URL, bad credentials or any other non-connection error is
/// returned as `ProbeError::Fatal` without retrying.
pub async fn wait_for_database(url: &str, interval: Duration) -> Result<ProbeReport, ProbeError> {
    let options = PgConnectOptions::from_str(url)
        .map_err(|e| ProbeError::Fatal(e.to_string()))?
        .disable_statement_logging();

    let check = || {
        let options = options.clone();
        async move {
            let mut conn = PgConnection::connect_with(&options).await?;
            conn.ping().await?;
            let _ = conn.close().await;
            Ok::<(), ProbeError>(())
        }
    };

    ReadinessProbe::new("Database", interval)
        .wait(check, &mut std::io::stdout())
        .await
}
