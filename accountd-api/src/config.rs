/// Configuration management for the API server
///
/// This module loads configuration from environment variables and provides
/// a type-safe configuration struct.
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `DB_WAIT_INTERVAL_SECS`: Sleep between database readiness checks (default: 2)
/// - `CORS_ORIGINS`: Comma-separated allowed origins, or `*` (default: `*`)
/// - `RUST_LOG`: Log filter (default: see `main.rs`)
///
/// # Example
///
/// ```no_run
/// use accountd_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};
use std::{env, time::Duration};

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins; `["*"]` allows any
    pub cors_origins: Vec<String>,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,

    /// Seconds to sleep between readiness checks at startup
    pub wait_interval_secs: u64,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// A `.env` file in the working directory is loaded first if present.
    ///
    /// # Errors
    ///
    /// Returns an error if `DATABASE_URL` is missing or a numeric variable
    /// does not parse.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let api_host = var_or("API_HOST", "0.0.0.0");
        let api_port = var_or("API_PORT", "8080")
            .parse::<u16>()
            .map_err(|e| anyhow::anyhow!("API_PORT is not a valid port: {}", e))?;

        let cors_origins = var_or("CORS_ORIGINS", "*")
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let database_url = lookup("DATABASE_URL")
            .filter(|url| !url.is_empty())
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let max_connections = var_or("DATABASE_MAX_CONNECTIONS", "10")
            .parse::<u32>()
            .map_err(|e| anyhow::anyhow!("DATABASE_MAX_CONNECTIONS is not a number: {}", e))?;

        let wait_interval_secs = var_or("DB_WAIT_INTERVAL_SECS", "2")
            .parse::<u64>()
            .map_err(|e| anyhow::anyhow!("DB_WAIT_INTERVAL_SECS is not a number: {}", e))?;

        Ok(Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
                cors_origins,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
                wait_interval_secs,
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Sleep between database readiness checks
    pub fn db_wait_interval(&self) -> Duration {
        Duration::from_secs(self.database.wait_interval_secs)
    }

    /// Whether any origin may call the API
    pub fn allows_any_origin(&self) -> bool {
        self.api.cors_origins.iter().any(|origin| origin == "*")
    }

    /// Pool settings for the shared database layer
    pub fn pool_config(&self) -> accountd_shared::db::pool::DatabaseConfig {
        accountd_shared::db::pool::DatabaseConfig {
            max_connections: self.database.max_connections,
            ..accountd_shared::db::pool::DatabaseConfig::with_url(&self.database.url)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("DATABASE_URL", "postgresql://localhost/accountd")]).unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.db_wait_interval(), Duration::from_secs(2));
        assert!(config.allows_any_origin());
    }

    #[test]
    fn test_database_url_required() {
        let err = load(&[]).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));

        assert!(load(&[("DATABASE_URL", "")]).is_err());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("DATABASE_URL", "postgresql://db/accountd"),
            ("API_HOST", "127.0.0.1"),
            ("API_PORT", "9000"),
            ("DATABASE_MAX_CONNECTIONS", "25"),
            ("DB_WAIT_INTERVAL_SECS", "5"),
            ("CORS_ORIGINS", "https://a.example.com, https://b.example.com"),
        ])
        .unwrap();

        assert_eq!(config.bind_address(), "127.0.0.1:9000");
        assert_eq!(config.db_wait_interval(), Duration::from_secs(5));
        assert_eq!(
            config.api.cors_origins,
            vec!["https://a.example.com", "https://b.example.com"]
        );
        assert!(!config.allows_any_origin());

        let pool = config.pool_config();
        assert_eq!(pool.url, "postgresql://db/accountd");
        assert_eq!(pool.max_connections, 25);
    }

    #[test]
    fn test_invalid_port_rejected() {
        let err = load(&[("DATABASE_URL", "postgresql://db/accountd"), ("API_PORT", "http")]).unwrap_err();
        assert!(err.to_string().contains("API_PORT"));
    }
}
