//! # accountd
//!
//! HTTP service for user registration, bearer token issuance and profile
//! management, plus operator commands.
//!
//! ## Usage
//!
//! ```bash
//! accountd                      # same as `accountd serve`
//! accountd wait-for-db
//! accountd migrate [--status]
//! accountd create-superuser --email admin@example.com --password '...'
//! ```

use accountd_api::{
    cli::{Cli, Commands},
    commands,
    config::Config,
};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "accountd_api=debug,accountd_shared=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::debug!("Configuration loaded");

    let command = cli.into_command();
    if command == Commands::Serve {
        tracing::info!("accountd v{} starting...", env!("CARGO_PKG_VERSION"));
    }

    let result = match command {
        Commands::Serve => commands::serve::execute(config).await,
        Commands::WaitForDb => commands::wait_for_db::execute(config).await,
        Commands::Migrate(args) => commands::migrate::execute(args, config).await,
        Commands::CreateSuperuser(args) => commands::create_superuser::execute(args, config).await,
    };

    if let Err(e) = &result {
        tracing::error!("Command failed: {:#}", e);
    }

    result
}
