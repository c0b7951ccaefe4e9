//! CLI argument definitions.
//!
//! Uses clap derive macros for type-safe argument parsing. Running the
//! binary without a subcommand is the same as `accountd serve`.

use clap::{Parser, Subcommand};

/// accountd - user accounts and bearer tokens over HTTP
#[derive(Parser, Debug)]
#[command(name = "accountd")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// The requested command, `serve` when none was given
    pub fn into_command(self) -> Commands {
        self.command.unwrap_or(Commands::Serve)
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Wait for the database, apply migrations, then start the HTTP server
    Serve,

    /// Block until the database accepts connections
    WaitForDb,

    /// Apply pending database migrations
    Migrate(MigrateArgs),

    /// Create a user with staff and superuser flags
    CreateSuperuser(CreateSuperuserArgs),
}

/// Arguments for the migrate command
#[derive(Parser, Debug, PartialEq, Eq)]
pub struct MigrateArgs {
    /// Only report applied and pending migrations
    #[arg(long)]
    pub status: bool,
}

/// Arguments for the create-superuser command
#[derive(Parser, Debug, PartialEq, Eq)]
pub struct CreateSuperuserArgs {
    /// Login email
    #[arg(long, env = "ACCOUNTD_SUPERUSER_EMAIL")]
    pub email: String,

    /// Display name
    #[arg(long, default_value = "", env = "ACCOUNTD_SUPERUSER_NAME")]
    pub name: String,

    /// Password (at least 8 characters)
    #[arg(long, env = "ACCOUNTD_SUPERUSER_PASSWORD", hide_env_values = true)]
    pub password: String,
}
