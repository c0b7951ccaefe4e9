//! CLI command implementations.
//!
//! Each command lives in its own module and returns `anyhow::Result`.

pub mod create_superuser;
pub mod migrate;
pub mod serve;
pub mod wait_for_db;
