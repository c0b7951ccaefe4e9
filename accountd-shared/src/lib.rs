//! # accountd Shared Library
//!
//! Core account logic used by the accountd API server and its operator
//! commands: user records, password hashing, bearer tokens, persistence and
//! database readiness.
//!
//! ## Module Organization
//!
//! - `auth`: Password hashing and token key utilities
//! - `credentials`: Registration, login and profile operations
//! - `db`: Connection pool, migrations and readiness probing
//! - `models`: Database models and data structures
//! - `store`: Storage seam over PostgreSQL (and an in-memory store for tests)

pub mod auth;
pub mod credentials;
pub mod db;
pub mod models;
pub mod store;

/// Current version of the accountd shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
