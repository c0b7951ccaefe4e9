//! # accountd API Server Library
//!
//! This library provides the core functionality for the accountd API server.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `cli`: Command-line arguments
//! - `commands`: Command implementations (serve, wait-for-db, migrate, create-superuser)
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `middleware`: Bearer token authentication
//! - `routes`: API route handlers

pub mod app;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
