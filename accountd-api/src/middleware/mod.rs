/// Middleware modules for the API server
///
/// - Bearer token authentication

pub mod auth;
