/// Database models for accountd
///
/// # Models
///
/// - `user`: user accounts, email normalization and the capability traits
/// - `auth_token`: opaque bearer tokens, one per user

pub mod auth_token;
pub mod user;
