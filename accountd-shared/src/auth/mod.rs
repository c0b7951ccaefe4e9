/// Authentication primitives for accountd
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing, verification and length policy
/// - [`token`]: opaque bearer token generation and header parsing
///
/// # Example
///
/// ```
/// use accountd_shared::auth::password::{hash_password, verify_password};
/// use accountd_shared::auth::token::generate_token_key;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("Whatever!")?;
/// assert!(verify_password("Whatever!", &hash)?);
///
/// let key = generate_token_key();
/// assert_eq!(key.len(), 40);
/// # Ok(())
/// # }
/// ```

pub mod password;
pub mod token;
