/// Opaque bearer token utilities
///
/// Token keys are 20 random bytes rendered as 40 lowercase hex characters.
/// They carry no claims; a key only means something once it is looked up in
/// the token store.
///
/// # Example
///
/// ```
/// use accountd_shared::auth::token::{generate_token_key, validate_token_format, TOKEN_KEY_LENGTH};
///
/// let key = generate_token_key();
/// assert_eq!(key.len(), TOKEN_KEY_LENGTH);
/// assert!(validate_token_format(&key));
/// ```

use rand::{rngs::OsRng, RngCore};

/// Number of random bytes in a token key
const KEY_RANDOM_BYTES: usize = 20;

/// Length of a token key in characters
pub const TOKEN_KEY_LENGTH: usize = KEY_RANDOM_BYTES * 2;

/// Authorization header schemes accepted for token authentication
const AUTH_SCHEMES: [&str; 2] = ["Bearer", "Token"];

/// Generates a new random token key
pub fn generate_token_key() -> String {
    let mut bytes = [0u8; KEY_RANDOM_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Checks that a key has the shape of a generated token
///
/// Rejecting malformed keys early saves a store round trip.
pub fn validate_token_format(key: &str) -> bool {
    key.len() == TOKEN_KEY_LENGTH
        && key
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

/// Extracts the token key from an `Authorization` header value
///
/// Accepts `Bearer <key>` and `Token <key>`; the scheme is matched
/// case-insensitively. Returns `None` for any other shape.
///
/// ```
/// use accountd_shared::auth::token::parse_authorization_header;
///
/// assert_eq!(parse_authorization_header("Bearer abc"), Some("abc"));
/// assert_eq!(parse_authorization_header("token abc"), Some("abc"));
/// assert_eq!(parse_authorization_header("Basic abc"), None);
/// assert_eq!(parse_authorization_header("Bearer"), None);
/// ```
pub fn parse_authorization_header(value: &str) -> Option<&str> {
    let (scheme, key) = value.trim().split_once(' ')?;

    if !AUTH_SCHEMES.iter().any(|s| s.eq_ignore_ascii_case(scheme)) {
        return None;
    }

    let key = key.trim();
    if key.is_empty() || key.contains(' ') {
        return None;
    }

    Some(key)
}

/// Constant-time string comparison
///
/// Always walks the full length of equal-length inputs so the time taken
/// does not reveal where they differ.
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.bytes()
        .zip(b.bytes())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}
