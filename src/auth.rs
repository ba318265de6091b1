use crate::error::{AppError, AppResult};
use crate::models::User;
use sha2::{Digest, Sha256};

const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Compare two strings without short-circuiting on the first differing byte.
///
/// Both sides are hashed first so the comparison length does not depend
/// on the input.
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    let a = Sha256::digest(a.as_bytes());
    let b = Sha256::digest(b.as_bytes());
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Verify a login attempt against the stored user record
///
/// # Arguments
/// * `user` - Result of the username lookup, `None` if no such user
/// * `pin_hash` - Hash presented by the client
///
/// # Returns
/// * `Ok(User)` if the stored hash matches exactly
/// * `Err(AppError::Unauthorized)` for an unknown user or a mismatch, with
///   the same message in both cases
pub fn verify_credentials(user: Option<User>, pin_hash: &str) -> AppResult<User> {
    match user {
        Some(user) if constant_time_eq(&user.pin_hash, pin_hash) => Ok(user),
        _ => Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string())),
    }
}
