//! Password hashing

use crate::error::{Error, Result};

/// Bcrypt cost factor. Matches the 10 rounds the original deployment used,
/// so existing hashes keep verifying.
const BCRYPT_COST: u32 = 10;

/// Hash a plaintext password with a fresh salt.
pub fn hash(plaintext: &str) -> Result<String> {
    if plaintext.is_empty() {
        return Err(Error::Validation("Password must not be empty".to_string()));
    }
    Ok(bcrypt::hash(plaintext, BCRYPT_COST)?)
}

/// Verify a plaintext password against a stored digest.
pub fn verify(plaintext: &str, digest: &str) -> Result<bool> {
    Ok(bcrypt::verify(plaintext, digest)?)
}
