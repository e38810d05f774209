//! Password hashing wrappers.
//!
//! Thin delegation to bcrypt; callers never see the hash format.

use pwhash::bcrypt;
use thiserror::Error;

/// Minimum accepted length for a newly chosen password.
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("failed to hash password")]
    Hash(#[source] pwhash::error::Error),
}

/// Hash a plaintext password for storage.
pub fn hash_password(plain: &str) -> Result<String, PasswordError> {
    bcrypt::hash(plain).map_err(PasswordError::Hash)
}

/// Verify a plaintext password against a stored hash.
///
/// Returns false on any mismatch or malformed hash; callers surface a single
/// indistinguishable credentials error either way.
pub fn verify_password(plain: &str, stored_hash: &str) -> bool {
    bcrypt::verify(plain, stored_hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_round_trip() {
        let hash = hash_password("hunter22").expect("hash");
        assert!(verify_password("hunter22", &hash));
        assert!(!verify_password("hunter23", &hash));
    }

    #[test]
    fn verify_rejects_garbage_hash() {
        assert!(!verify_password("anything", "not-a-bcrypt-hash"));
    }
}
