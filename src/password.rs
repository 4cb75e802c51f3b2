//! Password hashing with Argon2.
//!
//! Stored hashes use the PHC string format, so parameters and salt
//! travel with the hash. Verification is a pure check against the
//! stored string; callers never see why a password failed to match.

use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use password_hash::{PasswordHash, SaltString};

/// Hash a password with a fresh random salt, returning a PHC string.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let mut salt_bytes = [0u8; 16];
    getrandom::getrandom(&mut salt_bytes).map_err(|_| PasswordError::SaltGeneration)?;
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|_| PasswordError::SaltGeneration)?;

    let argon2 = Argon2::default();
    let phc = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| PasswordError::Hashing)?
        .to_string();
    Ok(phc)
}

/// Check a password against a stored PHC hash.
/// An unparseable hash verifies false, same as a mismatch.
pub fn verify_password(hash: &str, password: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// Errors that can occur while hashing a password.
#[derive(Debug)]
pub enum PasswordError {
    /// Could not obtain random salt bytes
    SaltGeneration,
    /// Argon2 rejected the input
    Hashing,
}

impl std::fmt::Display for PasswordError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PasswordError::SaltGeneration => write!(f, "Failed to generate salt"),
            PasswordError::Hashing => write!(f, "Failed to hash password"),
        }
    }
}

impl std::error::Error for PasswordError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let hash = hash_password("secret1").unwrap();
        assert!(verify_password(&hash, "secret1"));
        assert!(!verify_password(&hash, "secret2"));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("secret1").unwrap();
        let b = hash_password("secret1").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_garbage_hash_verifies_false() {
        assert!(!verify_password("not-a-phc-string", "secret1"));
        assert!(!verify_password("", "secret1"));
    }
}
