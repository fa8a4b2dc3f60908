//! Password hashing and verification.

use bcrypt::{hash, verify, BcryptError, DEFAULT_COST};

/// One-way salted hash of a plaintext password.
pub fn hash_password(password: &str) -> Result<String, BcryptError> {
    hash(password, DEFAULT_COST)
}

/// Compares a plaintext password against a stored digest.
/// A malformed digest counts as a non-match rather than an error, so
/// callers see a uniform failure signal.
pub fn verify_password(password: &str, digest: &str) -> bool {
    verify(password, digest).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify_roundtrip() {
        let digest = hash_password("hunter2").unwrap();
        assert!(verify_password("hunter2", &digest));
    }

    #[test]
    fn test_wrong_password_fails() {
        let digest = hash_password("hunter2").unwrap();
        assert!(!verify_password("hunter3", &digest));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("hunter2").unwrap();
        let b = hash_password("hunter2").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_malformed_digest_is_a_non_match() {
        assert!(!verify_password("hunter2", "not-a-bcrypt-digest"));
    }
}
