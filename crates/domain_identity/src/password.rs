//! Credential hashing with Argon2id
//!
//! Hashes embed their salt and parameters in PHC string format, so
//! verification needs no extra stored state.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};

use crate::error::IdentityError;

/// Minimum accepted password length
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Hashes a plaintext password with a fresh random salt
pub fn hash_password(plaintext: &str) -> Result<String, IdentityError> {
    if plaintext.len() < MIN_PASSWORD_LENGTH {
        return Err(IdentityError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }

    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| IdentityError::Hashing(e.to_string()))
}

/// Verifies a plaintext password against a stored PHC-format hash
///
/// An unparseable hash counts as a failed verification rather than an
/// error, so corrupted rows cannot be used to probe accounts.
pub fn verify_password(plaintext: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_round_trip() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(verify_password("correct horse battery", &hash));
        assert!(!verify_password("wrong password", &hash));
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_password("same-password").unwrap();
        let b = hash_password("same-password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn short_passwords_rejected() {
        assert!(matches!(
            hash_password("short"),
            Err(IdentityError::Validation(_))
        ));
    }

    #[test]
    fn malformed_hash_fails_closed() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }
}
