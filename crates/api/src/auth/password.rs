//! Argon2id password hashing and verification.
//!
//! Hashes are PHC strings: algorithm, cost parameters and a fresh random
//! salt from [`OsRng`] are embedded in the output, so hashing the same
//! password twice never yields the same string.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("password hashing failed: {0}")]
    Hash(argon2::password_hash::Error),

    #[error("stored password hash is malformed: {0}")]
    MalformedHash(argon2::password_hash::Error),
}

/// Argon2id v19 with the crate's default cost (19 MiB, 2 passes, 1 lane).
fn argon2() -> Argon2<'static> {
    Argon2::new(Algorithm::Argon2id, Version::V0x13, Params::default())
}

/// Hash a plaintext password with a random salt.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = argon2()
        .hash_password(password.as_bytes(), &salt)
        .map_err(PasswordError::Hash)?;
    Ok(hash.to_string())
}

/// Verify a plaintext password against a stored PHC hash.
///
/// The digest comparison is constant-time. `Ok(false)` means the password
/// does not match; an unparsable hash is an error, never a mismatch.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(hash).map_err(PasswordError::MalformedHash)?;
    match argon2().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::Hash(e)),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn hash_is_argon2id_phc_string() {
        let hash = hash_password("Secret123!").expect("hashing should succeed");
        assert!(hash.starts_with("$argon2id$v=19$"), "got {hash}");
        assert!(!hash.contains("Secret123!"));
    }

    #[test]
    fn same_password_hashes_differ_but_both_verify() {
        let a = hash_password("Secret123!").unwrap();
        let b = hash_password("Secret123!").unwrap();

        assert_ne!(a, b, "per-call salt must make hashes differ");
        assert!(verify_password("Secret123!", &a).unwrap());
        assert!(verify_password("Secret123!", &b).unwrap());
    }

    #[test]
    fn wrong_password_is_a_mismatch_not_an_error() {
        let hash = hash_password("real-password").unwrap();
        assert!(!verify_password("wrong-password", &hash).unwrap());
        assert!(!verify_password("", &hash).unwrap());
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert_matches!(
            verify_password("anything", "not-a-phc-string"),
            Err(PasswordError::MalformedHash(_))
        );
    }
}
