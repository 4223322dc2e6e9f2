//! Password hashing using Argon2id.
//!
//! Registration accepts an optional password. When present it is stored as
//! an Argon2id PHC string; accounts created without one get a hash of a
//! random throwaway secret so the column is never empty.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Algorithm, Argon2, Params, Version,
};
use thiserror::Error;

use crate::crypto::generate_secure_token;

/// Error type for password operations.
#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Failed to hash password: {0}")]
    HashError(String),
}

/// OWASP 2024 parameters: 19 MiB, 2 iterations, 1 lane.
const MEMORY_COST: u32 = 19456;
const TIME_COST: u32 = 2;
const PARALLELISM: u32 = 1;
const OUTPUT_LEN: usize = 32;

fn create_argon2() -> Result<Argon2<'static>, PasswordError> {
    let params = Params::new(MEMORY_COST, TIME_COST, PARALLELISM, Some(OUTPUT_LEN))
        .map_err(|e| PasswordError::HashError(format!("Failed to create Argon2 params: {}", e)))?;

    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hashes a password, returning a PHC-formatted string.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    create_argon2()?
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::HashError(e.to_string()))
}

/// Hashes the supplied password, or a random secret when none was given.
pub fn hash_optional_password(password: Option<&str>) -> Result<String, PasswordError> {
    match password.filter(|p| !p.is_empty()) {
        Some(p) => hash_password(p),
        None => hash_password(&generate_secure_token()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argon2::{PasswordHash, PasswordVerifier};

    fn verifies(password: &str, hash: &str) -> bool {
        let parsed = PasswordHash::new(hash).unwrap();
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }

    #[test]
    fn test_hash_password_returns_phc_format() {
        let hash = hash_password("test_password").unwrap();
        assert!(hash.starts_with("$argon2id$v=19$m=19456,t=2,p=1$"));
    }

    #[test]
    fn test_hash_password_verifies() {
        let hash = hash_password("пароль123").unwrap();
        assert!(verifies("пароль123", &hash));
        assert!(!verifies("wrong", &hash));
    }

    #[test]
    fn test_same_password_gets_different_salts() {
        assert_ne!(hash_password("same").unwrap(), hash_password("same").unwrap());
    }

    #[test]
    fn test_hash_optional_password_with_value() {
        let hash = hash_optional_password(Some("secret")).unwrap();
        assert!(verifies("secret", &hash));
    }

    #[test]
    fn test_hash_optional_password_blank_uses_random_secret() {
        let hash = hash_optional_password(Some("")).unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(!verifies("", &hash));

        let hash = hash_optional_password(None).unwrap();
        assert!(hash.starts_with("$argon2id$"));
    }
}
