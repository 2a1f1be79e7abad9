use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use rand::rngs::OsRng;
use tracing::error;

use super::errors::HashError;

/// One-way transform used for stored passwords and confirmation tokens.
#[async_trait]
pub trait Hasher: Send + Sync {
    async fn hash(&self, input: &str) -> Result<String, HashError>;
}

/// Argon2id with default parameters and a fresh random salt per hash.
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2Hasher;

impl Argon2Hasher {
    fn hash_blocking(input: &str) -> Result<String, HashError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(input.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| {
                error!(error = %e, "argon2 hash failed");
                HashError::Failed(e.to_string())
            })
    }

    /// Checks `plain` against a stored PHC string. Errors only when `stored`
    /// cannot be parsed; a mismatch is `Ok(false)`.
    pub fn verify(&self, plain: &str, stored: &str) -> Result<bool, HashError> {
        let parsed = PasswordHash::new(stored).map_err(|e| {
            error!(error = %e, "stored hash is not a PHC string");
            HashError::Failed(e.to_string())
        })?;
        Ok(Argon2::default()
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok())
    }
}

#[async_trait]
impl Hasher for Argon2Hasher {
    async fn hash(&self, input: &str) -> Result<String, HashError> {
        let input = input.to_owned();
        tokio::task::spawn_blocking(move || Self::hash_blocking(&input)).await?
    }
}
