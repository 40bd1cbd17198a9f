//! Argon2-backed `PasswordHasher` adapter.

use argon2::password_hash::{PasswordHash, PasswordVerifier, SaltString, rand_core::OsRng};
use argon2::{Argon2, PasswordHasher as _};
use async_trait::async_trait;

use crate::domain::ports::{PasswordHasher, PasswordHasherError};
use crate::domain::user::Password;

/// Argon2id implementation of the [`PasswordHasher`] port using the
/// library's default parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2PasswordHasher;

#[async_trait]
impl PasswordHasher for Argon2PasswordHasher {
    async fn hash(&self, password: &Password) -> Result<String, PasswordHasherError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.expose().as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| PasswordHasherError::hashing(err.to_string()))
    }

    async fn verify(
        &self,
        password: &Password,
        stored_hash: &str,
    ) -> Result<bool, PasswordHasherError> {
        let parsed = PasswordHash::new(stored_hash)
            .map_err(|err| PasswordHasherError::hashing(err.to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.expose().as_bytes(), &parsed)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hashes_verify_and_mismatches_do_not() {
        let hasher = Argon2PasswordHasher;
        let password = Password::new("correct-horse").expect("valid password");

        let hash = hasher.hash(&password).await.expect("hashing succeeds");
        assert!(hash.starts_with("$argon2"));

        assert!(hasher.verify(&password, &hash).await.expect("verify"));
        let other = Password::new("wrong-horse!").expect("valid password");
        assert!(!hasher.verify(&other, &hash).await.expect("verify"));
    }

    #[tokio::test]
    async fn malformed_stored_hashes_are_an_error_not_a_mismatch() {
        let hasher = Argon2PasswordHasher;
        let password = Password::new("correct-horse").expect("valid password");

        let error = hasher
            .verify(&password, "not-a-phc-string")
            .await
            .expect_err("malformed hash must error");
        assert!(matches!(error, PasswordHasherError::Hashing { .. }));
    }
}
