//! Port for credential hashing.
//!
//! The domain consumes hashing as an opaque capability; the algorithm and
//! its parameters live entirely in the adapter.

use async_trait::async_trait;

use crate::domain::user::Password;

use super::macros::define_port_error;

define_port_error! {
    /// Errors raised by password hasher adapters.
    pub enum PasswordHasherError {
        /// Hashing or hash parsing failed.
        Hashing { message: String } =>
            "password hashing failed: {message}",
    }
}

/// Port for hashing and verifying passwords.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    /// Produce a storable hash for the password.
    async fn hash(&self, password: &Password) -> Result<String, PasswordHasherError>;

    /// Check a password against a stored hash. A mismatch is `Ok(false)`;
    /// only a malformed hash or hasher failure is an error.
    async fn verify(
        &self,
        password: &Password,
        stored_hash: &str,
    ) -> Result<bool, PasswordHasherError>;
}
