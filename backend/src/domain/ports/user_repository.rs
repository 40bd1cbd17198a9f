//! Port for membership persistence.

use async_trait::async_trait;

use crate::domain::user::{Email, NewUser, PersonName, StoredCredentials, UserId, UserProfile};

use super::macros::define_port_error;

define_port_error! {
    /// Errors raised by user repository adapters.
    pub enum UserStoreError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "user repository query failed: {message}",
        /// The email address is already registered.
        DuplicateEmail { email: String } =>
            "email already registered: {email}",
    }
}

/// Port for user storage and retrieval.
///
/// Registration is transactional: [`create_with_balance`] inserts the user
/// row *and* its zero balance row in one store transaction, so every user
/// has exactly one balance row for the lifetime of the account.
///
/// [`create_with_balance`]: UserRepository::create_with_balance
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user together with a zero balance row, atomically.
    async fn create_with_balance(&self, user: NewUser) -> Result<(), UserStoreError>;

    /// Fetch stored credentials by email for login verification.
    async fn find_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<StoredCredentials>, UserStoreError>;

    /// Fetch the profile fields for a user.
    async fn find_profile(&self, user_id: &UserId) -> Result<Option<UserProfile>, UserStoreError>;

    /// Update first and last name, returning the updated profile.
    async fn update_names(
        &self,
        user_id: &UserId,
        first_name: &PersonName,
        last_name: &PersonName,
    ) -> Result<Option<UserProfile>, UserStoreError>;

    /// Update the stored profile image URL, returning the updated profile.
    async fn update_profile_image(
        &self,
        user_id: &UserId,
        image_url: &str,
    ) -> Result<Option<UserProfile>, UserStoreError>;
}
