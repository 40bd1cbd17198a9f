//! Driving ports for membership use-cases.

use async_trait::async_trait;

use crate::domain::error::Error;
use crate::domain::user::{
    AuthToken, Email, Password, PersonName, Registration, UserId, UserProfile,
};

use super::image_store::ImageUpload;

/// State-changing membership operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MembershipCommand: Send + Sync {
    /// Register a new account, creating the user and its zero balance row.
    async fn register(&self, registration: Registration) -> Result<(), Error>;

    /// Authenticate credentials and issue a bearer token.
    async fn login(&self, email: Email, password: Password) -> Result<AuthToken, Error>;

    /// Update first and last name.
    async fn update_profile(
        &self,
        user_id: &UserId,
        first_name: PersonName,
        last_name: PersonName,
    ) -> Result<UserProfile, Error>;

    /// Store an uploaded profile image and record its public URL.
    async fn update_profile_image(
        &self,
        user_id: &UserId,
        upload: ImageUpload,
    ) -> Result<UserProfile, Error>;
}

/// Read-only membership operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MembershipQuery: Send + Sync {
    /// Profile of the authenticated user.
    async fn profile(&self, user_id: &UserId) -> Result<UserProfile, Error>;
}
