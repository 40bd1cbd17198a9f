//! Membership domain service: registration, login, and profile management.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::domain::error::Error;
use crate::domain::ports::{
    ImageStore, ImageStoreError, ImageUpload, MembershipCommand, MembershipQuery, PasswordHasher,
    PasswordHasherError, TokenService, TokenServiceError, UserRepository, UserStoreError,
};
use crate::domain::user::{
    AuthToken, AuthenticatedIdentity, Email, NewUser, Password, PersonName, Registration, UserId,
    UserProfile,
};

/// Domain service implementing the membership use-cases.
#[derive(Clone)]
pub struct MembershipService<R, H, T, I> {
    users: Arc<R>,
    hasher: Arc<H>,
    tokens: Arc<T>,
    images: Arc<I>,
}

impl<R, H, T, I> MembershipService<R, H, T, I> {
    /// Create a new service over the given adapters.
    pub fn new(users: Arc<R>, hasher: Arc<H>, tokens: Arc<T>, images: Arc<I>) -> Self {
        Self {
            users,
            hasher,
            tokens,
            images,
        }
    }
}

impl<R, H, T, I> MembershipService<R, H, T, I>
where
    R: UserRepository,
    H: PasswordHasher,
    T: TokenService,
    I: ImageStore,
{
    fn map_user_error(error: UserStoreError) -> Error {
        match error {
            UserStoreError::Connection { message } => {
                warn!(%message, "user repository unreachable");
                Error::service_unavailable("user repository unavailable")
            }
            UserStoreError::Query { message } => {
                warn!(%message, "user repository operation failed");
                Error::internal("user repository error")
            }
            UserStoreError::DuplicateEmail { email } => {
                warn!(%email, "registration with already-registered email");
                Error::email_taken("email already registered")
            }
        }
    }

    fn map_hasher_error(error: PasswordHasherError) -> Error {
        let PasswordHasherError::Hashing { message } = error;
        warn!(%message, "credential hashing failed");
        Error::internal("credential hashing failed")
    }

    fn map_token_error(error: TokenServiceError) -> Error {
        match error {
            TokenServiceError::InvalidToken { .. } => {
                Error::unauthorized("token is invalid or expired")
            }
            TokenServiceError::Issuance { message } => {
                warn!(%message, "token issuance failed");
                Error::internal("token issuance failed")
            }
        }
    }

    fn map_image_error(error: ImageStoreError) -> Error {
        let ImageStoreError::Io { message } = error;
        warn!(%message, "profile image could not be stored");
        Error::internal("image could not be stored")
    }
}

#[async_trait]
impl<R, H, T, I> MembershipCommand for MembershipService<R, H, T, I>
where
    R: UserRepository,
    H: PasswordHasher,
    T: TokenService,
    I: ImageStore,
{
    async fn register(&self, registration: Registration) -> Result<(), Error> {
        let password_hash = self
            .hasher
            .hash(&registration.password)
            .await
            .map_err(Self::map_hasher_error)?;

        let user = NewUser {
            id: UserId::random(),
            email: registration.email,
            password_hash,
            first_name: registration.first_name,
            last_name: registration.last_name,
        };

        self.users
            .create_with_balance(user)
            .await
            .map_err(Self::map_user_error)
    }

    async fn login(&self, email: Email, password: Password) -> Result<AuthToken, Error> {
        let credentials = self
            .users
            .find_credentials(&email)
            .await
            .map_err(Self::map_user_error)?;

        // Unknown email and wrong password intentionally share one error.
        let Some(credentials) = credentials else {
            return Err(Error::invalid_credentials("email or password is incorrect"));
        };

        let verified = self
            .hasher
            .verify(&password, &credentials.password_hash)
            .await
            .map_err(Self::map_hasher_error)?;
        if !verified {
            return Err(Error::invalid_credentials("email or password is incorrect"));
        }

        let identity = AuthenticatedIdentity {
            user_id: credentials.user_id,
            email: credentials.email,
        };
        self.tokens
            .issue(&identity)
            .await
            .map_err(Self::map_token_error)
    }

    async fn update_profile(
        &self,
        user_id: &UserId,
        first_name: PersonName,
        last_name: PersonName,
    ) -> Result<UserProfile, Error> {
        self.users
            .update_names(user_id, &first_name, &last_name)
            .await
            .map_err(Self::map_user_error)?
            .ok_or_else(|| Error::not_found("user not found"))
    }

    async fn update_profile_image(
        &self,
        user_id: &UserId,
        upload: ImageUpload,
    ) -> Result<UserProfile, Error> {
        let image_url = self
            .images
            .save(upload)
            .await
            .map_err(Self::map_image_error)?;

        self.users
            .update_profile_image(user_id, &image_url)
            .await
            .map_err(Self::map_user_error)?
            .ok_or_else(|| Error::not_found("user not found"))
    }
}

#[async_trait]
impl<R, H, T, I> MembershipQuery for MembershipService<R, H, T, I>
where
    R: UserRepository,
    H: PasswordHasher,
    T: TokenService,
    I: ImageStore,
{
    async fn profile(&self, user_id: &UserId) -> Result<UserProfile, Error> {
        self.users
            .find_profile(user_id)
            .await
            .map_err(Self::map_user_error)?
            .ok_or_else(|| Error::not_found("user not found"))
    }
}
