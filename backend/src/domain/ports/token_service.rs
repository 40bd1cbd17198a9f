//! Port for bearer token issuance and verification.

use async_trait::async_trait;

use crate::domain::user::{AuthToken, AuthenticatedIdentity, Email, UserId};

use super::macros::define_port_error;

define_port_error! {
    /// Errors raised by token service adapters.
    pub enum TokenServiceError {
        /// The presented token is malformed, forged, or expired.
        InvalidToken { message: String } =>
            "token is invalid or expired: {message}",
        /// A token could not be produced.
        Issuance { message: String } =>
            "token issuance failed: {message}",
    }
}

/// Port for the opaque authenticated-identity capability.
///
/// Inbound adapters call [`verify`](TokenService::verify) to turn a bearer
/// token into an [`AuthenticatedIdentity`]; the membership service calls
/// [`issue`](TokenService::issue) at login. The token format is an adapter
/// detail.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenService: Send + Sync {
    /// Issue a token for an authenticated identity.
    async fn issue(&self, identity: &AuthenticatedIdentity) -> Result<AuthToken, TokenServiceError>;

    /// Verify a presented token and recover the identity it carries.
    async fn verify(&self, token: &str) -> Result<AuthenticatedIdentity, TokenServiceError>;
}

/// Deterministic in-memory [`TokenService`] for handler tests.
///
/// Issues `fixture-token:{user_id}:{email}` and verifies only tokens of
/// that shape.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureTokenService;

const FIXTURE_PREFIX: &str = "fixture-token:";

#[async_trait]
impl TokenService for FixtureTokenService {
    async fn issue(
        &self,
        identity: &AuthenticatedIdentity,
    ) -> Result<AuthToken, TokenServiceError> {
        Ok(AuthToken {
            token: format!(
                "{FIXTURE_PREFIX}{}:{}",
                identity.user_id,
                identity.email.as_ref()
            ),
        })
    }

    async fn verify(&self, token: &str) -> Result<AuthenticatedIdentity, TokenServiceError> {
        let Some(rest) = token.strip_prefix(FIXTURE_PREFIX) else {
            return Err(TokenServiceError::invalid_token("unknown fixture token"));
        };
        let Some((id, email)) = rest.split_once(':') else {
            return Err(TokenServiceError::invalid_token("malformed fixture token"));
        };
        let user_id = UserId::new(id)
            .map_err(|err| TokenServiceError::invalid_token(err.to_string()))?;
        let email = Email::new(email)
            .map_err(|err| TokenServiceError::invalid_token(err.to_string()))?;
        Ok(AuthenticatedIdentity { user_id, email })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixture_tokens_round_trip() {
        let identity = AuthenticatedIdentity {
            user_id: UserId::random(),
            email: Email::new("user@example.com").expect("valid email"),
        };
        let service = FixtureTokenService;

        let token = service.issue(&identity).await.expect("issue");
        let verified = service.verify(&token.token).await.expect("verify");
        assert_eq!(verified, identity);
    }

    #[tokio::test]
    async fn fixture_rejects_foreign_tokens() {
        let error = FixtureTokenService
            .verify("definitely-not-ours")
            .await
            .expect_err("foreign token must fail");
        assert!(matches!(error, TokenServiceError::InvalidToken { .. }));
    }
}
