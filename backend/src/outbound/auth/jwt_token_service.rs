//! JWT-backed `TokenService` adapter.
//!
//! Issues HS256 bearer tokens carrying the user id and email, expiring
//! after a configurable lifetime. Verification failures of any kind
//! (malformed, forged, expired) collapse into the port's invalid-token
//! error so callers cannot distinguish them.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::domain::ports::{TokenService, TokenServiceError};
use crate::domain::user::{AuthToken, AuthenticatedIdentity, Email, UserId};

/// Default token lifetime.
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 12;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    email: String,
    iat: i64,
    exp: i64,
}

/// HS256 implementation of the [`TokenService`] port.
#[derive(Clone)]
pub struct JwtTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl JwtTokenService {
    /// Create a service signing with the given secret and token lifetime.
    #[must_use]
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    /// Create a service with the default 12 hour lifetime.
    #[must_use]
    pub fn with_default_ttl(secret: &[u8]) -> Self {
        Self::new(secret, Duration::hours(DEFAULT_TOKEN_TTL_HOURS))
    }
}

#[async_trait]
impl TokenService for JwtTokenService {
    async fn issue(
        &self,
        identity: &AuthenticatedIdentity,
    ) -> Result<AuthToken, TokenServiceError> {
        let now = Utc::now();
        let claims = Claims {
            sub: identity.user_id.to_string(),
            email: identity.email.as_ref().to_owned(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|err| TokenServiceError::issuance(err.to_string()))?;
        Ok(AuthToken { token })
    }

    async fn verify(&self, token: &str) -> Result<AuthenticatedIdentity, TokenServiceError> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|err| TokenServiceError::invalid_token(err.to_string()))?;

        let user_id = UserId::new(&data.claims.sub)
            .map_err(|err| TokenServiceError::invalid_token(err.to_string()))?;
        let email = Email::new(data.claims.email)
            .map_err(|err| TokenServiceError::invalid_token(err.to_string()))?;
        Ok(AuthenticatedIdentity { user_id, email })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-secret-for-unit-tests";

    fn identity() -> AuthenticatedIdentity {
        AuthenticatedIdentity {
            user_id: UserId::random(),
            email: Email::new("ada@example.com").expect("valid email"),
        }
    }

    #[tokio::test]
    async fn issued_tokens_verify_back_to_the_identity() {
        let service = JwtTokenService::with_default_ttl(SECRET);
        let identity = identity();

        let token = service.issue(&identity).await.expect("issue");
        let verified = service.verify(&token.token).await.expect("verify");
        assert_eq!(verified, identity);
    }

    #[tokio::test]
    async fn tokens_signed_with_a_different_secret_are_rejected() {
        let issuer = JwtTokenService::with_default_ttl(b"other-secret");
        let verifier = JwtTokenService::with_default_ttl(SECRET);

        let token = issuer.issue(&identity()).await.expect("issue");
        let error = verifier
            .verify(&token.token)
            .await
            .expect_err("forged token must fail");
        assert!(matches!(error, TokenServiceError::InvalidToken { .. }));
    }

    #[tokio::test]
    async fn expired_tokens_are_rejected() {
        // Negative lifetime puts the expiry beyond the default leeway.
        let service = JwtTokenService::new(SECRET, Duration::minutes(-10));

        let token = service.issue(&identity()).await.expect("issue");
        let error = service
            .verify(&token.token)
            .await
            .expect_err("expired token must fail");
        assert!(matches!(error, TokenServiceError::InvalidToken { .. }));
    }

    #[tokio::test]
    async fn garbage_tokens_are_rejected() {
        let service = JwtTokenService::with_default_ttl(SECRET);
        let error = service
            .verify("not.a.jwt")
            .await
            .expect_err("garbage must fail");
        assert!(matches!(error, TokenServiceError::InvalidToken { .. }));
    }
}
