//! Bearer-token authentication extractor.
//!
//! Handlers that require an authenticated caller take an
//! [`AuthenticatedUser`] parameter; extraction reads the `Authorization`
//! header, verifies the token through the configured
//! [`TokenService`](crate::domain::ports::TokenService), and rejects the
//! request with the unauthorized envelope when anything is off. Handlers
//! never see an unverified identity.

use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{FromRequest, HttpRequest, web};
use futures_util::future::LocalBoxFuture;

use crate::domain::user::AuthenticatedIdentity;
use crate::domain::Error;

use super::state::HttpState;

/// Stable message for every token rejection.
const TOKEN_MESSAGE: &str = "token is invalid or expired";

/// The verified identity of the calling user.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub AuthenticatedIdentity);

fn bearer_token(req: &HttpRequest) -> Result<String, Error> {
    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| Error::unauthorized(TOKEN_MESSAGE))?;

    header_value
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_owned())
        .filter(|token| !token.is_empty())
        .ok_or_else(|| Error::unauthorized(TOKEN_MESSAGE))
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        let token = bearer_token(req);

        Box::pin(async move {
            let state =
                state.ok_or_else(|| Error::internal("http state is not configured"))?;
            let token = token?;
            let identity = state
                .tokens
                .verify(&token)
                .await
                .map_err(|_| Error::unauthorized(TOKEN_MESSAGE))?;
            Ok(AuthenticatedUser(identity))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{
        FixtureTokenService, MockBalanceCommand, MockBalanceQuery, MockInformationQuery,
        MockMembershipCommand, MockMembershipQuery, TokenService,
    };
    use crate::domain::user::{Email, UserId};
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test};
    use serde_json::Value;
    use std::sync::Arc;

    fn fixture_state() -> HttpState {
        HttpState {
            membership: Arc::new(MockMembershipCommand::new()),
            membership_query: Arc::new(MockMembershipQuery::new()),
            information: Arc::new(MockInformationQuery::new()),
            balance: Arc::new(MockBalanceCommand::new()),
            balance_query: Arc::new(MockBalanceQuery::new()),
            tokens: Arc::new(FixtureTokenService),
        }
    }

    async fn fixture_token() -> String {
        let identity = AuthenticatedIdentity {
            user_id: UserId::random(),
            email: Email::new("ada@example.com").expect("valid email"),
        };
        FixtureTokenService
            .issue(&identity)
            .await
            .expect("issue fixture token")
            .token
    }

    fn test_app(
        state: HttpState,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new().app_data(web::Data::new(state)).route(
            "/private",
            web::get().to(|user: AuthenticatedUser| async move {
                HttpResponse::Ok().body(user.0.email.as_ref().to_owned())
            }),
        )
    }

    #[actix_web::test]
    async fn valid_bearer_token_is_extracted() {
        let app = test::init_service(test_app(fixture_state())).await;
        let token = fixture_token().await;

        let req = test::TestRequest::get()
            .uri("/private")
            .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body = test::read_body(res).await;
        assert_eq!(body, "ada@example.com");
    }

    #[actix_web::test]
    async fn missing_header_is_rejected_with_status_108() {
        let app = test::init_service(test_app(fixture_state())).await;
        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/private").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["status"], 108);
    }

    #[actix_web::test]
    async fn non_bearer_scheme_is_rejected() {
        let app = test::init_service(test_app(fixture_state())).await;
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/private")
                .insert_header((header::AUTHORIZATION, "Basic dXNlcjpwYXNz"))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn unverifiable_token_is_rejected() {
        let app = test::init_service(test_app(fixture_state())).await;
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/private")
                .insert_header((header::AUTHORIZATION, "Bearer forged-token"))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["status"], 108);
        assert_eq!(body["message"], TOKEN_MESSAGE);
    }
}
