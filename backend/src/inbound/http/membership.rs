//! Membership API handlers.
//!
//! ```text
//! POST /registration {"email","password","first_name","last_name"}
//! POST /login        {"email","password"}
//! GET  /profile
//! PUT  /profile/update {"first_name","last_name"}
//! PUT  /profile/image  multipart field "file" (jpeg/png)
//! ```

use actix_multipart::Multipart;
use actix_web::{HttpResponse, get, post, put, web};
use futures_util::TryStreamExt;
use serde::Deserialize;

use crate::domain::ports::ImageUpload;
use crate::domain::user::{
    Email, Password, PersonName, Registration, UserValidationError,
};
use crate::domain::Error;

use super::auth::AuthenticatedUser;
use super::envelope;
use super::error::ApiResult;
use super::state::HttpState;

/// Stable message for every rejected image upload.
const IMAGE_MESSAGE: &str = "image format is not supported";

/// Maximum accepted image size in bytes.
const IMAGE_MAX_BYTES: usize = 2 * 1024 * 1024;

fn map_validation_error(err: UserValidationError) -> Error {
    Error::invalid_request(err.to_string())
}

/// Registration request body.
#[derive(Debug, Deserialize)]
pub struct RegistrationRequest {
    /// Login email.
    pub email: Option<String>,
    /// Raw password.
    pub password: Option<String>,
    /// First name.
    pub first_name: Option<String>,
    /// Last name.
    pub last_name: Option<String>,
}

impl TryFrom<RegistrationRequest> for Registration {
    type Error = UserValidationError;

    fn try_from(value: RegistrationRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            email: Email::new(value.email.unwrap_or_default())?,
            password: Password::new(value.password.unwrap_or_default())?,
            first_name: PersonName::new(value.first_name.unwrap_or_default())?,
            last_name: PersonName::new(value.last_name.unwrap_or_default())?,
        })
    }
}

/// Register a new account. Public endpoint.
#[post("/registration")]
pub async fn registration(
    state: web::Data<HttpState>,
    payload: web::Json<RegistrationRequest>,
) -> ApiResult<HttpResponse> {
    let registration =
        Registration::try_from(payload.into_inner()).map_err(map_validation_error)?;
    state.membership.register(registration).await?;
    Ok(envelope::success_empty("registration successful, please log in"))
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Login email.
    pub email: Option<String>,
    /// Raw password.
    pub password: Option<String>,
}

/// Authenticate and issue a bearer token. Public endpoint.
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let email = Email::new(body.email.unwrap_or_default()).map_err(map_validation_error)?;
    let password =
        Password::new(body.password.unwrap_or_default()).map_err(map_validation_error)?;

    let token = state.membership.login(email, password).await?;
    Ok(envelope::success("login success", token))
}

/// Fetch the authenticated user's profile.
#[get("/profile")]
pub async fn profile(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
) -> ApiResult<HttpResponse> {
    let profile = state.membership_query.profile(&user.0.user_id).await?;
    Ok(envelope::success("success", profile))
}

/// Profile update request body.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    /// New first name.
    pub first_name: Option<String>,
    /// New last name.
    pub last_name: Option<String>,
}

/// Update first and last name.
#[put("/profile/update")]
pub async fn update_profile(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    payload: web::Json<UpdateProfileRequest>,
) -> ApiResult<HttpResponse> {
    let body = payload.into_inner();
    let first_name =
        PersonName::new(body.first_name.unwrap_or_default()).map_err(map_validation_error)?;
    let last_name =
        PersonName::new(body.last_name.unwrap_or_default()).map_err(map_validation_error)?;

    let updated = state
        .membership
        .update_profile(&user.0.user_id, first_name, last_name)
        .await?;
    Ok(envelope::success("profile updated", updated))
}

/// Replace the profile image from a multipart `file` field.
#[put("/profile/image")]
pub async fn update_profile_image(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    payload: Multipart,
) -> ApiResult<HttpResponse> {
    let upload = read_image_field(payload).await?;
    let updated = state
        .membership
        .update_profile_image(&user.0.user_id, upload)
        .await?;
    Ok(envelope::success("profile image updated", updated))
}

/// Pull the `file` field out of the multipart stream, enforcing the
/// accepted content types and the size cap.
async fn read_image_field(mut payload: Multipart) -> Result<ImageUpload, Error> {
    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|_| Error::invalid_request(IMAGE_MESSAGE))?
    {
        if field.name() != "file" {
            continue;
        }

        let extension = match field.content_type().map(|mime| mime.essence_str()) {
            Some("image/jpeg") => "jpg",
            Some("image/png") => "png",
            _ => return Err(Error::invalid_request(IMAGE_MESSAGE)),
        };

        let mut bytes = Vec::new();
        while let Some(chunk) = field
            .try_next()
            .await
            .map_err(|_| Error::invalid_request(IMAGE_MESSAGE))?
        {
            if bytes.len() + chunk.len() > IMAGE_MAX_BYTES {
                return Err(Error::invalid_request(IMAGE_MESSAGE));
            }
            bytes.extend_from_slice(&chunk);
        }
        if bytes.is_empty() {
            return Err(Error::invalid_request(IMAGE_MESSAGE));
        }

        return Ok(ImageUpload { extension, bytes });
    }

    Err(Error::invalid_request(IMAGE_MESSAGE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{
        FixtureTokenService, MockBalanceCommand, MockBalanceQuery, MockInformationQuery,
        MockMembershipCommand, MockMembershipQuery, TokenService,
    };
    use crate::domain::user::{AuthToken, AuthenticatedIdentity, UserId, UserProfile};
    use actix_web::http::StatusCode;
    use actix_web::http::header;
    use actix_web::{App, test};
    use serde_json::{Value, json};
    use std::sync::Arc;

    fn state(
        membership: MockMembershipCommand,
        membership_query: MockMembershipQuery,
    ) -> HttpState {
        HttpState {
            membership: Arc::new(membership),
            membership_query: Arc::new(membership_query),
            information: Arc::new(MockInformationQuery::new()),
            balance: Arc::new(MockBalanceCommand::new()),
            balance_query: Arc::new(MockBalanceQuery::new()),
            tokens: Arc::new(FixtureTokenService),
        }
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
        App::new()
            .app_data(web::Data::new(state))
            .service(registration)
            .service(login)
            .service(profile)
            .service(update_profile)
    }

    fn ada_profile() -> UserProfile {
        UserProfile {
            email: Email::new("ada@example.com").expect("valid email"),
            first_name: PersonName::new("Ada").expect("valid name"),
            last_name: PersonName::new("Lovelace").expect("valid name"),
            profile_image: None,
        }
    }

    async fn bearer_for(user_id: UserId) -> (header::HeaderName, String) {
        let token = FixtureTokenService
            .issue(&AuthenticatedIdentity {
                user_id,
                email: Email::new("ada@example.com").expect("valid email"),
            })
            .await
            .expect("issue fixture token")
            .token;
        (header::AUTHORIZATION, format!("Bearer {token}"))
    }

    #[actix_web::test]
    async fn registration_returns_an_empty_success_envelope() {
        let mut membership = MockMembershipCommand::new();
        membership.expect_register().times(1).returning(|_| Ok(()));

        let app = test::init_service(test_app(state(membership, MockMembershipQuery::new())))
            .await;
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/registration")
                .set_json(json!({
                    "email": "ada@example.com",
                    "password": "correct-horse",
                    "first_name": "Ada",
                    "last_name": "Lovelace",
                }))
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["status"], 0);
        assert!(body["data"].is_null());
    }

    #[actix_web::test]
    async fn registration_rejects_a_malformed_email_before_the_service() {
        let mut membership = MockMembershipCommand::new();
        membership.expect_register().times(0);

        let app = test::init_service(test_app(state(membership, MockMembershipQuery::new())))
            .await;
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/registration")
                .set_json(json!({
                    "email": "not-an-email",
                    "password": "correct-horse",
                    "first_name": "Ada",
                    "last_name": "Lovelace",
                }))
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["status"], 102);
    }

    #[actix_web::test]
    async fn registration_rejects_a_short_password() {
        let mut membership = MockMembershipCommand::new();
        membership.expect_register().times(0);

        let app = test::init_service(test_app(state(membership, MockMembershipQuery::new())))
            .await;
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/registration")
                .set_json(json!({
                    "email": "ada@example.com",
                    "password": "short",
                    "first_name": "Ada",
                    "last_name": "Lovelace",
                }))
                .to_request(),
        )
        .await;

        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["status"], 102);
        assert_eq!(body["message"], "password must be at least 8 characters");
    }

    #[actix_web::test]
    async fn login_returns_the_issued_token() {
        let mut membership = MockMembershipCommand::new();
        membership.expect_login().times(1).returning(|_, _| {
            Ok(AuthToken {
                token: "issued-token".to_owned(),
            })
        });

        let app = test::init_service(test_app(state(membership, MockMembershipQuery::new())))
            .await;
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/login")
                .set_json(json!({
                    "email": "ada@example.com",
                    "password": "correct-horse",
                }))
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["status"], 0);
        assert_eq!(body["message"], "login success");
        assert_eq!(body["data"]["token"], "issued-token");
    }

    #[actix_web::test]
    async fn login_maps_rejected_credentials_to_status_103() {
        let mut membership = MockMembershipCommand::new();
        membership
            .expect_login()
            .returning(|_, _| Err(Error::invalid_credentials("email or password is incorrect")));

        let app = test::init_service(test_app(state(membership, MockMembershipQuery::new())))
            .await;
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/login")
                .set_json(json!({
                    "email": "ada@example.com",
                    "password": "wrong-password",
                }))
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["status"], 103);
    }

    #[actix_web::test]
    async fn profile_requires_authentication() {
        let app = test::init_service(test_app(state(
            MockMembershipCommand::new(),
            MockMembershipQuery::new(),
        )))
        .await;
        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/profile").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["status"], 108);
    }

    #[actix_web::test]
    async fn profile_returns_the_callers_profile() {
        let user_id = UserId::random();
        let mut membership_query = MockMembershipQuery::new();
        let expected = user_id;
        membership_query
            .expect_profile()
            .withf(move |id| *id == expected)
            .times(1)
            .returning(|_| Ok(ada_profile()));

        let app = test::init_service(test_app(state(
            MockMembershipCommand::new(),
            membership_query,
        )))
        .await;
        let (name, value) = bearer_for(user_id).await;
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/profile")
                .insert_header((name, value))
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["data"]["email"], "ada@example.com");
        assert_eq!(body["data"]["first_name"], "Ada");
        assert!(body["data"]["profile_image"].is_null());
    }

    #[actix_web::test]
    async fn update_profile_validates_names_before_the_service() {
        let mut membership = MockMembershipCommand::new();
        membership.expect_update_profile().times(0);

        let app = test::init_service(test_app(state(membership, MockMembershipQuery::new())))
            .await;
        let (name, value) = bearer_for(UserId::random()).await;
        let res = test::call_service(
            &app,
            test::TestRequest::put()
                .uri("/profile/update")
                .insert_header((name, value))
                .set_json(json!({ "first_name": "", "last_name": "Lovelace" }))
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["status"], 102);
        assert_eq!(body["message"], "name must not be empty");
    }
}
