//! Information API handlers.
//!
//! ```text
//! GET /banner    (public)
//! GET /services  (authenticated)
//! ```

use actix_web::{HttpResponse, get, web};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::ledger::{Banner, ServiceItem};

use super::auth::AuthenticatedUser;
use super::envelope;
use super::error::ApiResult;
use super::state::HttpState;

/// Banner payload in listing responses.
#[derive(Debug, Serialize)]
pub struct BannerData {
    /// Banner title.
    pub banner_name: String,
    /// Image URL.
    pub banner_image: String,
    /// Short description.
    pub description: String,
}

impl From<Banner> for BannerData {
    fn from(value: Banner) -> Self {
        Self {
            banner_name: value.name,
            banner_image: value.image,
            description: value.description,
        }
    }
}

/// Service payload in listing responses.
#[derive(Debug, Serialize)]
pub struct ServiceData {
    /// Unique catalogue code.
    pub service_code: String,
    /// Display name.
    pub service_name: String,
    /// Icon URL.
    pub service_icon: String,
    /// Fixed price debited on payment.
    #[serde(with = "rust_decimal::serde::float")]
    pub service_tariff: Decimal,
}

impl From<ServiceItem> for ServiceData {
    fn from(item: ServiceItem) -> Self {
        Self {
            service_code: item.code.into(),
            service_name: item.name,
            service_icon: item.icon,
            service_tariff: item.tariff,
        }
    }
}

/// List promotional banners. Public endpoint.
#[get("/banner")]
pub async fn banner(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    let banners = state.information.banners().await?;
    let data: Vec<BannerData> = banners.into_iter().map(BannerData::from).collect();
    Ok(envelope::success("success", data))
}

/// List payable services.
#[get("/services")]
pub async fn services(
    state: web::Data<HttpState>,
    _user: AuthenticatedUser,
) -> ApiResult<HttpResponse> {
    let services = state.information.services().await?;
    let data: Vec<ServiceData> = services.into_iter().map(ServiceData::from).collect();
    Ok(envelope::success("success", data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ledger::ServiceCode;
    use crate::domain::ports::{
        FixtureTokenService, MockBalanceCommand, MockBalanceQuery, MockInformationQuery,
        MockMembershipCommand, MockMembershipQuery, TokenService,
    };
    use crate::domain::user::{AuthenticatedIdentity, Email, UserId};
    use actix_web::http::StatusCode;
    use actix_web::http::header;
    use actix_web::{App, test};
    use serde_json::Value;
    use std::sync::Arc;

    fn state(information: MockInformationQuery) -> HttpState {
        HttpState {
            membership: Arc::new(MockMembershipCommand::new()),
            membership_query: Arc::new(MockMembershipQuery::new()),
            information: Arc::new(information),
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
            .service(banner)
            .service(services)
    }

    #[actix_web::test]
    async fn banner_is_public_and_lists_in_order() {
        let mut information = MockInformationQuery::new();
        information.expect_banners().returning(|| {
            Ok(vec![Banner {
                name: "Banner 1".to_owned(),
                image: "https://cdn.example.com/banner1.png".to_owned(),
                description: "First banner".to_owned(),
            }])
        });

        let app = test::init_service(test_app(state(information))).await;
        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/banner").to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["status"], 0);
        assert_eq!(body["data"][0]["banner_name"], "Banner 1");
    }

    #[actix_web::test]
    async fn services_requires_authentication() {
        let app = test::init_service(test_app(state(MockInformationQuery::new()))).await;
        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/services").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn services_renders_tariffs_as_numbers() {
        let mut information = MockInformationQuery::new();
        information.expect_services().returning(|| {
            Ok(vec![ServiceItem {
                code: ServiceCode::new("PULSA").expect("valid code"),
                name: "Pulsa".to_owned(),
                icon: "https://cdn.example.com/pulsa.png".to_owned(),
                tariff: Decimal::from(40_000),
            }])
        });

        let app = test::init_service(test_app(state(information))).await;
        let token = FixtureTokenService
            .issue(&AuthenticatedIdentity {
                user_id: UserId::random(),
                email: Email::new("ada@example.com").expect("valid email"),
            })
            .await
            .expect("issue fixture token")
            .token;
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/services")
                .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
                .to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["data"][0]["service_code"], "PULSA");
        assert_eq!(body["data"][0]["service_tariff"], 40000.0);
    }
}
