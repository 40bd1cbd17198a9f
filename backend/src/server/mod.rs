//! Server assembly: adapter wiring and the Actix application factory.

pub mod config;

use std::path::PathBuf;
use std::sync::Arc;

use actix_files::Files;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};

use crate::domain::{BalanceService, InformationService, MembershipService};
use crate::inbound::http::{self, HttpState, health, information, membership, transaction};
use crate::middleware::Trace;
use crate::outbound::auth::{Argon2PasswordHasher, JwtTokenService};
use crate::outbound::media::FsImageStore;
use crate::outbound::persistence::{
    DbPool, DieselCatalogueRepository, DieselLedgerStore, DieselUserRepository,
};

pub use config::{AppConfig, ConfigError};

/// Wire the production adapters and services into an [`HttpState`].
#[must_use]
pub fn build_state(pool: &DbPool, config: &AppConfig) -> HttpState {
    let ledger = Arc::new(DieselLedgerStore::new(pool.clone()));
    let users = Arc::new(DieselUserRepository::new(pool.clone()));
    let catalogue = Arc::new(DieselCatalogueRepository::new(pool.clone()));
    let tokens = Arc::new(JwtTokenService::with_default_ttl(&config.jwt_secret));
    let hasher = Arc::new(Argon2PasswordHasher);
    let images = Arc::new(FsImageStore::new(
        config.upload_dir.clone(),
        config.app_url.clone(),
    ));

    let balance = Arc::new(BalanceService::new(ledger));
    let membership = Arc::new(MembershipService::new(
        users,
        hasher,
        tokens.clone(),
        images,
    ));
    let information = Arc::new(InformationService::new(catalogue));

    HttpState {
        membership: membership.clone(),
        membership_query: membership,
        information,
        balance: balance.clone(),
        balance_query: balance,
        tokens,
    }
}

/// Build the Actix application serving the full API surface.
pub fn build_app(
    state: HttpState,
    health_state: web::Data<health::HealthState>,
    upload_dir: PathBuf,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .app_data(health_state)
        .app_data(http::json_config())
        .app_data(http::query_config())
        .wrap(Trace)
        .service(membership::registration)
        .service(membership::login)
        .service(membership::profile)
        .service(membership::update_profile)
        .service(membership::update_profile_image)
        .service(information::banner)
        .service(information::services)
        .service(transaction::balance)
        .service(transaction::topup)
        .service(transaction::transaction)
        .service(transaction::history)
        .service(health::ready)
        .service(health::live)
        .service(Files::new("/uploads", upload_dir))
}
