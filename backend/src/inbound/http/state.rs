//! Shared HTTP adapter state.
//!
//! Handlers receive this bundle via `actix_web::web::Data`, so they only
//! depend on domain ports and stay testable with mocks instead of wired
//! adapters.

use std::sync::Arc;

use crate::domain::ports::{
    BalanceCommand, BalanceQuery, InformationQuery, MembershipCommand, MembershipQuery,
    TokenService,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Registration, login, and profile mutations.
    pub membership: Arc<dyn MembershipCommand>,
    /// Profile reads.
    pub membership_query: Arc<dyn MembershipQuery>,
    /// Banner and service catalogue listings.
    pub information: Arc<dyn InformationQuery>,
    /// Ledger mutations (top-up, payment).
    pub balance: Arc<dyn BalanceCommand>,
    /// Ledger reads (balance, history).
    pub balance_query: Arc<dyn BalanceQuery>,
    /// Bearer token verification for the authentication extractor.
    pub tokens: Arc<dyn TokenService>,
}
