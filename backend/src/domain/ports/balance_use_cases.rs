//! Driving ports for the balance ledger use-cases.
//!
//! Inbound adapters depend on these traits instead of the concrete
//! [`BalanceService`](crate::domain::balance_service::BalanceService) so
//! handler tests can substitute mocks without wiring a store.

use async_trait::async_trait;
use pagination::{PageRequest, Paged};
use rust_decimal::Decimal;

use crate::domain::error::Error;
use crate::domain::ledger::{LedgerEntry, Receipt};
use crate::domain::user::UserId;

/// State-changing ledger operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BalanceCommand: Send + Sync {
    /// Credit the user's balance and append a `TOPUP` entry, returning the
    /// post-operation balance. The raw amount is validated here: it must be
    /// strictly positive.
    async fn top_up(&self, user_id: &UserId, amount: Decimal) -> Result<Decimal, Error>;

    /// Debit the tariff of the referenced service and append a `PAYMENT`
    /// entry, returning the receipt. The raw code is validated here: it
    /// must be non-empty.
    async fn pay(&self, user_id: &UserId, service_code: &str) -> Result<Receipt, Error>;
}

/// Read-only ledger operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BalanceQuery: Send + Sync {
    /// Current balance of the user.
    async fn balance(&self, user_id: &UserId) -> Result<Decimal, Error>;

    /// Windowed ledger history, newest first.
    async fn history(
        &self,
        user_id: &UserId,
        page: PageRequest,
    ) -> Result<Paged<LedgerEntry>, Error>;
}
