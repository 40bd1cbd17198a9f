//! Balance ledger domain service.
//!
//! Orchestrates the atomic sequence behind every balance mutation:
//! open a store transaction, lock the balance row, validate, mutate the
//! balance, append the ledger entry, commit. Any failure after the lock
//! rolls the whole transaction back, so a debit and its ledger entry are
//! never observed independently.

use std::sync::Arc;

use async_trait::async_trait;
use pagination::{PageRequest, Paged};
use rust_decimal::Decimal;
use tracing::warn;

use crate::domain::error::Error;
use crate::domain::invoice::InvoiceNumber;
use crate::domain::ledger::{
    LedgerEntry, NewLedgerEntry, Receipt, ServiceCode, TopUpAmount, TransactionKind,
};
use crate::domain::ports::{
    BalanceCommand, BalanceQuery, LedgerStore, LedgerStoreError, LedgerTx,
};
use crate::domain::user::UserId;

/// Description recorded on every top-up ledger entry.
const TOP_UP_DESCRIPTION: &str = "Top Up balance";

/// Domain service implementing the balance ledger use-cases.
#[derive(Clone)]
pub struct BalanceService<S> {
    store: Arc<S>,
}

impl<S> BalanceService<S> {
    /// Create a new service over the given ledger store.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

impl<S> BalanceService<S>
where
    S: LedgerStore,
{
    fn map_store_error(error: LedgerStoreError) -> Error {
        match error {
            LedgerStoreError::Connection { message } => {
                warn!(%message, "ledger store unreachable");
                Error::service_unavailable("ledger store unavailable")
            }
            LedgerStoreError::Query { message } => {
                warn!(%message, "ledger store operation failed");
                Error::operation_failed("balance operation failed")
            }
            LedgerStoreError::Conflict { message } => {
                // Invoice collision: rolled back, retryable by the caller.
                warn!(%message, "ledger store conflict");
                Error::operation_failed("balance operation failed")
            }
        }
    }

    /// Commit on success, roll back on failure. Exactly one of the two
    /// runs on every path out of a mutation.
    async fn finish<T>(mut tx: Box<dyn LedgerTx>, outcome: Result<T, Error>) -> Result<T, Error> {
        match outcome {
            Ok(value) => {
                tx.commit().await.map_err(Self::map_store_error)?;
                Ok(value)
            }
            Err(error) => {
                if let Err(rollback_error) = tx.rollback().await {
                    warn!(
                        error = %rollback_error,
                        "rollback after failed ledger operation also failed"
                    );
                }
                Err(error)
            }
        }
    }

    async fn run_top_up(
        tx: &mut dyn LedgerTx,
        user_id: &UserId,
        amount: TopUpAmount,
    ) -> Result<Decimal, Error> {
        let locked = tx
            .lock_balance(user_id)
            .await
            .map_err(Self::map_store_error)?;
        let current = locked.ok_or_else(|| Error::not_found("balance not found"))?;

        let new_balance = current + amount.value();
        tx.store_balance(user_id, new_balance)
            .await
            .map_err(Self::map_store_error)?;

        tx.append_entry(NewLedgerEntry {
            user_id: *user_id,
            invoice_number: InvoiceNumber::generate(),
            kind: TransactionKind::Topup,
            service_code: None,
            total_amount: amount.value(),
            description: TOP_UP_DESCRIPTION.to_owned(),
        })
        .await
        .map_err(Self::map_store_error)?;

        Ok(new_balance)
    }

    async fn run_pay(
        tx: &mut dyn LedgerTx,
        user_id: &UserId,
        code: &ServiceCode,
    ) -> Result<Receipt, Error> {
        // Lock before the catalogue lookup so the tariff comparison reads
        // a balance no concurrent mutator can move underneath it.
        let locked = tx
            .lock_balance(user_id)
            .await
            .map_err(Self::map_store_error)?;
        let current = locked.ok_or_else(|| Error::not_found("balance not found"))?;

        let service = tx
            .find_service(code)
            .await
            .map_err(Self::map_store_error)?
            .ok_or_else(|| Error::service_not_found("service not found"))?;

        if current < service.tariff {
            return Err(Error::insufficient_funds("balance is not sufficient"));
        }

        let new_balance = current - service.tariff;
        tx.store_balance(user_id, new_balance)
            .await
            .map_err(Self::map_store_error)?;

        let entry = tx
            .append_entry(NewLedgerEntry {
                user_id: *user_id,
                invoice_number: InvoiceNumber::generate(),
                kind: TransactionKind::Payment,
                service_code: Some(service.code.clone()),
                total_amount: service.tariff,
                description: service.name.clone(),
            })
            .await
            .map_err(Self::map_store_error)?;

        Ok(Receipt {
            invoice_number: entry.invoice_number,
            service_code: service.code,
            service_name: service.name,
            kind: TransactionKind::Payment,
            total_amount: entry.total_amount,
            created_on: entry.created_on,
        })
    }
}

#[async_trait]
impl<S> BalanceCommand for BalanceService<S>
where
    S: LedgerStore,
{
    async fn top_up(&self, user_id: &UserId, amount: Decimal) -> Result<Decimal, Error> {
        // Precondition check happens before any store interaction.
        let amount = TopUpAmount::new(amount)
            .map_err(|err| Error::invalid_request(err.to_string()))?;

        let mut tx = self.store.begin().await.map_err(Self::map_store_error)?;
        let outcome = Self::run_top_up(tx.as_mut(), user_id, amount).await;
        Self::finish(tx, outcome).await
    }

    async fn pay(&self, user_id: &UserId, service_code: &str) -> Result<Receipt, Error> {
        let code = ServiceCode::new(service_code)
            .map_err(|err| Error::invalid_request(err.to_string()))?;

        let mut tx = self.store.begin().await.map_err(Self::map_store_error)?;
        let outcome = Self::run_pay(tx.as_mut(), user_id, &code).await;
        Self::finish(tx, outcome).await
    }
}

#[async_trait]
impl<S> BalanceQuery for BalanceService<S>
where
    S: LedgerStore,
{
    async fn balance(&self, user_id: &UserId) -> Result<Decimal, Error> {
        self.store
            .balance_of(user_id)
            .await
            .map_err(Self::map_store_error)?
            .ok_or_else(|| Error::not_found("balance not found"))
    }

    async fn history(
        &self,
        user_id: &UserId,
        page: PageRequest,
    ) -> Result<Paged<LedgerEntry>, Error> {
        let records = self
            .store
            .history(user_id, &page)
            .await
            .map_err(Self::map_store_error)?;
        Ok(Paged::new(&page, records))
    }
}
