//! PostgreSQL-backed `LedgerStore` implementation using Diesel ORM.
//!
//! This adapter gives the ledger port its concurrency teeth: `begin`
//! checks out a pool-owned connection and opens a real store transaction,
//! `lock_balance` issues `SELECT ... FOR UPDATE` on the user's balance
//! row, and `commit`/`rollback` drive the transaction manager explicitly.
//! Everything staged between begin and commit is invisible to concurrent
//! readers, and the row lock serialises concurrent mutators of one user.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::{AnsiTransactionManager, RunQueryDsl, TransactionManager};
use rust_decimal::Decimal;
use tracing::debug;

use crate::domain::ledger::{LedgerEntry, NewLedgerEntry, ServiceCode, ServiceItem, TransactionKind};
use crate::domain::ports::{LedgerStore, LedgerStoreError, LedgerTx};
use crate::domain::user::UserId;
use crate::domain::InvoiceNumber;
use pagination::PageRequest;

use super::models::{NewTransactionRow, ServiceRow, TransactionRow};
use super::pool::{DbPool, OwnedPooledConnection, PoolError};
use super::schema::{balances, services, transactions};

/// Diesel-backed implementation of the [`LedgerStore`] port.
#[derive(Clone)]
pub struct DieselLedgerStore {
    pool: DbPool,
}

impl DieselLedgerStore {
    /// Create a new store with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Map pool errors to domain ledger store errors.
fn map_pool_error(error: PoolError) -> LedgerStoreError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            LedgerStoreError::connection(message)
        }
    }
}

/// Map Diesel errors to domain ledger store errors.
fn map_diesel_error(error: diesel::result::Error) -> LedgerStoreError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            LedgerStoreError::conflict("unique constraint violation")
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            LedgerStoreError::connection("database connection error")
        }
        _ => LedgerStoreError::query("database error"),
    }
}

/// Convert a stored row to a domain ledger entry.
fn row_to_entry(row: TransactionRow) -> Result<LedgerEntry, LedgerStoreError> {
    let kind = TransactionKind::from_label(&row.transaction_type).ok_or_else(|| {
        LedgerStoreError::query(format!(
            "unrecognised transaction type: {}",
            row.transaction_type
        ))
    })?;
    let service_code = row
        .service_code
        .map(ServiceCode::new)
        .transpose()
        .map_err(|err| LedgerStoreError::query(err.to_string()))?;

    Ok(LedgerEntry {
        id: row.id,
        invoice_number: InvoiceNumber::from_stored(row.invoice_number),
        user_id: UserId::from(row.user_id),
        kind,
        service_code,
        total_amount: row.total_amount,
        description: row.description,
        created_on: row.created_on,
    })
}

/// Convert a stored row to a domain catalogue service.
fn row_to_service(row: ServiceRow) -> Result<ServiceItem, LedgerStoreError> {
    let code = ServiceCode::new(row.service_code)
        .map_err(|err| LedgerStoreError::query(err.to_string()))?;
    Ok(ServiceItem {
        code,
        name: row.service_name,
        icon: row.service_icon,
        tariff: row.service_tariff,
    })
}

#[async_trait]
impl LedgerStore for DieselLedgerStore {
    async fn begin(&self) -> Result<Box<dyn LedgerTx>, LedgerStoreError> {
        let mut conn = self.pool.get_owned().await.map_err(map_pool_error)?;
        AnsiTransactionManager::begin_transaction(&mut *conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(Box::new(DieselLedgerTx {
            conn,
            finished: false,
        }))
    }

    async fn balance_of(&self, user_id: &UserId) -> Result<Option<Decimal>, LedgerStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        balances::table
            .filter(balances::user_id.eq(user_id.as_uuid()))
            .select(balances::amount)
            .first::<Decimal>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)
    }

    async fn history(
        &self,
        user_id: &UserId,
        page: &PageRequest,
    ) -> Result<Vec<LedgerEntry>, LedgerStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut query = transactions::table
            .filter(transactions::user_id.eq(user_id.as_uuid()))
            .select(TransactionRow::as_select())
            .order((transactions::created_on.desc(), transactions::id.desc()))
            .offset(page.offset())
            .into_boxed();
        if let Some(limit) = page.limit() {
            query = query.limit(limit);
        }

        let rows: Vec<TransactionRow> =
            query.load(&mut conn).await.map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_entry).collect()
    }
}

/// An open PostgreSQL transaction holding its pooled connection.
struct DieselLedgerTx {
    conn: OwnedPooledConnection,
    finished: bool,
}

impl DieselLedgerTx {
    fn ensure_open(&self) -> Result<(), LedgerStoreError> {
        if self.finished {
            return Err(LedgerStoreError::query("transaction already finished"));
        }
        Ok(())
    }
}

#[async_trait]
impl LedgerTx for DieselLedgerTx {
    async fn lock_balance(
        &mut self,
        user_id: &UserId,
    ) -> Result<Option<Decimal>, LedgerStoreError> {
        self.ensure_open()?;
        balances::table
            .filter(balances::user_id.eq(user_id.as_uuid()))
            .select(balances::amount)
            .for_update()
            .first::<Decimal>(&mut *self.conn)
            .await
            .optional()
            .map_err(map_diesel_error)
    }

    async fn store_balance(
        &mut self,
        user_id: &UserId,
        amount: Decimal,
    ) -> Result<(), LedgerStoreError> {
        self.ensure_open()?;
        diesel::update(balances::table.filter(balances::user_id.eq(user_id.as_uuid())))
            .set(balances::amount.eq(amount))
            .execute(&mut *self.conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_service(
        &mut self,
        code: &ServiceCode,
    ) -> Result<Option<ServiceItem>, LedgerStoreError> {
        self.ensure_open()?;
        let row: Option<ServiceRow> = services::table
            .filter(services::service_code.eq(code.as_ref()))
            .select(ServiceRow::as_select())
            .first(&mut *self.conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_service).transpose()
    }

    async fn append_entry(
        &mut self,
        entry: NewLedgerEntry,
    ) -> Result<LedgerEntry, LedgerStoreError> {
        self.ensure_open()?;
        let new_row = NewTransactionRow {
            invoice_number: entry.invoice_number.as_ref(),
            user_id: *entry.user_id.as_uuid(),
            transaction_type: entry.kind.as_str(),
            service_code: entry.service_code.as_ref().map(AsRef::as_ref),
            total_amount: entry.total_amount,
            description: &entry.description,
        };

        let stored: TransactionRow = diesel::insert_into(transactions::table)
            .values(&new_row)
            .returning(TransactionRow::as_returning())
            .get_result(&mut *self.conn)
            .await
            .map_err(map_diesel_error)?;

        row_to_entry(stored)
    }

    async fn commit(&mut self) -> Result<(), LedgerStoreError> {
        self.ensure_open()?;
        self.finished = true;
        AnsiTransactionManager::commit_transaction(&mut *self.conn)
            .await
            .map_err(map_diesel_error)
    }

    async fn rollback(&mut self) -> Result<(), LedgerStoreError> {
        self.ensure_open()?;
        self.finished = true;
        AnsiTransactionManager::rollback_transaction(&mut *self.conn)
            .await
            .map_err(map_diesel_error)
    }
}
