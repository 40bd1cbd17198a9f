//! Port for the balance ledger store.
//!
//! The row-lock-then-mutate protocol is an explicit contract here rather
//! than a detail buried in adapter queries: a ledger mutation opens a
//! [`LedgerTx`], locks the balance row, validates and mutates, appends the
//! ledger entry, and finishes with exactly one of [`LedgerTx::commit`] or
//! [`LedgerTx::rollback`]. Nothing staged inside the transaction is visible
//! to other callers before commit.
//!
//! # Locking semantics
//!
//! [`LedgerTx::lock_balance`] takes an exclusive lock on the user's balance
//! row (read-for-update). It blocks concurrent mutators of the *same* user
//! until the transaction finishes and never blocks other users or the
//! non-locking read paths [`LedgerStore::balance_of`] and
//! [`LedgerStore::history`]. Concurrent mutations of one user therefore
//! serialise in lock-acquisition order with no lost updates.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::domain::ledger::{LedgerEntry, NewLedgerEntry, ServiceCode, ServiceItem};
use crate::domain::user::UserId;
use pagination::PageRequest;

use super::macros::define_port_error;

define_port_error! {
    /// Errors raised by ledger store adapters.
    pub enum LedgerStoreError {
        /// Store connection could not be established or was lost.
        Connection { message: String } =>
            "ledger store connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "ledger store query failed: {message}",
        /// A unique constraint rejected the mutation (invoice collision).
        Conflict { message: String } =>
            "ledger store conflict: {message}",
    }
}

/// An open store transaction holding the locks it acquired.
///
/// Exactly one of [`commit`](Self::commit) or
/// [`rollback`](Self::rollback) must be called on every exit path; the
/// handle must not be used afterwards. Dropping an unfinished transaction
/// behaves like a rollback.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LedgerTx: Send {
    /// Lock the user's balance row for update and return the locked amount,
    /// or `None` when no balance row exists for the user.
    async fn lock_balance(&mut self, user_id: &UserId)
    -> Result<Option<Decimal>, LedgerStoreError>;

    /// Persist a new amount for the locked balance row.
    async fn store_balance(
        &mut self,
        user_id: &UserId,
        amount: Decimal,
    ) -> Result<(), LedgerStoreError>;

    /// Resolve a catalogue service inside the transaction.
    async fn find_service(
        &mut self,
        code: &ServiceCode,
    ) -> Result<Option<ServiceItem>, LedgerStoreError>;

    /// Append one immutable ledger entry and return it as stored.
    async fn append_entry(
        &mut self,
        entry: NewLedgerEntry,
    ) -> Result<LedgerEntry, LedgerStoreError>;

    /// Make every staged change visible atomically and release the locks.
    async fn commit(&mut self) -> Result<(), LedgerStoreError>;

    /// Discard every staged change and release the locks.
    async fn rollback(&mut self) -> Result<(), LedgerStoreError>;
}

/// Port for ledger persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Open a store transaction for a locked read-modify-write-append cycle.
    async fn begin(&self) -> Result<Box<dyn LedgerTx>, LedgerStoreError>;

    /// Non-locking read of the user's current balance.
    async fn balance_of(&self, user_id: &UserId) -> Result<Option<Decimal>, LedgerStoreError>;

    /// Non-locking windowed read of the user's ledger, newest first
    /// (`created_on` descending, insertion order breaking ties).
    async fn history(
        &self,
        user_id: &UserId,
        page: &PageRequest,
    ) -> Result<Vec<LedgerEntry>, LedgerStoreError>;
}

#[derive(Default)]
struct FixtureState {
    balances: HashMap<Uuid, Decimal>,
    entries: Vec<LedgerEntry>,
    next_entry_id: i64,
}

/// In-memory [`LedgerStore`] for tests.
///
/// Reproduces the store's concurrency contract without a database: a
/// per-user async mutex stands in for the balance row lock, and staged
/// changes only become visible on commit. Invoice uniqueness is *not*
/// enforced here; that backstop belongs to the real store's constraint.
#[derive(Clone, Default)]
pub struct FixtureLedgerStore {
    state: Arc<StdMutex<FixtureState>>,
    row_locks: Arc<StdMutex<HashMap<Uuid, Arc<AsyncMutex<()>>>>>,
    services: Arc<StdMutex<HashMap<String, ServiceItem>>>,
}

impl FixtureLedgerStore {
    /// Create an empty fixture store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a balance row for a user.
    #[must_use]
    pub fn with_balance(self, user_id: &UserId, amount: Decimal) -> Self {
        self.locked_state(|state| {
            state.balances.insert(*user_id.as_uuid(), amount);
        });
        self
    }

    /// Seed a catalogue service.
    #[must_use]
    pub fn with_service(self, service: ServiceItem) -> Self {
        {
            let mut services = self
                .services
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            services.insert(service.code.as_ref().to_owned(), service);
        }
        self
    }

    /// Number of committed ledger entries across all users.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.locked_state(|state| state.entries.len())
    }

    /// Committed entries for one user in insertion order.
    #[must_use]
    pub fn entries_for(&self, user_id: &UserId) -> Vec<LedgerEntry> {
        self.locked_state(|state| {
            state
                .entries
                .iter()
                .filter(|entry| entry.user_id == *user_id)
                .cloned()
                .collect()
        })
    }

    fn locked_state<R>(&self, f: impl FnOnce(&mut FixtureState) -> R) -> R {
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        f(&mut state)
    }

    fn row_lock(&self, user_id: &UserId) -> Arc<AsyncMutex<()>> {
        let mut locks = self
            .row_locks
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        locks
            .entry(*user_id.as_uuid())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }
}

#[async_trait]
impl LedgerStore for FixtureLedgerStore {
    async fn begin(&self) -> Result<Box<dyn LedgerTx>, LedgerStoreError> {
        Ok(Box::new(FixtureLedgerTx {
            store: self.clone(),
            guards: Vec::new(),
            staged_balances: HashMap::new(),
            staged_entries: Vec::new(),
            finished: false,
        }))
    }

    async fn balance_of(&self, user_id: &UserId) -> Result<Option<Decimal>, LedgerStoreError> {
        Ok(self.locked_state(|state| state.balances.get(user_id.as_uuid()).copied()))
    }

    async fn history(
        &self,
        user_id: &UserId,
        page: &PageRequest,
    ) -> Result<Vec<LedgerEntry>, LedgerStoreError> {
        let mut entries = self.entries_for(user_id);
        entries.sort_by(|a, b| {
            b.created_on
                .cmp(&a.created_on)
                .then_with(|| b.id.cmp(&a.id))
        });
        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let windowed: Vec<LedgerEntry> = match page.limit() {
            Some(limit) => {
                let limit = usize::try_from(limit).unwrap_or(usize::MAX);
                entries.into_iter().skip(offset).take(limit).collect()
            }
            None => entries.into_iter().skip(offset).collect(),
        };
        Ok(windowed)
    }
}

struct FixtureLedgerTx {
    store: FixtureLedgerStore,
    guards: Vec<OwnedMutexGuard<()>>,
    staged_balances: HashMap<Uuid, Decimal>,
    staged_entries: Vec<LedgerEntry>,
    finished: bool,
}

impl FixtureLedgerTx {
    fn ensure_open(&self) -> Result<(), LedgerStoreError> {
        if self.finished {
            return Err(LedgerStoreError::query("transaction already finished"));
        }
        Ok(())
    }
}

#[async_trait]
impl LedgerTx for FixtureLedgerTx {
    async fn lock_balance(
        &mut self,
        user_id: &UserId,
    ) -> Result<Option<Decimal>, LedgerStoreError> {
        self.ensure_open()?;
        let guard = self.store.row_lock(user_id).lock_owned().await;
        self.guards.push(guard);
        if let Some(staged) = self.staged_balances.get(user_id.as_uuid()) {
            return Ok(Some(*staged));
        }
        Ok(self
            .store
            .locked_state(|state| state.balances.get(user_id.as_uuid()).copied()))
    }

    async fn store_balance(
        &mut self,
        user_id: &UserId,
        amount: Decimal,
    ) -> Result<(), LedgerStoreError> {
        self.ensure_open()?;
        self.staged_balances.insert(*user_id.as_uuid(), amount);
        Ok(())
    }

    async fn find_service(
        &mut self,
        code: &ServiceCode,
    ) -> Result<Option<ServiceItem>, LedgerStoreError> {
        self.ensure_open()?;
        let services = self
            .store
            .services
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(services.get(code.as_ref()).cloned())
    }

    async fn append_entry(
        &mut self,
        entry: NewLedgerEntry,
    ) -> Result<LedgerEntry, LedgerStoreError> {
        self.ensure_open()?;
        // Sequence values survive rollback, as in the real store.
        let id = self.store.locked_state(|state| {
            state.next_entry_id += 1;
            state.next_entry_id
        });
        let stored = LedgerEntry {
            id,
            invoice_number: entry.invoice_number,
            user_id: entry.user_id,
            kind: entry.kind,
            service_code: entry.service_code,
            total_amount: entry.total_amount,
            description: entry.description,
            created_on: Utc::now(),
        };
        self.staged_entries.push(stored.clone());
        Ok(stored)
    }

    async fn commit(&mut self) -> Result<(), LedgerStoreError> {
        self.ensure_open()?;
        self.finished = true;
        let staged_balances = std::mem::take(&mut self.staged_balances);
        let staged_entries = std::mem::take(&mut self.staged_entries);
        self.store.locked_state(|state| {
            for (user, amount) in staged_balances {
                state.balances.insert(user, amount);
            }
            state.entries.extend(staged_entries);
        });
        self.guards.clear();
        Ok(())
    }

    async fn rollback(&mut self) -> Result<(), LedgerStoreError> {
        self.ensure_open()?;
        self.finished = true;
        self.staged_balances.clear();
        self.staged_entries.clear();
        self.guards.clear();
        Ok(())
    }
}
