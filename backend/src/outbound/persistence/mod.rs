//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the domain's driven store ports, backed by
//! PostgreSQL via `diesel-async` with `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: repositories only translate between Diesel rows
//!   and domain types. No business logic resides here; in particular the
//!   ledger protocol ordering lives in the domain service, while this
//!   layer supplies real transactions and the `FOR UPDATE` row lock.
//! - **Internal models**: row structs (`models.rs`) and schema definitions
//!   (`schema.rs`) never leak to the domain.
//! - **Strongly typed errors**: database failures map to the port error
//!   enums with stable, generic messages; diagnostics go to the log.

mod diesel_catalogue_repository;
mod diesel_ledger_store;
mod diesel_user_repository;
mod models;
mod pool;
mod schema;

use diesel_migrations::{EmbeddedMigrations, embed_migrations};

pub use diesel_catalogue_repository::DieselCatalogueRepository;
pub use diesel_ledger_store::DieselLedgerStore;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, OwnedPooledConnection, PoolConfig, PoolError};

/// SQL migrations compiled into the binary and applied at startup.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();
