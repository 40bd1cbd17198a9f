//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::schema::{balances, banners, services, transactions, users};

/// Row struct for reading login credentials from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CredentialsRow {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
}

/// Row struct for reading profile fields from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ProfileRow {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub profile_image: Option<String>,
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
}

/// Insertable struct for the zero balance row created at registration.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = balances)]
pub(crate) struct NewBalanceRow {
    pub user_id: Uuid,
    pub amount: Decimal,
}

/// Row struct for reading from the transactions table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = transactions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TransactionRow {
    pub id: i64,
    pub invoice_number: String,
    pub user_id: Uuid,
    pub transaction_type: String,
    pub service_code: Option<String>,
    pub total_amount: Decimal,
    pub description: String,
    pub created_on: DateTime<Utc>,
}

/// Insertable struct for appending ledger entries. `created_on` is
/// assigned by the database default.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = transactions)]
pub(crate) struct NewTransactionRow<'a> {
    pub invoice_number: &'a str,
    pub user_id: Uuid,
    pub transaction_type: &'a str,
    pub service_code: Option<&'a str>,
    pub total_amount: Decimal,
    pub description: &'a str,
}

/// Row struct for reading from the services table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = services)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ServiceRow {
    pub service_code: String,
    pub service_name: String,
    pub service_icon: String,
    pub service_tariff: Decimal,
}

/// Row struct for reading from the banners table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = banners)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct BannerRow {
    pub banner_name: String,
    pub banner_image: String,
    pub description: String,
}
