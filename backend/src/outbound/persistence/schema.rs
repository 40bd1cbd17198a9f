//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are
//! used by Diesel for compile-time query validation and type-safe SQL
//! generation. When migrations change the schema, regenerate with
//! `diesel print-schema` or update by hand.

diesel::table! {
    /// Registered user accounts, owned by the membership subsystem.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Unique login email.
        email -> Varchar,
        /// Argon2 credential hash.
        password_hash -> Varchar,
        /// First name.
        first_name -> Varchar,
        /// Last name.
        last_name -> Varchar,
        /// Public URL of the uploaded profile image, if any.
        profile_image -> Nullable<Varchar>,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// One spendable balance per user, mutated only under a row lock.
    balances (user_id) {
        /// Owning user; exactly one row per user.
        user_id -> Uuid,
        /// Current amount; never negative.
        amount -> Numeric,
    }
}

diesel::table! {
    /// Append-only ledger of balance-affecting operations.
    transactions (id) {
        /// Surrogate key; tie-break for equal `created_on` values.
        id -> Int8,
        /// Unique human-readable invoice reference.
        invoice_number -> Varchar,
        /// Owning user.
        user_id -> Uuid,
        /// `TOPUP` or `PAYMENT`.
        transaction_type -> Varchar,
        /// Catalogue code for payments, NULL for top-ups.
        service_code -> Nullable<Varchar>,
        /// Positive amount moved by the operation.
        total_amount -> Numeric,
        /// Human-readable description.
        description -> Varchar,
        /// Server timestamp assigned at insert.
        created_on -> Timestamptz,
    }
}

diesel::table! {
    /// Read-mostly catalogue of payable services, seeded by migration.
    services (id) {
        /// Surrogate key preserving seed order.
        id -> Int4,
        /// Unique catalogue code.
        service_code -> Varchar,
        /// Display name, used as the payment description.
        service_name -> Varchar,
        /// Icon URL.
        service_icon -> Varchar,
        /// Fixed price debited on payment.
        service_tariff -> Numeric,
    }
}

diesel::table! {
    /// Promotional banners, seeded by migration.
    banners (id) {
        /// Surrogate key preserving seed order.
        id -> Int4,
        /// Banner title.
        banner_name -> Varchar,
        /// Image URL.
        banner_image -> Varchar,
        /// Short description.
        description -> Varchar,
    }
}

diesel::joinable!(balances -> users (user_id));
diesel::joinable!(transactions -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(users, balances, transactions, services, banners);
