//! Domain types, services, and ports.
//!
//! Everything in this module is transport and store agnostic. Inbound
//! adapters call the driving ports in [`ports`]; outbound adapters
//! implement the driven ports. Invariants live on the types: amounts are
//! validated at construction, the ledger is append-only, and every balance
//! mutation runs inside an explicit store transaction.

pub mod balance_service;
pub mod error;
pub mod information_service;
pub mod invoice;
pub mod ledger;
pub mod membership_service;
pub mod ports;
pub mod user;

pub use self::balance_service::BalanceService;
pub use self::error::{Error, ErrorCode};
pub use self::information_service::InformationService;
pub use self::invoice::InvoiceNumber;
pub use self::ledger::{
    Banner, LedgerEntry, LedgerValidationError, NewLedgerEntry, Receipt, ServiceCode, ServiceItem,
    TopUpAmount, TransactionKind,
};
pub use self::membership_service::MembershipService;
pub use self::user::{
    AuthToken, AuthenticatedIdentity, Email, NewUser, Password, PersonName, Registration,
    StoredCredentials, UserId, UserProfile, UserValidationError,
};

/// Convenient result alias for domain operations.
pub type ApiResult<T> = Result<T, Error>;
