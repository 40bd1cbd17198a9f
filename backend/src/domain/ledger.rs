//! Ledger and catalogue domain types.
//!
//! The ledger is append-only: a [`LedgerEntry`] is never updated or deleted
//! once written, and every successful balance mutation produces exactly one
//! entry. Amounts are exact decimals end to end.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::invoice::InvoiceNumber;
use super::user::UserId;

/// Validation errors raised by the ledger newtypes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerValidationError {
    /// Top-up amount was zero or negative.
    NonPositiveAmount,
    /// Service code was empty once trimmed.
    EmptyServiceCode,
}

impl fmt::Display for LedgerValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveAmount => {
                write!(f, "amount must be a number greater than zero")
            }
            Self::EmptyServiceCode => write!(f, "service code must not be empty"),
        }
    }
}

impl std::error::Error for LedgerValidationError {}

/// Kind of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    /// Balance credit from a top-up.
    Topup,
    /// Balance debit paying for a catalogue service.
    Payment,
}

impl TransactionKind {
    /// Stable wire/storage label for the kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Topup => "TOPUP",
            Self::Payment => "PAYMENT",
        }
    }

    /// Parse the stable label back into a kind.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "TOPUP" => Some(Self::Topup),
            "PAYMENT" => Some(Self::Payment),
            _ => None,
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A strictly positive top-up amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopUpAmount(Decimal);

impl TopUpAmount {
    /// Validate and construct a [`TopUpAmount`].
    pub fn new(amount: Decimal) -> Result<Self, LedgerValidationError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerValidationError::NonPositiveAmount);
        }
        Ok(Self(amount))
    }

    /// The validated amount.
    #[must_use]
    pub const fn value(&self) -> Decimal {
        self.0
    }
}

/// Non-empty catalogue service code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ServiceCode(String);

impl ServiceCode {
    /// Validate and construct a [`ServiceCode`], trimming whitespace.
    pub fn new(code: impl Into<String>) -> Result<Self, LedgerValidationError> {
        let code = code.into().trim().to_owned();
        if code.is_empty() {
            return Err(LedgerValidationError::EmptyServiceCode);
        }
        Ok(Self(code))
    }
}

impl AsRef<str> for ServiceCode {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ServiceCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<ServiceCode> for String {
    fn from(value: ServiceCode) -> Self {
        value.0
    }
}

impl TryFrom<String> for ServiceCode {
    type Error = LedgerValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// One payable entry in the service catalogue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceItem {
    /// Unique catalogue code.
    pub code: ServiceCode,
    /// Display name, also used as the payment description.
    pub name: String,
    /// Icon URL shown by clients.
    pub icon: String,
    /// Fixed price debited on payment.
    pub tariff: Decimal,
}

/// Promotional banner shown on the landing surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    /// Banner title.
    pub name: String,
    /// Image URL.
    pub image: String,
    /// Short description.
    pub description: String,
}

/// A ledger entry prepared for appending.
#[derive(Debug, Clone)]
pub struct NewLedgerEntry {
    /// Owning user.
    pub user_id: UserId,
    /// Pre-generated invoice reference.
    pub invoice_number: InvoiceNumber,
    /// Entry kind.
    pub kind: TransactionKind,
    /// Catalogue code for payments, absent for top-ups.
    pub service_code: Option<ServiceCode>,
    /// Positive amount moved by the operation.
    pub total_amount: Decimal,
    /// Human-readable description.
    pub description: String,
}

/// A ledger entry as stored, immutable once written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    /// Surrogate key; also the deterministic tie-break for equal timestamps.
    pub id: i64,
    /// Unique invoice reference.
    pub invoice_number: InvoiceNumber,
    /// Owning user.
    pub user_id: UserId,
    /// Entry kind.
    pub kind: TransactionKind,
    /// Catalogue code for payments.
    pub service_code: Option<ServiceCode>,
    /// Amount moved by the operation.
    pub total_amount: Decimal,
    /// Description as recorded at append time.
    pub description: String,
    /// Server timestamp assigned at insert.
    pub created_on: DateTime<Utc>,
}

/// Receipt returned by a successful payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    /// Unique invoice reference.
    pub invoice_number: InvoiceNumber,
    /// Paid service code.
    pub service_code: ServiceCode,
    /// Paid service name.
    pub service_name: String,
    /// Always [`TransactionKind::Payment`].
    pub kind: TransactionKind,
    /// Debited amount (the service tariff).
    pub total_amount: Decimal,
    /// Server timestamp of the ledger entry.
    pub created_on: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("0", false)]
    #[case("-1", false)]
    #[case("0.01", true)]
    #[case("50000", true)]
    fn top_up_amount_must_be_positive(#[case] raw: &str, #[case] ok: bool) {
        let amount: Decimal = raw.parse().expect("valid decimal literal");
        assert_eq!(TopUpAmount::new(amount).is_ok(), ok, "amount: {raw}");
    }

    #[rstest]
    fn service_code_rejects_blank_input() {
        assert_eq!(
            ServiceCode::new("   "),
            Err(LedgerValidationError::EmptyServiceCode)
        );
    }

    #[rstest]
    fn service_code_trims_whitespace() {
        let code = ServiceCode::new(" PULSA ").expect("valid code");
        assert_eq!(code.as_ref(), "PULSA");
    }

    #[rstest]
    #[case(TransactionKind::Topup, "TOPUP")]
    #[case(TransactionKind::Payment, "PAYMENT")]
    fn kind_labels_round_trip(#[case] kind: TransactionKind, #[case] label: &str) {
        assert_eq!(kind.as_str(), label);
        assert_eq!(TransactionKind::from_label(label), Some(kind));
    }

    #[rstest]
    fn unknown_kind_label_is_rejected() {
        assert_eq!(TransactionKind::from_label("REFUND"), None);
    }
}
