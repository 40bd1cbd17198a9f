//! Ledger API handlers.
//!
//! ```text
//! GET  /balance
//! POST /topup        {"top_up_amount": 50000}
//! POST /transaction  {"service_code": "PULSA"}
//! GET  /transaction/history?offset=0&limit=3
//! ```

use actix_web::{HttpResponse, get, post, web};
use chrono::{DateTime, Utc};
use pagination::{PageRequest, Paged};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde::Serialize;

use crate::domain::ledger::{LedgerEntry, Receipt};
use crate::domain::Error;

use super::auth::AuthenticatedUser;
use super::envelope;
use super::error::ApiResult;
use super::state::HttpState;

/// Balance payload.
#[derive(Debug, Serialize)]
pub struct BalanceData {
    /// Current spendable amount.
    #[serde(with = "rust_decimal::serde::float")]
    pub balance: Decimal,
}

/// Read the authenticated user's balance.
#[get("/balance")]
pub async fn balance(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
) -> ApiResult<HttpResponse> {
    let amount = state.balance_query.balance(&user.0.user_id).await?;
    Ok(envelope::success(
        "balance retrieved",
        BalanceData { balance: amount },
    ))
}

/// Top-up request body.
#[derive(Debug, Deserialize)]
pub struct TopUpRequest {
    /// Amount to credit; must be a number greater than zero.
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub top_up_amount: Option<Decimal>,
}

/// Credit the authenticated user's balance.
#[post("/topup")]
pub async fn topup(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    payload: web::Json<TopUpRequest>,
) -> ApiResult<HttpResponse> {
    let amount = payload.into_inner().top_up_amount.ok_or_else(|| {
        Error::invalid_request("amount must be a number greater than zero")
    })?;

    let new_balance = state.balance.top_up(&user.0.user_id, amount).await?;
    Ok(envelope::success(
        "top up successful",
        BalanceData {
            balance: new_balance,
        },
    ))
}

/// Payment request body.
#[derive(Debug, Deserialize)]
pub struct PaymentRequest {
    /// Catalogue code of the service to pay for.
    pub service_code: Option<String>,
}

/// Receipt payload returned by a successful payment.
#[derive(Debug, Serialize)]
pub struct ReceiptData {
    /// Unique invoice reference.
    pub invoice_number: String,
    /// Paid service code.
    pub service_code: String,
    /// Paid service name.
    pub service_name: String,
    /// Always `PAYMENT`.
    pub transaction_type: String,
    /// Debited amount.
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    /// Ledger timestamp.
    pub created_on: DateTime<Utc>,
}

impl From<Receipt> for ReceiptData {
    fn from(receipt: Receipt) -> Self {
        Self {
            invoice_number: receipt.invoice_number.into(),
            service_code: receipt.service_code.into(),
            service_name: receipt.service_name,
            transaction_type: receipt.kind.as_str().to_owned(),
            total_amount: receipt.total_amount,
            created_on: receipt.created_on,
        }
    }
}

/// Pay for a catalogue service from the balance.
#[post("/transaction")]
pub async fn transaction(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    payload: web::Json<PaymentRequest>,
) -> ApiResult<HttpResponse> {
    let service_code = payload.into_inner().service_code.unwrap_or_default();
    let receipt = state.balance.pay(&user.0.user_id, &service_code).await?;
    Ok(envelope::success(
        "payment successful",
        ReceiptData::from(receipt),
    ))
}

/// History window query parameters.
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    /// Records to skip; defaults to 0.
    pub offset: Option<i64>,
    /// Window size; omitted means the full remaining set.
    pub limit: Option<i64>,
}

/// One record in the history listing.
#[derive(Debug, Serialize)]
pub struct HistoryRecord {
    /// Unique invoice reference.
    pub invoice_number: String,
    /// `TOPUP` or `PAYMENT`.
    pub transaction_type: String,
    /// Description as recorded at append time.
    pub description: String,
    /// Amount moved by the operation.
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    /// Ledger timestamp.
    pub created_on: DateTime<Utc>,
}

impl From<LedgerEntry> for HistoryRecord {
    fn from(entry: LedgerEntry) -> Self {
        Self {
            invoice_number: entry.invoice_number.into(),
            transaction_type: entry.kind.as_str().to_owned(),
            description: entry.description,
            total_amount: entry.total_amount,
            created_on: entry.created_on,
        }
    }
}

/// History payload: the echoed window plus its records.
#[derive(Debug, Serialize)]
pub struct HistoryData {
    /// Offset the window was read at.
    pub offset: i64,
    /// Effective limit.
    pub limit: i64,
    /// Records, newest first.
    pub records: Vec<HistoryRecord>,
}

impl From<Paged<LedgerEntry>> for HistoryData {
    fn from(page: Paged<LedgerEntry>) -> Self {
        Self {
            offset: page.offset,
            limit: page.limit,
            records: page.records.into_iter().map(HistoryRecord::from).collect(),
        }
    }
}

/// Read the authenticated user's ledger history, newest first.
#[get("/transaction/history")]
pub async fn history(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    query: web::Query<HistoryQuery>,
) -> ApiResult<HttpResponse> {
    let window = query.into_inner();
    let page = PageRequest::new(window.offset.unwrap_or(0), window.limit)
        .map_err(|err| Error::invalid_request(err.to_string()))?;

    let page = state.balance_query.history(&user.0.user_id, page).await?;
    Ok(envelope::success(
        "history retrieved",
        HistoryData::from(page),
    ))
}
