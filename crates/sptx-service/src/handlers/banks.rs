//! Bank account resolution handler.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::required;
use crate::error::ApiError;
use crate::extract::ApiQuery;
use crate::paystack::bank_code;
use crate::state::AppState;

/// Query for `GET /verify`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveAccountQuery {
    /// Ten-digit NUBAN account number.
    pub account_number: Option<String>,
    /// Bank display name.
    pub bank_name: Option<String>,
}

/// Resolved account.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveAccountResponse {
    /// Always `true`.
    pub success: bool,
    /// The account number.
    pub account_number: String,
    /// Account holder name.
    pub account_name: String,
    /// Bank name as given.
    pub bank_name: String,
    /// Bank code used for the lookup.
    pub bank_code: &'static str,
}

/// Resolve a bank account to its holder's name.
///
/// GET /verify?accountNumber=&bankName=
pub async fn resolve_account(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<ResolveAccountQuery>,
) -> Result<Json<ResolveAccountResponse>, ApiError> {
    let account_number = required(query.account_number, "accountNumber")?;
    if account_number.len() != 10 || !account_number.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ApiError::BadRequest(
            "accountNumber must be exactly 10 digits".into(),
        ));
    }

    let bank_name = required(query.bank_name, "bankName")?;
    let code = bank_code(&bank_name)
        .ok_or_else(|| ApiError::BadRequest(format!("Unsupported bank: {bank_name}")))?;

    let paystack = state
        .paystack
        .as_ref()
        .ok_or(ApiError::Configuration("Paystack"))?;

    let account = paystack
        .resolve_account(&account_number, code)
        .await
        .map_err(|e| ApiError::external("paystack", e))?;

    tracing::info!(bank_code = %code, "Bank account resolved");

    Ok(Json(ResolveAccountResponse {
        success: true,
        account_number: account.account_number,
        account_name: account.account_name,
        bank_name,
        bank_code: code,
    }))
}
