//! Payment handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use sptx_core::{
    PaymentDetails, Reference, ReferenceKind, ReferenceRecord, ReferenceStatus, TicketId,
    TicketSnapshot, TICKET_PURCHASE,
};

use super::required;
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiQuery};
use crate::state::AppState;

/// Request to initialize a charge.
#[derive(Debug, Deserialize)]
pub struct InitializePaymentRequest {
    /// Amount in kobo.
    pub amount: Option<i64>,
    /// Payer email.
    pub email: Option<String>,
    /// Booking metadata; a ticket snapshot when it carries `userId` and `eventId`.
    pub metadata: Option<Value>,
}

/// Response for an initialized charge.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializePaymentResponse {
    /// Always `true`.
    pub success: bool,
    /// Hosted checkout URL.
    pub authorization_url: String,
    /// Access code for inline checkout.
    pub access_code: String,
    /// The charge reference.
    pub reference: String,
}

/// Initialize a charge.
///
/// POST /payment
pub async fn initialize_payment(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<InitializePaymentRequest>,
) -> Result<Json<InitializePaymentResponse>, ApiError> {
    let amount = request
        .amount
        .ok_or_else(|| ApiError::BadRequest("amount is required".into()))?;
    if amount <= 0 {
        return Err(ApiError::BadRequest(
            "amount must be a positive number of kobo".into(),
        ));
    }
    let email = required(request.email, "email")?;
    if !email.contains('@') {
        return Err(ApiError::BadRequest(format!("Invalid email: {email}")));
    }

    let mut metadata = request.metadata;
    let snapshot = match metadata.as_mut() {
        Some(Value::Object(map)) if map.contains_key("userId") && map.contains_key("eventId") => {
            let snapshot: TicketSnapshot = serde_json::from_value(Value::Object(map.clone()))
                .map_err(|e| ApiError::BadRequest(format!("Invalid ticket metadata: {e}")))?;
            snapshot.validate()?;
            map.entry("transactionType")
                .or_insert_with(|| Value::from(TICKET_PURCHASE));
            Some(snapshot)
        }
        _ => None,
    };

    let paystack = state
        .paystack
        .as_ref()
        .ok_or(ApiError::Configuration("Paystack"))?;

    let reference = Reference::generate(ReferenceKind::Paid);
    let authorization = paystack
        .initialize_transaction(
            &email,
            amount,
            reference.as_str(),
            state.config.payment_callback_url.as_deref(),
            metadata.as_ref(),
        )
        .await
        .map_err(|e| ApiError::external("paystack", e))?;

    if let Some(snapshot) = snapshot {
        let mut record = ReferenceRecord::pending(reference.clone(), snapshot);
        if record.ticket.booker_email.is_none() {
            record.ticket.booker_email = Some(email.clone());
        }
        state.store.put_reference(&record)?;
        tracing::info!(
            reference = %reference,
            event_id = %record.ticket.event_id,
            "Created pending reference"
        );
    }

    tracing::info!(reference = %reference, amount = %amount, "Payment initialized");

    Ok(Json(InitializePaymentResponse {
        success: true,
        authorization_url: authorization.authorization_url,
        access_code: authorization.access_code,
        reference: reference.to_string(),
    }))
}

/// Query for `GET /payment/verify`.
#[derive(Debug, Deserialize)]
pub struct GatewayVerifyQuery {
    /// The charge reference.
    pub reference: Option<String>,
}

/// Gateway view of a charge.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayVerifyResponse {
    /// Always `true`.
    pub success: bool,
    /// The charge reference.
    pub reference: String,
    /// Gateway status, e.g. "success".
    pub status: String,
    /// Charge details.
    #[serde(flatten)]
    pub payment: PaymentDetails,
}

/// Relay the gateway's verification of a charge.
///
/// GET /payment/verify?reference=
pub async fn verify_payment(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<GatewayVerifyQuery>,
) -> Result<Json<GatewayVerifyResponse>, ApiError> {
    let reference = required(query.reference, "reference")?;
    let paystack = state
        .paystack
        .as_ref()
        .ok_or(ApiError::Configuration("Paystack"))?;

    let transaction = paystack
        .verify_transaction(&reference)
        .await
        .map_err(|e| ApiError::external("paystack", e))?;

    Ok(Json(GatewayVerifyResponse {
        success: true,
        reference,
        status: transaction.status.clone(),
        payment: payment_details(transaction),
    }))
}

/// Query for `GET /verify-payment`.
#[derive(Debug, Deserialize)]
pub struct ReferenceQuery {
    /// The reference to look up.
    #[serde(rename = "ref")]
    pub reference: Option<String>,
}

/// Stored view of a reference.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceStatusResponse {
    /// Always `true`.
    pub success: bool,
    /// The reference.
    pub reference: Reference,
    /// Gating status.
    pub status: ReferenceStatus,
    /// Whether issuance has completed.
    pub ticket_generated: bool,
    /// Assigned ticket identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket_id: Option<TicketId>,
    /// Snapshot taken at creation.
    pub ticket: TicketSnapshot,
    /// Gateway metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment: Option<PaymentDetails>,
}

/// Read a stored reference.
///
/// GET /verify-payment?ref=
pub async fn verify_reference(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<ReferenceQuery>,
) -> Result<Json<ReferenceStatusResponse>, ApiError> {
    let raw = required(query.reference, "ref")?;
    let reference: Reference = raw.parse().map_err(|_| {
        ApiError::BadRequest(format!(
            "Invalid reference format. Expected a reference starting with SPTX-: {raw}"
        ))
    })?;

    let record = state
        .store
        .get_reference(&reference)?
        .ok_or_else(|| ApiError::NotFound(format!("Reference not found: {reference}")))?;

    Ok(Json(ReferenceStatusResponse {
        success: true,
        reference: record.reference,
        status: record.status,
        ticket_generated: record.ticket_generated,
        ticket_id: record.ticket_id,
        ticket: record.ticket,
        payment: record.payment,
    }))
}

/// Gateway transaction fields kept on a reference.
pub(crate) fn payment_details(transaction: crate::paystack::types::Transaction) -> PaymentDetails {
    PaymentDetails {
        amount: transaction.amount,
        currency: transaction.currency,
        channel: transaction.channel,
        paid_at: transaction.paid_at,
        gateway_response: transaction.gateway_response,
        customer_email: transaction.customer.and_then(|c| c.email),
    }
}
