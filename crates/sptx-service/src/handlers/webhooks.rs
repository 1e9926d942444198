//! Paystack webhook handlers.
//!
//! Both routes verify the HMAC-SHA512 signature over the raw body before
//! anything is parsed. A charge event moves the matching `SPTX-REF-`
//! reference to `successful` or `failed` and records the gateway's payment
//! details. A `successful` reference is never moved back.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Serialize;
use serde_json::Value;

use sptx_core::{Reference, ReferenceKind, ReferencePatch, ReferenceStatus, TICKET_PURCHASE};

use super::payments::payment_details;
use crate::crypto::verify_signature;
use crate::error::ApiError;
use crate::paystack::types::WebhookEvent;
use crate::state::AppState;

/// Header carrying the hex HMAC-SHA512 of the body.
pub const SIGNATURE_HEADER: &str = "x-paystack-signature";

/// Webhook response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookResponse {
    /// Whether the webhook was received.
    pub received: bool,
    /// The event name.
    pub event: String,
    /// Whether a reference was updated.
    pub applied: bool,
    /// The updated reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<Reference>,
    /// The reference's new status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ReferenceStatus>,
}

impl WebhookResponse {
    fn ignored(event: String) -> Self {
        Self {
            received: true,
            event,
            applied: false,
            reference: None,
            status: None,
        }
    }
}

/// Handle Paystack webhooks.
///
/// POST /webhook
pub async fn paystack_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookResponse>, ApiError> {
    let event = verified_event(&state, &headers, &body)?;
    apply_charge_event(&state, event).map(Json)
}

/// Handle Paystack webhooks for ticket purchases only.
///
/// POST /webhook/ticket
pub async fn ticket_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookResponse>, ApiError> {
    let event = verified_event(&state, &headers, &body)?;

    let transaction_type = event
        .data
        .metadata
        .as_ref()
        .and_then(|m| m.get("transactionType"))
        .and_then(Value::as_str);

    if transaction_type != Some(TICKET_PURCHASE) {
        tracing::debug!(
            event = %event.event,
            transaction_type = ?transaction_type,
            "Not a ticket purchase, ignoring"
        );
        return Ok(Json(WebhookResponse::ignored(event.event)));
    }

    apply_charge_event(&state, event).map(Json)
}

/// Check the signature and parse the body.
fn verified_event(
    state: &AppState,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<WebhookEvent, ApiError> {
    let secret = state
        .config
        .paystack_secret_key
        .as_deref()
        .ok_or(ApiError::Configuration("Paystack secret key"))?;

    let Some(signature) = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok()) else {
        tracing::warn!("Webhook without signature rejected");
        return Err(ApiError::Unauthorized("Missing webhook signature".into()));
    };

    if !verify_signature(secret, body, signature) {
        tracing::warn!("Webhook with invalid signature rejected");
        return Err(ApiError::Unauthorized("Invalid webhook signature".into()));
    }

    let event: WebhookEvent = serde_json::from_slice(body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid webhook payload: {e}")))?;

    tracing::info!(
        event = %event.event,
        reference = ?event.data.reference,
        "Received Paystack webhook"
    );

    Ok(event)
}

fn apply_charge_event(state: &AppState, event: WebhookEvent) -> Result<WebhookResponse, ApiError> {
    let status = match event.event.as_str() {
        "charge.success" => ReferenceStatus::Successful,
        "charge.failed" => ReferenceStatus::Failed,
        _ => {
            tracing::debug!(event = %event.event, "Unhandled Paystack event");
            return Ok(WebhookResponse::ignored(event.event));
        }
    };

    let raw = event
        .data
        .reference
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing data.reference".into()))?;

    let not_found = || ApiError::NotFound(format!("Reference not found: {raw}"));
    let reference = Reference::parse_kind(raw, ReferenceKind::Paid).map_err(|_| not_found())?;
    let current = state.store.get_reference(&reference)?.ok_or_else(not_found)?;

    if current.status == ReferenceStatus::Successful && status != ReferenceStatus::Successful {
        tracing::warn!(
            reference = %reference,
            event = %event.event,
            ticket_id = ?current.ticket_id,
            "Ignoring status change for a successful reference"
        );
        return Ok(WebhookResponse {
            received: true,
            event: event.event,
            applied: false,
            reference: Some(current.reference),
            status: Some(current.status),
        });
    }

    let name = event.event;
    let patch = ReferencePatch::status(status).with_payment(payment_details(event.data));
    let record = state.store.update_reference(&reference, &patch)?;

    tracing::info!(
        reference = %reference,
        status = %record.status,
        "Reference status updated"
    );

    Ok(WebhookResponse {
        received: true,
        event: name,
        applied: true,
        reference: Some(record.reference),
        status: Some(record.status),
    })
}
