//! Ticket issuance handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use sptx_core::{
    Reference, ReferenceKind, ReferenceRecord, ReferenceStatus, TicketRecord, TicketSnapshot,
};

use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::issuance::{self, IssuedTicket, SideEffects};
use crate::state::AppState;

/// Request to issue a ticket.
#[derive(Debug, Deserialize)]
pub struct IssueTicketRequest {
    /// The reference to issue from.
    #[serde(default)]
    pub reference: Option<String>,
}

/// Response for an issued ticket.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueTicketResponse {
    /// Always `true`.
    pub success: bool,
    /// Human-readable outcome.
    pub message: &'static str,
    /// The ticket as stored.
    #[serde(flatten)]
    pub ticket: TicketRecord,
    /// `true` when an earlier call already issued this ticket.
    pub already_issued: bool,
    /// What each side call did.
    pub side_effects: SideEffects,
}

impl From<IssuedTicket> for IssueTicketResponse {
    fn from(issued: IssuedTicket) -> Self {
        Self {
            success: true,
            message: if issued.newly_issued {
                "Ticket issued successfully"
            } else {
                "Ticket already issued"
            },
            ticket: issued.ticket,
            already_issued: !issued.newly_issued,
            side_effects: issued.side_effects,
        }
    }
}

/// Issue the ticket for a paid reference.
///
/// POST /ticket/iwss
pub async fn issue_paid_ticket(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<IssueTicketRequest>,
) -> Result<Json<IssueTicketResponse>, ApiError> {
    let reference = request.reference.unwrap_or_default();
    let issued = issuance::issue_paid(&state, &reference).await?;
    Ok(Json(issued.into()))
}

/// Issue the ticket for a free reservation.
///
/// POST /ticket/free
pub async fn issue_free_ticket(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<IssueTicketRequest>,
) -> Result<Json<IssueTicketResponse>, ApiError> {
    let reference = request.reference.unwrap_or_default();
    let issued = issuance::issue_free(&state, &reference).await?;
    Ok(Json(issued.into()))
}

/// Response for a free reservation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReserveFreeTicketResponse {
    /// Always `true`.
    pub success: bool,
    /// The new `SPTX-FREE-` reference.
    pub reference: Reference,
    /// Always `settled`.
    pub status: ReferenceStatus,
}

/// Create a settled free-ticket reservation.
///
/// POST /ticket/free/reserve
pub async fn reserve_free_ticket(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<Value>,
) -> Result<Json<ReserveFreeTicketResponse>, ApiError> {
    let snapshot: TicketSnapshot = serde_json::from_value(body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid reservation: {e}")))?;
    snapshot.validate()?;

    let record = ReferenceRecord::free(Reference::generate(ReferenceKind::Free), snapshot);
    state.store.put_reference(&record)?;

    tracing::info!(
        reference = %record.reference,
        user_id = %record.ticket.user_id,
        event_id = %record.ticket.event_id,
        "Free ticket reserved"
    );

    Ok(Json(ReserveFreeTicketResponse {
        success: true,
        reference: record.reference,
        status: record.status,
    }))
}
