//! Ticket issuance workflow.
//!
//! Turns a confirmed reference into a ticket. Both variants share one tail:
//!
//! 1. Assign (or recover) the reference's ticket identifier
//! 2. Load the attendee's profile
//! 3. Write the ticket into every location, first write wins
//! 4. Inventory, referral, analytics and email side calls (best-effort)
//! 5. Set the completion marker on the reference
//!
//! Every step is safe to repeat, so a client that retries after a timeout
//! gets the same ticket identifier and no duplicate rows.

use std::time::Duration;

use chrono::Utc;
use serde::Serialize;

use sptx_core::{
    IdError, PaymentMethod, Reference, ReferenceKind, ReferencePatch, ReferenceRecord,
    ReferenceStatus, ReferralUsage, TicketId, TicketLocation, TicketRecord,
};
use sptx_store::{Store, StoreError};

use crate::best_effort::{best_effort, Outcome};
use crate::error::ApiError;
use crate::mail::TicketMailParams;
use crate::retry::{poll, Attempt, PollOutcome, RetryPolicy};
use crate::state::AppState;

/// Error type for the issuance workflow.
#[derive(Debug, thiserror::Error)]
pub enum IssuanceError {
    /// Missing or malformed reference.
    #[error(transparent)]
    InvalidReference(#[from] IdError),

    /// The reference is in a state that cannot be issued from.
    #[error("{0}")]
    InvalidState(String),

    /// Reference or user not found.
    #[error("{0}")]
    NotFound(String),

    /// The gateway reported the payment failed.
    #[error("payment failed for reference {0}")]
    PaymentRejected(Reference),

    /// The payment stayed pending through every status read.
    #[error("payment still pending for reference {reference} after {attempts} attempts")]
    PaymentPending {
        /// The pending reference.
        reference: Reference,
        /// Status reads made.
        attempts: u32,
    },

    /// Ticket identifier assignment failed.
    #[error("ticket identifier assignment failed: {0}")]
    TransactionFailed(String),

    /// Storage error.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<IssuanceError> for ApiError {
    fn from(err: IssuanceError) -> Self {
        match err {
            IssuanceError::InvalidReference(e) => e.into(),
            IssuanceError::InvalidState(msg) => Self::BadRequest(msg),
            IssuanceError::NotFound(msg) => Self::NotFound(msg),
            IssuanceError::PaymentRejected(reference) => Self::PaymentRejected {
                reference: reference.to_string(),
            },
            IssuanceError::PaymentPending {
                reference,
                attempts,
            } => Self::PaymentPending {
                reference: reference.to_string(),
                attempts,
            },
            IssuanceError::TransactionFailed(msg) => Self::TransactionFailed(msg),
            IssuanceError::Store(e) => e.into(),
        }
    }
}

/// What each side call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SideEffects {
    /// Inventory decrement.
    pub inventory: Outcome,
    /// Referral bookkeeping.
    pub referral: Outcome,
    /// Analytics record.
    pub analytics: Outcome,
    /// Confirmation email.
    pub email: Outcome,
}

/// Result of a successful issuance.
#[derive(Debug, Clone)]
pub struct IssuedTicket {
    /// The ticket as stored.
    pub ticket: TicketRecord,
    /// `false` when a previous call already assigned the identifier.
    pub newly_issued: bool,
    /// Side call outcomes.
    pub side_effects: SideEffects,
}

/// Issue the ticket for a paid reference.
///
/// Waits for the gateway webhook by re-reading the reference status under
/// the configured poll policy.
///
/// # Errors
///
/// Returns `InvalidReference` for a missing or non-`SPTX-REF-` reference,
/// `NotFound` for an unknown reference or user, `PaymentRejected` or
/// `PaymentPending` when the payment isn't confirmed, `InvalidState` for any
/// other status and `TransactionFailed` if the identifier can't be assigned.
pub async fn issue_paid(
    state: &AppState,
    raw_reference: &str,
) -> Result<IssuedTicket, IssuanceError> {
    let reference = Reference::parse_kind(raw_reference, ReferenceKind::Paid)?;
    let policy = RetryPolicy::fixed(
        state.config.payment_poll_attempts,
        Duration::from_millis(state.config.payment_poll_delay_ms),
    );

    let record = confirm_payment(state.store.as_ref(), &reference, policy).await?;
    tracing::info!(reference = %reference, "Payment confirmed");

    complete(state, record, PaymentMethod::Paystack).await
}

/// Issue the ticket for a free reservation.
///
/// # Errors
///
/// Returns `InvalidReference` for a missing or non-`SPTX-FREE-` reference,
/// `NotFound` for an unknown reference or user, `InvalidState` unless the
/// reference is a settled free-ticket reservation and `TransactionFailed` if
/// the identifier can't be assigned.
pub async fn issue_free(
    state: &AppState,
    raw_reference: &str,
) -> Result<IssuedTicket, IssuanceError> {
    let reference = Reference::parse_kind(raw_reference, ReferenceKind::Free)?;

    let record = state
        .store
        .get_reference(&reference)?
        .ok_or_else(|| reference_not_found(&reference))?;

    if record.status != ReferenceStatus::Settled || !record.is_free_ticket() {
        return Err(IssuanceError::InvalidState(format!(
            "Reference {reference} is not a settled free-ticket reservation (status: {})",
            record.status
        )));
    }

    complete(state, record, PaymentMethod::Free).await
}

/// Re-read the reference until the payment leaves `pending`.
async fn confirm_payment(
    store: &dyn Store,
    reference: &Reference,
    policy: RetryPolicy,
) -> Result<ReferenceRecord, IssuanceError> {
    let outcome = poll(policy, |attempt| read_status(store, reference, attempt)).await?;

    match outcome {
        PollOutcome::Ready(record) => Ok(record),
        PollOutcome::Exhausted { attempts } => {
            tracing::warn!(reference = %reference, attempts = %attempts, "Payment still pending");
            Err(IssuanceError::PaymentPending {
                reference: reference.clone(),
                attempts,
            })
        }
    }
}

async fn read_status(
    store: &dyn Store,
    reference: &Reference,
    attempt: u32,
) -> Result<Attempt<ReferenceRecord>, IssuanceError> {
    let record = store
        .get_reference(reference)?
        .ok_or_else(|| reference_not_found(reference))?;

    tracing::debug!(
        reference = %reference,
        attempt = %attempt,
        status = %record.status,
        "Read payment status"
    );

    match record.status {
        ReferenceStatus::Successful => Ok(Attempt::Done(record)),
        ReferenceStatus::Pending => Ok(Attempt::Retry),
        ReferenceStatus::Failed => Err(IssuanceError::PaymentRejected(reference.clone())),
        ReferenceStatus::Settled => Err(IssuanceError::InvalidState(format!(
            "Reference {reference} has status {}; expected successful",
            record.status
        ))),
    }
}

/// The shared tail: identifier, ticket rows, side calls, completion marker.
async fn complete(
    state: &AppState,
    record: ReferenceRecord,
    payment_method: PaymentMethod,
) -> Result<IssuedTicket, IssuanceError> {
    let store = state.store.as_ref();
    let reference = record.reference.clone();

    let assignment = store
        .assign_ticket_id(&reference, &mut TicketId::generate)
        .map_err(|e| IssuanceError::TransactionFailed(e.to_string()))?;
    tracing::info!(
        reference = %reference,
        ticket_id = %assignment.ticket_id,
        newly_assigned = %assignment.newly_assigned,
        "Ticket identifier resolved"
    );

    let user_id = &record.ticket.user_id;
    let user = store
        .get_user(user_id)?
        .ok_or_else(|| IssuanceError::NotFound(format!("User not found: {user_id}")))?;

    let ticket = TicketRecord::issue(
        assignment.ticket_id,
        &record,
        &user,
        payment_method,
        Utc::now(),
    );
    let ticket = write_ticket(store, ticket)?;

    let inventory = match &state.platform {
        Some(platform) => best_effort("inventory", platform.record_sale(&ticket)).await,
        None => Outcome::Skipped,
    };

    let referral = record_referral(store, &ticket).await;

    if !record.ticket_generated {
        store.update_reference(&reference, &ReferencePatch::ticket_generated(Utc::now()))?;
    }

    let analytics = match &state.platform {
        Some(platform) => best_effort("analytics", platform.record_analytics(&ticket)).await,
        None => Outcome::Skipped,
    };

    let email = send_confirmation(state, &ticket).await;

    let side_effects = SideEffects {
        inventory,
        referral,
        analytics,
        email,
    };
    tracing::info!(
        reference = %reference,
        ticket_id = %ticket.ticket_id,
        side_effects = ?side_effects,
        "Ticket issued"
    );

    Ok(IssuedTicket {
        ticket,
        newly_issued: assignment.newly_assigned,
        side_effects,
    })
}

/// Write the ticket into every location and return the stored copy.
///
/// On replay the rows written by the first call are kept, so the stored copy
/// (with its original creation time) is what the caller sees.
fn write_ticket(store: &dyn Store, ticket: TicketRecord) -> Result<TicketRecord, IssuanceError> {
    for location in TicketLocation::ALL {
        let written = store.insert_ticket(location, &ticket)?;
        tracing::debug!(
            ticket_id = %ticket.ticket_id,
            location = %location.collection(),
            written = %written,
            "Ticket row"
        );
    }

    let stored =
        store.get_ticket(TicketLocation::UserHistory, &ticket.user_id, &ticket.ticket_id)?;
    Ok(stored.unwrap_or(ticket))
}

async fn record_referral(store: &dyn Store, ticket: &TicketRecord) -> Outcome {
    let Some(code) = ticket.referral_code.as_deref() else {
        return Outcome::Skipped;
    };

    match store.get_referral(code) {
        Ok(Some(_)) => {}
        Ok(None) => {
            tracing::debug!(code = %code, "Referral code not found, skipping");
            return Outcome::Skipped;
        }
        Err(e) => {
            tracing::warn!(task = "referral", error = %e, "Side call failed, continuing");
            return Outcome::Failed;
        }
    }

    let usage = ReferralUsage {
        ticket_id: ticket.ticket_id.clone(),
        user_id: ticket.user_id.clone(),
        reference: ticket.reference.clone(),
        used_at: Utc::now(),
    };
    best_effort("referral", async { store.record_referral_usage(code, usage) }).await
}

async fn send_confirmation(state: &AppState, ticket: &TicketRecord) -> Outcome {
    let (Some(mailer), Some(template_id)) = (&state.mailer, state.config.ticket_template_id) else {
        return Outcome::Skipped;
    };
    if ticket.attendee_email.is_empty() {
        tracing::debug!(ticket_id = %ticket.ticket_id, "No attendee email, skipping confirmation");
        return Outcome::Skipped;
    }

    best_effort("confirmation email", async {
        let mail = TicketMailParams::from_ticket(ticket)
            .into_mail(&ticket.attendee_email, template_id)?;
        mailer.send(&mail).await
    })
    .await
}

fn reference_not_found(reference: &Reference) -> IssuanceError {
    IssuanceError::NotFound(format!("Reference not found: {reference}"))
}
