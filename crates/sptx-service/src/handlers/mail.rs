//! Email and notification handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::required;
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::mail::{TemplateMail, TicketMailParams};
use crate::state::AppState;

/// Request to send a template email.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMailRequest {
    /// Recipient address.
    pub to: Option<String>,
    /// Recipient name.
    pub name: Option<String>,
    /// Provider template id.
    pub template_id: Option<i64>,
    /// Template parameters.
    pub params: Option<Value>,
}

/// Request to send a ticket confirmation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketMailRequest {
    /// Recipient address.
    pub email: Option<String>,
    /// Attendee name.
    pub name: Option<String>,
    /// Ticket identifier.
    pub ticket_id: Option<String>,
    /// Event name.
    pub event_name: Option<String>,
    /// Ticket tier.
    pub ticket_type: Option<String>,
    /// Venue.
    pub event_venue: Option<String>,
    /// Event date.
    pub event_date: Option<String>,
    /// Event time.
    pub event_time: Option<String>,
    /// Amount paid, display string.
    pub amount_paid: Option<String>,
}

/// Accepted email.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MailResponse {
    /// Always `true`.
    pub success: bool,
    /// Provider message id.
    pub message_id: String,
}

/// POST /mail/send
pub async fn send_mail(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<SendMailRequest>,
) -> Result<Json<MailResponse>, ApiError> {
    let to = required(request.to, "to")?;
    let template_id = request
        .template_id
        .ok_or_else(|| ApiError::BadRequest("templateId is required".into()))?;

    let mail = TemplateMail {
        to,
        name: request.name,
        template_id,
        params: request.params.unwrap_or_else(|| Value::Object(serde_json::Map::new())),
    };
    send(&state, &mail).await
}

/// POST /mail/ticket
pub async fn send_ticket_mail(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<TicketMailRequest>,
) -> Result<Json<MailResponse>, ApiError> {
    let email = required(request.email, "email")?;
    let params = TicketMailParams {
        name: required(request.name, "name")?,
        ticket_id: required(request.ticket_id, "ticketId")?,
        event_name: required(request.event_name, "eventName")?,
        ticket_type: request.ticket_type,
        event_venue: request.event_venue,
        event_date: request.event_date,
        event_time: request.event_time,
        amount_paid: request.amount_paid,
    };

    let template_id = state
        .config
        .ticket_template_id
        .ok_or(ApiError::Configuration("Ticket email template"))?;
    let mail = params
        .into_mail(&email, template_id)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    send(&state, &mail).await
}

async fn send(state: &AppState, mail: &TemplateMail) -> Result<Json<MailResponse>, ApiError> {
    let mailer = state
        .mailer
        .as_ref()
        .ok_or(ApiError::Configuration("Mail provider"))?;

    let message_id = mailer
        .send(mail)
        .await
        .map_err(|e| ApiError::external("mail", e))?;

    tracing::info!(template_id = %mail.template_id, "Template email sent");

    Ok(Json(MailResponse {
        success: true,
        message_id,
    }))
}

/// Request to trigger a notification workflow.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifyRequest {
    /// Subscriber (user) id.
    pub subscriber_id: Option<String>,
    /// Workflow identifier.
    pub workflow: Option<String>,
    /// Subscriber email.
    pub email: Option<String>,
    /// Workflow payload.
    pub payload: Option<Value>,
}

/// Triggered notification.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifyResponse {
    /// Always `true`.
    pub success: bool,
    /// Provider receipt.
    #[serde(flatten)]
    pub receipt: crate::mail::NotifyReceipt,
}

/// POST /notify
pub async fn notify(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<NotifyRequest>,
) -> Result<Json<NotifyResponse>, ApiError> {
    let subscriber_id = required(request.subscriber_id, "subscriberId")?;
    let workflow = required(request.workflow, "workflow")?;
    let payload = request
        .payload
        .unwrap_or_else(|| Value::Object(serde_json::Map::new()));

    let client = state
        .notify
        .as_ref()
        .ok_or(ApiError::Configuration("Notification provider"))?;

    let receipt = client
        .trigger(&workflow, &subscriber_id, request.email.as_deref(), &payload)
        .await
        .map_err(|e| ApiError::external("notify", e))?;

    tracing::info!(workflow = %workflow, subscriber_id = %subscriber_id, "Notification triggered");

    Ok(Json(NotifyResponse {
        success: true,
        receipt,
    }))
}
