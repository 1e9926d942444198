//! Transactional email and notifications.
//!
//! Email goes through the [`Mailer`] trait so the issuance workflow can send
//! confirmations without knowing the provider. [`TemplateMailClient`] is the
//! production implementation; [`NotifyClient`] triggers notification
//! workflows.

mod notify;
mod template;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use sptx_core::TicketRecord;

pub use notify::{NotifyClient, NotifyReceipt};
pub use template::TemplateMailClient;

/// Error type for mail and notification operations.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider rejected the request.
    #[error("mail provider error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message.
        message: String,
    },

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// One templated email.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateMail {
    /// Recipient address.
    pub to: String,
    /// Recipient display name.
    pub name: Option<String>,
    /// Provider template id.
    pub template_id: i64,
    /// Template parameters.
    pub params: Value,
}

/// Sends templated email.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send one email, returning the provider's message id.
    async fn send(&self, mail: &TemplateMail) -> Result<String, MailError>;
}

/// Parameters of the ticket confirmation template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketMailParams {
    /// Attendee name.
    pub name: String,
    /// Ticket identifier.
    pub ticket_id: String,
    /// Event display name.
    pub event_name: String,
    /// Ticket tier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket_type: Option<String>,
    /// Venue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_venue: Option<String>,
    /// Event date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_date: Option<String>,
    /// Event time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_time: Option<String>,
    /// Amount paid, formatted in naira.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_paid: Option<String>,
}

impl TicketMailParams {
    /// Template parameters for an issued ticket.
    #[must_use]
    pub fn from_ticket(ticket: &TicketRecord) -> Self {
        Self {
            name: ticket.attendee_name.clone(),
            ticket_id: ticket.ticket_id.to_string(),
            event_name: ticket.event_name.clone(),
            ticket_type: Some(ticket.ticket_type.clone()).filter(|t| !t.is_empty()),
            event_venue: ticket.event_venue.clone(),
            event_date: ticket.event_date.clone(),
            event_time: ticket.event_time.clone(),
            amount_paid: Some(format_naira(ticket.total_amount)),
        }
    }

    /// Build the email for `to` using the given template.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameters cannot be serialized.
    pub fn into_mail(self, to: &str, template_id: i64) -> Result<TemplateMail, MailError> {
        let name = Some(self.name.clone()).filter(|n| !n.is_empty());
        Ok(TemplateMail {
            to: to.to_string(),
            name,
            template_id,
            params: serde_json::to_value(self)?,
        })
    }
}

/// Format kobo as a naira amount, e.g. `1050000` → `"₦10,500.00"`.
#[must_use]
pub fn format_naira(kobo: i64) -> String {
    let sign = if kobo < 0 { "-" } else { "" };
    let kobo = kobo.unsigned_abs();
    let naira = (kobo / 100).to_string();

    let mut grouped = String::with_capacity(naira.len() + naira.len() / 3);
    for (i, digit) in naira.chars().enumerate() {
        if i > 0 && (naira.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    format!("{sign}\u{20a6}{grouped}.{:02}", kobo % 100)
}
