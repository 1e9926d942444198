//! Platform callback client.
//!
//! The platform's own inventory and analytics endpoints, reached through the
//! configured base URL. Both calls are fire-and-report from the issuance
//! workflow.

use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use sptx_core::{PaymentMethod, TicketRecord};

/// Error type for platform callbacks.
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The platform answered with a non-2xx status.
    #[error("platform error: {status} - {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body, as text.
        body: String,
    },
}

/// Inventory decrement for one sold ticket.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SaleRequest<'a> {
    event_id: &'a str,
    ticket_type: &'a str,
    ticket_id: &'a str,
    reference: &'a str,
    quantity: u32,
}

/// Analytics record for one sold ticket.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyticsRequest<'a> {
    event_id: &'a str,
    user_id: &'a str,
    ticket_id: &'a str,
    ticket_type: &'a str,
    ticket_price: i64,
    service_fee: i64,
    total_amount: i64,
    payment_method: PaymentMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    referral_code: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    discount_code: Option<&'a str>,
}

/// Platform callback client.
#[derive(Debug, Clone)]
pub struct PlatformClient {
    client: Client,
    base_url: String,
}

impl PlatformClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self, PlatformError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Decrement the event's inventory for an issued ticket.
    pub async fn record_sale(&self, ticket: &TicketRecord) -> Result<(), PlatformError> {
        let request = SaleRequest {
            event_id: &ticket.event_id,
            ticket_type: &ticket.ticket_type,
            ticket_id: ticket.ticket_id.as_str(),
            reference: ticket.reference.as_str(),
            quantity: 1,
        };
        self.post("/api/inventory/sale", &request).await
    }

    /// Report an issued ticket to analytics.
    pub async fn record_analytics(&self, ticket: &TicketRecord) -> Result<(), PlatformError> {
        let request = AnalyticsRequest {
            event_id: &ticket.event_id,
            user_id: &ticket.user_id,
            ticket_id: ticket.ticket_id.as_str(),
            ticket_type: &ticket.ticket_type,
            ticket_price: ticket.ticket_price,
            service_fee: ticket.service_fee,
            total_amount: ticket.total_amount,
            payment_method: ticket.payment_method,
            referral_code: ticket.referral_code.as_deref(),
            discount_code: ticket.discount_code.as_deref(),
        };
        self.post("/api/analytics/ticket-sale", &request).await
    }

    async fn post<T: Serialize + Sync>(&self, path: &str, body: &T) -> Result<(), PlatformError> {
        let response = self
            .client
            .post(format!("{}{path}", self.base_url))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(PlatformError::Api {
            status: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;
    use sptx_core::{ReferenceRecord, TicketId, TicketSnapshot, UserProfile};
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn ticket() -> TicketRecord {
        let record = ReferenceRecord::pending(
            "SPTX-REF-plat".parse().unwrap(),
            TicketSnapshot {
                user_id: "u1".into(),
                event_id: "e1".into(),
                ticket_type: "Regular".into(),
                total_amount: 1_000,
                ..TicketSnapshot::default()
            },
        );
        TicketRecord::issue(
            TicketId::generate(),
            &record,
            &UserProfile::new("u1", "Ada", "ada@example.com"),
            PaymentMethod::Paystack,
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn sale_posts_one_unit() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/inventory/sale"))
            .and(body_partial_json(json!({
                "eventId": "e1",
                "ticketType": "Regular",
                "quantity": 1
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        PlatformClient::new(server.uri())
            .unwrap()
            .record_sale(&ticket())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn analytics_failure_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/analytics/ticket-sale"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = PlatformClient::new(server.uri())
            .unwrap()
            .record_analytics(&ticket())
            .await
            .unwrap_err();

        assert!(matches!(err, PlatformError::Api { status: 500, ref body } if body == "boom"));
    }
}
