//! Paystack API types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Standard Paystack response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    /// Whether the call succeeded.
    pub status: bool,
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
    /// Payload, absent on most errors.
    pub data: Option<T>,
}

/// Error body returned on non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
}

/// Body of `POST /transaction/initialize`.
#[derive(Debug, Clone, Serialize)]
pub struct InitializeRequest<'a> {
    /// Payer email.
    pub email: &'a str,
    /// Amount in kobo.
    pub amount: i64,
    /// Our reference for the charge.
    pub reference: &'a str,
    /// Where the payer lands after checkout.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<&'a str>,
    /// Arbitrary metadata echoed back in webhooks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<&'a Value>,
}

/// Payload of a successful initialization.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Authorization {
    /// Hosted checkout URL.
    pub authorization_url: String,
    /// Access code for inline checkout.
    pub access_code: String,
    /// The charge reference.
    pub reference: String,
}

/// Customer attached to a transaction.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Customer {
    /// Customer email.
    #[serde(default)]
    pub email: Option<String>,
}

/// Payload of `GET /transaction/verify/{reference}` and of charge webhooks.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Transaction {
    /// Charge status: "success", "failed", "abandoned"...
    #[serde(default)]
    pub status: String,
    /// The charge reference.
    #[serde(default)]
    pub reference: Option<String>,
    /// Amount in kobo.
    #[serde(default)]
    pub amount: i64,
    /// Currency code.
    #[serde(default)]
    pub currency: Option<String>,
    /// Payment channel.
    #[serde(default)]
    pub channel: Option<String>,
    /// When the charge was paid.
    #[serde(default)]
    pub paid_at: Option<String>,
    /// Gateway response message.
    #[serde(default)]
    pub gateway_response: Option<String>,
    /// Paying customer.
    #[serde(default)]
    pub customer: Option<Customer>,
    /// Metadata supplied at initialization.
    #[serde(default)]
    pub metadata: Option<Value>,
}

/// Payload of `GET /bank/resolve`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResolvedAccount {
    /// The account number.
    pub account_number: String,
    /// Account holder name.
    pub account_name: String,
}

/// A webhook event.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    /// Event name, e.g. `charge.success`.
    pub event: String,
    /// Event payload.
    #[serde(default)]
    pub data: Transaction,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn webhook_event_parses_charge_payload() {
        let json = r#"{
            "event": "charge.success",
            "data": {
                "status": "success",
                "reference": "SPTX-REF-ABC",
                "amount": 1050000,
                "currency": "NGN",
                "channel": "card",
                "paid_at": "2024-05-01T10:00:00.000Z",
                "gateway_response": "Successful",
                "customer": {"email": "ada@example.com"},
                "metadata": {"transactionType": "ticket purchase"}
            }
        }"#;

        let event: WebhookEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.event, "charge.success");
        assert_eq!(event.data.reference.as_deref(), Some("SPTX-REF-ABC"));
        assert_eq!(event.data.amount, 1_050_000);
        assert_eq!(
            event.data.customer.and_then(|c| c.email).as_deref(),
            Some("ada@example.com")
        );
    }

    #[test]
    fn webhook_event_without_data_parses() {
        let event: WebhookEvent = serde_json::from_str(r#"{"event":"transfer.success"}"#).unwrap();
        assert!(event.data.reference.is_none());
    }

    #[test]
    fn initialize_request_omits_absent_fields() {
        let request = InitializeRequest {
            email: "ada@example.com",
            amount: 500_000,
            reference: "SPTX-REF-1",
            callback_url: None,
            metadata: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["amount"], 500_000);
        assert!(json.get("callback_url").is_none());
        assert!(json.get("metadata").is_none());
    }
}
