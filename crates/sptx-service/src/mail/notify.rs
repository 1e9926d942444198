//! Notification workflow client (Novu-style `/v1/events/trigger`).

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use super::MailError;

#[derive(Debug, Serialize)]
struct TriggerRequest<'a> {
    name: &'a str,
    to: Subscriber<'a>,
    payload: &'a Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Subscriber<'a> {
    subscriber_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct TriggerResponse {
    data: NotifyReceipt,
}

/// What the provider reports for a triggered workflow.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifyReceipt {
    /// Whether the trigger was accepted.
    #[serde(default)]
    pub acknowledged: bool,
    /// Provider status string.
    #[serde(default)]
    pub status: String,
    /// Provider transaction id.
    #[serde(default)]
    pub transaction_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// Notification API client.
#[derive(Debug, Clone)]
pub struct NotifyClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl NotifyClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self, MailError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    /// Trigger a notification workflow for one subscriber.
    pub async fn trigger(
        &self,
        workflow: &str,
        subscriber_id: &str,
        email: Option<&str>,
        payload: &Value,
    ) -> Result<NotifyReceipt, MailError> {
        let request = TriggerRequest {
            name: workflow,
            to: Subscriber {
                subscriber_id,
                email,
            },
            payload,
        };

        let response = self
            .client
            .post(format!("{}/v1/events/trigger", self.base_url))
            .header("Authorization", format!("ApiKey {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<ErrorBody>().await {
                Ok(body) if !body.message.is_empty() => body.message,
                _ => format!("HTTP {status}"),
            };
            return Err(MailError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: TriggerResponse = response.json().await?;
        Ok(body.data)
    }
}
