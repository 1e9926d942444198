//! Paystack API client implementation.

use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use super::types::{
    Authorization, Envelope, ErrorBody, InitializeRequest, ResolvedAccount, Transaction,
};

/// Error type for Paystack operations.
#[derive(Debug, thiserror::Error)]
pub enum PaystackError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Paystack API returned an error.
    #[error("Paystack API error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message.
        message: String,
    },

    /// The envelope reported success but carried no data.
    #[error("Paystack response missing data: {0}")]
    MissingData(String),
}

/// Paystack API client.
#[derive(Debug, Clone)]
pub struct PaystackClient {
    client: Client,
    base_url: String,
    secret_key: String,
}

impl PaystackClient {
    /// Create a new Paystack client.
    ///
    /// # Arguments
    ///
    /// * `secret_key` - Paystack secret key (`sk_test_...` or `sk_live_...`)
    /// * `base_url` - API base URL (e.g., `"https://api.paystack.co"`)
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        secret_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, PaystackError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            secret_key: secret_key.into(),
        })
    }

    /// Initialize a charge and get the hosted checkout URL.
    ///
    /// # Arguments
    ///
    /// * `email` - Payer email
    /// * `amount` - Amount in kobo
    /// * `reference` - Our reference for the charge
    /// * `callback_url` - Optional post-checkout redirect
    /// * `metadata` - Optional metadata echoed back in webhooks
    pub async fn initialize_transaction(
        &self,
        email: &str,
        amount: i64,
        reference: &str,
        callback_url: Option<&str>,
        metadata: Option<&Value>,
    ) -> Result<Authorization, PaystackError> {
        let request = InitializeRequest {
            email,
            amount,
            reference,
            callback_url,
            metadata,
        };

        tracing::debug!(reference = %reference, amount = %amount, "Initializing Paystack charge");

        let response = self
            .client
            .post(format!("{}/transaction/initialize", self.base_url))
            .bearer_auth(&self.secret_key)
            .json(&request)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Verify a charge by reference.
    pub async fn verify_transaction(&self, reference: &str) -> Result<Transaction, PaystackError> {
        let response = self
            .client
            .get(format!("{}/transaction/verify/{}", self.base_url, reference))
            .bearer_auth(&self.secret_key)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Resolve an account number at a bank to the account holder's name.
    pub async fn resolve_account(
        &self,
        account_number: &str,
        bank_code: &str,
    ) -> Result<ResolvedAccount, PaystackError> {
        let response = self
            .client
            .get(format!("{}/bank/resolve", self.base_url))
            .bearer_auth(&self.secret_key)
            .query(&[("account_number", account_number), ("bank_code", bank_code)])
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Handle API response and unwrap the envelope.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, PaystackError> {
        let status = response.status();

        if !status.is_success() {
            let message = match response.json::<ErrorBody>().await {
                Ok(body) if !body.message.is_empty() => body.message,
                _ => format!("HTTP {status}"),
            };
            return Err(PaystackError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: Envelope<T> = response.json().await?;
        if !envelope.status {
            return Err(PaystackError::Api {
                status: status.as_u16(),
                message: envelope.message,
            });
        }

        envelope
            .data
            .ok_or(PaystackError::MissingData(envelope.message))
    }
}
