//! Generative-text client.
//!
//! Talks to a Gemini-style `generateContent` endpoint: one prompt in, the
//! first candidate's text out.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Error type for generative-text operations.
#[derive(Debug, thiserror::Error)]
pub enum GenAiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API returned an error.
    #[error("generative API error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message.
        message: String,
    },

    /// The response had no text candidate.
    #[error("generative API returned no text")]
    EmptyResponse,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: String,
}

/// Generative-text API client.
#[derive(Debug, Clone)]
pub struct GenAiClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GenAiClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self, GenAiError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
        })
    }

    /// Send one prompt and return the generated text, trimmed.
    pub async fn generate(&self, prompt: &str) -> Result<String, GenAiError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let request = GenerateRequest {
            contents: [Content {
                parts: [Part { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(&url)
            .query(&[("key", &self.api_key)])
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<ApiErrorBody>().await {
                Ok(body) if !body.error.message.is_empty() => body.error.message,
                _ => format!("HTTP {status}"),
            };
            return Err(GenAiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: GenerateResponse = response.json().await?;
        let text: String = body
            .candidates
            .into_iter()
            .find_map(|c| c.content)
            .map(|c| c.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();

        let text = text.trim();
        if text.is_empty() {
            return Err(GenAiError::EmptyResponse);
        }
        Ok(text.to_string())
    }
}

/// Inputs for an event-description rewrite.
#[derive(Debug, Clone, Copy)]
pub struct EnhanceInput<'a> {
    /// Event name.
    pub event_name: &'a str,
    /// The organizer's draft description.
    pub description: &'a str,
    /// Kind of event (concert, conference...).
    pub event_type: Option<&'a str>,
    /// Desired tone.
    pub tone: Option<&'a str>,
}

/// Build the rewrite prompt for an event description.
#[must_use]
pub fn enhance_prompt(input: &EnhanceInput<'_>) -> String {
    let tone = input.tone.unwrap_or("engaging and professional");
    let mut prompt = format!(
        "Rewrite the following event description so it is {tone}, clear and \
         persuasive for potential attendees. Keep every factual detail, do not \
         invent dates, prices or performers, and keep it under 200 words. \
         Return only the rewritten description as plain text.\n\n\
         Event name: {}\n",
        input.event_name
    );
    if let Some(kind) = input.event_type {
        prompt.push_str(&format!("Event type: {kind}\n"));
    }
    prompt.push_str(&format!("Description: {}\n", input.description));
    prompt
}
