//! Template email provider client (Brevo-style `/v3/smtp/email`).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use super::{MailError, Mailer, TemplateMail};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendRequest<'a> {
    sender: Contact<'a>,
    to: [Contact<'a>; 1],
    template_id: i64,
    params: &'a Value,
}

#[derive(Debug, Serialize)]
struct Contact<'a> {
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendResponse {
    #[serde(default)]
    message_id: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// Template email client.
#[derive(Debug, Clone)]
pub struct TemplateMailClient {
    client: Client,
    base_url: String,
    api_key: String,
    sender_email: String,
    sender_name: String,
}

impl TemplateMailClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        sender_email: impl Into<String>,
        sender_name: impl Into<String>,
    ) -> Result<Self, MailError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            sender_email: sender_email.into(),
            sender_name: sender_name.into(),
        })
    }
}

#[async_trait]
impl Mailer for TemplateMailClient {
    async fn send(&self, mail: &TemplateMail) -> Result<String, MailError> {
        let request = SendRequest {
            sender: Contact {
                email: &self.sender_email,
                name: Some(&self.sender_name),
            },
            to: [Contact {
                email: &mail.to,
                name: mail.name.as_deref(),
            }],
            template_id: mail.template_id,
            params: &mail.params,
        };

        let response = self
            .client
            .post(format!("{}/v3/smtp/email", self.base_url))
            .header("api-key", &self.api_key)
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

        let body: SendResponse = response.json().await?;
        tracing::debug!(
            template_id = %mail.template_id,
            message_id = %body.message_id,
            "Template email accepted"
        );
        Ok(body.message_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn mail() -> TemplateMail {
        TemplateMail {
            to: "ada@example.com".into(),
            name: Some("Ada".into()),
            template_id: 12,
            params: json!({"ticketId": "SPTX-TX-12A34567B8"}),
        }
    }

    #[tokio::test]
    async fn sends_template_with_api_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v3/smtp/email"))
            .and(header("api-key", "mail-key"))
            .and(body_partial_json(json!({
                "templateId": 12,
                "sender": {"email": "tickets@sptx.app"},
                "to": [{"email": "ada@example.com", "name": "Ada"}]
            })))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(json!({"messageId": "<m-1@relay>"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client =
            TemplateMailClient::new("mail-key", server.uri(), "tickets@sptx.app", "SPTX").unwrap();
        assert_eq!(client.send(&mail()).await.unwrap(), "<m-1@relay>");
    }

    #[tokio::test]
    async fn provider_rejection_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({"code": "invalid_parameter", "message": "bad template"})),
            )
            .mount(&server)
            .await;

        let client =
            TemplateMailClient::new("mail-key", server.uri(), "tickets@sptx.app", "SPTX").unwrap();
        let err = client.send(&mail()).await.unwrap_err();
        assert!(matches!(err, MailError::Api { status: 400, .. }));
        assert!(err.to_string().contains("bad template"));
    }
}
