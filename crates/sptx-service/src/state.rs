//! Application state.

use std::sync::Arc;

use sptx_store::Store;

use crate::config::ServiceConfig;
use crate::genai::GenAiClient;
use crate::mail::{Mailer, NotifyClient, TemplateMailClient};
use crate::paystack::PaystackClient;
use crate::platform::PlatformClient;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The storage backend.
    pub store: Arc<dyn Store>,

    /// Service configuration.
    pub config: ServiceConfig,

    /// Paystack client for payments and bank resolution (optional).
    pub paystack: Option<Arc<PaystackClient>>,

    /// Generative-text client (optional).
    pub genai: Option<Arc<GenAiClient>>,

    /// Template email sender (optional).
    pub mailer: Option<Arc<dyn Mailer>>,

    /// Notification client (optional).
    pub notify: Option<Arc<NotifyClient>>,

    /// Platform inventory and analytics callbacks (optional).
    pub platform: Option<Arc<PlatformClient>>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// Each integration is enabled when its configuration is present. A
    /// client that fails to build is logged and left disabled.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, config: ServiceConfig) -> Self {
        let paystack = config.paystack_secret_key.as_ref().and_then(|key| {
            enabled(
                "Paystack",
                PaystackClient::new(key, &config.paystack_base_url),
            )
        });
        if paystack.is_none() {
            tracing::warn!(
                "Paystack not configured - payments, webhooks and bank lookups will fail"
            );
        }

        let genai = config.genai_api_key.as_ref().and_then(|key| {
            enabled(
                "Generative text",
                GenAiClient::new(key, &config.genai_base_url, &config.genai_model),
            )
        });

        let mailer = config.mail_api_key.as_ref().and_then(|key| {
            enabled(
                "Template mail",
                TemplateMailClient::new(
                    key,
                    &config.mail_base_url,
                    &config.mail_sender_email,
                    &config.mail_sender_name,
                ),
            )
            .map(|client| client as Arc<dyn Mailer>)
        });
        if mailer.is_some() && config.ticket_template_id.is_none() {
            tracing::warn!("Ticket template not configured - confirmation emails will be skipped");
        }

        let notify = config
            .notify_api_key
            .as_ref()
            .and_then(|key| {
                enabled(
                    "Notifications",
                    NotifyClient::new(key, &config.notify_base_url),
                )
            });

        let platform = config.platform_base_url.as_ref().and_then(|url| {
            tracing::info!(platform_url = %url, "Platform callbacks enabled");
            enabled("Platform callbacks", PlatformClient::new(url))
        });
        if platform.is_none() {
            tracing::warn!(
                "Platform not configured - inventory and analytics calls will be skipped"
            );
        }

        Self {
            store,
            config,
            paystack,
            genai,
            mailer,
            notify,
            platform,
        }
    }

    /// Replace the template mail sender.
    #[must_use]
    pub fn with_mailer(mut self, mailer: Arc<dyn Mailer>) -> Self {
        self.mailer = Some(mailer);
        self
    }

    /// Check if Paystack is configured.
    #[must_use]
    pub fn has_paystack(&self) -> bool {
        self.paystack.is_some()
    }
}

fn enabled<T, E: std::fmt::Display>(name: &str, client: Result<T, E>) -> Option<Arc<T>> {
    match client {
        Ok(client) => {
            tracing::info!(integration = %name, "Integration enabled");
            Some(Arc::new(client))
        }
        Err(e) => {
            tracing::error!(
                integration = %name,
                error = %e,
                "Failed to build client, integration disabled"
            );
            None
        }
    }
}
