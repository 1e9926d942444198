//! Service configuration.
//!
//! Built once at startup and carried in `AppState`. Every external
//! integration is optional: a missing key disables the routes that need it,
//! which then answer 500 at call time.

use serde::Deserialize;
use std::path::Path;

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address to listen on (default: "0.0.0.0:8080").
    pub listen_addr: String,

    /// Path to the `RocksDB` data directory (default: "/data/sptx").
    pub data_dir: String,

    /// Paystack secret key; also the webhook signing key.
    pub paystack_secret_key: Option<String>,

    /// Paystack API base URL.
    pub paystack_base_url: String,

    /// Where Paystack redirects the payer after checkout.
    pub payment_callback_url: Option<String>,

    /// Generative-text API key.
    pub genai_api_key: Option<String>,

    /// Generative-text API base URL.
    pub genai_base_url: String,

    /// Generative-text model name.
    pub genai_model: String,

    /// Transactional email API key.
    pub mail_api_key: Option<String>,

    /// Transactional email API base URL.
    pub mail_base_url: String,

    /// Sender address for transactional email.
    pub mail_sender_email: String,

    /// Sender display name for transactional email.
    pub mail_sender_name: String,

    /// Template used for ticket confirmation email.
    pub ticket_template_id: Option<i64>,

    /// Notification API key.
    pub notify_api_key: Option<String>,

    /// Notification API base URL.
    pub notify_base_url: String,

    /// Base URL of the platform's own inventory and analytics endpoints.
    pub platform_base_url: Option<String>,

    /// Payment-status reads before giving up on a pending reference.
    pub payment_poll_attempts: u32,

    /// Pause between payment-status reads, in milliseconds.
    pub payment_poll_delay_ms: u64,

    /// CORS allowed origins.
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Request timeout in seconds.
    pub request_timeout_seconds: u64,
}

/// Paystack secrets file structure.
#[derive(Debug, Deserialize)]
struct PaystackSecrets {
    secret_key: String,
    #[serde(default)]
    callback_url: Option<String>,
}

impl ServiceConfig {
    /// Load configuration from environment variables and secrets files.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();

        // Try to load Paystack secrets from file first, then fall back to env vars
        let (paystack_secret_key, payment_callback_url) = load_paystack_secrets();

        Self {
            listen_addr: env_or("LISTEN_ADDR", defaults.listen_addr),
            data_dir: env_or("DATA_DIR", defaults.data_dir),
            paystack_secret_key,
            paystack_base_url: env_or("PAYSTACK_BASE_URL", defaults.paystack_base_url),
            payment_callback_url,
            genai_api_key: std::env::var("GEMINI_API_KEY").ok(),
            genai_base_url: env_or("GEMINI_BASE_URL", defaults.genai_base_url),
            genai_model: env_or("GEMINI_MODEL", defaults.genai_model),
            mail_api_key: std::env::var("MAIL_API_KEY").ok(),
            mail_base_url: env_or("MAIL_BASE_URL", defaults.mail_base_url),
            mail_sender_email: env_or("MAIL_SENDER_EMAIL", defaults.mail_sender_email),
            mail_sender_name: env_or("MAIL_SENDER_NAME", defaults.mail_sender_name),
            ticket_template_id: std::env::var("MAIL_TICKET_TEMPLATE_ID")
                .ok()
                .and_then(|s| s.parse().ok()),
            notify_api_key: std::env::var("NOTIFY_API_KEY").ok(),
            notify_base_url: env_or("NOTIFY_BASE_URL", defaults.notify_base_url),
            platform_base_url: std::env::var("PLATFORM_BASE_URL").ok(),
            payment_poll_attempts: env_parse(
                "PAYMENT_POLL_ATTEMPTS",
                defaults.payment_poll_attempts,
            ),
            payment_poll_delay_ms: env_parse(
                "PAYMENT_POLL_DELAY_MS",
                defaults.payment_poll_delay_ms,
            ),
            cors_origins: std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "*".into())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            max_body_bytes: env_parse("MAX_BODY_BYTES", defaults.max_body_bytes),
            request_timeout_seconds: env_parse(
                "REQUEST_TIMEOUT_SECONDS",
                defaults.request_timeout_seconds,
            ),
        }
    }
}

fn env_or(name: &str, default: String) -> String {
    std::env::var(name).unwrap_or(default)
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// Load Paystack secrets from file or environment.
fn load_paystack_secrets() -> (Option<String>, Option<String>) {
    let secret_paths = [".secrets/paystack.json", "../.secrets/paystack.json"];

    for path in &secret_paths {
        if let Ok(secrets) = load_secrets_file::<PaystackSecrets>(path) {
            tracing::info!(path = %path, "Loaded Paystack secrets from file");
            return (
                Some(secrets.secret_key),
                secrets
                    .callback_url
                    .or_else(|| std::env::var("PAYMENT_CALLBACK_URL").ok()),
            );
        }
    }

    // Fall back to environment variables
    tracing::debug!("Paystack secrets file not found, using environment variables");
    (
        std::env::var("PAYSTACK_SECRET_KEY").ok(),
        std::env::var("PAYMENT_CALLBACK_URL").ok(),
    )
}

/// Load secrets from a JSON file.
fn load_secrets_file<T: serde::de::DeserializeOwned>(path: &str) -> Result<T, std::io::Error> {
    let path = Path::new(path);
    if !path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Secrets file not found",
        ));
    }
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".into(),
            data_dir: "/data/sptx".into(),
            paystack_secret_key: None,
            paystack_base_url: "https://api.paystack.co".into(),
            payment_callback_url: None,
            genai_api_key: None,
            genai_base_url: "https://generativelanguage.googleapis.com".into(),
            genai_model: "gemini-1.5-flash".into(),
            mail_api_key: None,
            mail_base_url: "https://api.brevo.com".into(),
            mail_sender_email: "tickets@sptx.app".into(),
            mail_sender_name: "SPTX Tickets".into(),
            ticket_template_id: None,
            notify_api_key: None,
            notify_base_url: "https://api.novu.co".into(),
            platform_base_url: None,
            payment_poll_attempts: 3,
            payment_poll_delay_ms: 2000,
            cors_origins: vec!["*".into()],
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_poll_three_times_two_seconds_apart() {
        let config = ServiceConfig::default();
        assert_eq!(config.payment_poll_attempts, 3);
        assert_eq!(config.payment_poll_delay_ms, 2000);
        assert!(config.paystack_secret_key.is_none());
    }

    #[test]
    fn missing_secrets_file_is_not_found() {
        let err = load_secrets_file::<PaystackSecrets>("does/not/exist.json").unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }
}
