//! Common test utilities for SPTX integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue};
use axum::Router;
use axum_test::TestServer;
use serde_json::Value;
use wiremock::MockServer;

use sptx_core::{ReferenceRecord, ReferenceStatus, TicketSnapshot, UserProfile};
use sptx_service::crypto::hmac_sha512_hex;
use sptx_service::{create_router, AppState, ServiceConfig};
use sptx_store::{MemoryStore, Store};

/// Paystack secret used by every harness.
pub const PAYSTACK_SECRET: &str = "sk_test_sptx_secret";

/// Ticket confirmation template id.
pub const TICKET_TEMPLATE_ID: i64 = 42;

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// The store behind the server.
    pub store: Arc<MemoryStore>,
    /// Stands in for every external API.
    pub external: MockServer,
}

impl TestHarness {
    /// Create a harness with every integration pointed at a mock server.
    pub async fn new() -> Self {
        let external = MockServer::start().await;
        let uri = external.uri();

        let config = ServiceConfig {
            listen_addr: "127.0.0.1:0".into(),
            paystack_secret_key: Some(PAYSTACK_SECRET.into()),
            paystack_base_url: uri.clone(),
            payment_callback_url: Some("https://sptx.app/payment/done".into()),
            genai_api_key: Some("genai-key".into()),
            genai_base_url: uri.clone(),
            genai_model: "gemini-test".into(),
            mail_api_key: Some("mail-key".into()),
            mail_base_url: uri.clone(),
            ticket_template_id: Some(TICKET_TEMPLATE_ID),
            notify_api_key: Some("notify-key".into()),
            notify_base_url: uri.clone(),
            platform_base_url: Some(uri),
            payment_poll_attempts: 3,
            payment_poll_delay_ms: 10,
            ..ServiceConfig::default()
        };

        Self::with_config(config, external)
    }

    /// Create a harness with no integrations configured.
    pub async fn unconfigured() -> Self {
        let external = MockServer::start().await;
        let config = ServiceConfig {
            listen_addr: "127.0.0.1:0".into(),
            payment_poll_attempts: 2,
            payment_poll_delay_ms: 10,
            ..ServiceConfig::default()
        };

        Self::with_config(config, external)
    }

    fn with_config(config: ServiceConfig, external: MockServer) -> Self {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(store.clone(), config);
        let router: Router = create_router(state);

        let server = TestServer::new(router).expect("Failed to create test server");

        Self {
            server,
            store,
            external,
        }
    }

    /// Store a user profile.
    pub fn seed_user(&self, user_id: &str, name: &str, email: &str) {
        self.store
            .put_user(&UserProfile::new(user_id, name, email))
            .unwrap();
    }

    /// Store a paid reference with the given status.
    pub fn seed_paid_reference(&self, reference: &str, status: ReferenceStatus) {
        let mut record = ReferenceRecord::pending(reference.parse().unwrap(), snapshot());
        record.status = status;
        self.store.put_reference(&record).unwrap();
    }

    /// Store a settled free reservation.
    pub fn seed_free_reference(&self, reference: &str) {
        self.store
            .put_reference(&ReferenceRecord::free(reference.parse().unwrap(), snapshot()))
            .unwrap();
    }

    /// Read a reference back.
    pub fn reference(&self, reference: &str) -> ReferenceRecord {
        self.store
            .get_reference(&reference.parse().unwrap())
            .unwrap()
            .expect("reference should exist")
    }
}

/// The booking every seeded reference carries.
pub fn snapshot() -> TicketSnapshot {
    TicketSnapshot {
        user_id: "user-ada".into(),
        event_id: "event-jazz".into(),
        event_name: "Lagos Jazz Night".into(),
        ticket_type: "VIP".into(),
        ticket_price: 1_000_000,
        service_fee: 50_000,
        total_amount: 1_050_000,
        event_venue: Some("Muri Okunola Park".into()),
        event_date: Some("2024-12-20".into()),
        event_time: Some("19:00".into()),
        ..TicketSnapshot::default()
    }
}

/// Signature header for a webhook body.
pub fn signature_header(body: &[u8], secret: &str) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("x-paystack-signature"),
        HeaderValue::from_str(&hmac_sha512_hex(secret, body)).unwrap(),
    )
}

/// Whether `value` looks like `SPTX-TX-\d{2,8}[A-Z]\d{0,7}[A-Z]\d{0,7}`.
pub fn is_ticket_id(value: &Value) -> bool {
    value
        .as_str()
        .is_some_and(sptx_core::TicketId::is_well_formed)
}
