//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{banks, enhance, health, mail, payments, tickets, webhooks};
use crate::state::AppState;

/// Maximum concurrent requests across the client-facing API.
const API_MAX_CONCURRENT_REQUESTS: usize = 100;

/// Maximum concurrent ticket issuances. Each may hold its request open for
/// the whole payment poll.
const TICKET_MAX_CONCURRENT_REQUESTS: usize = 50;

/// Create the service router with all routes and middleware.
///
/// # Routes
///
/// ## Payments
/// - `POST /payment` - Initialize a charge
/// - `GET /payment/verify?reference=` - Gateway verification
/// - `GET /verify-payment?ref=` - Stored reference status
///
/// ## Tickets (rate-limited)
/// - `POST /ticket/iwss` - Issue a paid ticket
/// - `POST /ticket/free` - Issue a free ticket
/// - `POST /ticket/free/reserve` - Reserve a free ticket
///
/// ## Webhooks (signature verification, no rate limit)
/// - `POST /webhook` - Paystack charge events
/// - `POST /webhook/ticket` - Paystack charge events for ticket purchases
///
/// ## Utilities
/// - `GET /verify?accountNumber=&bankName=` - Resolve a bank account
/// - `POST /enhance` - Rewrite an event description
/// - `POST /mail/send`, `POST /mail/ticket` - Template email
/// - `POST /notify` - Trigger a notification workflow
///
/// Every group also answers `GET .../health`.
pub fn create_router(state: AppState) -> Router {
    // Extract config values before moving state
    let cors_origins = state.config.cors_origins.clone();
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout_seconds = state.config.request_timeout_seconds;

    let cors = build_cors_layer(&cors_origins);

    let state = Arc::new(state);

    let ticket_routes = Router::new()
        .route("/iwss", post(tickets::issue_paid_ticket))
        .route("/free", post(tickets::issue_free_ticket))
        .route("/free/reserve", post(tickets::reserve_free_ticket))
        .layer(ConcurrencyLimitLayer::new(TICKET_MAX_CONCURRENT_REQUESTS));

    let api_routes = Router::new()
        // Payments
        .route("/payment", post(payments::initialize_payment))
        .route("/payment/verify", get(payments::verify_payment))
        .route("/verify-payment", get(payments::verify_reference))
        // Tickets (with their own concurrency limit)
        .nest("/ticket", ticket_routes)
        // Utilities
        .route("/verify", get(banks::resolve_account))
        .route("/enhance", post(enhance::enhance_description))
        .route("/mail/send", post(mail::send_mail))
        .route("/mail/ticket", post(mail::send_ticket_mail))
        .route("/notify", post(mail::notify))
        .layer(ConcurrencyLimitLayer::new(API_MAX_CONCURRENT_REQUESTS));

    Router::new()
        // Health (public, no rate limit)
        .route("/health", get(health::health))
        .route("/payment/health", get(health::payment))
        .route("/webhook/health", get(health::webhook))
        .route("/ticket/health", get(health::ticket))
        .route("/verify/health", get(health::verify))
        .route("/enhance/health", get(health::enhance))
        .route("/mail/health", get(health::mail))
        .route("/notify/health", get(health::notify))
        .merge(api_routes)
        // Webhooks (no rate limit - controlled by the gateway)
        .route("/webhook", post(webhooks::paystack_webhook))
        .route("/webhook/ticket", post(webhooks::ticket_webhook))
        // Global middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            request_timeout_seconds,
        )))
        .with_state(state)
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
