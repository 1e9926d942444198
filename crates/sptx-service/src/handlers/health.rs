//! Health check handlers.
//!
//! Every route group answers its own liveness probe with a static payload.

use axum::Json;
use serde::Serialize;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: &'static str,
    /// Service name.
    pub service: &'static str,
    /// Route group being probed.
    pub component: &'static str,
    /// Service version.
    pub version: &'static str,
}

fn liveness(component: &'static str) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "sptx",
        component,
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    liveness("service")
}

/// `GET /payment/health`
pub async fn payment() -> Json<HealthResponse> {
    liveness("payment")
}

/// `GET /webhook/health`
pub async fn webhook() -> Json<HealthResponse> {
    liveness("webhook")
}

/// `GET /ticket/health`
pub async fn ticket() -> Json<HealthResponse> {
    liveness("ticket")
}

/// `GET /verify/health`
pub async fn verify() -> Json<HealthResponse> {
    liveness("verify")
}

/// `GET /enhance/health`
pub async fn enhance() -> Json<HealthResponse> {
    liveness("enhance")
}

/// `GET /mail/health`
pub async fn mail() -> Json<HealthResponse> {
    liveness("mail")
}

/// `GET /notify/health`
pub async fn notify() -> Json<HealthResponse> {
    liveness("notify")
}
