//! API error types and responses.
//!
//! Every non-2xx response carries `{success: false, error, message, ...context}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::{Map, Value};

use sptx_core::{CoreError, IdError};
use sptx_store::StoreError;

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing or invalid webhook signature.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request - invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// The gateway reported the payment failed.
    #[error("payment failed for reference {reference}")]
    PaymentRejected {
        /// The rejected reference.
        reference: String,
    },

    /// The payment was still pending after every status read.
    #[error("payment still processing for reference {reference}")]
    PaymentPending {
        /// The pending reference.
        reference: String,
        /// How many times the status was read.
        attempts: u32,
    },

    /// Ticket identifier assignment failed.
    #[error("transaction failed: {0}")]
    TransactionFailed(String),

    /// A required integration is not configured.
    #[error("{0} is not configured")]
    Configuration(&'static str),

    /// External service error.
    #[error("{service} error: {message}")]
    ExternalService {
        /// The failing service.
        service: &'static str,
        /// Underlying message.
        message: String,
    },

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// An external-service failure.
    pub fn external(service: &'static str, err: impl std::fmt::Display) -> Self {
        Self::ExternalService {
            service,
            message: err.to_string(),
        }
    }

    /// The HTTP status this error maps to.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) | Self::PaymentRejected { .. } | Self::PaymentPending { .. } => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::TransactionFailed(_)
            | Self::Configuration(_)
            | Self::ExternalService { .. }
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The error name reported in the response body.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "Unauthorized",
            Self::BadRequest(_) => "BadRequest",
            Self::NotFound(_) => "NotFound",
            Self::PaymentRejected { .. } => "PaymentRejected",
            Self::PaymentPending { .. } => "PaymentPending",
            Self::TransactionFailed(_) => "TransactionFailed",
            Self::Configuration(_) => "ConfigurationError",
            Self::ExternalService { .. } => "ExternalServiceError",
            Self::Internal(_) => "InternalError",
        }
    }
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    success: bool,
    error: &'static str,
    message: String,
    #[serde(flatten)]
    details: Map<String, Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut details = Map::new();
        let message = match &self {
            Self::Unauthorized(msg) | Self::BadRequest(msg) | Self::NotFound(msg) => msg.clone(),
            Self::PaymentRejected { reference } => {
                details.insert("reference".into(), Value::from(reference.as_str()));
                "Payment failed. No ticket was issued for this reference.".to_string()
            }
            Self::PaymentPending {
                reference,
                attempts,
            } => {
                details.insert("reference".into(), Value::from(reference.as_str()));
                details.insert("attempts".into(), Value::from(*attempts));
                "Payment is still processing. Please retry shortly.".to_string()
            }
            Self::TransactionFailed(msg) => {
                tracing::error!(error = %msg, "Ticket identifier assignment failed");
                format!("Failed to assign ticket identifier: {msg}")
            }
            Self::Configuration(what) => {
                tracing::error!(missing = %what, "Integration not configured");
                self.to_string()
            }
            Self::ExternalService { service, message } => {
                tracing::error!(service = %service, error = %message, "External service error");
                details.insert("service".into(), Value::from(*service));
                message.clone()
            }
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                msg.clone()
            }
        };

        let body = ErrorResponse {
            success: false,
            error: self.name(),
            message,
            details,
        };

        (self.status(), Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => {
                Self::NotFound(format!("{entity} not found: {id}"))
            }
            StoreError::TransactionFailed(msg) => Self::TransactionFailed(msg),
            StoreError::Database(msg) | StoreError::Serialization(msg) => Self::Internal(msg),
        }
    }
}

impl From<IdError> for ApiError {
    fn from(err: IdError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        Self::BadRequest(err.to_string())
    }
}
