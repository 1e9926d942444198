//! SPTX HTTP API Service.
//!
//! This crate provides the HTTP API for the SPTX ticketing platform:
//!
//! - Payment initialization and verification through Paystack
//! - Paystack webhook ingestion
//! - Ticket issuance for paid and free references
//! - Bank account resolution
//! - Event description rewriting through a generative-text API
//! - Template email and notification dispatch
//!
//! Ticket issuance is the one workflow with real internal logic; see
//! [`issuance`]. Every other handler validates its input, calls one external
//! service and maps the result.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result
#![allow(clippy::unused_async)] // Health handlers need async for routing

pub mod best_effort;
pub mod config;
pub mod crypto;
pub mod error;
pub mod extract;
pub mod genai;
pub mod handlers;
pub mod issuance;
pub mod mail;
pub mod paystack;
pub mod platform;
pub mod retry;
pub mod routes;
pub mod state;

pub use config::ServiceConfig;
pub use error::ApiError;
pub use genai::GenAiClient;
pub use mail::{Mailer, NotifyClient, TemplateMailClient};
pub use paystack::{PaystackClient, PaystackError};
pub use platform::PlatformClient;
pub use routes::create_router;
pub use state::AppState;
