//! Paystack integration.
//!
//! This module provides a client for the Paystack REST API, covering charge
//! initialization, charge verification and bank-account resolution, plus the
//! static bank-name table used to translate display names into bank codes.

pub mod banks;
mod client;
pub mod types;

pub use banks::bank_code;
pub use client::{PaystackClient, PaystackError};
