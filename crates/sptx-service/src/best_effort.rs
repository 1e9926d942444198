//! Fire-and-report side calls.
//!
//! Inventory, analytics, referral and email calls made during ticket issuance
//! must never change the response. `best_effort` awaits the call, logs the
//! outcome and returns it as a value instead of an error.

use std::fmt::Display;
use std::future::Future;

use serde::Serialize;

/// What happened to one side call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// The call succeeded.
    Completed,
    /// The call failed; the failure was logged.
    Failed,
    /// The call was not attempted (integration not configured, nothing to do).
    Skipped,
}

/// Await `call`, log its result and swallow any error.
pub async fn best_effort<T, E, Fut>(task: &'static str, call: Fut) -> Outcome
where
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    match call.await {
        Ok(_) => {
            tracing::debug!(task = %task, "Side call completed");
            Outcome::Completed
        }
        Err(e) => {
            tracing::warn!(task = %task, error = %e, "Side call failed, continuing");
            Outcome::Failed
        }
    }
}
