//! Bounded polling with backoff.
//!
//! Used for in-request waits such as re-reading a payment status until the
//! gateway webhook lands. The wait lives inside the request future, so it is
//! cancelled whenever that future is dropped: on client disconnect or when the
//! router's timeout layer fires.

use std::future::Future;
use std::time::Duration;

/// How many times to try and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Treated as at least 1.
    pub attempts: u32,
    /// Delay after the first unsuccessful attempt.
    pub delay: Duration,
    /// Factor applied to the delay after each further attempt (1 = fixed).
    pub multiplier: u32,
    /// Upper bound on any single delay.
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// A fixed delay between attempts.
    #[must_use]
    pub const fn fixed(attempts: u32, delay: Duration) -> Self {
        Self {
            attempts,
            delay,
            multiplier: 1,
            max_delay: delay,
        }
    }

    /// Grow the delay by `multiplier` after every attempt, up to `max_delay`.
    #[must_use]
    pub const fn with_backoff(mut self, multiplier: u32, max_delay: Duration) -> Self {
        self.multiplier = multiplier;
        self.max_delay = max_delay;
        self
    }

    fn next_delay(&self, current: Duration) -> Duration {
        current
            .saturating_mul(self.multiplier.max(1))
            .min(self.max_delay.max(self.delay))
    }
}

/// Result of one polling attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempt<T> {
    /// Finished; stop polling.
    Done(T),
    /// Not ready yet; try again after the delay.
    Retry,
}

/// Result of a whole polling run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome<T> {
    /// An attempt finished.
    Ready(T),
    /// Every attempt asked to retry.
    Exhausted {
        /// How many attempts were made.
        attempts: u32,
    },
}

/// Run `op` until it returns `Attempt::Done`, an error, or attempts run out.
///
/// `op` receives the 1-based attempt number. No delay follows the final
/// attempt. Errors from `op` end polling immediately.
pub async fn poll<T, E, F, Fut>(policy: RetryPolicy, mut op: F) -> Result<PollOutcome<T>, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Attempt<T>, E>>,
{
    let attempts = policy.attempts.max(1);
    let mut delay = policy.delay;

    for attempt in 1..=attempts {
        if let Attempt::Done(value) = op(attempt).await? {
            return Ok(PollOutcome::Ready(value));
        }

        if attempt < attempts {
            tracing::debug!(
                attempt = %attempt,
                delay_ms = %delay.as_millis(),
                "Not ready yet, waiting before next attempt"
            );
            tokio::time::sleep(delay).await;
            delay = policy.next_delay(delay);
        }
    }

    Ok(PollOutcome::Exhausted { attempts })
}
