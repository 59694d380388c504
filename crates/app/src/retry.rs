//! Bounded exponential backoff for units of work that lose a concurrency race.

use std::{fmt::Display, future::Future, time::Duration};

use tokio::time::sleep;
use tracing::{debug, warn};

/// Errors that may succeed when the whole unit of work is attempted again.
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

/// Retry policy for conflicting units of work.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first one.
    pub max_attempts: u32,

    /// Delay before the second attempt.
    pub initial_delay: Duration,

    /// Upper bound for the delay between attempts.
    pub max_delay: Duration,

    /// Factor applied to the delay after each failed attempt.
    pub multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(500),
            multiplier: 2,
        }
    }
}

impl RetryPolicy {
    /// A policy that retries immediately, for tests.
    #[must_use]
    pub const fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            multiplier: 1,
        }
    }

    fn next_delay(&self, delay: Duration) -> Duration {
        delay.saturating_mul(self.multiplier).min(self.max_delay)
    }
}

/// Outcome of a retried operation.
#[derive(Debug)]
pub enum RetryOutcome<T, E> {
    /// The operation succeeded, possibly after retries.
    Done(T),

    /// The operation failed with an error that retrying cannot fix.
    Failed(E),

    /// Every attempt failed with a retryable error; carries the last one.
    Exhausted(E),
}

/// Run `operation` until it succeeds, fails permanently, or runs out of attempts.
pub async fn retry<F, Fut, T, E>(policy: RetryPolicy, mut operation: F) -> RetryOutcome<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Retryable + Display,
{
    let mut attempt = 0;
    let mut delay = policy.initial_delay;

    loop {
        attempt += 1;

        match operation(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(attempt, "unit of work succeeded after retry");
                }

                return RetryOutcome::Done(value);
            }
            Err(error) if !error.is_retryable() => return RetryOutcome::Failed(error),
            Err(error) if attempt >= policy.max_attempts => {
                warn!(attempt, %error, "unit of work exhausted retries");

                return RetryOutcome::Exhausted(error);
            }
            Err(error) => {
                debug!(
                    attempt,
                    %error,
                    delay_ms = delay.as_millis(),
                    "unit of work conflicted, retrying"
                );

                if !delay.is_zero() {
                    sleep(delay).await;
                }

                delay = policy.next_delay(delay);
            }
        }
    }
}
