//! Configurable retry policy shared by the catalog and gateway clients.
//!
//! [`RetryPolicy::run`] wraps any fallible async operation. The caller decides
//! which errors are transient through a predicate; everything else is returned
//! on the first failure. Delays come from a [`Backoff`] schedule.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Delay schedule between attempts.
///
/// The `retry` argument of [`Backoff::delay_for`] counts from 1 for the first
/// retry (i.e. the second attempt).
#[derive(Debug, Clone, Copy)]
pub enum Backoff {
    /// Same delay before every retry.
    Fixed(Duration),
    /// `base * 2^(retry - 1)`, capped at `max`.
    Exponential { base: Duration, max: Duration },
    /// Caller-supplied schedule.
    Custom(fn(u32) -> Duration),
}

impl Backoff {
    #[must_use]
    pub fn delay_for(&self, retry: u32) -> Duration {
        match *self {
            Backoff::Fixed(delay) => delay,
            Backoff::Exponential { base, max } => {
                let factor = 1u32 << retry.saturating_sub(1).min(20);
                base.saturating_mul(factor).min(max)
            }
            Backoff::Custom(schedule) => schedule(retry),
        }
    }
}

/// How many times to retry and how long to wait in between.
///
/// `max_retries` counts additional attempts after the first, so a policy with
/// `max_retries = 3` calls the operation at most 4 times.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff: Backoff,
}

impl RetryPolicy {
    /// Single attempt, no retries.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            max_retries: 0,
            backoff: Backoff::Fixed(Duration::ZERO),
        }
    }

    #[must_use]
    pub const fn fixed(max_retries: u32, delay: Duration) -> Self {
        Self {
            max_retries,
            backoff: Backoff::Fixed(delay),
        }
    }

    /// Exponential backoff capped at 30 seconds per wait.
    #[must_use]
    pub const fn exponential(max_retries: u32, base: Duration) -> Self {
        Self {
            max_retries,
            backoff: Backoff::Exponential {
                base,
                max: Duration::from_secs(30),
            },
        }
    }

    /// Total number of times the operation may be called.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Runs `operation` until it succeeds, returns an error `is_retriable`
    /// rejects, or the retry budget is spent. The last error is returned.
    ///
    /// # Errors
    ///
    /// Propagates the error of the final attempt.
    pub async fn run<T, E, F, Fut, P>(&self, is_retriable: P, mut operation: F) -> Result<T, E>
    where
        E: Display,
        P: Fn(&E) -> bool,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut retry = 0u32;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if !is_retriable(&err) || retry >= self.max_retries {
                        return Err(err);
                    }
                    retry += 1;
                    let delay = self.backoff.delay_for(retry);
                    tracing::warn!(
                        retry,
                        max_retries = self.max_retries,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %err,
                        "transient error, retrying after delay"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
