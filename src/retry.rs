//! Retry logic with a fixed backoff
//!
//! This module drives a fallible async operation through a bounded number of
//! attempts. Whether a failure is retried, and whether the backoff interval is
//! slept first, is decided entirely by the error's [`IsRetryable`]
//! implementation.
//!
//! # Example
//!
//! ```no_run
//! use site_harvest::retry::{IsRetryable, RetryPolicy, run_with_retry};
//! use std::time::Duration;
//!
//! #[derive(Debug)]
//! enum MyError {
//!     Transient,
//!     Permanent,
//! }
//!
//! impl std::fmt::Display for MyError {
//!     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
//!         write!(f, "{:?}", self)
//!     }
//! }
//!
//! impl IsRetryable for MyError {
//!     fn is_retryable(&self) -> bool {
//!         matches!(self, MyError::Transient)
//!     }
//! }
//!
//! # async fn example() -> Result<(), MyError> {
//! let policy = RetryPolicy::new(3, Duration::from_secs(2));
//! let value = run_with_retry(&policy, |_attempt| async {
//!     Ok::<_, MyError>(42)
//! })
//! .await?;
//! # Ok(())
//! # }
//! ```

use crate::config::FetchConfig;
use crate::types::ErrorKind;
use std::future::Future;
use std::time::Duration;

/// Trait for errors that can be classified as retryable or not
///
/// Transient failures (timeouts, refused or reset connections, empty bodies)
/// return `true`. Permanent failures (error status codes, malformed requests)
/// return `false`.
pub trait IsRetryable {
    /// Returns true if the error is transient and the operation should be retried
    fn is_retryable(&self) -> bool;

    /// Returns true if the backoff interval should be slept before retrying
    ///
    /// Only consulted for retryable errors.
    fn backs_off(&self) -> bool {
        self.is_retryable()
    }
}

impl IsRetryable for ErrorKind {
    fn is_retryable(&self) -> bool {
        ErrorKind::is_retryable(self)
    }

    fn backs_off(&self) -> bool {
        ErrorKind::backs_off(self)
    }
}

/// Attempt budget and backoff interval for one operation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: Duration,
}

impl RetryPolicy {
    /// Create a policy; a budget of 0 is treated as a single attempt
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    /// Policy taken from the fetch configuration
    pub fn from_config(config: &FetchConfig) -> Self {
        Self::new(config.max_attempts, config.backoff)
    }

    /// Total number of attempts allowed, including the first
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Fixed delay between a backing-off failure and the next attempt
    pub fn backoff(&self) -> Duration {
        self.backoff
    }

    /// Decide what happens after `attempt` (1-based) failed with `error`
    pub fn decide<E: IsRetryable>(&self, attempt: u32, error: &E) -> RetryDecision {
        if !error.is_retryable() {
            return RetryDecision::Abort;
        }
        if attempt >= self.max_attempts {
            return RetryDecision::Exhausted;
        }
        if error.backs_off() {
            RetryDecision::RetryAfter(self.backoff)
        } else {
            RetryDecision::RetryNow
        }
    }
}

/// What to do after a failed attempt
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RetryDecision {
    /// Sleep for the given interval, then try again
    RetryAfter(Duration),
    /// Try again immediately
    RetryNow,
    /// Retryable, but the attempt budget is spent
    Exhausted,
    /// Not retryable
    Abort,
}

/// Execute an async operation, retrying transient failures per `policy`
///
/// The closure receives the 1-based attempt number. Returns the first
/// success, or the error from the last attempt made.
pub async fn run_with_retry<F, Fut, T, E>(policy: &RetryPolicy, mut operation: F) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: IsRetryable + std::fmt::Display,
{
    let mut attempt = 1;

    loop {
        match operation(attempt).await {
            Ok(result) => {
                if attempt > 1 {
                    tracing::info!(attempts = attempt, "Operation succeeded after retry");
                }
                return Ok(result);
            }
            Err(e) => match policy.decide(attempt, &e) {
                RetryDecision::RetryAfter(delay) => {
                    tracing::warn!(
                        error = %e,
                        attempt,
                        max_attempts = policy.max_attempts,
                        delay_ms = delay.as_millis(),
                        "Attempt failed, retrying after backoff"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                RetryDecision::RetryNow => {
                    tracing::warn!(
                        error = %e,
                        attempt,
                        max_attempts = policy.max_attempts,
                        "Attempt failed, retrying immediately"
                    );
                    attempt += 1;
                }
                RetryDecision::Exhausted => {
                    tracing::error!(
                        error = %e,
                        attempts = attempt,
                        "Operation failed after all attempts exhausted"
                    );
                    return Err(e);
                }
                RetryDecision::Abort => {
                    tracing::error!(error = %e, attempt, "Operation failed with non-retryable error");
                    return Err(e);
                }
            },
        }
    }
}
