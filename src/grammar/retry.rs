//! Bounded retry with exponential backoff.
//!
//! Only [`CheckError::UpstreamTransient`] is retried. Everything else ends
//! the run on the attempt that produced it.

use std::future::Future;
use std::time::Duration;

use tracing::{error, info, warn};

use super::CheckError;

/// Retry strategy configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    /// Delay after the first failed attempt
    pub initial_backoff: Duration,
    /// Growth factor applied per failed attempt
    pub multiplier: u32,
    /// Upper bound for a single delay
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_secs(1),
            multiplier: 2,
            max_backoff: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after the `failures`-th consecutive failure (1-based).
    pub fn backoff_after(&self, failures: u32) -> Duration {
        let factor = self
            .multiplier
            .saturating_pow(failures.saturating_sub(1));
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

/// Result of a retried operation plus how many attempts it took.
#[derive(Debug)]
pub struct Outcome<T> {
    pub result: Result<T, CheckError>,
    pub attempts: u32,
}

impl<T> Outcome<T> {
    pub fn into_result(self) -> Result<T, CheckError> {
        self.result
    }
}

/// Run `operation` under `policy`.
///
/// The backoff sleep is a tokio timer, so only the calling task is
/// suspended.
pub async fn execute<T, F, Fut>(policy: &RetryPolicy, mut operation: F) -> Outcome<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, CheckError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempts = 0;

    loop {
        attempts += 1;

        let err = match operation().await {
            Ok(value) => {
                if attempts > 1 {
                    info!(attempts, "Operation succeeded after retry");
                }
                return Outcome {
                    result: Ok(value),
                    attempts,
                };
            }
            Err(err) => err,
        };

        match err {
            CheckError::UpstreamTransient(last) => {
                if attempts >= max_attempts {
                    error!(attempts, "Giving up after transient failures: {}", last);
                    return Outcome {
                        result: Err(CheckError::RetriesExhausted { attempts, last }),
                        attempts,
                    };
                }

                let delay = policy.backoff_after(attempts);
                warn!(
                    attempt = attempts,
                    max_attempts,
                    "Attempt failed with {}, retrying in {:?}: {}",
                    last.kind,
                    delay,
                    last.message
                );
                tokio::time::sleep(delay).await;
            }
            err @ (CheckError::UpstreamFatal(_)
            | CheckError::Parse(_)
            | CheckError::Unexpected(_)
            | CheckError::RetriesExhausted { .. }) => {
                error!(attempts, "Request failed (non-retryable): {}", err);
                return Outcome {
                    result: Err(err),
                    attempts,
                };
            }
        }
    }
}
