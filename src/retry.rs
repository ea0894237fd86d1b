//! Bounded re-invocation of fallible async operations.
//!
//! Every failure counts as retryable and attempts follow each other without
//! delay. When attempts run out the error of the last attempt is returned
//! and earlier ones are dropped.

use crate::error::{ClientError, ClientResult};
use log::{debug, warn};
use std::fmt::Display;
use std::future::Future;

/// How many times an operation may be invoked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> ClientResult<Self> {
        if max_attempts < 1 {
            return Err(ClientError::invalid_argument(format!(
                "max_attempts must be at least 1, got {}",
                max_attempts
            )));
        }
        Ok(Self { max_attempts })
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Invoke `operation` until it succeeds or the attempts are used up
    pub async fn run<F, Fut, T, E>(&self, operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        self.run_counted(operation).await.0
    }

    /// Like [`run`](Self::run), also returning how many times `operation`
    /// was invoked. The error, if any, is the one from the last attempt.
    pub async fn run_counted<F, Fut, T, E>(&self, mut operation: F) -> (Result<T, E>, u32)
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let mut attempt = 1;
        loop {
            match operation().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!("Succeeded on attempt {}/{}", attempt, self.max_attempts);
                    }
                    return (Ok(value), attempt);
                }
                Err(e) if attempt >= self.max_attempts => {
                    warn!("Giving up after {} attempt(s): {}", attempt, e);
                    return (Err(e), attempt);
                }
                Err(e) => {
                    warn!(
                        "Attempt {}/{} failed ({}), retrying...",
                        attempt, self.max_attempts, e
                    );
                    attempt += 1;
                }
            }
        }
    }
}

/// Run `operation` up to `max_attempts` times.
///
/// `max_attempts < 1` fails with [`ClientError::InvalidArgument`] without
/// invoking the operation.
pub async fn retry<F, Fut, T, E>(max_attempts: u32, operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display + From<ClientError>,
{
    let policy = RetryPolicy::new(max_attempts)?;
    policy.run(operation).await
}
