//! Retry policy with exponential backoff and jitter
//!
//! Every attempt is bounded by a timeout. Delays grow as
//! `initial_delay * 2^retry`, are capped at `max_delay`, and get ±25% jitter.

use rand::Rng;
use std::fmt;
use std::future::Future;
use std::time::Duration;

use crate::config::RetrySettings;

/// Why a retried operation gave up
#[derive(Debug)]
pub enum RetryError<E> {
    /// Every attempt failed; carries the last error
    Exhausted { attempts: u32, last: E },
    /// Every attempt timed out (or the last one did)
    TimedOut { attempts: u32, timeout: Duration },
    /// The error was classified as not worth retrying
    Permanent(E),
}

impl<E> RetryError<E> {
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Exhausted { attempts, .. } | Self::TimedOut { attempts, .. } => *attempts,
            Self::Permanent(_) => 1,
        }
    }

    /// The underlying error, if the last attempt produced one
    pub fn into_inner(self) -> Option<E> {
        match self {
            Self::Exhausted { last, .. } | Self::Permanent(last) => Some(last),
            Self::TimedOut { .. } => None,
        }
    }
}

impl<E: fmt::Display> fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exhausted { attempts, last } => {
                write!(f, "gave up after {attempts} attempts: {last}")
            }
            Self::TimedOut { attempts, timeout } => {
                write!(f, "timed out after {attempts} attempts ({timeout:?} each)")
            }
            Self::Permanent(e) => write!(f, "permanent failure: {e}"),
        }
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for RetryError<E> {}

/// Bounded retry policy
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    initial_delay: Duration,
    max_delay: Duration,
    attempt_timeout: Duration,
    jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(5),
            attempt_timeout: Duration::from_secs(15),
            jitter: true,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, attempt_timeout: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            attempt_timeout,
            ..Self::default()
        }
    }

    pub fn from_settings(settings: &RetrySettings) -> Self {
        Self::new(
            settings.max_attempts,
            Duration::from_secs(settings.attempt_timeout_secs),
        )
    }

    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    pub fn without_jitter(mut self) -> Self {
        self.jitter = false;
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn attempt_timeout(&self) -> Duration {
        self.attempt_timeout
    }

    /// Delay before retry number `retry` (0-based)
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry);
        let delay = self.initial_delay.saturating_mul(factor).min(self.max_delay);

        if self.jitter {
            let jitter_factor = rand::thread_rng().gen_range(0.75..=1.25);
            delay.mul_f64(jitter_factor)
        } else {
            delay
        }
    }

    /// Run `operation`, retrying every failure
    pub async fn run<T, E, F, Fut>(&self, name: &str, operation: F) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        self.run_when(name, operation, |_| true).await
    }

    /// Run `operation`, retrying only failures accepted by `retryable`
    pub async fn run_when<T, E, F, Fut, P>(
        &self,
        name: &str,
        mut operation: F,
        retryable: P,
    ) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
        P: Fn(&E) -> bool,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;

            let failure = match tokio::time::timeout(self.attempt_timeout, operation()).await {
                Ok(Ok(value)) => {
                    if attempt > 1 {
                        tracing::debug!(operation = name, attempt, "Succeeded after retry");
                    }
                    return Ok(value);
                }
                Ok(Err(e)) => {
                    if !retryable(&e) {
                        return Err(RetryError::Permanent(e));
                    }
                    tracing::warn!(operation = name, attempt, error = %e, "Attempt failed");
                    RetryError::Exhausted { attempts: attempt, last: e }
                }
                Err(_) => {
                    tracing::warn!(
                        operation = name,
                        attempt,
                        timeout_ms = self.attempt_timeout.as_millis() as u64,
                        "Attempt timed out"
                    );
                    RetryError::TimedOut {
                        attempts: attempt,
                        timeout: self.attempt_timeout,
                    }
                }
            };

            if attempt >= self.max_attempts {
                return Err(failure);
            }

            tokio::time::sleep(self.delay_for(attempt - 1)).await;
        }
    }
}
