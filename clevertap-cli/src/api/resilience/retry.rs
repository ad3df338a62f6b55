//! Retry policy with exponential backoff
//!
//! Transient transport failures against the sync gateway are retried with
//! exponential backoff and optional jitter. Anything the gateway rejects
//! outright (4xx-style application errors) is not retried.

use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use log::warn;
use rand::Rng;

/// Configuration for the retry policy
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total attempts including the first one
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }
}

impl RetryConfig {
    /// Fewer attempts, longer waits. For production use.
    pub fn conservative() -> Self {
        Self {
            max_attempts: 2,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 3.0,
            jitter: true,
        }
    }

    /// More attempts, shorter waits. For development.
    pub fn aggressive() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(10),
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }

    /// Single attempt, no waiting. For tests.
    pub fn disabled() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            backoff_multiplier: 1.0,
            jitter: false,
        }
    }
}

/// Errors the policy considers transient
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryableError {
    /// Connection-level failure (DNS, refused, reset)
    Transport,
    /// Request timed out
    Timeout,
    /// Server-side failure status (5xx, 429)
    ServerStatus(u16),
}

impl RetryableError {
    /// Classify an error chain; None means the error is not retryable
    pub fn classify(error: &anyhow::Error) -> Option<Self> {
        if let Some(req_err) = error.downcast_ref::<reqwest::Error>() {
            if req_err.is_timeout() {
                return Some(RetryableError::Timeout);
            }
            if let Some(status) = req_err.status() {
                if status.is_server_error() || status.as_u16() == 429 {
                    return Some(RetryableError::ServerStatus(status.as_u16()));
                }
                return None;
            }
            if req_err.is_connect() || req_err.is_request() {
                return Some(RetryableError::Transport);
            }
        }
        None
    }
}

/// Executes operations under a [`RetryConfig`]
#[derive(Debug, Clone, Default)]
pub struct RetryPolicy {
    config: RetryConfig,
}

impl RetryPolicy {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Backoff delay before the given retry (attempt is 1-based; the delay
    /// precedes attempt `attempt + 1`)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exp = self
            .config
            .base_delay
            .as_millis() as f64
            * self.config.backoff_multiplier.powi(attempt.saturating_sub(1) as i32);
        let capped = exp.min(self.config.max_delay.as_millis() as f64);
        let millis = if self.config.jitter {
            // Full jitter keeps concurrent clients from retrying in lockstep
            rand::rng().random_range(0.0..=capped)
        } else {
            capped
        };
        Duration::from_millis(millis as u64)
    }

    /// Run `operation`, retrying transient failures up to the configured
    /// attempt count. The final error is returned unchanged.
    pub async fn execute<T, F, Fut>(&self, name: &str, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 1;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(error) => {
                    let transient = RetryableError::classify(&error);
                    if transient.is_none() || attempt >= self.config.max_attempts {
                        return Err(error);
                    }
                    let delay = self.delay_for(attempt);
                    warn!(
                        "{} failed with {:?} (attempt {}/{}), retrying in {:?}",
                        name, transient, attempt, self.config.max_attempts, delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
