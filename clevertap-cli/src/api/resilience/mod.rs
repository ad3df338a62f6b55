//! Resilience features for gateway interactions
//!
//! Retry policies for transient transport failures and bounded
//! read-after-write convergence polling for the gateway's asynchronous
//! metadata deployment.

pub mod config;
pub mod convergence;
pub mod retry;

pub use config::ResilienceConfig;
pub use convergence::{Convergence, ConvergenceConfig, poll_until_converged};
pub use retry::{RetryConfig, RetryPolicy, RetryableError};
