//! Read-after-write convergence polling
//!
//! The gateway applies connection writes through an asynchronous metadata
//! deployment, so a save or delete that has been acknowledged is not
//! guaranteed to be visible on the next read. Instead of sleeping a fixed
//! interval and hoping, callers poll the read path until it reflects the
//! write, bounded by an attempt count and a wall-clock timeout.
//!
//! A probe that errors counts as "not yet converged": visibility lag is a
//! mitigation concern, not an error path, so probe failures are logged and
//! never surfaced past this module.

use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use log::{debug, warn};
use tokio::time::Instant;

/// Bounds for a convergence poll
#[derive(Debug, Clone)]
pub struct ConvergenceConfig {
    /// Maximum number of read-path probes
    pub max_probes: u32,
    /// Delay before the first probe
    pub initial_delay: Duration,
    /// Cap on the per-probe delay
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
    /// Overall deadline across all probes and delays
    pub timeout: Duration,
}

impl Default for ConvergenceConfig {
    fn default() -> Self {
        Self {
            max_probes: 6,
            initial_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(15),
            backoff_multiplier: 2.0,
            timeout: Duration::from_secs(60),
        }
    }
}

impl ConvergenceConfig {
    /// No waiting between probes. For tests.
    pub fn immediate() -> Self {
        Self {
            max_probes: 6,
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            backoff_multiplier: 1.0,
            timeout: Duration::from_secs(60),
        }
    }

    fn delay_before(&self, probe: u32) -> Duration {
        let millis = self.initial_delay.as_millis() as f64
            * self.backoff_multiplier.powi(probe.saturating_sub(1) as i32);
        Duration::from_millis(millis.min(self.max_delay.as_millis() as f64) as u64)
    }
}

/// Outcome of a convergence poll
#[derive(Debug)]
pub enum Convergence<T> {
    /// The read path reflects the write; `value` is what the final probe saw
    Converged { value: T, probes: u32 },
    /// Bounds exhausted without observing the write
    Stale { probes: u32, elapsed: Duration },
}

impl<T> Convergence<T> {
    pub fn is_converged(&self) -> bool {
        matches!(self, Convergence::Converged { .. })
    }
}

/// Poll `probe` until it reports convergence or the configured bounds run
/// out. The probe returns `Some(value)` once the read path reflects the
/// write, `None` while it does not.
pub async fn poll_until_converged<T, F, Fut>(
    config: &ConvergenceConfig,
    what: &str,
    mut probe: F,
) -> Convergence<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    let started = Instant::now();
    let mut probes = 0;

    while probes < config.max_probes && started.elapsed() < config.timeout {
        tokio::time::sleep(config.delay_before(probes + 1)).await;
        probes += 1;

        match probe().await {
            Ok(Some(value)) => {
                debug!("{} converged after {} probe(s)", what, probes);
                return Convergence::Converged { value, probes };
            }
            Ok(None) => {
                debug!("{} not yet visible after probe {}", what, probes);
            }
            Err(error) => {
                // Logged only; a failed probe must not become a user-facing error
                warn!("{} convergence probe {} failed: {:#}", what, probes, error);
            }
        }
    }

    let elapsed = started.elapsed();
    warn!(
        "{} still stale after {} probe(s) over {:?}",
        what, probes, elapsed
    );
    Convergence::Stale { probes, elapsed }
}
