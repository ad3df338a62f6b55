//! Resilience configuration
//!
//! Bundles the retry policy for gateway calls and the convergence bounds
//! for read-after-write polling, with sane defaults.

use super::convergence::ConvergenceConfig;
use super::retry::RetryConfig;

/// Global resilience configuration for gateway operations
#[derive(Debug, Clone, Default)]
pub struct ResilienceConfig {
    pub retry: RetryConfig,
    pub convergence: ConvergenceConfig,
}

impl ResilienceConfig {
    /// Fewer retries, longer convergence patience. For production use.
    pub fn conservative() -> Self {
        Self {
            retry: RetryConfig::conservative(),
            convergence: ConvergenceConfig {
                max_probes: 8,
                timeout: std::time::Duration::from_secs(120),
                ..ConvergenceConfig::default()
            },
        }
    }

    /// No waiting anywhere. For tests.
    pub fn immediate() -> Self {
        Self {
            retry: RetryConfig::disabled(),
            convergence: ConvergenceConfig::immediate(),
        }
    }
}
