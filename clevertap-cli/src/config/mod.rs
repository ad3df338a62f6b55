//! Application configuration
//!
//! Settings are read from a TOML file in the platform config directory
//! (`clevertap-cli/config.toml`), then overridden by environment
//! variables. A `.env` file is honored for local development.

use std::path::PathBuf;

use anyhow::{Context, Result};
use log::debug;
use once_cell::sync::OnceCell;
use serde::Deserialize;

use crate::api::resilience::{ConvergenceConfig, ResilienceConfig, RetryConfig};

static APP_CONFIG: OnceCell<AppConfig> = OnceCell::new();

/// Process-wide configuration, loaded once on first access
pub fn global_config() -> Result<&'static AppConfig> {
    APP_CONFIG.get_or_try_init(AppConfig::load)
}

/// Environment variable overriding the gateway base URL
pub const ENV_GATEWAY_URL: &str = "CLEVERTAP_GATEWAY_URL";
/// Environment variable overriding the gateway API key
pub const ENV_API_KEY: &str = "CLEVERTAP_API_KEY";
/// Environment variable pointing at an alternate config file
pub const ENV_CONFIG_PATH: &str = "CLEVERTAP_CLI_CONFIG";

/// Connection details for the sync gateway
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

/// Tunable resilience knobs as they appear in the config file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ResilienceSettings {
    pub retry_max_attempts: Option<u32>,
    pub retry_base_delay_ms: Option<u64>,
    pub convergence_max_probes: Option<u32>,
    pub convergence_timeout_secs: Option<u64>,
}

impl ResilienceSettings {
    /// Materialize a [`ResilienceConfig`], falling back to defaults for
    /// anything unset
    pub fn to_resilience(&self) -> ResilienceConfig {
        let defaults = ResilienceConfig::default();
        ResilienceConfig {
            retry: RetryConfig {
                max_attempts: self.retry_max_attempts.unwrap_or(defaults.retry.max_attempts),
                base_delay: self
                    .retry_base_delay_ms
                    .map(std::time::Duration::from_millis)
                    .unwrap_or(defaults.retry.base_delay),
                ..defaults.retry
            },
            convergence: ConvergenceConfig {
                max_probes: self
                    .convergence_max_probes
                    .unwrap_or(defaults.convergence.max_probes),
                timeout: self
                    .convergence_timeout_secs
                    .map(std::time::Duration::from_secs)
                    .unwrap_or(defaults.convergence.timeout),
                ..defaults.convergence
            },
        }
    }
}

/// Top-level application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub resilience: ResilienceSettings,
}

impl AppConfig {
    /// Load configuration from disk and environment
    pub fn load() -> Result<Self> {
        let path = config_path();
        let mut config = if path.exists() {
            debug!("Loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            toml::from_str::<AppConfig>(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            AppConfig {
                gateway: GatewayConfig {
                    base_url: String::new(),
                    api_key: None,
                    timeout_secs: default_timeout_secs(),
                },
                resilience: ResilienceSettings::default(),
            }
        };

        if let Ok(url) = std::env::var(ENV_GATEWAY_URL) {
            config.gateway.base_url = url;
        }
        if let Ok(key) = std::env::var(ENV_API_KEY) {
            config.gateway.api_key = Some(key);
        }

        if config.gateway.base_url.is_empty() {
            anyhow::bail!(
                "No gateway URL configured. Set {} or add [gateway] base_url to {}",
                ENV_GATEWAY_URL,
                path.display()
            );
        }

        Ok(config)
    }
}

/// Path of the config file, honoring the override variable
pub fn config_path() -> PathBuf {
    if let Ok(path) = std::env::var(ENV_CONFIG_PATH) {
        return PathBuf::from(path);
    }
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("clevertap-cli")
        .join("config.toml")
}
