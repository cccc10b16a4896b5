//! Node configuration: defaults with environment overrides.

use std::time::Duration;
use survey_settlement::SettlementConfig;

/// Runtime parameters for one node.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Human-readable name used in logs.
    pub display_name: String,
    /// Window for countersigning and trade round trips, in milliseconds.
    pub exchange_timeout_ms: u64,
    /// Window for oracle round trips, in milliseconds.
    pub oracle_timeout_ms: u64,
    /// Window for post-commit distribution acks, in milliseconds.
    pub notify_timeout_ms: u64,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            display_name: "node".to_string(),
            exchange_timeout_ms: 10_000,
            oracle_timeout_ms: 10_000,
            notify_timeout_ms: 5_000,
        }
    }
}

impl NodeConfig {
    /// Defaults overridden by `SURVEY_*_TIMEOUT_MS` environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(ms) = std::env::var("SURVEY_EXCHANGE_TIMEOUT_MS") {
            if let Ok(ms) = ms.parse() {
                config.exchange_timeout_ms = ms;
            }
        }
        if let Ok(ms) = std::env::var("SURVEY_ORACLE_TIMEOUT_MS") {
            if let Ok(ms) = ms.parse() {
                config.oracle_timeout_ms = ms;
            }
        }
        if let Ok(ms) = std::env::var("SURVEY_NOTIFY_TIMEOUT_MS") {
            if let Ok(ms) = ms.parse() {
                config.notify_timeout_ms = ms;
            }
        }
        config
    }

    pub fn settlement(&self) -> SettlementConfig {
        SettlementConfig {
            exchange_timeout: Duration::from_millis(self.exchange_timeout_ms),
            oracle_timeout: Duration::from_millis(self.oracle_timeout_ms),
            notify_timeout: Duration::from_millis(self.notify_timeout_ms),
        }
    }
}
