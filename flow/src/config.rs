//! Flow configuration.

use std::time::Duration;

use coinswap_catalog::{CurrencyCacheConfig, ResolverConfig};
use coinswap_common::{constants, DurationExt};
use coinswap_gateway::GatewayConfig;

/// Amount step configuration.
#[derive(Debug, Clone)]
pub struct AmountConfig {
    /// Pause before re-entering the step after a below-minimum rejection.
    pub reentry_delay: Duration,
    /// Input that returns to destination currency selection.
    pub back_label: String,
}

impl Default for AmountConfig {
    fn default() -> Self {
        Self {
            reentry_delay: constants::below_minimum_reentry_delay().as_std(),
            back_label: "Back".to_string(),
        }
    }
}

/// Main flow configuration.
#[derive(Debug, Clone)]
pub struct FlowConfig {
    /// Messages older than this are dropped unhandled.
    pub message_max_age: Duration,
    /// Amount step configuration.
    pub amount_config: AmountConfig,
    /// Upstream gateway configuration.
    pub gateway_config: GatewayConfig,
    /// Currency cache configuration.
    pub cache_config: CurrencyCacheConfig,
    /// Fuzzy resolver configuration.
    pub resolver_config: ResolverConfig,
    /// Log level.
    pub log_level: String,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            message_max_age: constants::message_max_age().as_std(),
            amount_config: AmountConfig::default(),
            gateway_config: GatewayConfig::default(),
            cache_config: CurrencyCacheConfig::default(),
            resolver_config: ResolverConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

impl FlowConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self {
            gateway_config: GatewayConfig::from_env(),
            ..Self::default()
        };

        if let Ok(secs) = std::env::var("MESSAGE_MAX_AGE_SECS") {
            if let Ok(secs) = secs.parse() {
                config.message_max_age = Duration::from_secs(secs);
            }
        }

        if let Ok(ms) = std::env::var("BELOW_MINIMUM_REENTRY_MS") {
            if let Ok(ms) = ms.parse() {
                config.amount_config.reentry_delay = Duration::from_millis(ms);
            }
        }

        if let Ok(level) = std::env::var("LOG_LEVEL") {
            config.log_level = level;
        }

        config
    }

    /// Filter directive for the log subscriber: `rust_log` when given, else `log_level`.
    pub fn log_filter(&self, rust_log: Option<String>) -> String {
        rust_log
            .filter(|directive| !directive.trim().is_empty())
            .unwrap_or_else(|| self.log_level.clone())
    }

    /// Validate configuration, excluding the gateway credentials.
    pub fn validate(&self) -> Result<(), String> {
        if self.message_max_age.is_zero() {
            return Err("Message max age cannot be zero".to_string());
        }

        if self.amount_config.back_label.trim().is_empty() {
            return Err("Back label cannot be empty".to_string());
        }

        if self.cache_config.ttl <= chrono::Duration::zero() {
            return Err("Catalog TTL must be positive".to_string());
        }

        self.resolver_config.validate()
    }

    /// Validate configuration including the gateway section.
    pub fn validate_all(&self) -> Result<(), String> {
        self.validate()?;
        self.gateway_config.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FlowConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.message_max_age, Duration::from_secs(300));
        assert_eq!(config.amount_config.reentry_delay, Duration::from_millis(500));
    }

    #[test]
    fn test_invalid_config() {
        let mut config = FlowConfig::default();
        config.message_max_age = Duration::ZERO;
        assert!(config.validate().is_err());

        let mut config = FlowConfig::default();
        config.resolver_config.threshold = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_log_filter_falls_back_to_log_level() {
        let config = FlowConfig {
            log_level: "debug".to_string(),
            ..FlowConfig::default()
        };

        assert_eq!(config.log_filter(None), "debug");
        assert_eq!(config.log_filter(Some(" ".to_string())), "debug");
        assert_eq!(
            config.log_filter(Some("coinswap_flow=trace".to_string())),
            "coinswap_flow=trace"
        );
    }

    #[test]
    fn test_gateway_section_needs_api_key() {
        let config = FlowConfig::default();
        assert!(config.validate_all().is_err());
    }
}
