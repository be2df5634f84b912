//! Gateway configuration.

use std::time::Duration;

/// Configuration for the upstream HTTP gateways.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Base URL of the exchange provider API.
    pub exchange_api_url: String,
    /// API key sent with every exchange provider request.
    pub exchange_api_key: String,
    /// Base URL of the content catalog API.
    pub content_api_url: String,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            exchange_api_url: "https://api.changenow.io/v1".to_string(),
            exchange_api_key: String::new(),
            content_api_url: "https://content-api.changenow.io".to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl GatewayConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("CN_API_URL") {
            config.exchange_api_url = url;
        }

        if let Ok(key) = std::env::var("CN_API_KEY") {
            config.exchange_api_key = key;
        }

        if let Ok(url) = std::env::var("CONTENT_API_URL") {
            config.content_api_url = url;
        }

        if let Ok(secs) = std::env::var("GATEWAY_REQUEST_TIMEOUT_SECS") {
            if let Ok(secs) = secs.parse() {
                config.request_timeout = Duration::from_secs(secs);
            }
        }

        config
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        for (name, url) in [
            ("Exchange API URL", &self.exchange_api_url),
            ("Content API URL", &self.content_api_url),
        ] {
            if url.is_empty() {
                return Err(format!("{} cannot be empty", name));
            }
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(format!("{} must be an http(s) URL", name));
            }
        }

        if self.exchange_api_key.trim().is_empty() {
            return Err("Exchange API key cannot be empty".to_string());
        }

        if self.request_timeout.is_zero() {
            return Err("Request timeout cannot be zero".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> GatewayConfig {
        GatewayConfig {
            exchange_api_key: "test-key".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_missing_api_key() {
        let config = GatewayConfig::default();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_url() {
        let mut config = valid_config();
        config.content_api_url = "content-api.changenow.io".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_timeout() {
        let mut config = valid_config();
        config.request_timeout = Duration::ZERO;
        assert!(config.validate().is_err());
    }
}
