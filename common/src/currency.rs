//! Currency catalog records and trading pair keys.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Position assigned to records the provider did not rank.
pub const UNRANKED_POSITION: i64 = i64::MAX;

/// A currency as described by one upstream catalog.
///
/// Upstream lists are loosely typed: fields may be missing or `null`. Missing
/// strings decode as empty so that a single malformed entry never fails the
/// whole list; consumers check [`CurrencyRecord::missing_field`] before use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyRecord {
    /// Catalog-local identity (lowercase on both upstreams).
    #[serde(default, deserialize_with = "nullable_string")]
    pub ticker: String,
    /// Human readable name.
    #[serde(default, rename = "name", deserialize_with = "nullable_string")]
    pub display_name: String,
    /// Symbol the exchange provider actually trades under.
    #[serde(default, rename = "current_ticker", deserialize_with = "nullable_string")]
    pub current_ticker: String,
    /// Network for multi-chain assets.
    #[serde(default)]
    pub network: Option<String>,
    /// Provider display position, ascending.
    #[serde(default = "unranked", deserialize_with = "nullable_position")]
    pub position: i64,
}

impl CurrencyRecord {
    /// Create a new record with no network and no explicit position.
    pub fn new(
        ticker: impl Into<String>,
        display_name: impl Into<String>,
        current_ticker: impl Into<String>,
    ) -> Self {
        Self {
            ticker: ticker.into(),
            display_name: display_name.into(),
            current_ticker: current_ticker.into(),
            network: None,
            position: UNRANKED_POSITION,
        }
    }

    /// Set the network.
    pub fn with_network(mut self, network: impl Into<String>) -> Self {
        self.network = Some(network.into());
        self
    }

    /// Set the display position.
    pub fn with_position(mut self, position: i64) -> Self {
        self.position = position;
        self
    }

    /// Network, if present and non-empty.
    pub fn network(&self) -> Option<&str> {
        self.network.as_deref().filter(|n| !n.trim().is_empty())
    }

    /// Name of the first required field that is empty, if any.
    pub fn missing_field(&self) -> Option<&'static str> {
        if self.ticker.trim().is_empty() {
            Some("ticker")
        } else if self.display_name.trim().is_empty() {
            Some("name")
        } else if self.current_ticker.trim().is_empty() {
            Some("current_ticker")
        } else {
            None
        }
    }

    /// Ticker upper-cased for display.
    pub fn display_ticker(&self) -> String {
        self.ticker.to_uppercase()
    }

    /// Case-insensitive ticker comparison.
    pub fn has_ticker(&self, ticker: &str) -> bool {
        self.ticker.eq_ignore_ascii_case(ticker)
    }
}

impl fmt::Display for CurrencyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.display_ticker(), self.display_name)
    }
}

fn unranked() -> i64 {
    UNRANKED_POSITION
}

fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn nullable_position<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<i64>::deserialize(deserializer)?.unwrap_or(UNRANKED_POSITION))
}

/// Ordered trading pair, rendered as `from_to` for upstream calls.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PairKey {
    /// Ticker being sold.
    pub from: String,
    /// Ticker being bought.
    pub to: String,
}

impl PairKey {
    /// Create a new pair key.
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.from, self.to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_content_record() {
        let json = r#"{
            "ticker": "usdterc20",
            "name": "Tether",
            "current_ticker": "usdt",
            "network": "eth",
            "position": 4
        }"#;

        let record: CurrencyRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.ticker, "usdterc20");
        assert_eq!(record.display_name, "Tether");
        assert_eq!(record.current_ticker, "usdt");
        assert_eq!(record.network(), Some("eth"));
        assert_eq!(record.position, 4);
        assert!(record.missing_field().is_none());
    }

    #[test]
    fn test_decode_tolerates_nulls_and_gaps() {
        let json = r#"{ "ticker": "btc", "name": null, "network": "", "position": null }"#;

        let record: CurrencyRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.display_name, "");
        assert_eq!(record.network(), None);
        assert_eq!(record.position, UNRANKED_POSITION);
        assert_eq!(record.missing_field(), Some("name"));
    }

    #[test]
    fn test_missing_field_order() {
        let record = CurrencyRecord::new("", "", "");
        assert_eq!(record.missing_field(), Some("ticker"));

        let record = CurrencyRecord::new("eth", "Ethereum", " ");
        assert_eq!(record.missing_field(), Some("current_ticker"));
    }

    #[test]
    fn test_pair_key_display() {
        let pair = PairKey::new("btc", "usdterc20");
        assert_eq!(pair.to_string(), "btc_usdterc20");
        assert_ne!(pair, PairKey::new("usdterc20", "btc"));
    }
}
