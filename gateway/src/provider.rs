//! Gateway traits and in-memory implementations.

use async_trait::async_trait;
use coinswap_common::{CurrencyRecord, PairKey};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::GatewayResult;

#[cfg(any(test, feature = "test-utils"))]
use crate::error::GatewayError;
#[cfg(any(test, feature = "test-utils"))]
use dashmap::DashMap;
#[cfg(any(test, feature = "test-utils"))]
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// An upstream that publishes a currency catalog.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Get the provider name.
    fn name(&self) -> &str;

    /// Fetch the full currency list.
    async fn list_currencies(&self) -> GatewayResult<Vec<CurrencyRecord>>;
}

/// The exchange provider: tradable catalog plus pair-level quotes.
#[async_trait]
pub trait ExchangeGateway: CatalogProvider {
    /// Minimum deposit for the pair, in units of `pair.from`.
    async fn min_amount(&self, pair: &PairKey) -> GatewayResult<Decimal>;

    /// Estimated amount of `pair.to` received for `amount` of `pair.from`.
    async fn exchange_estimate(
        &self,
        amount: Decimal,
        pair: &PairKey,
    ) -> GatewayResult<ExchangeEstimate>;
}

/// Estimate returned by the exchange provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeEstimate {
    /// Amount of the destination currency.
    pub estimated_amount: Decimal,
    /// Provider's forecast of transaction speed, e.g. `10-60` minutes.
    pub transaction_speed_forecast: Option<String>,
    /// Provider warning to show alongside the estimate.
    pub warning_message: Option<String>,
}

/// Decode a catalog entry by entry, dropping entries that do not decode.
pub(crate) fn decode_catalog(source: &str, entries: Vec<serde_json::Value>) -> Vec<CurrencyRecord> {
    let total = entries.len();
    let records: Vec<CurrencyRecord> = entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value(entry) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(source, index, error = %e, "Dropping undecodable catalog entry");
                None
            }
        })
        .collect();

    if records.len() < total {
        warn!(source, kept = records.len(), total, "Catalog decoded with gaps");
    }

    records
}

/// Mock catalog provider for testing.
#[cfg(any(test, feature = "test-utils"))]
pub struct MockCatalogProvider {
    name: String,
    records: parking_lot::Mutex<Vec<CurrencyRecord>>,
    failing: AtomicBool,
    calls: AtomicUsize,
    delay: parking_lot::Mutex<Option<std::time::Duration>>,
}

#[cfg(any(test, feature = "test-utils"))]
impl MockCatalogProvider {
    /// Create a new mock provider serving `records`.
    pub fn new(name: impl Into<String>, records: Vec<CurrencyRecord>) -> Self {
        Self {
            name: name.into(),
            records: parking_lot::Mutex::new(records),
            failing: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
            delay: parking_lot::Mutex::new(None),
        }
    }

    /// Replace the served records.
    pub fn set_records(&self, records: Vec<CurrencyRecord>) {
        *self.records.lock() = records;
    }

    /// Make subsequent fetches fail with a transport error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Delay every fetch, to hold a refresh in flight.
    pub fn set_delay(&self, delay: std::time::Duration) {
        *self.delay.lock() = Some(delay);
    }

    /// Number of fetches issued so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl CatalogProvider for MockCatalogProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn list_currencies(&self) -> GatewayResult<Vec<CurrencyRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing.load(Ordering::SeqCst) {
            return Err(GatewayError::Transport(format!("{} unreachable", self.name)));
        }

        Ok(self.records.lock().clone())
    }
}

/// Mock exchange gateway for testing.
#[cfg(any(test, feature = "test-utils"))]
pub struct MockExchangeGateway {
    catalog: MockCatalogProvider,
    minimums: DashMap<String, GatewayResult<Decimal>>,
    estimates: DashMap<String, GatewayResult<ExchangeEstimate>>,
    min_amount_calls: AtomicUsize,
    min_amount_delay: parking_lot::Mutex<Option<std::time::Duration>>,
}

#[cfg(any(test, feature = "test-utils"))]
impl MockExchangeGateway {
    /// Create a new mock gateway whose catalog serves `records`.
    pub fn new(records: Vec<CurrencyRecord>) -> Self {
        Self {
            catalog: MockCatalogProvider::new("mock-exchange", records),
            minimums: DashMap::new(),
            estimates: DashMap::new(),
            min_amount_calls: AtomicUsize::new(0),
            min_amount_delay: parking_lot::Mutex::new(None),
        }
    }

    /// Access the underlying catalog mock.
    pub fn catalog(&self) -> &MockCatalogProvider {
        &self.catalog
    }

    /// Set the minimum deposit for a pair.
    pub fn set_min_amount(&self, pair: &PairKey, min: Decimal) {
        self.minimums.insert(pair.to_string(), Ok(min));
    }

    /// Make the minimum lookup for a pair fail.
    pub fn fail_min_amount(&self, pair: &PairKey, err: GatewayError) {
        self.minimums.insert(pair.to_string(), Err(err));
    }

    /// Delay every minimum lookup, to hold it in flight.
    pub fn set_min_amount_delay(&self, delay: std::time::Duration) {
        *self.min_amount_delay.lock() = Some(delay);
    }

    /// Set the estimate result for a pair.
    pub fn set_estimate(&self, pair: &PairKey, result: GatewayResult<ExchangeEstimate>) {
        self.estimates.insert(pair.to_string(), result);
    }

    /// Number of minimum lookups issued so far.
    pub fn min_amount_calls(&self) -> usize {
        self.min_amount_calls.load(Ordering::SeqCst)
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl CatalogProvider for MockExchangeGateway {
    fn name(&self) -> &str {
        self.catalog.name()
    }

    async fn list_currencies(&self) -> GatewayResult<Vec<CurrencyRecord>> {
        self.catalog.list_currencies().await
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl ExchangeGateway for MockExchangeGateway {
    async fn min_amount(&self, pair: &PairKey) -> GatewayResult<Decimal> {
        self.min_amount_calls.fetch_add(1, Ordering::SeqCst);

        let delay = *self.min_amount_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.minimums
            .get(&pair.to_string())
            .map(|r| r.clone())
            .unwrap_or(Err(GatewayError::MissingField("minAmount")))
    }

    async fn exchange_estimate(
        &self,
        _amount: Decimal,
        pair: &PairKey,
    ) -> GatewayResult<ExchangeEstimate> {
        self.estimates
            .get(&pair.to_string())
            .map(|r| r.clone())
            .unwrap_or(Err(GatewayError::Status {
                status: 422,
                body: String::new(),
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn test_decode_catalog_drops_bad_entries() {
        let entries = vec![
            json!({ "ticker": "btc", "name": "Bitcoin", "current_ticker": "btc", "position": 1 }),
            json!("not an object"),
            json!({ "ticker": "eth", "name": "Ethereum", "current_ticker": "eth", "position": 2 }),
        ];

        let records = decode_catalog("test", entries);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].ticker, "btc");
        assert_eq!(records[1].ticker, "eth");
    }

    #[tokio::test]
    async fn test_mock_catalog_counts_and_fails() {
        let provider =
            MockCatalogProvider::new("test", vec![CurrencyRecord::new("btc", "Bitcoin", "btc")]);

        let records = assert_ok!(provider.list_currencies().await);
        assert_eq!(records.len(), 1);

        provider.set_failing(true);
        assert_err!(provider.list_currencies().await);
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn test_mock_exchange_min_amount() {
        let gateway = MockExchangeGateway::new(vec![]);
        let pair = PairKey::new("btc", "eth");

        assert_eq!(
            gateway.min_amount(&pair).await,
            Err(GatewayError::MissingField("minAmount"))
        );

        gateway.set_min_amount(&pair, dec!(0.005));
        assert_eq!(gateway.min_amount(&pair).await, Ok(dec!(0.005)));
        assert_eq!(gateway.min_amount_calls(), 2);
    }
}
