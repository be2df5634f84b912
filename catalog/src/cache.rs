//! Currency catalog caching with TTL and single-flight refresh.

use chrono::Duration;
use coinswap_common::{
    constants, epoch, is_older_than, CurrencyRecord, SharedClock, Timestamp,
};
use coinswap_gateway::CatalogProvider;
use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

/// Which upstream a catalog comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogSource {
    /// Currencies the exchange provider can trade right now.
    Exchange,
    /// Descriptive metadata from the content catalog.
    Content,
}

impl fmt::Display for CatalogSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogSource::Exchange => write!(f, "exchange"),
            CatalogSource::Content => write!(f, "content"),
        }
    }
}

/// A catalog as last fetched.
#[derive(Debug, Clone)]
pub struct CacheSnapshot {
    /// Records sorted by position, unique by ticker.
    pub data: Vec<CurrencyRecord>,
    /// When the last successful refresh completed.
    pub last_refreshed_at: Timestamp,
}

impl CacheSnapshot {
    fn empty() -> Self {
        Self {
            data: Vec::new(),
            last_refreshed_at: epoch(),
        }
    }
}

/// Configuration for the currency cache.
#[derive(Debug, Clone)]
pub struct CurrencyCacheConfig {
    /// How long a snapshot is served before the next read refreshes it.
    pub ttl: Duration,
}

impl Default for CurrencyCacheConfig {
    fn default() -> Self {
        Self {
            ttl: constants::catalog_ttl(),
        }
    }
}

struct SourceSlot {
    source: CatalogSource,
    provider: Arc<dyn CatalogProvider>,
    snapshot: Mutex<CacheSnapshot>,
    /// Completed refresh attempts, successful or not.
    attempts: AtomicU64,
}

impl SourceSlot {
    fn new(source: CatalogSource, provider: Arc<dyn CatalogProvider>) -> Self {
        Self {
            source,
            provider,
            snapshot: Mutex::new(CacheSnapshot::empty()),
            attempts: AtomicU64::new(0),
        }
    }

    async fn read(&self, clock: &SharedClock, ttl: Duration) -> Vec<CurrencyRecord> {
        let seen = self.attempts.load(Ordering::Acquire);

        // The snapshot lock is held across the fetch; waiters queue behind it.
        let mut snapshot = self.snapshot.lock().await;

        if !is_older_than(snapshot.last_refreshed_at, clock.now(), ttl) {
            debug!(source = %self.source, "Catalog cache hit");
            return snapshot.data.clone();
        }

        if self.attempts.load(Ordering::Acquire) != seen {
            debug!(source = %self.source, "Reusing outcome of concurrent refresh");
            return snapshot.data.clone();
        }

        match self.provider.list_currencies().await {
            Ok(records) => {
                let data = prepare(self.source, records);
                info!(
                    source = %self.source,
                    provider = self.provider.name(),
                    records = data.len(),
                    "Catalog refreshed"
                );
                snapshot.data = data;
                snapshot.last_refreshed_at = clock.now();
            }
            Err(e) => {
                warn!(
                    source = %self.source,
                    provider = self.provider.name(),
                    error = %e,
                    stale_records = snapshot.data.len(),
                    "Catalog refresh failed, serving previous snapshot"
                );
            }
        }

        self.attempts.fetch_add(1, Ordering::Release);
        snapshot.data.clone()
    }
}

/// Sort by position and drop repeated tickers, keeping the best-ranked one.
fn prepare(source: CatalogSource, mut records: Vec<CurrencyRecord>) -> Vec<CurrencyRecord> {
    records.sort_by_key(|r| r.position);

    let mut seen = HashSet::with_capacity(records.len());
    records.retain(|r| {
        let fresh = seen.insert(r.ticker.to_lowercase());
        if !fresh {
            debug!(source = %source, ticker = %r.ticker, "Dropping duplicate ticker");
        }
        fresh
    });

    records
}

/// In-memory cache of both upstream catalogs.
pub struct CurrencyCache {
    exchange: SourceSlot,
    content: SourceSlot,
    clock: SharedClock,
    config: CurrencyCacheConfig,
}

impl CurrencyCache {
    /// Create a new cache over the two catalog providers.
    pub fn new(
        exchange: Arc<dyn CatalogProvider>,
        content: Arc<dyn CatalogProvider>,
        clock: SharedClock,
        config: CurrencyCacheConfig,
    ) -> Self {
        Self {
            exchange: SourceSlot::new(CatalogSource::Exchange, exchange),
            content: SourceSlot::new(CatalogSource::Content, content),
            clock,
            config,
        }
    }

    fn slot(&self, source: CatalogSource) -> &SourceSlot {
        match source {
            CatalogSource::Exchange => &self.exchange,
            CatalogSource::Content => &self.content,
        }
    }

    /// Get a catalog, refreshing it first if its snapshot has expired.
    ///
    /// Never fails: if the upstream is down the last good snapshot (possibly
    /// empty) is returned and the next read tries again.
    #[instrument(skip(self))]
    pub async fn get_catalog(&self, source: CatalogSource) -> Vec<CurrencyRecord> {
        self.slot(source).read(&self.clock, self.config.ttl).await
    }

    /// Current snapshot without triggering a refresh.
    pub async fn peek(&self, source: CatalogSource) -> CacheSnapshot {
        self.slot(source).snapshot.lock().await.clone()
    }

    /// Force the next read of `source` to refresh.
    pub async fn invalidate(&self, source: CatalogSource) {
        self.slot(source).snapshot.lock().await.last_refreshed_at = epoch();
        debug!(source = %source, "Catalog invalidated");
    }

    /// Get cache statistics for one source.
    pub async fn stats(&self, source: CatalogSource) -> CacheStats {
        let slot = self.slot(source);
        let snapshot = slot.snapshot.lock().await;

        CacheStats {
            source,
            records: snapshot.data.len(),
            last_refreshed_at: snapshot.last_refreshed_at,
            refresh_attempts: slot.attempts.load(Ordering::Acquire),
            is_stale: is_older_than(snapshot.last_refreshed_at, self.clock.now(), self.config.ttl),
        }
    }
}

/// Cache statistics.
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub source: CatalogSource,
    pub records: usize,
    pub last_refreshed_at: Timestamp,
    pub refresh_attempts: u64,
    pub is_stale: bool,
}

/// Shared currency cache.
pub type SharedCurrencyCache = Arc<CurrencyCache>;

#[cfg(test)]
mod tests {
    use super::*;
    use coinswap_common::ManualClock;
    use coinswap_gateway::MockCatalogProvider;
    use std::time::Duration as StdDuration;

    fn record(ticker: &str, position: i64) -> CurrencyRecord {
        CurrencyRecord::new(ticker, ticker.to_uppercase(), ticker).with_position(position)
    }

    struct Fixture {
        cache: CurrencyCache,
        exchange: Arc<MockCatalogProvider>,
        content: Arc<MockCatalogProvider>,
        clock: ManualClock,
    }

    fn setup() -> Fixture {
        let exchange = Arc::new(MockCatalogProvider::new(
            "exchange",
            vec![record("eth", 2), record("btc", 1)],
        ));
        let content = Arc::new(MockCatalogProvider::new("content", vec![record("xmr", 1)]));
        let clock = ManualClock::default();

        let cache = CurrencyCache::new(
            exchange.clone(),
            content.clone(),
            Arc::new(clock.clone()),
            CurrencyCacheConfig::default(),
        );

        Fixture {
            cache,
            exchange,
            content,
            clock,
        }
    }

    #[tokio::test]
    async fn test_first_read_fetches_and_sorts() {
        let f = setup();

        let catalog = f.cache.get_catalog(CatalogSource::Exchange).await;

        let tickers: Vec<_> = catalog.iter().map(|r| r.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["btc", "eth"]);
        assert_eq!(f.exchange.calls(), 1);
        assert_eq!(f.content.calls(), 0);
    }

    #[tokio::test]
    async fn test_ttl_window() {
        let f = setup();

        f.cache.get_catalog(CatalogSource::Exchange).await;

        f.clock.advance(Duration::hours(8) - Duration::seconds(1));
        f.cache.get_catalog(CatalogSource::Exchange).await;
        assert_eq!(f.exchange.calls(), 1);

        f.clock.advance(Duration::seconds(2));
        f.cache.get_catalog(CatalogSource::Exchange).await;
        assert_eq!(f.exchange.calls(), 2);
    }

    #[tokio::test]
    async fn test_sources_refresh_independently() {
        let f = setup();

        f.cache.get_catalog(CatalogSource::Exchange).await;
        f.clock.advance(Duration::hours(4));
        f.cache.get_catalog(CatalogSource::Content).await;
        f.clock.advance(Duration::hours(5));

        // Exchange is 9h old, content only 5h.
        f.cache.get_catalog(CatalogSource::Exchange).await;
        f.cache.get_catalog(CatalogSource::Content).await;

        assert_eq!(f.exchange.calls(), 2);
        assert_eq!(f.content.calls(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_reads_single_flight() {
        let f = setup();
        f.exchange.set_delay(StdDuration::from_millis(20));

        let reads = (0..16).map(|_| f.cache.get_catalog(CatalogSource::Exchange));
        let results = futures::future::join_all(reads).await;

        assert_eq!(f.exchange.calls(), 1);
        assert!(results.iter().all(|catalog| catalog.len() == 2));
    }

    #[tokio::test]
    async fn test_concurrent_reads_share_failed_refresh() {
        let f = setup();
        f.exchange.set_failing(true);
        f.exchange.set_delay(StdDuration::from_millis(20));

        let reads = (0..8).map(|_| f.cache.get_catalog(CatalogSource::Exchange));
        let results = futures::future::join_all(reads).await;

        assert_eq!(f.exchange.calls(), 1);
        assert!(results.iter().all(|catalog| catalog.is_empty()));
    }

    #[tokio::test]
    async fn test_failed_refresh_serves_stale_and_retries() {
        let f = setup();

        f.cache.get_catalog(CatalogSource::Exchange).await;
        let refreshed_at = f.cache.peek(CatalogSource::Exchange).await.last_refreshed_at;

        f.clock.advance(Duration::hours(9));
        f.exchange.set_failing(true);

        let stale = f.cache.get_catalog(CatalogSource::Exchange).await;
        assert_eq!(stale.len(), 2);
        assert_eq!(
            f.cache.peek(CatalogSource::Exchange).await.last_refreshed_at,
            refreshed_at
        );

        // Next read tries again rather than treating the failure as a refresh.
        f.exchange.set_failing(false);
        f.exchange.set_records(vec![record("ltc", 1)]);
        let fresh = f.cache.get_catalog(CatalogSource::Exchange).await;

        assert_eq!(f.exchange.calls(), 3);
        assert_eq!(fresh.len(), 1);
        assert_eq!(fresh[0].ticker, "ltc");
    }

    #[tokio::test]
    async fn test_failed_first_fetch_returns_empty() {
        let f = setup();
        f.content.set_failing(true);

        assert!(f.cache.get_catalog(CatalogSource::Content).await.is_empty());

        let stats = f.cache.stats(CatalogSource::Content).await;
        assert!(stats.is_stale);
        assert_eq!(stats.refresh_attempts, 1);
        assert_eq!(stats.last_refreshed_at, epoch());
    }

    #[tokio::test]
    async fn test_duplicate_tickers_dropped() {
        let f = setup();
        f.exchange.set_records(vec![
            record("usdt", 5),
            record("USDT", 1),
            record("btc", 2),
        ]);

        let catalog = f.cache.get_catalog(CatalogSource::Exchange).await;

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog[0].ticker, "USDT");
        assert_eq!(catalog[0].position, 1);
    }

    #[tokio::test]
    async fn test_invalidate_forces_refresh() {
        let f = setup();

        f.cache.get_catalog(CatalogSource::Content).await;
        f.cache.invalidate(CatalogSource::Content).await;
        f.cache.get_catalog(CatalogSource::Content).await;

        assert_eq!(f.content.calls(), 2);
    }
}
