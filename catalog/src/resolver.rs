//! Fuzzy currency resolution across both catalogs.

use coinswap_common::CurrencyRecord;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::cache::{CatalogSource, CurrencyCache};
use crate::similarity::similarity;

/// Configuration for the resolver.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// A field must score strictly above this to make a record a candidate.
    pub threshold: f64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self { threshold: 0.45 }
    }
}

impl ResolverConfig {
    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..1.0).contains(&self.threshold) {
            return Err("Fuzzy threshold must be in [0, 1)".to_string());
        }
        Ok(())
    }
}

/// A content-catalog record that plausibly matches a query.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionMatch {
    /// The matched record.
    pub record: CurrencyRecord,
    /// Best score across ticker, name and trading symbol.
    pub similarity: f64,
}

impl ResolutionMatch {
    /// Display line for a disambiguation list.
    pub fn suggestion(&self) -> String {
        format_suggestion(&self.record)
    }
}

/// Format a record as `/ticker = SYMBOL (Name) on NETWORK network`.
pub fn format_suggestion(record: &CurrencyRecord) -> String {
    let base = format!(
        "/{} = {} ({})",
        record.ticker,
        record.current_ticker.to_uppercase(),
        record.display_name
    );

    match record.network() {
        Some(network) => format!("{} on {} network", base, network.to_uppercase()),
        None => base,
    }
}

fn is_exact(query: &str, record: &CurrencyRecord) -> bool {
    [&record.ticker, &record.display_name, &record.current_ticker]
        .iter()
        .any(|field| field.to_lowercase() == query)
}

fn best_score(query: &str, record: &CurrencyRecord) -> f64 {
    [&record.ticker, &record.display_name, &record.current_ticker]
        .iter()
        .map(|field| similarity(query, field))
        .fold(0.0, f64::max)
}

/// Resolves free-text currency queries.
pub struct CurrencyResolver {
    cache: Arc<CurrencyCache>,
    config: ResolverConfig,
}

impl CurrencyResolver {
    /// Create a new resolver over a shared cache.
    pub fn new(cache: Arc<CurrencyCache>, config: ResolverConfig) -> Self {
        Self { cache, config }
    }

    /// Tickers the exchange provider can trade, lowercased.
    async fn tradable_tickers(&self) -> HashSet<String> {
        self.cache
            .get_catalog(CatalogSource::Exchange)
            .await
            .iter()
            .map(|r| r.ticker.to_lowercase())
            .collect()
    }

    /// Content records plausibly matching `query` that are tradable right now.
    ///
    /// Returns every accepted candidate in catalog order. An unavailable
    /// exchange catalog yields no matches rather than an error.
    #[instrument(skip(self))]
    pub async fn resolve(&self, query: &str) -> Vec<ResolutionMatch> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Vec::new();
        }

        let content = self.cache.get_catalog(CatalogSource::Content).await;
        let tradable = self.tradable_tickers().await;

        let mut matches = Vec::new();
        for record in content {
            if let Some(field) = record.missing_field() {
                warn!(ticker = %record.ticker, field, "Skipping incomplete catalog record");
                continue;
            }

            let exact = is_exact(&query, &record);
            let score = if exact { 1.0 } else { best_score(&query, &record) };
            if !exact && score <= self.config.threshold {
                continue;
            }

            if !tradable.contains(&record.ticker.to_lowercase()) {
                debug!(ticker = %record.ticker, "Candidate not tradable");
                continue;
            }

            matches.push(ResolutionMatch {
                record,
                similarity: score,
            });
        }

        debug!(candidates = matches.len(), "Resolution complete");
        matches
    }

    /// Suggestion lines for `query`.
    pub async fn suggest(&self, query: &str) -> Vec<String> {
        self.resolve(query)
            .await
            .iter()
            .map(ResolutionMatch::suggestion)
            .collect()
    }

    /// Content records whose ticker, name or trading symbol equals `query`.
    ///
    /// No threshold and no tradability filter: this answers "is this a
    /// currency we know of", not "can it be traded".
    #[instrument(skip(self))]
    pub async fn exact_matches(&self, query: &str) -> Vec<String> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Vec::new();
        }

        self.cache
            .get_catalog(CatalogSource::Content)
            .await
            .iter()
            .filter(|record| match record.missing_field() {
                Some(field) => {
                    warn!(ticker = %record.ticker, field, "Skipping incomplete catalog record");
                    false
                }
                None => is_exact(&query, record),
            })
            .map(format_suggestion)
            .collect()
    }

    /// Check whether `query` names a currency in the content catalog.
    pub async fn is_known_currency(&self, query: &str) -> bool {
        !self.exact_matches(query).await.is_empty()
    }

    /// Exchange catalog record for `ticker`, if it is tradable.
    pub async fn find_tradable(&self, ticker: &str) -> Option<CurrencyRecord> {
        let ticker = ticker.trim().trim_start_matches('/');
        self.cache
            .get_catalog(CatalogSource::Exchange)
            .await
            .into_iter()
            .find(|r| r.has_ticker(ticker))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CurrencyCacheConfig;
    use coinswap_common::ManualClock;
    use coinswap_gateway::MockCatalogProvider;

    fn content_catalog() -> Vec<CurrencyRecord> {
        vec![
            CurrencyRecord::new("btc", "Bitcoin", "btc").with_position(1),
            CurrencyRecord::new("eth", "Ethereum", "eth").with_position(2),
            CurrencyRecord::new("usdterc20", "Tether", "usdt")
                .with_network("eth")
                .with_position(3),
            CurrencyRecord::new("usdttrc20", "Tether", "usdt")
                .with_network("trx")
                .with_position(4),
            CurrencyRecord::new("xmr", "Monero", "xmr").with_position(5),
            CurrencyRecord::new("broken", "", "brk").with_position(6),
        ]
    }

    fn exchange_catalog() -> Vec<CurrencyRecord> {
        ["btc", "eth", "usdterc20", "usdttrc20", "broken"]
            .iter()
            .map(|t| CurrencyRecord::new(*t, *t, *t))
            .collect()
    }

    fn resolver_over(
        content: Vec<CurrencyRecord>,
        exchange: Vec<CurrencyRecord>,
        config: ResolverConfig,
    ) -> (CurrencyResolver, Arc<MockCatalogProvider>) {
        let exchange = Arc::new(MockCatalogProvider::new("exchange", exchange));
        let content = Arc::new(MockCatalogProvider::new("content", content));
        let cache = CurrencyCache::new(
            exchange.clone(),
            content,
            Arc::new(ManualClock::default()),
            CurrencyCacheConfig::default(),
        );
        (CurrencyResolver::new(Arc::new(cache), config), exchange)
    }

    fn setup() -> CurrencyResolver {
        resolver_over(content_catalog(), exchange_catalog(), ResolverConfig::default()).0
    }

    #[tokio::test]
    async fn test_exact_ticker_always_accepted() {
        let resolver = setup();

        let matches = resolver.resolve("BTC").await;

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].record.ticker, "btc");
        assert_eq!(matches[0].similarity, 1.0);
    }

    #[tokio::test]
    async fn test_all_matches_returned_in_catalog_order() {
        let resolver = setup();

        // "ethereum" shares four bigrams with "tether" and clears the threshold too.
        let suggestions = resolver.suggest("tether").await;

        assert_eq!(
            suggestions,
            vec![
                "/eth = ETH (Ethereum)".to_string(),
                "/usdterc20 = USDT (Tether) on ETH network".to_string(),
                "/usdttrc20 = USDT (Tether) on TRX network".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_fuzzy_name_match() {
        let resolver = setup();

        let matches = resolver.resolve("bitcoinn").await;

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].record.ticker, "btc");
        assert!(matches[0].similarity > 0.45 && matches[0].similarity < 1.0);
    }

    #[tokio::test]
    async fn test_untradable_record_never_suggested() {
        let resolver = setup();

        // Monero matches perfectly but the exchange does not list it.
        assert!(resolver.resolve("monero").await.is_empty());
        assert!(resolver.resolve("xmr").await.is_empty());
    }

    #[tokio::test]
    async fn test_incomplete_record_skipped() {
        let resolver = setup();

        assert!(resolver.resolve("broken").await.is_empty());
        assert!(resolver.exact_matches("brk").await.is_empty());
    }

    #[tokio::test]
    async fn test_threshold_is_exclusive() {
        // "abc" vs "abd" scores exactly 0.5.
        let catalog = vec![CurrencyRecord::new("abd", "abd", "abd")];

        let (resolver, _) =
            resolver_over(catalog.clone(), catalog.clone(), ResolverConfig { threshold: 0.5 });
        assert!(resolver.resolve("abc").await.is_empty());

        let (resolver, _) =
            resolver_over(catalog.clone(), catalog, ResolverConfig { threshold: 0.49 });
        assert_eq!(resolver.resolve("abc").await.len(), 1);
    }

    #[tokio::test]
    async fn test_exchange_outage_yields_no_suggestions() {
        let (resolver, exchange) =
            resolver_over(content_catalog(), exchange_catalog(), ResolverConfig::default());
        exchange.set_failing(true);

        assert!(resolver.suggest("bitcoin").await.is_empty());
        // The known-currency check only needs the content catalog.
        assert!(resolver.is_known_currency("bitcoin").await);
    }

    #[tokio::test]
    async fn test_exact_matches_ignore_tradability() {
        let resolver = setup();

        assert_eq!(
            resolver.exact_matches("Monero").await,
            vec!["/xmr = XMR (Monero)".to_string()]
        );
        assert_eq!(resolver.exact_matches("usdt").await.len(), 2);
        assert!(!resolver.is_known_currency("monera").await);
    }

    #[tokio::test]
    async fn test_find_tradable() {
        let resolver = setup();

        assert_eq!(
            resolver.find_tradable("/ETH").await.map(|r| r.ticker),
            Some("eth".to_string())
        );
        assert!(resolver.find_tradable("xmr").await.is_none());
    }

    #[test]
    fn test_format_without_network() {
        let record = CurrencyRecord::new("btc", "Bitcoin", "btc").with_network(" ");
        assert_eq!(format_suggestion(&record), "/btc = BTC (Bitcoin)");
    }

    #[test]
    fn test_config_validation() {
        assert!(ResolverConfig::default().validate().is_ok());
        assert!(ResolverConfig { threshold: 1.0 }.validate().is_err());
    }
}
