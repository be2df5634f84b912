//! Coinswap Currency Catalog
//!
//! Keeps the exchange provider's tradable list and the content catalog's
//! descriptive list in memory, and resolves free-text currency queries
//! against them.
//!
//! # Features
//!
//! - Per-source snapshots refreshed at most once per TTL window
//! - Single-flight refresh: concurrent readers share one upstream fetch
//! - Fail-open: a failed refresh keeps serving the previous snapshot
//! - Fuzzy resolution filtered to currently tradable tickers
//!
//! # Example
//!
//! ```rust,ignore
//! use coinswap_catalog::{CurrencyCache, CurrencyResolver};
//!
//! let cache = Arc::new(CurrencyCache::new(exchange, content, clock, Default::default()));
//! let resolver = CurrencyResolver::new(cache, Default::default());
//!
//! for suggestion in resolver.suggest("tether").await {
//!     println!("{suggestion}");
//! }
//! ```

pub mod cache;
pub mod resolver;
pub mod similarity;

pub use cache::{
    CacheSnapshot, CacheStats, CatalogSource, CurrencyCache, CurrencyCacheConfig,
    SharedCurrencyCache,
};
pub use resolver::{format_suggestion, CurrencyResolver, ResolutionMatch, ResolverConfig};
pub use similarity::similarity;
