//! Coinswap Gateways
//!
//! Request/response contracts to the two upstream services the exchange flow
//! depends on:
//!
//! - the exchange provider (tradable currencies, minimum deposit, estimates)
//! - the content catalog (descriptive currency metadata)
//!
//! Every call returns a [`GatewayResult`]; callers decide per call site whether
//! a failure is served stale, treated as absent, or shown to the user.
//!
//! # Example
//!
//! ```rust,ignore
//! use coinswap_gateway::{ChangeNowClient, ExchangeGateway, GatewayConfig};
//! use coinswap_common::PairKey;
//!
//! let client = ChangeNowClient::new(&GatewayConfig::from_env())?;
//! let min = client.min_amount(&PairKey::new("btc", "eth")).await?;
//! ```

pub mod config;
pub mod content;
pub mod error;
pub mod exchange;
pub mod provider;

pub use config::GatewayConfig;
pub use content::ContentApiClient;
pub use error::{EstimateError, GatewayError, GatewayResult};
pub use exchange::ChangeNowClient;
pub use provider::{CatalogProvider, ExchangeEstimate, ExchangeGateway};

#[cfg(any(test, feature = "test-utils"))]
pub use provider::{MockCatalogProvider, MockExchangeGateway};
