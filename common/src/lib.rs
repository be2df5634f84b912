//! Coinswap Common Types
//!
//! This crate contains shared types used across the coinswap exchange flow,
//! including currency catalog records, trading sessions and the clock
//! abstraction used for cache and message freshness decisions.

pub mod currency;
pub mod session;
pub mod error;
pub mod time;

pub use currency::*;
pub use session::*;
pub use error::*;
pub use time::*;
