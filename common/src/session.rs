//! Trading session state carried through a conversation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::currency::{CurrencyRecord, PairKey};
use crate::error::{CommonError, Result};

/// Identifier of the conversation a session belongs to (the chat id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(i64);

impl ConversationId {
    /// Create a new conversation ID.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the raw chat id.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ConversationId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Per-conversation exchange state.
///
/// Updates consume the session and return the next value; handlers never hold
/// a mutable reference across an await point.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TradingSession {
    /// Currency being sold.
    pub curr_from: Option<CurrencyRecord>,
    /// Currency being bought.
    pub curr_to: Option<CurrencyRecord>,
    /// Minimum deposit for the pair, when the provider reported one.
    pub min_amount: Option<Decimal>,
    /// Accepted amount of `curr_from`.
    pub amount: Option<Decimal>,
}

impl TradingSession {
    /// Create an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session with both currencies selected.
    pub fn for_pair(from: CurrencyRecord, to: CurrencyRecord) -> Self {
        Self::new().with_curr_from(from).with_curr_to(to)
    }

    /// Set the source currency. Pair-derived state is cleared.
    pub fn with_curr_from(mut self, currency: CurrencyRecord) -> Self {
        self.curr_from = Some(currency);
        self.min_amount = None;
        self.amount = None;
        self
    }

    /// Set the destination currency. Pair-derived state is cleared.
    pub fn with_curr_to(mut self, currency: CurrencyRecord) -> Self {
        self.curr_to = Some(currency);
        self.min_amount = None;
        self.amount = None;
        self
    }

    /// Replace the cached minimum.
    pub fn with_min_amount(mut self, min_amount: Option<Decimal>) -> Self {
        self.min_amount = min_amount;
        self
    }

    /// Store an accepted amount.
    pub fn with_amount(mut self, amount: Decimal) -> Self {
        self.amount = Some(amount);
        self
    }

    /// Drop the destination currency together with anything derived from the pair.
    pub fn without_destination(mut self) -> Self {
        self.curr_to = None;
        self.min_amount = None;
        self.amount = None;
        self
    }

    /// Check that both currencies are selected.
    pub fn has_pair(&self) -> bool {
        self.curr_from.is_some() && self.curr_to.is_some()
    }

    /// Source currency, or an invariant error.
    pub fn require_curr_from(&self) -> Result<&CurrencyRecord> {
        self.curr_from
            .as_ref()
            .ok_or(CommonError::SessionInvariant { field: "curr_from" })
    }

    /// Destination currency, or an invariant error.
    pub fn require_curr_to(&self) -> Result<&CurrencyRecord> {
        self.curr_to
            .as_ref()
            .ok_or(CommonError::SessionInvariant { field: "curr_to" })
    }

    /// Upstream key for the selected pair.
    pub fn pair_key(&self) -> Result<PairKey> {
        let from = self.require_curr_from()?;
        let to = self.require_curr_to()?;
        Ok(PairKey::new(from.ticker.clone(), to.ticker.clone()))
    }
}
