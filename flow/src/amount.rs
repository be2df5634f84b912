//! Amount entry step.
//!
//! On entry the step makes sure the session names a pair and looks up the
//! pair minimum once, storing it on the session before the prompt goes out,
//! so the first input is always judged against a settled minimum. Each input
//! then moves through `AwaitingInput -> Normalizing` and ends in one of
//! `Accepted`, `RejectedFormat` or `RejectedBelowMinimum`.

use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

use coinswap_common::{PairKey, TradingSession};
use coinswap_gateway::ExchangeGateway;

use crate::config::AmountConfig;
use crate::error::FlowError;
use crate::metrics::SharedFlowMetrics;
use crate::normalize::{normalize_amount, FormatRejection};
use crate::state::{AmountState, Scene};

/// Shown for any input that is not a usable amount.
pub const INVALID_AMOUNT_MESSAGE: &str =
    "Please enter a valid amount using digits only, for example 0.1";

/// Result of entering the amount step.
#[derive(Debug)]
pub enum AmountEntry {
    /// Session is ready for input; `prompt` asks for the amount.
    Prompt {
        session: TradingSession,
        prompt: String,
    },
    /// Session is malformed; restart the conversation.
    Restart { reason: FlowError },
}

/// Result of one amount input.
#[derive(Debug)]
pub enum AmountTransition {
    /// Amount stored on the session; continue with `next`.
    Advance { session: TradingSession, next: Scene },
    /// Input not usable; ask again right away.
    Reprompt {
        reason: FormatRejection,
        message: String,
    },
    /// Below the minimum; show `message`, wait `delay`, enter the step again.
    Reenter {
        message: String,
        delay: Duration,
        entered: Decimal,
        minimum: Decimal,
    },
    /// Return to destination currency selection.
    Back { session: TradingSession, next: Scene },
    /// Session is malformed; restart the conversation.
    Restart { reason: FlowError },
}

impl AmountTransition {
    /// State the input ended in, or `None` when the user left the step.
    pub fn state(&self) -> Option<AmountState> {
        match self {
            AmountTransition::Advance { .. } => Some(AmountState::Accepted),
            AmountTransition::Reprompt { .. } => Some(AmountState::RejectedFormat),
            AmountTransition::Reenter { .. } => Some(AmountState::RejectedBelowMinimum),
            AmountTransition::Back { .. } | AmountTransition::Restart { .. } => None,
        }
    }
}

/// Prompt asking for the amount, with the minimum line when one is known.
pub fn amount_prompt(ticker: &str, minimum: Option<Decimal>) -> String {
    let mut prompt = format!(
        "Enter the amount of {} you would like to exchange.",
        ticker.to_uppercase()
    );
    if let Some(minimum) = minimum {
        prompt.push_str(&format!("\nMinimal amount - {}", minimum.normalize()));
    }
    prompt
}

/// Message for an amount below the pair minimum.
pub fn below_minimum_message(ticker: &str, entered: Decimal, minimum: Decimal) -> String {
    let ticker = ticker.to_uppercase();
    format!(
        "Oops! Wrong amount.\n\nYour amount: {} {}\nMinimum required: {} {}",
        entered.normalize(),
        ticker,
        minimum.normalize(),
        ticker
    )
}

/// The amount step.
pub struct AmountStep {
    gateway: Arc<dyn ExchangeGateway>,
    config: AmountConfig,
    metrics: SharedFlowMetrics,
}

impl AmountStep {
    /// Create a new amount step.
    pub fn new(
        gateway: Arc<dyn ExchangeGateway>,
        config: AmountConfig,
        metrics: SharedFlowMetrics,
    ) -> Self {
        Self {
            gateway,
            config,
            metrics,
        }
    }

    /// Label of the input that goes back to currency selection.
    pub fn back_label(&self) -> &str {
        &self.config.back_label
    }

    /// Enter the step: check the session and settle the pair minimum.
    ///
    /// A minimum already on the session is reused; changing either currency
    /// clears it, so a stored minimum always belongs to the current pair.
    #[instrument(skip(self, session))]
    pub async fn enter(&self, session: TradingSession) -> AmountEntry {
        let pair = match session.pair_key() {
            Ok(pair) => pair,
            Err(e) => {
                error!(error = %e, "Amount step entered without a currency pair");
                self.metrics.flow_reset();
                return AmountEntry::Restart { reason: e.into() };
            }
        };

        let session = match session.min_amount {
            Some(_) => session,
            None => {
                let minimum = self.fetch_minimum(&pair).await;
                session.with_min_amount(minimum)
            }
        };

        let prompt = amount_prompt(&pair.from, session.min_amount);
        AmountEntry::Prompt { session, prompt }
    }

    /// Best-effort minimum lookup. Failures mean "no minimum".
    async fn fetch_minimum(&self, pair: &PairKey) -> Option<Decimal> {
        match self.gateway.min_amount(pair).await {
            Ok(minimum) if minimum > Decimal::ZERO => {
                info!(pair = %pair, minimum = %minimum, "Minimum amount obtained");
                Some(minimum)
            }
            Ok(minimum) => {
                warn!(pair = %pair, minimum = %minimum, "Ignoring non-positive minimum");
                self.metrics.minimum_unavailable();
                None
            }
            Err(e) => {
                warn!(
                    pair = %pair,
                    error = %e,
                    code = e.error_code(),
                    "Minimum amount unavailable, not enforcing one"
                );
                self.metrics.minimum_unavailable();
                None
            }
        }
    }

    /// Judge one input against the session.
    pub fn handle_input(&self, session: TradingSession, text: &str) -> AmountTransition {
        if text.trim() == self.config.back_label {
            debug!("Back to destination currency selection");
            return AmountTransition::Back {
                session: session.without_destination(),
                next: Scene::CurrencyTo,
            };
        }

        let ticker = match session.pair_key() {
            Ok(pair) => pair.from,
            Err(e) => {
                error!(error = %e, "Amount input without a currency pair");
                self.metrics.flow_reset();
                return AmountTransition::Restart { reason: e.into() };
            }
        };

        self.metrics.amount_received();

        let amount = match normalize_amount(text) {
            Ok(amount) => amount,
            Err(reason) => {
                debug!(reason = %reason, "Amount rejected");
                self.metrics.amount_rejected_format();
                return AmountTransition::Reprompt {
                    reason,
                    message: INVALID_AMOUNT_MESSAGE.to_string(),
                };
            }
        };

        if let Some(minimum) = session.min_amount {
            if amount < minimum {
                debug!(amount = %amount, minimum = %minimum, "Amount below minimum");
                self.metrics.amount_rejected_minimum();
                return AmountTransition::Reenter {
                    message: below_minimum_message(&ticker, amount, minimum),
                    delay: self.config.reentry_delay,
                    entered: amount,
                    minimum,
                };
            }
        }

        info!(amount = %amount, ticker = %ticker, "Amount accepted");
        self.metrics.amount_accepted();
        AmountTransition::Advance {
            session: session.with_amount(amount),
            next: Scene::Estimate,
        }
    }
}
