//! Conversation scene and amount step state definitions.

use std::fmt;

/// Conversation step a session is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scene {
    /// Entry point; the flow restarts here after an invariant violation.
    StartNewExchange,
    /// Selecting the currency to sell.
    CurrencyFrom,
    /// Selecting the currency to buy.
    CurrencyTo,
    /// Entering the amount to sell.
    Amount,
    /// Showing the exchange estimate.
    Estimate,
}

impl Scene {
    /// Check if this scene consumes amount input.
    pub fn accepts_amount(&self) -> bool {
        matches!(self, Scene::Amount)
    }
}

impl fmt::Display for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Scene::StartNewExchange => "start_new_exchange",
            Scene::CurrencyFrom => "curr_from",
            Scene::CurrencyTo => "curr_to",
            Scene::Amount => "amount",
            Scene::Estimate => "estimate",
        };
        f.write_str(name)
    }
}

/// Amount step state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountState {
    /// Prompt shown, waiting for text.
    AwaitingInput,
    /// Text received, being parsed.
    Normalizing,
    /// Amount stored on the session.
    Accepted,
    /// Text is not a usable amount.
    RejectedFormat,
    /// Amount parsed but below the pair minimum.
    RejectedBelowMinimum,
}

impl AmountState {
    /// Check if the step is finished and the flow moves on.
    pub fn is_terminal(&self) -> bool {
        matches!(self, AmountState::Accepted)
    }

    /// Check if the user is asked for input again.
    pub fn is_rejected(&self) -> bool {
        matches!(
            self,
            AmountState::RejectedFormat | AmountState::RejectedBelowMinimum
        )
    }

    /// State the step returns to after this one.
    pub fn next(&self) -> AmountState {
        match self {
            AmountState::AwaitingInput => AmountState::AwaitingInput,
            AmountState::Normalizing => AmountState::Normalizing,
            AmountState::Accepted => AmountState::Accepted,
            AmountState::RejectedFormat | AmountState::RejectedBelowMinimum => {
                AmountState::AwaitingInput
            }
        }
    }
}
