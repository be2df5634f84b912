//! Exchange estimate step.

use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use coinswap_common::TradingSession;
use coinswap_gateway::{EstimateError, ExchangeEstimate, ExchangeGateway};

use crate::error::FlowError;
use crate::metrics::SharedFlowMetrics;

/// Result of asking for an estimate.
#[derive(Debug)]
pub enum EstimateOutcome {
    /// Upstream quoted the pair.
    Quoted {
        estimate: ExchangeEstimate,
        message: String,
    },
    /// Quote failed; `message` is shown to the user.
    Failed {
        error: EstimateError,
        message: String,
    },
    /// Session is malformed; restart the conversation.
    Restart { reason: FlowError },
}

/// Summary shown for a successful quote.
pub fn estimate_message(
    amount: Decimal,
    from: &str,
    to: &str,
    estimate: &ExchangeEstimate,
) -> String {
    let mut message = format!(
        "You send: {} {}\nYou get: ~{} {}",
        amount.normalize(),
        from.to_uppercase(),
        estimate.estimated_amount.normalize(),
        to.to_uppercase()
    );
    if let Some(forecast) = &estimate.transaction_speed_forecast {
        message.push_str(&format!("\nExpected time: {} minutes", forecast));
    }
    if let Some(warning) = &estimate.warning_message {
        message.push_str(&format!("\n{}", warning));
    }
    message
}

/// The estimate step.
pub struct EstimateStep {
    gateway: Arc<dyn ExchangeGateway>,
    metrics: SharedFlowMetrics,
}

impl EstimateStep {
    pub fn new(gateway: Arc<dyn ExchangeGateway>, metrics: SharedFlowMetrics) -> Self {
        Self { gateway, metrics }
    }

    /// Quote the session's accepted amount.
    ///
    /// A missing or non-positive amount fails as [`EstimateError::InvalidAmount`]
    /// without contacting upstream.
    #[instrument(skip(self, session))]
    pub async fn run(&self, session: &TradingSession) -> EstimateOutcome {
        let pair = match session.pair_key() {
            Ok(pair) => pair,
            Err(e) => {
                error!(error = %e, "Estimate requested without a currency pair");
                self.metrics.flow_reset();
                return EstimateOutcome::Restart { reason: e.into() };
            }
        };

        let amount = match session.amount {
            Some(amount) if amount > Decimal::ZERO => amount,
            _ => return self.failed(EstimateError::InvalidAmount),
        };

        match self.gateway.exchange_estimate(amount, &pair).await {
            Ok(estimate) => {
                info!(
                    pair = %pair,
                    amount = %amount,
                    estimated = %estimate.estimated_amount,
                    "Estimate quoted"
                );
                self.metrics.estimate_quoted();
                let message = estimate_message(amount, &pair.from, &pair.to, &estimate);
                EstimateOutcome::Quoted { estimate, message }
            }
            Err(e) => {
                warn!(pair = %pair, error = %e, code = e.error_code(), "Estimate failed");
                self.failed(e.into())
            }
        }
    }

    fn failed(&self, error: EstimateError) -> EstimateOutcome {
        self.metrics.estimate_failed();
        EstimateOutcome::Failed {
            message: error.to_string(),
            error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::FlowMetrics;
    use coinswap_common::{CurrencyRecord, PairKey};
    use coinswap_gateway::{GatewayError, MockExchangeGateway};
    use rust_decimal_macros::dec;

    fn setup() -> (EstimateStep, Arc<MockExchangeGateway>, SharedFlowMetrics) {
        let gateway = Arc::new(MockExchangeGateway::new(Vec::new()));
        let metrics = Arc::new(FlowMetrics::new());
        (EstimateStep::new(gateway.clone(), metrics.clone()), gateway, metrics)
    }

    fn session(amount: Option<Decimal>) -> TradingSession {
        let session = TradingSession::for_pair(
            CurrencyRecord::new("btc", "Bitcoin", "btc"),
            CurrencyRecord::new("eth", "Ethereum", "eth"),
        );
        match amount {
            Some(amount) => session.with_amount(amount),
            None => session,
        }
    }

    fn failed_with(outcome: EstimateOutcome) -> EstimateError {
        match outcome {
            EstimateOutcome::Failed { error, message } => {
                assert_eq!(message, error.to_string());
                error
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_quote() {
        let (step, gateway, metrics) = setup();
        gateway.set_estimate(
            &PairKey::new("btc", "eth"),
            Ok(ExchangeEstimate {
                estimated_amount: dec!(0.152),
                transaction_speed_forecast: Some("10-60".to_string()),
                warning_message: None,
            }),
        );

        match step.run(&session(Some(dec!(0.01)))).await {
            EstimateOutcome::Quoted { estimate, message } => {
                assert_eq!(estimate.estimated_amount, dec!(0.152));
                assert_eq!(
                    message,
                    "You send: 0.01 BTC\nYou get: ~0.152 ETH\nExpected time: 10-60 minutes"
                );
            }
            other => panic!("expected quote, got {:?}", other),
        }
        assert_eq!(metrics.snapshot().estimates_quoted, 1);
    }

    #[tokio::test]
    async fn test_missing_amount_is_invalid() {
        let (step, _, metrics) = setup();

        assert_eq!(
            failed_with(step.run(&session(None)).await),
            EstimateError::InvalidAmount
        );
        assert_eq!(metrics.snapshot().estimates_failed, 1);
    }

    #[tokio::test]
    async fn test_status_codes_are_categorized() {
        let (step, gateway, _) = setup();
        let pair = PairKey::new("btc", "eth");

        let cases = [
            (401, EstimateError::Unauthorized),
            (400, EstimateError::BadParameters),
            (422, EstimateError::BelowMinimumOrInvalidPair),
            (500, EstimateError::TemporarilyUnavailable),
        ];
        for (status, expected) in cases {
            gateway.set_estimate(
                &pair,
                Err(GatewayError::Status {
                    status,
                    body: String::new(),
                }),
            );
            assert_eq!(failed_with(step.run(&session(Some(dec!(1)))).await), expected);
        }

        gateway.set_estimate(&pair, Err(GatewayError::Transport("reset".to_string())));
        assert!(matches!(
            failed_with(step.run(&session(Some(dec!(1)))).await),
            EstimateError::Other(_)
        ));
    }

    #[tokio::test]
    async fn test_without_pair_restarts() {
        let (step, _, _) = setup();

        let outcome = step.run(&TradingSession::new().with_amount(dec!(1))).await;

        assert!(matches!(outcome, EstimateOutcome::Restart { .. }));
    }
}
