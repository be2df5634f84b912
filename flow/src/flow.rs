//! Exchange flow: routes amount messages through the steps and the session store.

use std::sync::Arc;
use tracing::{info, instrument, warn};

use coinswap_common::{ConversationId, CurrencyRecord, SharedClock, TradingSession};
use coinswap_gateway::ExchangeGateway;

use crate::amount::{AmountEntry, AmountStep, AmountTransition};
use crate::config::FlowConfig;
use crate::error::FlowError;
use crate::estimate::{EstimateOutcome, EstimateStep};
use crate::interceptor::{InboundMessage, MessageInterceptor};
use crate::metrics::{FlowMetrics, FlowMetricsSnapshot, SharedFlowMetrics};
use crate::session_store::SessionStore;
use crate::state::Scene;

/// Shown when the conversation restarts after an invalid session.
pub const RESTART_MESSAGE: &str = "Something went wrong with this exchange. Let's start over.";

/// Shown when the user goes back to pick the destination currency.
pub const CHOOSE_DESTINATION_MESSAGE: &str = "Choose the currency you want to receive.";

/// What to send back to the user and where the conversation now is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowReply {
    /// Messages in display order.
    pub messages: Vec<String>,
    /// Scene the conversation is in after the reply.
    pub scene: Scene,
}

impl FlowReply {
    fn new(scene: Scene, messages: Vec<String>) -> Self {
        Self { messages, scene }
    }
}

/// Amount and estimate steps over a shared session store.
pub struct ExchangeFlow {
    store: SessionStore,
    interceptor: MessageInterceptor,
    amount: AmountStep,
    estimate: EstimateStep,
    metrics: SharedFlowMetrics,
}

impl ExchangeFlow {
    /// Create a new flow.
    pub fn new(gateway: Arc<dyn ExchangeGateway>, clock: SharedClock, config: &FlowConfig) -> Self {
        let metrics = Arc::new(FlowMetrics::new());
        Self {
            store: SessionStore::new(),
            interceptor: MessageInterceptor::new(clock, config.message_max_age, metrics.clone()),
            amount: AmountStep::new(
                gateway.clone(),
                config.amount_config.clone(),
                metrics.clone(),
            ),
            estimate: EstimateStep::new(gateway, metrics.clone()),
            metrics,
        }
    }

    /// Current session for a conversation.
    pub fn session(&self, conversation: ConversationId) -> TradingSession {
        self.store.get(conversation)
    }

    /// Get metrics snapshot.
    pub fn metrics(&self) -> FlowMetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Label of the input that goes back to currency selection.
    pub fn back_label(&self) -> &str {
        self.amount.back_label()
    }

    /// Start the amount step for a freshly selected pair.
    pub async fn begin_amount(
        &self,
        conversation: ConversationId,
        from: CurrencyRecord,
        to: CurrencyRecord,
    ) -> FlowReply {
        let _turn = self.store.lock(conversation).await;
        self.store.update(conversation, |session| {
            session.with_curr_from(from).with_curr_to(to)
        });
        self.enter_amount_locked(conversation).await
    }

    /// Enter the amount step with whatever the session holds.
    #[instrument(skip(self))]
    pub async fn enter_amount(&self, conversation: ConversationId) -> FlowReply {
        let _turn = self.store.lock(conversation).await;
        self.enter_amount_locked(conversation).await
    }

    /// Caller holds the conversation's turn.
    async fn enter_amount_locked(&self, conversation: ConversationId) -> FlowReply {
        let session = self.store.get(conversation);
        match self.amount.enter(session).await {
            AmountEntry::Prompt { session, prompt } => {
                self.store.put(conversation, session);
                FlowReply::new(Scene::Amount, vec![prompt])
            }
            AmountEntry::Restart { reason } => self.restart(conversation, &reason),
        }
    }

    /// Handle a message sent while the conversation is in the amount step.
    ///
    /// Returns `None` when the message is too old to act on. Waits for any
    /// handler still working on the same conversation, such as the minimum
    /// lookup of the step entry, so every input sees a settled session.
    #[instrument(skip(self, message), fields(conversation = %message.conversation))]
    pub async fn on_amount_message(&self, message: &InboundMessage) -> Option<FlowReply> {
        if self.interceptor.intercepted_by_age(message) {
            return None;
        }

        let conversation = message.conversation;
        let _turn = self.store.lock(conversation).await;
        let session = self.store.get(conversation);

        let reply = match self.amount.handle_input(session, &message.text) {
            AmountTransition::Advance { session, next } => {
                self.store.put(conversation, session.clone());
                info!(scene = %next, "Amount step complete");
                self.run_estimate(conversation, &session).await
            }
            AmountTransition::Reprompt { message, .. } => {
                FlowReply::new(Scene::Amount, vec![message])
            }
            AmountTransition::Reenter { message, delay, .. } => {
                tokio::time::sleep(delay).await;
                let mut reply = self.enter_amount_locked(conversation).await;
                reply.messages.insert(0, message);
                reply
            }
            AmountTransition::Back { session, next } => {
                self.store.put(conversation, session);
                FlowReply::new(next, vec![CHOOSE_DESTINATION_MESSAGE.to_string()])
            }
            AmountTransition::Restart { reason } => self.restart(conversation, &reason),
        };

        Some(reply)
    }

    async fn run_estimate(&self, conversation: ConversationId, session: &TradingSession) -> FlowReply {
        match self.estimate.run(session).await {
            EstimateOutcome::Quoted { message, .. } => FlowReply::new(Scene::Estimate, vec![message]),
            EstimateOutcome::Failed { message, .. } => FlowReply::new(Scene::Estimate, vec![message]),
            EstimateOutcome::Restart { reason } => self.restart(conversation, &reason),
        }
    }

    fn restart(&self, conversation: ConversationId, reason: &FlowError) -> FlowReply {
        warn!(
            conversation = %conversation,
            code = reason.error_code(),
            "Resetting conversation"
        );
        self.store.reset(conversation);
        FlowReply::new(Scene::StartNewExchange, vec![RESTART_MESSAGE.to_string()])
    }
}
