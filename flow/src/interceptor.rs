//! Staleness guard for inbound messages.

use chrono::Duration;
use coinswap_common::{constants, is_older_than, ConversationId, SharedClock, Timestamp};
use tracing::debug;

use crate::metrics::SharedFlowMetrics;

/// A user message as delivered by the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    /// Conversation the message belongs to.
    pub conversation: ConversationId,
    /// Raw message text.
    pub text: String,
    /// When the user sent it.
    pub sent_at: Timestamp,
}

impl InboundMessage {
    /// Create a new inbound message.
    pub fn new(conversation: ConversationId, text: impl Into<String>, sent_at: Timestamp) -> Self {
        Self {
            conversation,
            text: text.into(),
            sent_at,
        }
    }
}

/// Drops messages that arrive too long after they were sent.
///
/// Transports redeliver messages after reconnects; without the guard a
/// redelivered amount would be validated again after the user moved on.
pub struct MessageInterceptor {
    clock: SharedClock,
    max_age: Duration,
    metrics: SharedFlowMetrics,
}

impl MessageInterceptor {
    /// Create a new interceptor.
    pub fn new(clock: SharedClock, max_age: std::time::Duration, metrics: SharedFlowMetrics) -> Self {
        let max_age =
            Duration::from_std(max_age).unwrap_or_else(|_| constants::message_max_age());
        Self {
            clock,
            max_age,
            metrics,
        }
    }

    /// Check whether `message` is at least the configured age and must be ignored.
    pub fn intercepted_by_age(&self, message: &InboundMessage) -> bool {
        let now = self.clock.now();
        if !is_older_than(message.sent_at, now, self.max_age) {
            return false;
        }

        debug!(
            conversation = %message.conversation,
            age_secs = now.signed_duration_since(message.sent_at).num_seconds(),
            "Dropping stale message"
        );
        self.metrics.message_stale();
        true
    }
}
