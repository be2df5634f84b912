//! Coinswap Exchange Flow
//!
//! The conversational steps between pair selection and the exchange estimate:
//! amount entry with a best-effort pair minimum, the estimate itself, and the
//! plumbing around them (session store, staleness guard, counters).
//!
//! Validation failures are never errors here. They come back as
//! [`AmountTransition`] values the transport renders as prompts; only a
//! malformed session ends the step, and that restarts the conversation.

pub mod amount;
pub mod config;
pub mod error;
pub mod estimate;
pub mod flow;
pub mod interceptor;
pub mod metrics;
pub mod normalize;
pub mod session_store;
pub mod state;

pub use amount::{AmountEntry, AmountStep, AmountTransition};
pub use config::{AmountConfig, FlowConfig};
pub use error::{FlowError, FlowResult};
pub use estimate::{EstimateOutcome, EstimateStep};
pub use flow::{ExchangeFlow, FlowReply};
pub use interceptor::{InboundMessage, MessageInterceptor};
pub use metrics::{FlowMetrics, FlowMetricsSnapshot, SharedFlowMetrics};
pub use normalize::{normalize_amount, FormatRejection};
pub use session_store::SessionStore;
pub use state::{AmountState, Scene};
