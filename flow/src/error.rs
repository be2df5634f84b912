//! Flow error types.

use coinswap_common::CommonError;
use thiserror::Error;

/// Errors that end the current step.
#[derive(Debug, Error)]
pub enum FlowError {
    /// The session is missing a field the step needs; the flow restarts.
    #[error("Session invariant violated: {0}")]
    Session(#[from] CommonError),

    /// Settings failed validation at startup.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl FlowError {
    /// Check if the conversation should restart from its entry point.
    pub fn resets_flow(&self) -> bool {
        matches!(self, FlowError::Session(_))
    }

    /// Get error code for logs.
    pub fn error_code(&self) -> &'static str {
        match self {
            FlowError::Session(e) => e.error_code(),
            FlowError::Configuration(_) => "CONFIGURATION_ERROR",
        }
    }
}

/// Result type for flow operations.
pub type FlowResult<T> = Result<T, FlowError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_session_errors_reset_the_flow() {
        let session = FlowError::from(CommonError::SessionInvariant { field: "curr_to" });
        assert!(session.resets_flow());
        assert_eq!(session.error_code(), "SESSION_INVARIANT");

        let config = FlowError::Configuration("Message max age cannot be zero".to_string());
        assert!(!config.resets_flow());
        assert_eq!(config.error_code(), "CONFIGURATION_ERROR");
    }
}
