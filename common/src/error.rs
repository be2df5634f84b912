//! Error types shared by the coinswap crates.

use thiserror::Error;

/// Errors raised by shared types.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommonError {
    /// A trading session is missing a field the current step relies on.
    #[error("Session invariant violated: missing {field}")]
    SessionInvariant { field: &'static str },
}

impl CommonError {
    /// Get error code for log correlation.
    pub fn error_code(&self) -> &'static str {
        match self {
            CommonError::SessionInvariant { .. } => "SESSION_INVARIANT",
        }
    }
}

/// Result type alias for shared operations.
pub type Result<T> = std::result::Result<T, CommonError>;
