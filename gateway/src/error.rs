//! Gateway error types.

use thiserror::Error;

/// Errors returned by upstream gateways.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    /// Upstream could not be reached.
    #[error("Network error: {0}")]
    Transport(String),

    /// Upstream answered with a non-2xx status.
    #[error("Upstream returned HTTP {status}")]
    Status { status: u16, body: String },

    /// Response body could not be decoded.
    #[error("Malformed response: {0}")]
    Decode(String),

    /// Response decoded but lacked a field we consume.
    #[error("Response missing field: {0}")]
    MissingField(&'static str),

    /// Gateway was built from an unusable configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl GatewayError {
    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            GatewayError::Transport(_) => true,
            GatewayError::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Get error code for log correlation.
    pub fn error_code(&self) -> &'static str {
        match self {
            GatewayError::Transport(_) => "TRANSPORT",
            GatewayError::Status { .. } => "HTTP_STATUS",
            GatewayError::Decode(_) => "DECODE",
            GatewayError::MissingField(_) => "MISSING_FIELD",
            GatewayError::Configuration(_) => "CONFIGURATION",
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            GatewayError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            GatewayError::Status {
                status: status.as_u16(),
                body: String::new(),
            }
        } else if err.is_builder() {
            GatewayError::Configuration(err.to_string())
        } else {
            GatewayError::Transport(err.to_string())
        }
    }
}

/// Result type for gateway calls.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// User-facing categories for a failed exchange estimate.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EstimateError {
    /// Amount was not a positive number; upstream was never called.
    #[error("Invalid amount provided")]
    InvalidAmount,

    /// HTTP 401.
    #[error("API Key unauthorized. Verify your ChangeNow API key.")]
    Unauthorized,

    /// HTTP 400.
    #[error("Invalid parameters. Check currency pair and amount.")]
    BadParameters,

    /// HTTP 422.
    #[error("Amount below minimum or invalid currency pair.")]
    BelowMinimumOrInvalidPair,

    /// HTTP 500.
    #[error("Service temporarily unavailable. Please try again.")]
    TemporarilyUnavailable,

    /// Upstream answered 2xx without an estimate.
    #[error("Invalid API response")]
    InvalidResponse,

    /// Anything else.
    #[error("{0}")]
    Other(String),
}

impl From<GatewayError> for EstimateError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Status { status: 401, .. } => EstimateError::Unauthorized,
            GatewayError::Status { status: 400, .. } => EstimateError::BadParameters,
            GatewayError::Status { status: 422, .. } => EstimateError::BelowMinimumOrInvalidPair,
            GatewayError::Status { status: 500, .. } => EstimateError::TemporarilyUnavailable,
            GatewayError::Decode(_) | GatewayError::MissingField(_) => EstimateError::InvalidResponse,
            other => EstimateError::Other(other.to_string()),
        }
    }
}
