//! Error kinds for upstream generation calls.

use std::time::Duration;
use thiserror::Error;

/// Errors returned by the AI gateway.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// The call did not finish within the per-attempt timeout.
    #[error("AI request timed out after {0:?}")]
    Timeout(Duration),

    /// The service answered with a non-success status.
    #[error("AI service returned HTTP {status}: {body}")]
    Upstream { status: u16, body: String },

    /// Connection or transport failure.
    #[error("Network error talking to AI service: {0}")]
    Network(#[from] reqwest::Error),

    /// The service answered 2xx with a body that is not the expected JSON.
    #[error("Malformed AI response: {0}")]
    MalformedResponse(String),

    /// The client could not be set up.
    #[error("AI client configuration error: {0}")]
    Config(String),
}

impl GatewayError {
    /// Whether retrying the same request might succeed.
    ///
    /// Timeouts, transport errors and 5xx answers are transient; 4xx answers
    /// and malformed bodies are not.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout(_) | Self::Network(_) => true,
            Self::Upstream { status, .. } => *status >= 500,
            Self::MalformedResponse(_) | Self::Config(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(GatewayError::Timeout(Duration::from_secs(1)).is_transient());
        assert!(GatewayError::Upstream {
            status: 503,
            body: String::new()
        }
        .is_transient());
        assert!(!GatewayError::Upstream {
            status: 400,
            body: String::new()
        }
        .is_transient());
        assert!(!GatewayError::Upstream {
            status: 429,
            body: String::new()
        }
        .is_transient());
        assert!(!GatewayError::MalformedResponse("x".into()).is_transient());
    }
}
