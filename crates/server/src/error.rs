//! HTTP error responses.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use deck_gemini::GatewayError;
use serde_json::json;
use thiserror::Error;

/// Message for a topic with no stored deck.
pub const NOT_FOUND_MESSAGE: &str = "No slides found for this topic";

/// An error answered as `{ "error": message }`.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("AI service timed out. Please try again.")]
    GatewayTimeout,

    #[error("AI service is unavailable. Please try again.")]
    BadGateway,

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::GatewayTimeout => StatusCode::GATEWAY_TIMEOUT,
            Self::BadGateway => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Map a core error. Client mistakes keep their message; anything else
    /// is logged and answered with `message`.
    pub fn from_core(err: deck_core::Error, message: &str) -> Self {
        use deck_core::Error;
        match err {
            Error::InvalidTopic(_) | Error::SlideCountOutOfRange { .. } => {
                Self::BadRequest(err.to_string())
            }
            Error::DeckNotFound(_) => Self::NotFound(NOT_FOUND_MESSAGE.to_string()),
            other => {
                log::error!("{}: {}", message, other);
                Self::Internal(message.to_string())
            }
        }
    }

    /// Map a gateway error, logging the cause. Clients only see the kind.
    pub fn from_gateway(err: GatewayError) -> Self {
        log::error!("Error calling AI service: {}", err);
        match err {
            GatewayError::Timeout(_) => Self::GatewayTimeout,
            GatewayError::Config(_) => Self::Internal("AI service is not configured".into()),
            GatewayError::Upstream { .. }
            | GatewayError::Network(_)
            | GatewayError::MalformedResponse(_) => Self::BadGateway,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
