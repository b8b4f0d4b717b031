use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::Value;

use super::provider::ProviderKind;

const GENERIC_FAILURE: &str = "Failed to process AI request";

#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("unknown AI provider: {0}")]
    UnknownProvider(String),

    #[error("no API key configured for {0}")]
    NotConfigured(ProviderKind),

    /// The provider answered with a non-success status. The body is echoed
    /// back to the caller as-is.
    #[error("upstream returned {status}")]
    Upstream { status: StatusCode, body: Value },

    #[error("invalid request body: {0}")]
    InvalidRequest(#[from] serde_json::Error),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl AiError {
    pub fn error_code(&self) -> &str {
        match self {
            Self::UnknownProvider(_) => "unknown_provider",
            Self::NotConfigured(_) => "not_configured",
            Self::Upstream { .. } => "upstream",
            Self::InvalidRequest(_) => "invalid_request",
            Self::Transport(_) => "transport",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::UnknownProvider(_) => StatusCode::NOT_FOUND,
            Self::NotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Upstream { status, .. } => *status,
            Self::InvalidRequest(_) | Self::Transport(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The `error` field returned to HTTP and WebSocket callers. Decode and
    /// network failures are collapsed into one generic message.
    pub fn client_body(&self) -> Value {
        match self {
            Self::Upstream { body, .. } => body.clone(),
            Self::InvalidRequest(_) | Self::Transport(_) => Value::from(GENERIC_FAILURE),
            other => Value::from(other.to_string()),
        }
    }
}

impl IntoResponse for AiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(serde_json::json!({ "error": self.client_body() }))).into_response()
    }
}
