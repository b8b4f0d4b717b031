//! Generic Relay
//!
//! Forwards an arbitrary JSON-described HTTP request to a third-party API
//! and returns the upstream JSON. Configured secrets are substituted into
//! the envelope first, and an optional origin allowlist limits where the
//! relay will go.

mod envelope;
mod secrets;

pub use envelope::RelayEnvelope;
pub use secrets::SecretMasker;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::RelayConfig;

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("Invalid JSON")]
    InvalidJson,

    #[error("Missing required fields in request body")]
    MissingFields,

    #[error("Invalid method: {0}")]
    InvalidMethod(String),

    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    #[error("Origin not allowed: {0}")]
    OriginNotAllowed(String),

    #[error("Failed to fetch external API")]
    Fetch { details: String },
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidJson
            | Self::MissingFields
            | Self::InvalidMethod(_)
            | Self::InvalidHeader(_) => StatusCode::BAD_REQUEST,
            Self::OriginNotAllowed(_) => StatusCode::FORBIDDEN,
            Self::Fetch { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            RelayError::Fetch { details } => serde_json::json!({
                "error": self.to_string(),
                "details": details,
            }),
            _ => serde_json::json!({ "error": self.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

#[derive(Debug, Clone)]
pub struct RelayClient {
    client: reqwest::Client,
    masker: SecretMasker,
    allowed_origins: Vec<String>,
}

impl RelayClient {
    pub fn new(config: &RelayConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        let masker = SecretMasker::new(&config.secrets)?;
        Ok(Self {
            client,
            masker,
            allowed_origins: config.allowed_origins.clone(),
        })
    }

    fn origin_allowed(&self, origin: &str) -> bool {
        self.allowed_origins.is_empty()
            || self
                .allowed_origins
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(origin))
    }

    /// Parse, validate and forward one raw envelope. Returns the upstream
    /// status and its JSON body.
    pub async fn relay(&self, raw: &[u8]) -> Result<(StatusCode, Value), RelayError> {
        let value: Value = serde_json::from_slice(raw).map_err(|_| RelayError::InvalidJson)?;
        let value = self.masker.apply(value);
        let envelope = RelayEnvelope::from_value(&value)?;

        if !self.origin_allowed(&envelope.origin) {
            warn!(origin = %envelope.origin, "Relay target not in allowlist");
            return Err(RelayError::OriginNotAllowed(envelope.origin));
        }

        debug!(method = %envelope.method, origin = %envelope.origin, "Relaying request");

        let mut request = self
            .client
            .request(envelope.method, &envelope.url)
            .headers(envelope.headers);
        if let Some(body) = envelope.body {
            request = request.body(body);
        }

        let fetch_failed = |e: reqwest::Error| RelayError::Fetch {
            details: e.to_string(),
        };
        let resp = request.send().await.map_err(fetch_failed)?;
        let status =
            StatusCode::from_u16(resp.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
        let json: Value = resp.json().await.map_err(fetch_failed)?;

        Ok((status, json))
    }
}
