use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    response::{IntoResponse, Response},
};

use crate::AppState;
use crate::ai::{AiError, AiRequest};

/// POST /api/ai/{provider} - send a prompt to one provider
pub async fn ai_dispatch_handler(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    body: Bytes,
) -> Response {
    state.metrics.ai_request();

    let result = match serde_json::from_slice::<AiRequest>(&body) {
        Ok(request) => state.dispatcher.dispatch(&provider, &request).await,
        Err(e) => Err(AiError::from(e)),
    };

    match result {
        Ok(reply) => Json(reply).into_response(),
        Err(e) => {
            tracing::error!(provider = %provider, code = e.error_code(), "AI API error: {}", e);
            state.metrics.ai_failure();
            e.into_response()
        }
    }
}
