use axum::{
    Json,
    extract::Path,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use ring_gesture::Gesture;
use serde::Serialize;

use crate::context::{AppContext, ContextInfo};
use crate::intent::{Intent, IntentEntry, all_intents, build_prompt, intent_for};

/// GET /api/contexts
pub async fn list_contexts() -> Json<Vec<ContextInfo>> {
    Json(AppContext::ALL.iter().map(AppContext::info).collect())
}

/// GET /api/intents
pub async fn list_intents() -> Json<Vec<IntentEntry>> {
    Json(all_intents())
}

#[derive(Debug, Serialize)]
pub struct IntentDetail {
    pub context: AppContext,
    pub gesture: Gesture,
    #[serde(flatten)]
    pub intent: Intent,
    pub prompt: String,
}

/// GET /api/intents/{context}/{gesture}
pub async fn get_intent(Path((context, gesture)): Path<(String, String)>) -> Response {
    let context: AppContext = match context.parse() {
        Ok(c) => c,
        Err(e) => return not_found(e),
    };
    let gesture: Gesture = match gesture.parse() {
        Ok(g) => g,
        Err(e) => return not_found(e),
    };

    Json(IntentDetail {
        context,
        gesture,
        intent: intent_for(context, gesture),
        prompt: build_prompt(context, gesture),
    })
    .into_response()
}

fn not_found(e: impl std::fmt::Display) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": e.to_string() })),
    )
        .into_response()
}
