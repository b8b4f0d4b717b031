use axum::{Json, extract::State, response::IntoResponse};

use crate::AppState;
use crate::ai::ProviderKind;
use crate::metrics;

/// Health check endpoint - returns server status
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.metrics.snapshot();
    let providers: Vec<metrics::ProviderHealth> = ProviderKind::ALL
        .iter()
        .map(|kind| metrics::ProviderHealth {
            name: kind.to_string(),
            configured: state.dispatcher.is_configured(*kind),
        })
        .collect();

    let status = if providers.iter().any(|p| p.configured) {
        "healthy"
    } else {
        "degraded"
    };

    Json(metrics::HealthStatus {
        status: status.to_string(),
        sessions: snapshot.sessions.active,
        providers,
        uptime_secs: snapshot.uptime_secs,
    })
}

/// Metrics endpoint - returns detailed server metrics
pub async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.metrics.snapshot())
}

/// Liveness probe - returns 200 if the server is running
pub async fn health_live_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "alive" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{body_json, test_app_state};
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode},
        routing::get,
    };
    use tower::ServiceExt;

    fn test_router() -> Router {
        Router::new()
            .route("/health", get(health_handler))
            .route("/health/live", get(health_live_handler))
            .route("/metrics", get(metrics_handler))
            .with_state(test_app_state())
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_live() {
        let resp = test_router().oneshot(get_req("/health/live")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["status"], "alive");
    }

    #[tokio::test]
    async fn test_health_without_keys_is_degraded() {
        let resp = test_router().oneshot(get_req("/health")).await.unwrap();
        let json = body_json(resp).await;
        assert_eq!(json["status"], "degraded");
        assert_eq!(json["providers"][0]["name"], "openai");
        assert_eq!(json["providers"][0]["configured"], false);
    }

    #[tokio::test]
    async fn test_metrics_shape() {
        let resp = test_router().oneshot(get_req("/metrics")).await.unwrap();
        let json = body_json(resp).await;
        assert_eq!(json["sessions"]["active"], 0);
        assert_eq!(json["gestures"]["rotate"], 0);
        assert!(json["ai"].is_object());
        assert!(json["relay"].is_object());
    }
}
