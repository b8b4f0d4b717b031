use axum::{
    Json,
    body::Bytes,
    extract::State,
    response::{IntoResponse, Response},
};

use crate::AppState;

/// GET/POST/PUT/PATCH/DELETE /api/proxy - forward a JSON-described request
pub async fn relay_handler(State(state): State<AppState>, body: Bytes) -> Response {
    state.metrics.relay_request();

    match state.relay.relay(&body).await {
        Ok((status, json)) => (status, Json(json)).into_response(),
        Err(e) => {
            tracing::warn!("Relay request failed: {}", e);
            state.metrics.relay_failure();
            e.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FileConfig;
    use crate::test_helpers::{body_json, spawn_upstream, test_app_state, test_app_state_with};
    use axum::{
        Router,
        body::Body,
        http::{HeaderMap, Method, Request, StatusCode},
        routing::{any, get},
    };
    use serde_json::{Value, json};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    fn test_router(state: AppState) -> Router {
        Router::new()
            .route(
                "/api/proxy",
                get(relay_handler)
                    .post(relay_handler)
                    .put(relay_handler)
                    .patch(relay_handler)
                    .delete(relay_handler),
            )
            .with_state(state)
    }

    fn relay_request(method: Method, body: impl Into<Body>) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri("/api/proxy")
            .header("content-type", "application/json")
            .body(body.into())
            .unwrap()
    }

    /// Upstream that echoes what it received and counts calls
    async fn echo_upstream() -> (String, Arc<AtomicUsize>, tokio::sync::oneshot::Sender<()>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let app = Router::new().route(
            "/{*path}",
            any(
                move |method: Method, headers: HeaderMap, body: String| {
                    let counter = counter.clone();
                    async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                        Json(json!({
                            "method": method.as_str(),
                            "auth": headers.get("authorization").and_then(|v| v.to_str().ok()),
                            "body": body,
                        }))
                    }
                },
            ),
        );
        let (base, shutdown) = spawn_upstream(app).await;
        let origin = base.trim_start_matches("http://").to_string();
        (origin, calls, shutdown)
    }

    #[tokio::test]
    async fn test_invalid_json() {
        let app = test_router(test_app_state());
        let resp = app
            .oneshot(relay_request(Method::POST, "{not json"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await, json!({ "error": "Invalid JSON" }));
    }

    #[tokio::test]
    async fn test_missing_path_makes_no_outbound_call() {
        let (origin, calls, _shutdown) = echo_upstream().await;
        let app = test_router(test_app_state());
        let envelope = json!({
            "protocol": "http",
            "origin": origin,
            "method": "GET",
            "headers": {},
        });
        let resp = app
            .oneshot(relay_request(Method::POST, envelope.to_string()))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(resp).await,
            json!({ "error": "Missing required fields in request body" })
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_forwards_and_returns_upstream_json() {
        let (origin, calls, _shutdown) = echo_upstream().await;
        let app = test_router(test_app_state());
        let envelope = json!({
            "protocol": "http",
            "origin": origin,
            "path": "/v1/things",
            "method": "PUT",
            "headers": { "Content-Type": "application/json" },
            "body": { "id": 7 },
        });
        let resp = app
            .oneshot(relay_request(Method::PUT, envelope.to_string()))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["method"], "PUT");
        assert_eq!(json["body"], r#"{"id":7}"#);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_secrets_substituted_before_forwarding() {
        let (origin, _calls, _shutdown) = echo_upstream().await;
        let mut fc = FileConfig::default();
        fc.relay
            .secrets
            .insert("WEATHER_KEY".into(), "real-secret".into());
        let app = test_router(test_app_state_with(fc));

        let envelope = json!({
            "protocol": "http",
            "origin": origin,
            "path": "forecast",
            "method": "POST",
            "headers": { "Authorization": "Bearer weather_key" },
            "body": "key=WEATHER_KEY",
        });
        let resp = app
            .oneshot(relay_request(Method::POST, envelope.to_string()))
            .await
            .unwrap();
        let json = body_json(resp).await;
        assert_eq!(json["auth"], "Bearer real-secret");
        assert_eq!(json["body"], "key=real-secret");
    }

    #[tokio::test]
    async fn test_origin_allowlist() {
        let mut fc = FileConfig::default();
        fc.relay.allowed_origins = vec!["api.example.com".into()];
        let app = test_router(test_app_state_with(fc));

        let envelope = json!({
            "protocol": "https",
            "origin": "evil.example.net",
            "path": "/",
            "method": "GET",
            "headers": {},
        });
        let resp = app
            .oneshot(relay_request(Method::GET, envelope.to_string()))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_500_with_details() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let origin = listener.local_addr().unwrap().to_string();
        drop(listener);

        let state = test_app_state();
        let metrics = state.metrics.clone();
        let app = test_router(state);
        let envelope = json!({
            "protocol": "http",
            "origin": origin,
            "path": "x",
            "method": "DELETE",
            "headers": {},
        });
        let resp = app
            .oneshot(relay_request(Method::DELETE, envelope.to_string()))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json: Value = body_json(resp).await;
        assert_eq!(json["error"], "Failed to fetch external API");
        assert!(json["details"].as_str().is_some_and(|d| !d.is_empty()));
        assert_eq!(metrics.snapshot().relay.failures, 1);
    }
}
