use std::sync::Arc;

use axum::Router;
use axum::response::Response;

use crate::AppState;
use crate::ai::AiDispatcher;
use crate::config::{AppConfig, FileConfig};
use crate::metrics::ServerMetrics;
use crate::relay::RelayClient;

/// Build an `AppState` from a file config, with no API keys unless the
/// config sets them.
pub fn test_app_state_with(fc: FileConfig) -> AppState {
    let config = AppConfig::from_file(&fc).expect("config");
    let dispatcher =
        AiDispatcher::new(&config.providers, config.dispatch.request_timeout).expect("dispatcher");
    let relay = RelayClient::new(&config.relay).expect("relay");

    AppState {
        config: Arc::new(config),
        dispatcher: Arc::new(dispatcher),
        relay: Arc::new(relay),
        metrics: Arc::new(ServerMetrics::new()),
    }
}

pub fn test_app_state() -> AppState {
    test_app_state_with(FileConfig::default())
}

/// Serve `app` on an ephemeral local port, standing in for a third-party
/// API. Returns the base URL and a shutdown handle; dropping the handle
/// stops the server.
pub async fn spawn_upstream(app: Router) -> (String, tokio::sync::oneshot::Sender<()>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = tokio::sync::oneshot::channel::<()>();
    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = rx.await;
            })
            .await
            .unwrap();
    });
    (format!("http://{addr}"), tx)
}

pub async fn body_json(resp: Response) -> serde_json::Value {
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}
