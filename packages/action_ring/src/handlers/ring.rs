use axum::{
    extract::{State, WebSocketUpgrade},
    response::Response,
};

use crate::AppState;
use crate::ring;

/// GET /api/ring/ws - one simulated ring per connection
pub async fn ring_websocket_handler(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| ring::handle_ring_ws(socket, state))
}
