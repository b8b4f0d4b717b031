//! Ring WebSocket Protocol Types
//!
//! Message types exchanged over `/api/ring/ws`.

use ring_gesture::{Gesture, PointerInput};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ai::ProviderKind;
use crate::context::AppContext;
use crate::intent::Intent;

/// Messages from the simulated ring to the server
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    PointerDown { x: f64, y: f64 },
    PointerMove { x: f64, y: f64 },
    PointerUp,
    Wheel { delta_y: f64 },
    SetContext { context: AppContext },
    SetProvider { provider: ProviderKind },
}

impl ClientMessage {
    /// The pointer input this message carries, if any
    pub fn pointer_input(&self) -> Option<PointerInput> {
        match *self {
            ClientMessage::PointerDown { x, y } => Some(PointerInput::PressStart { x, y }),
            ClientMessage::PointerMove { x, y } => Some(PointerInput::PressMove { x, y }),
            ClientMessage::PointerUp => Some(PointerInput::PressEnd),
            ClientMessage::Wheel { delta_y } => Some(PointerInput::Scroll { delta_y }),
            ClientMessage::SetContext { .. } | ClientMessage::SetProvider { .. } => None,
        }
    }
}

/// Messages from the server to the ring
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// Sent once when the session starts
    Ready {
        context: AppContext,
        provider: ProviderKind,
        auto_dispatch: bool,
    },
    /// The recognized gesture (or the selected context) changed
    GestureChanged {
        gesture: Gesture,
        context: AppContext,
        intent: Intent,
        rotation: f64,
    },
    AiPending {
        request_id: u64,
    },
    AiResponse {
        request_id: u64,
        response: String,
        model: String,
    },
    AiFailed {
        request_id: u64,
        error: Value,
    },
    Error {
        message: String,
    },
}
