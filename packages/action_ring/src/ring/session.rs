//! Ring Session
//!
//! One WebSocket connection drives one gesture engine. Gesture transitions
//! are reported back with the intent for the selected context and, when
//! auto-dispatch is on, trigger an AI request for that intent.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures::{sink::SinkExt, stream::StreamExt};
use ring_gesture::{Gesture, GestureUpdate, spawn_gesture_engine};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::AppState;
use crate::ai::{AiDispatcher, AiError, AiReply, AiRequest, ProviderKind};
use crate::context::AppContext;
use crate::intent::{build_prompt, intent_for};
use crate::metrics::ServerMetrics;

use super::protocol::{ClientMessage, ServerMessage};
use super::tracker::RequestTracker;

/// An AI request the session wants sent
#[derive(Debug, Clone)]
pub struct PendingDispatch {
    pub request_id: u64,
    pub provider: ProviderKind,
    pub request: AiRequest,
}

/// A finished AI request, tagged with the id it was issued under
#[derive(Debug)]
pub struct AiOutcome {
    pub request_id: u64,
    pub result: Result<AiReply, AiError>,
}

/// What the session wants done after an input
#[derive(Debug, Default)]
pub struct Reaction {
    pub messages: Vec<ServerMessage>,
    pub dispatch: Option<PendingDispatch>,
}

/// Per-connection state. Owned by the connection's control loop, so no
/// locking.
#[derive(Debug)]
pub struct RingSession {
    context: AppContext,
    provider: ProviderKind,
    gesture: Gesture,
    rotation: f64,
    auto_dispatch: bool,
    tracker: RequestTracker,
}

impl RingSession {
    pub fn new(context: AppContext, provider: ProviderKind, auto_dispatch: bool) -> Self {
        Self {
            context,
            provider,
            gesture: Gesture::Idle,
            rotation: 0.0,
            auto_dispatch,
            tracker: RequestTracker::new(),
        }
    }

    #[cfg(test)]
    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    #[cfg(test)]
    pub fn context(&self) -> AppContext {
        self.context
    }

    #[cfg(test)]
    pub fn provider(&self) -> ProviderKind {
        self.provider
    }

    pub fn ready(&self) -> ServerMessage {
        ServerMessage::Ready {
            context: self.context,
            provider: self.provider,
            auto_dispatch: self.auto_dispatch,
        }
    }

    fn gesture_changed(&self) -> ServerMessage {
        ServerMessage::GestureChanged {
            gesture: self.gesture,
            context: self.context,
            intent: intent_for(self.context, self.gesture),
            rotation: self.rotation,
        }
    }

    /// Issue a request for the current intent, unless idle or auto-dispatch
    /// is off.
    fn dispatch_current(&mut self, reaction: &mut Reaction) {
        if !self.auto_dispatch || self.gesture.is_idle() {
            return;
        }
        let request_id = self.tracker.issue();
        reaction
            .messages
            .push(ServerMessage::AiPending { request_id });
        reaction.dispatch = Some(PendingDispatch {
            request_id,
            provider: self.provider,
            request: AiRequest {
                prompt: build_prompt(self.context, self.gesture),
                context: self.context.as_str().to_string(),
                gesture: self.gesture.as_str().to_string(),
            },
        });
    }

    pub fn on_gesture(&mut self, update: &GestureUpdate) -> Reaction {
        self.gesture = update.gesture;
        self.rotation = update.rotation;

        let mut reaction = Reaction::default();
        reaction.messages.push(self.gesture_changed());
        self.dispatch_current(&mut reaction);
        reaction
    }

    pub fn set_context(&mut self, context: AppContext) -> Reaction {
        let mut reaction = Reaction::default();
        if context == self.context {
            return reaction;
        }
        self.context = context;
        reaction.messages.push(self.gesture_changed());
        self.dispatch_current(&mut reaction);
        reaction
    }

    pub fn set_provider(&mut self, provider: ProviderKind) -> Reaction {
        let mut reaction = Reaction::default();
        if provider == self.provider {
            return reaction;
        }
        self.provider = provider;
        self.dispatch_current(&mut reaction);
        reaction
    }

    /// Turn a finished request into a message, or `None` if a newer request
    /// has been issued since.
    pub fn on_outcome(&self, outcome: AiOutcome) -> Option<ServerMessage> {
        if !self.tracker.is_latest(outcome.request_id) {
            return None;
        }
        Some(match outcome.result {
            Ok(reply) => ServerMessage::AiResponse {
                request_id: outcome.request_id,
                response: reply.response,
                model: reply.model,
            },
            Err(e) => ServerMessage::AiFailed {
                request_id: outcome.request_id,
                error: e.client_body(),
            },
        })
    }
}

fn spawn_dispatch(
    pending: PendingDispatch,
    dispatcher: Arc<AiDispatcher>,
    outcome_tx: mpsc::Sender<AiOutcome>,
) {
    tokio::spawn(async move {
        let result = dispatcher
            .dispatch_to(pending.provider, &pending.request)
            .await;
        let _ = outcome_tx
            .send(AiOutcome {
                request_id: pending.request_id,
                result,
            })
            .await;
    });
}

fn record_outcome(metrics: &ServerMetrics, outcome: &AiOutcome) {
    if let Err(e) = &outcome.result {
        warn!(request_id = outcome.request_id, code = e.error_code(), error = %e, "AI request failed");
        metrics.ai_failure();
    }
}

/// Handle a ring WebSocket connection
pub async fn handle_ring_ws(socket: WebSocket, state: AppState) {
    let connection_id = uuid::Uuid::new_v4().to_string();
    info!(conn_id = %connection_id, "New ring session");
    state.metrics.session_opened();

    let provider = state
        .config
        .dispatch
        .default_provider
        .parse::<ProviderKind>()
        .unwrap_or_else(|e| {
            warn!("{}, falling back to openai", e);
            ProviderKind::OpenAi
        });
    let mut session = RingSession::new(
        AppContext::default(),
        provider,
        state.config.dispatch.auto_dispatch,
    );

    let (mut ws_sender, mut ws_receiver) = socket.split();

    // Channel for sending messages to the WebSocket
    let (tx, mut rx) = mpsc::channel::<ServerMessage>(64);

    let (input_tx, input_rx) = mpsc::channel(64);
    let (update_tx, mut update_rx) = mpsc::channel::<GestureUpdate>(64);
    let (outcome_tx, mut outcome_rx) = mpsc::channel::<AiOutcome>(16);
    spawn_gesture_engine(input_rx, update_tx, state.config.gesture.clone());

    // Task to send messages to WebSocket
    let sender_task = async move {
        while let Some(msg) = rx.recv().await {
            let json = match serde_json::to_string(&msg) {
                Ok(j) => j,
                Err(e) => {
                    error!("Failed to serialize message: {}", e);
                    continue;
                }
            };
            if ws_sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    };

    // Task that owns the session: client input, gesture updates, AI outcomes
    let metrics = state.metrics.clone();
    let dispatcher = state.dispatcher.clone();
    let conn_id = connection_id.clone();
    let control_task = async move {
        if tx.send(session.ready()).await.is_err() {
            return;
        }

        loop {
            let reaction = tokio::select! {
                msg = ws_receiver.next() => match msg {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ClientMessage>(text.as_str()) {
                            Ok(client_msg) => match client_msg.pointer_input() {
                                Some(input) => {
                                    if input_tx.send(input).await.is_err() {
                                        warn!(conn_id = %conn_id, "Gesture engine stopped");
                                        break;
                                    }
                                    Reaction::default()
                                }
                                None => match client_msg {
                                    ClientMessage::SetContext { context } => {
                                        session.set_context(context)
                                    }
                                    ClientMessage::SetProvider { provider } => {
                                        session.set_provider(provider)
                                    }
                                    _ => Reaction::default(),
                                },
                            },
                            Err(e) => {
                                debug!(conn_id = %conn_id, "Invalid ring message: {}", e);
                                Reaction {
                                    messages: vec![ServerMessage::Error {
                                        message: format!("Invalid message: {}", e),
                                    }],
                                    dispatch: None,
                                }
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => Reaction::default(),
                    Some(Err(e)) => {
                        debug!(conn_id = %conn_id, "Ring socket error: {}", e);
                        break;
                    }
                },
                Some(update) = update_rx.recv() => {
                    debug!(conn_id = %conn_id, gesture = %update.gesture, "Gesture changed");
                    metrics.gesture_recognized(update.gesture);
                    session.on_gesture(&update)
                }
                Some(outcome) = outcome_rx.recv() => {
                    record_outcome(&metrics, &outcome);
                    let request_id = outcome.request_id;
                    match session.on_outcome(outcome) {
                        Some(message) => Reaction {
                            messages: vec![message],
                            dispatch: None,
                        },
                        None => {
                            debug!(conn_id = %conn_id, request_id, "Dropping stale AI response");
                            metrics.ai_stale_response();
                            Reaction::default()
                        }
                    }
                }
            };

            if let Some(pending) = reaction.dispatch {
                metrics.ai_request();
                spawn_dispatch(pending, dispatcher.clone(), outcome_tx.clone());
            }
            for message in reaction.messages {
                if tx.send(message).await.is_err() {
                    return;
                }
            }
        }
    };

    tokio::select! {
        _ = sender_task => debug!(conn_id = %connection_id, "Ring sender finished"),
        _ = control_task => debug!(conn_id = %connection_id, "Ring session closed"),
    }

    state.metrics.session_closed();
    info!(conn_id = %connection_id, "Ring session ended");
}
