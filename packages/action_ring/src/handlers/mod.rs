pub mod ai;
pub mod health;
pub mod intents;
pub mod relay;
pub mod ring;

// Re-export all handlers for easy route registration
pub use ai::ai_dispatch_handler;
pub use health::{health_handler, health_live_handler, metrics_handler};
pub use intents::{get_intent, list_contexts, list_intents};
pub use relay::relay_handler;
pub use ring::ring_websocket_handler;
