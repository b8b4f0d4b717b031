//! Ring WebSocket sessions

mod protocol;
mod session;
mod tracker;

pub use protocol::{ClientMessage, ServerMessage};
pub use session::handle_ring_ws;
