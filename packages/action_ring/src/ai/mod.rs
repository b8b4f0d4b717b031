//! AI Dispatch
//!
//! Turns a prompt plus its context and gesture into a call against one of
//! the configured LLM providers.

mod dispatch;
mod error;
mod provider;

pub use dispatch::{AiDispatcher, AiReply, AiRequest};
pub use error::AiError;
pub use provider::{ProviderDescriptor, ProviderKind};
