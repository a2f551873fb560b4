//! Chat with the local language model
//!
//! [`ChatHistory`] persists the transcript between runs, [`LlmService`]
//! streams replies from the inference service.

pub mod history;
pub mod llm;
pub mod message;

pub use history::{ChatHistory, FeedbackKind};
pub use llm::{LlmService, MessageAccumulator, ERROR_PREFIX, UNAVAILABLE_MESSAGE};
pub use message::{ChatMessage, Role, SEED_MESSAGE};
