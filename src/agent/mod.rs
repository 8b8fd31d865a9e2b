//! Conversation state and the tool-calling turn loop.

pub mod conversation;
pub mod errors;
pub mod orchestrator;

pub use conversation::Conversation;
pub use errors::AgentError;
pub use orchestrator::{ChatModel, Orchestrator, ToolExecutor};
