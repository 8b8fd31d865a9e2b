//! Orchestrator error types.

use thiserror::Error;

use crate::mcp::McpError;
use crate::model::ModelError;

/// A failed turn. Tool-level failures never appear here — they are folded
/// into the conversation as error payloads and the turn continues.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The model call itself failed (transport, HTTP, malformed response).
    #[error(transparent)]
    Model(#[from] ModelError),

    /// The tool-server session died or timed out.
    #[error(transparent)]
    Session(#[from] McpError),

    /// The model kept requesting tools past the round budget.
    #[error("turn did not converge after {rounds} tool rounds")]
    ToolRoundsExhausted { rounds: usize },
}

impl AgentError {
    /// Whether the underlying tool-server session is unusable and the
    /// enclosing chat loop should end.
    pub fn session_is_dead(&self) -> bool {
        matches!(self, AgentError::Session(_))
    }
}
