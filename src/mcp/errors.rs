//! Tool-server client error types.

use thiserror::Error;

/// Errors from the tool-server session and its transport.
///
/// Everything here is fatal to the session. A tool that ran and reported a
/// problem is *not* an error — it comes back as a [`super::types::ToolOutcome`]
/// with an error payload so the conversation can continue.
#[derive(Debug, Error)]
pub enum McpError {
    /// The server process failed to start (or exited immediately).
    #[error("failed to launch server '{name}': {reason}")]
    LaunchFailed { name: String, reason: String },

    /// The initialization handshake did not yield a tool list.
    #[error("server '{name}' initialization failed: {reason}")]
    InitFailed { name: String, reason: String },

    /// I/O on the child's stdio failed or the stream ended mid-session.
    #[error("transport error for server '{server}': {reason}")]
    Transport { server: String, reason: String },

    /// The server did not answer within the configured deadline.
    #[error("'{method}' timed out after {timeout_ms}ms")]
    Timeout { method: String, timeout_ms: u64 },
}
