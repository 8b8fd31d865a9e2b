//! Model client error types.
//!
//! These are all turn-fatal: the orchestrator surfaces them instead of
//! continuing the conversation.

use thiserror::Error;

/// Errors from the conversational-model endpoint.
#[derive(Debug, Error)]
pub enum ModelError {
    /// TCP/HTTP connection to the endpoint failed.
    #[error("connection failed to {endpoint}: {reason}")]
    ConnectionFailed { endpoint: String, reason: String },

    /// The endpoint did not respond within the request timeout.
    #[error("model request timed out after {duration_secs}s")]
    Timeout { duration_secs: u64 },

    /// Non-2xx HTTP response from the endpoint.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body did not parse, or carried no candidates.
    #[error("malformed model response: {reason}")]
    MalformedResponse { reason: String },
}
