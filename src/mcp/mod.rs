//! Tool-server client — JSON-RPC over a child process's stdio.
//!
//! This module handles:
//! - Spawning the tool-server child process and draining its stderr
//! - Line-delimited JSON-RPC framing over stdin/stdout
//! - The `initialize` handshake and the advertised tool catalog
//! - Correlated `execute_tool` round-trips with typed error/timeout handling
//! - Graceful, idempotent shutdown

pub mod catalog;
pub mod errors;
pub mod session;
pub mod transport;
pub mod types;

pub use catalog::ToolCatalog;
pub use errors::McpError;
pub use session::{McpSession, SessionTimeouts};
pub use types::{ServerConfig, ToolOutcome, ToolSchema};
