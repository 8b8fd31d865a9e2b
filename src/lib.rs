//! SAMS Assistant — a conversational client for the Smart Asset Management
//! System's tool server.
//!
//! The assistant spawns the tool server as a child process, speaks a
//! line-delimited JSON-RPC protocol over its stdio (`mcp`), sends the
//! conversation to a Gemini-style function-calling model (`model`), and runs
//! the turn loop that alternates model replies with tool execution until the
//! model answers in plain text (`agent`).

pub mod agent;
pub mod config;
pub mod mcp;
pub mod model;

pub use agent::{AgentError, Orchestrator};
pub use config::AssistantConfig;
pub use mcp::{McpError, McpSession, SessionTimeouts};
pub use model::{GeminiClient, ModelError};
