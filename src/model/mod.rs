//! Conversational-model client (Gemini `generateContent` REST API).
//!
//! Request/response types, the HTTP client, and the conversion from
//! advertised tool schemas to function declarations.

pub mod client;
pub mod declarations;
pub mod errors;
pub mod types;

pub use client::GeminiClient;
pub use declarations::declare_tools;
pub use errors::ModelError;
pub use types::{Content, FunctionCall, FunctionResponse, ModelReply, ToolDeclarations};
