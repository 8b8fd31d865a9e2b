//! Wire types for the tool-server protocol.
//!
//! JSON-RPC 2.0 framing plus the tool schema shapes the server advertises
//! during the `initialize` handshake.

use serde::{Deserialize, Serialize};

// ─── JSON-RPC 2.0 ───────────────────────────────────────────────────────────

/// JSON-RPC 2.0 request message.
#[derive(Debug, Clone, Serialize)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub id: u64,
    pub method: String,
    pub params: serde_json::Value,
}

impl RpcRequest {
    /// Create a new JSON-RPC request.
    pub fn new(id: u64, method: &str, params: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            method: method.to_string(),
            params,
        }
    }
}

/// JSON-RPC 2.0 response message (success or error).
///
/// The server may report errors either as a structured object or as a bare
/// string, so `error` stays a raw [`serde_json::Value`] and callers use
/// [`RpcResponse::error_message`] to render it.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    #[allow(dead_code)]
    pub jsonrpc: Option<String>,
    pub id: u64,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

impl RpcResponse {
    /// Render the error payload as a human-readable message, if present.
    pub fn error_message(&self) -> Option<String> {
        let err = self.error.as_ref()?;
        match err {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Object(map) => {
                let message = map
                    .get("message")
                    .and_then(|m| m.as_str())
                    .unwrap_or("unspecified server error");
                match map.get("code").and_then(|c| c.as_i64()) {
                    Some(code) => Some(format!("[{code}] {message}")),
                    None => Some(message.to_string()),
                }
            }
            other => Some(other.to_string()),
        }
    }
}

// ─── Tool Schemas ────────────────────────────────────────────────────────────

/// Scalar parameter type as declared by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Integer,
    Number,
    Boolean,
}

/// A single declared tool parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolParameter {
    pub name: String,
    #[serde(rename = "type", default = "default_param_type")]
    pub param_type: ParamType,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub default: Option<serde_json::Value>,
}

fn default_param_type() -> ParamType {
    ParamType::String
}

/// Tool definition as advertised in the `initialize` response.
///
/// Immutable for the session's lifetime; parameter order is preserved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSchema {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parameters: Vec<ToolParameter>,
}

/// Payload of a successful `initialize` response.
///
/// `tools` is intentionally *not* defaulted: a response without a tool list
/// fails deserialization, which the session treats as an initialization
/// failure.
#[derive(Debug, Clone, Deserialize)]
pub struct InitializeResult {
    pub tools: Vec<ToolSchema>,
}

// ─── Server Configuration ────────────────────────────────────────────────────

/// How to launch the tool-server child process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub env: std::collections::HashMap<String, String>,
    #[serde(default)]
    pub cwd: Option<String>,
}

// ─── Tool Outcomes ───────────────────────────────────────────────────────────

/// Result of one `execute_tool` round-trip.
///
/// A failed tool run is still a *successful* RPC exchange — the failure is
/// carried as data so the conversation can continue.
#[derive(Debug, Clone, Serialize)]
pub struct ToolOutcome {
    pub tool_name: String,
    pub success: bool,
    pub result: Option<serde_json::Value>,
    pub error: Option<String>,
    pub execution_time_ms: u64,
}

impl ToolOutcome {
    pub fn success(tool_name: &str, result: serde_json::Value, elapsed_ms: u64) -> Self {
        Self {
            tool_name: tool_name.to_string(),
            success: true,
            result: Some(result),
            error: None,
            execution_time_ms: elapsed_ms,
        }
    }

    pub fn failure(tool_name: &str, error: impl Into<String>, elapsed_ms: u64) -> Self {
        Self {
            tool_name: tool_name.to_string(),
            success: false,
            result: None,
            error: Some(error.into()),
            execution_time_ms: elapsed_ms,
        }
    }

    /// The payload handed back to the model as a function response.
    ///
    /// Always a JSON object: non-object results are wrapped under `"result"`
    /// and failures carry an `"error"` field the model can read.
    pub fn response_payload(&self) -> serde_json::Value {
        if let Some(err) = &self.error {
            return serde_json::json!({ "error": err });
        }
        match &self.result {
            Some(serde_json::Value::Object(map)) => serde_json::Value::Object(map.clone()),
            Some(other) => serde_json::json!({ "result": other }),
            None => serde_json::json!({ "result": serde_json::Value::Null }),
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
