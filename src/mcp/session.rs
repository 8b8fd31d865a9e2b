//! One conversation's tool-server session.
//!
//! Owns the transport (and through it the child process), performs the
//! `initialize` handshake, and turns tool invocations into correlated
//! `execute_tool` round-trips. The protocol is half-duplex: one outstanding
//! request at a time, matched by monotonically increasing per-session ids.

use std::time::{Duration, Instant};

use super::catalog::ToolCatalog;
use super::errors::McpError;
use super::transport::StdioTransport;
use super::types::{InitializeResult, RpcRequest, RpcResponse, ServerConfig, ToolOutcome};

/// Protocol version sent in the `initialize` handshake.
const PROTOCOL_VERSION: &str = "1.0";

/// Deadlines for the session's suspension points.
#[derive(Debug, Clone, Copy)]
pub struct SessionTimeouts {
    /// Handshake deadline (server startup can be slow).
    pub init: Duration,
    /// Per-tool-call deadline. A wedged server must not hang the turn.
    pub call: Duration,
    /// Grace period before the child is force-killed on shutdown.
    pub shutdown: Duration,
}

impl Default for SessionTimeouts {
    fn default() -> Self {
        Self {
            init: Duration::from_secs(10),
            call: Duration::from_secs(30),
            shutdown: Duration::from_secs(5),
        }
    }
}

/// A live session against one tool-server child process.
#[derive(Debug)]
pub struct McpSession {
    transport: StdioTransport,
    catalog: ToolCatalog,
    timeouts: SessionTimeouts,
    /// Next request id; starts at 1 and never repeats within the session.
    next_id: u64,
}

impl McpSession {
    /// Spawn the server and run the `initialize` handshake.
    ///
    /// Fails the whole session if the process cannot start or the handshake
    /// does not return a tool list. On handshake failure the child is reaped
    /// before returning.
    pub async fn start(
        name: &str,
        config: &ServerConfig,
        timeouts: SessionTimeouts,
    ) -> Result<Self, McpError> {
        let transport = StdioTransport::start(name, config)?;

        let mut session = Self {
            transport,
            catalog: ToolCatalog::new(Vec::new()),
            timeouts,
            next_id: 1,
        };

        match session.initialize().await {
            Ok(catalog) => {
                tracing::info!(
                    server = name,
                    tool_count = catalog.len(),
                    "session initialized"
                );
                session.catalog = catalog;
                Ok(session)
            }
            Err(e) => {
                session.transport.stop(timeouts.shutdown).await;
                // A broken pipe this early means the process never came up.
                Err(match e {
                    McpError::Transport { server, reason } => McpError::LaunchFailed {
                        name: server,
                        reason: format!("server exited during startup: {reason}"),
                    },
                    other => other,
                })
            }
        }
    }

    /// The tools the server advertised, fixed for the session's lifetime.
    pub fn catalog(&self) -> &ToolCatalog {
        &self.catalog
    }

    async fn initialize(&mut self) -> Result<ToolCatalog, McpError> {
        let name = self.transport.server_name().to_string();

        let response = tokio::time::timeout(
            self.timeouts.init,
            self.round_trip(
                "initialize",
                serde_json::json!({ "protocolVersion": PROTOCOL_VERSION }),
            ),
        )
        .await
        .map_err(|_| McpError::Timeout {
            method: "initialize".into(),
            timeout_ms: self.timeouts.init.as_millis() as u64,
        })??;

        if let Some(message) = response.error_message() {
            return Err(McpError::InitFailed { name, reason: message });
        }

        let result = response.result.ok_or_else(|| McpError::InitFailed {
            name: name.clone(),
            reason: "response carries neither result nor error".into(),
        })?;

        let init: InitializeResult =
            serde_json::from_value(result).map_err(|e| McpError::InitFailed {
                name: name.clone(),
                reason: format!("no valid tool list in initialize response: {e}"),
            })?;

        Ok(ToolCatalog::new(init.tools))
    }

    /// Execute one tool invocation.
    ///
    /// Tool-level failures (unknown name, bad arguments, server-reported
    /// errors) come back as `Ok` outcomes carrying an error payload — the
    /// conversation is expected to continue. `Err` means the session itself
    /// is unusable: the child died, the pipe broke, or the call timed out.
    pub async fn execute_tool(
        &mut self,
        tool_name: &str,
        parameters: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<ToolOutcome, McpError> {
        let start = Instant::now();

        if let Err(fault) = self.catalog.validate(tool_name, parameters) {
            tracing::warn!(tool = tool_name, %fault, "rejecting invocation at the boundary");
            return Ok(ToolOutcome::failure(
                tool_name,
                fault.to_string(),
                start.elapsed().as_millis() as u64,
            ));
        }

        let params = serde_json::json!({
            "name": tool_name,
            "parameters": parameters,
        });

        let response = tokio::time::timeout(
            self.timeouts.call,
            self.round_trip("execute_tool", params),
        )
        .await
        .map_err(|_| McpError::Timeout {
            method: format!("execute_tool({tool_name})"),
            timeout_ms: self.timeouts.call.as_millis() as u64,
        })??;

        let elapsed = start.elapsed().as_millis() as u64;

        match (response.error_message(), response.result) {
            (Some(message), _) => Ok(ToolOutcome::failure(tool_name, message, elapsed)),
            (None, Some(result)) => Ok(ToolOutcome::success(tool_name, result, elapsed)),
            (None, None) => Ok(ToolOutcome::failure(
                tool_name,
                "server returned an empty response",
                elapsed,
            )),
        }
    }

    /// Send one request and read frames until the matching response arrives.
    async fn round_trip(
        &mut self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<RpcResponse, McpError> {
        let id = self.next_id;
        self.next_id += 1;

        let request = RpcRequest::new(id, method, params);
        tracing::debug!(id, method, "sending request");
        self.transport.send(&request).await?;

        loop {
            match self.transport.receive().await? {
                Some(resp) if resp.id == id => return Ok(resp),
                Some(resp) => {
                    // Half-duplex protocol: a different id means the server
                    // answered something we no longer wait for.
                    tracing::warn!(
                        expected = id,
                        got = resp.id,
                        "skipping response with stale request id"
                    );
                }
                None => {
                    return Err(McpError::Transport {
                        server: self.transport.server_name().to_string(),
                        reason: "server closed its stdout before responding".into(),
                    });
                }
            }
        }
    }

    /// Shut the session down: best-effort `shutdown` notification, bounded
    /// wait, then kill. Safe to call more than once.
    pub async fn shutdown(&mut self) {
        let _ = self
            .transport
            .notify("shutdown", serde_json::Value::Null)
            .await;
        self.transport.stop(self.timeouts.shutdown).await;
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    /// Initialize response advertising one `echo(text)` tool, as a shell
    /// `printf` line. Request ids are deterministic (1, 2, ...) because the
    /// counter is per-session.
    const INIT_LINE: &str = r#"printf '%s\n' '{"jsonrpc":"2.0","id":1,"result":{"tools":[{"name":"echo","description":"Echo text back","parameters":[{"name":"text","type":"string","required":true}]}]}}'"#;

    fn scripted_server(script: &str) -> ServerConfig {
        ServerConfig {
            command: "sh".into(),
            args: vec!["-c".into(), script.into()],
            env: Default::default(),
            cwd: None,
        }
    }

    fn fast_timeouts() -> SessionTimeouts {
        SessionTimeouts {
            init: Duration::from_secs(5),
            call: Duration::from_secs(5),
            shutdown: Duration::from_millis(200),
        }
    }

    fn args(json: serde_json::Value) -> serde_json::Map<String, serde_json::Value> {
        json.as_object().unwrap().clone()
    }

    #[tokio::test]
    async fn initialize_records_advertised_tools() {
        let script = format!("read -r line; {INIT_LINE}; read -r line");
        let mut session = McpSession::start("sams", &scripted_server(&script), fast_timeouts())
            .await
            .unwrap();

        assert_eq!(session.catalog().len(), 1);
        assert!(session.catalog().get("echo").is_some());
        session.shutdown().await;
    }

    #[tokio::test]
    async fn initialize_fails_without_tool_list() {
        let script = r#"read -r line; printf '%s\n' '{"jsonrpc":"2.0","id":1,"result":{"capabilities":{}}}'"#;
        let err = McpSession::start("sams", &scripted_server(script), fast_timeouts())
            .await
            .unwrap_err();
        assert!(matches!(err, McpError::InitFailed { .. }));
    }

    #[tokio::test]
    async fn initialize_fails_when_child_exits_immediately() {
        let err = McpSession::start("sams", &scripted_server("exit 0"), fast_timeouts())
            .await
            .unwrap_err();
        assert!(matches!(err, McpError::LaunchFailed { .. }));
    }

    #[tokio::test]
    async fn initialize_times_out_on_wedged_server() {
        let timeouts = SessionTimeouts {
            init: Duration::from_millis(200),
            ..fast_timeouts()
        };
        let err = McpSession::start("sams", &scripted_server("sleep 30"), timeouts)
            .await
            .unwrap_err();
        assert!(matches!(err, McpError::Timeout { .. }));
    }

    #[tokio::test]
    async fn execute_tool_returns_server_result() {
        let script = format!(
            r#"read -r line; {INIT_LINE}; read -r line; printf '%s\n' '{{"jsonrpc":"2.0","id":2,"result":"hi"}}'"#
        );
        let mut session = McpSession::start("sams", &scripted_server(&script), fast_timeouts())
            .await
            .unwrap();

        let outcome = session
            .execute_tool("echo", &args(serde_json::json!({"text": "hi"})))
            .await
            .unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.result, Some(serde_json::json!("hi")));
        session.shutdown().await;
    }

    #[tokio::test]
    async fn server_error_becomes_failure_outcome_not_session_error() {
        let script = format!(
            r#"read -r line; {INIT_LINE}; read -r line; printf '%s\n' '{{"jsonrpc":"2.0","id":2,"error":{{"code":-32000,"message":"backend unreachable"}}}}'"#
        );
        let mut session = McpSession::start("sams", &scripted_server(&script), fast_timeouts())
            .await
            .unwrap();

        let outcome = session
            .execute_tool("echo", &args(serde_json::json!({"text": "hi"})))
            .await
            .unwrap();

        assert!(!outcome.success);
        assert!(outcome.error.as_deref().unwrap().contains("backend unreachable"));
        session.shutdown().await;
    }

    #[tokio::test]
    async fn unknown_tool_is_rejected_without_a_round_trip() {
        // The script only ever answers the initialize request; a dispatched
        // call would wedge it, so getting an outcome proves no frame was sent.
        let script = format!("read -r line; {INIT_LINE}; read -r line");
        let mut session = McpSession::start("sams", &scripted_server(&script), fast_timeouts())
            .await
            .unwrap();

        let outcome = session
            .execute_tool("no_such_tool", &args(serde_json::json!({})))
            .await
            .unwrap();

        assert!(!outcome.success);
        assert!(outcome.error.as_deref().unwrap().contains("unknown tool"));
        session.shutdown().await;
    }

    #[tokio::test]
    async fn child_death_mid_session_is_fatal() {
        let script = format!("read -r line; {INIT_LINE}");
        let mut session = McpSession::start("sams", &scripted_server(&script), fast_timeouts())
            .await
            .unwrap();

        let err = session
            .execute_tool("echo", &args(serde_json::json!({"text": "hi"})))
            .await
            .unwrap_err();

        assert!(matches!(err, McpError::Transport { .. }));
        session.shutdown().await;
    }

    #[tokio::test]
    async fn wedged_call_times_out() {
        let script = format!("read -r line; {INIT_LINE}; sleep 30");
        let timeouts = SessionTimeouts {
            call: Duration::from_millis(200),
            ..fast_timeouts()
        };
        let mut session = McpSession::start("sams", &scripted_server(&script), timeouts)
            .await
            .unwrap();

        let err = session
            .execute_tool("echo", &args(serde_json::json!({"text": "hi"})))
            .await
            .unwrap_err();

        assert!(matches!(err, McpError::Timeout { .. }));
        session.shutdown().await;
    }

    #[tokio::test]
    async fn shutdown_twice_is_a_no_op() {
        let script = format!("read -r line; {INIT_LINE}; read -r line");
        let mut session = McpSession::start("sams", &scripted_server(&script), fast_timeouts())
            .await
            .unwrap();

        session.shutdown().await;
        session.shutdown().await;
    }
}
