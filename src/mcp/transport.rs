//! Framed stdio transport over a tool-server child process.
//!
//! Owns exactly one child and presents it as a line-delimited duplex channel:
//! one UTF-8 JSON object per newline-terminated frame, written to the child's
//! stdin and read from its stdout. The child's stderr is drained by an
//! independent task that only produces log output — a wedged or dead drain
//! never affects protocol state.

use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

use super::errors::McpError;
use super::types::{RpcRequest, RpcResponse, ServerConfig};

/// Line-delimited JSON transport over a child process's stdio.
///
/// Callers hold the transport mutably, so at most one frame is ever being
/// written or read at a time.
#[derive(Debug)]
pub struct StdioTransport {
    server_name: String,
    /// `None` once [`stop`](Self::stop) has reaped the process.
    child: Option<Child>,
    /// `None` once [`stop`](Self::stop) has closed the pipe.
    writer: Option<ChildStdin>,
    reader: BufReader<ChildStdout>,
}

impl StdioTransport {
    /// Spawn the server process and wire up its stdio.
    ///
    /// Stdin/stdout are reserved for the protocol; stderr is handed to a
    /// fire-and-forget drain task that logs each line.
    pub fn start(name: &str, config: &ServerConfig) -> Result<Self, McpError> {
        let mut cmd = Command::new(&config.command);
        cmd.args(&config.args);

        for (key, value) in &config.env {
            cmd.env(key, value);
        }
        if let Some(dir) = &config.cwd {
            cmd.current_dir(dir);
        }

        cmd.stdin(Stdio::piped());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|e| McpError::LaunchFailed {
            name: name.to_string(),
            reason: e.to_string(),
        })?;

        let stdin = child.stdin.take().ok_or_else(|| McpError::LaunchFailed {
            name: name.to_string(),
            reason: "failed to capture stdin".into(),
        })?;
        let stdout = child.stdout.take().ok_or_else(|| McpError::LaunchFailed {
            name: name.to_string(),
            reason: "failed to capture stdout".into(),
        })?;

        if let Some(stderr) = child.stderr.take() {
            spawn_stderr_drain(name.to_string(), stderr);
        }

        Ok(Self {
            server_name: name.to_string(),
            child: Some(child),
            writer: Some(stdin),
            reader: BufReader::new(stdout),
        })
    }

    /// The server name this transport was started with.
    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    /// Write one newline-terminated request frame and flush it.
    pub async fn send(&mut self, request: &RpcRequest) -> Result<(), McpError> {
        let mut frame = serde_json::to_string(request).map_err(|e| McpError::Transport {
            server: self.server_name.clone(),
            reason: format!("failed to serialize request: {e}"),
        })?;
        frame.push('\n');

        self.write_frame(&frame).await
    }

    /// Send a one-way notification (no response expected).
    pub async fn notify(
        &mut self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<(), McpError> {
        let notification = serde_json::json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
        });

        let mut frame = notification.to_string();
        frame.push('\n');
        self.write_frame(&frame).await
    }

    async fn write_frame(&mut self, frame: &str) -> Result<(), McpError> {
        let Some(writer) = self.writer.as_mut() else {
            return Err(McpError::Transport {
                server: self.server_name.clone(),
                reason: "stdin already closed".into(),
            });
        };
        writer
            .write_all(frame.as_bytes())
            .await
            .map_err(|e| McpError::Transport {
                server: self.server_name.clone(),
                reason: format!("failed to write to stdin: {e}"),
            })?;
        writer.flush().await.map_err(|e| McpError::Transport {
            server: self.server_name.clone(),
            reason: format!("failed to flush stdin: {e}"),
        })
    }

    /// Read the next response frame from the child's stdout.
    ///
    /// Returns `Ok(None)` when the child has closed its output — the caller
    /// must treat that as "no more responses, assume the process is gone".
    /// Lines that do not parse as responses (stray server output) are logged
    /// and skipped.
    pub async fn receive(&mut self) -> Result<Option<RpcResponse>, McpError> {
        let mut line = String::new();

        loop {
            line.clear();
            let bytes_read =
                self.reader
                    .read_line(&mut line)
                    .await
                    .map_err(|e| McpError::Transport {
                        server: self.server_name.clone(),
                        reason: format!("failed to read from stdout: {e}"),
                    })?;

            if bytes_read == 0 {
                return Ok(None);
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            match serde_json::from_str::<RpcResponse>(trimmed) {
                Ok(resp) => return Ok(Some(resp)),
                Err(_) => {
                    tracing::debug!(
                        server = %self.server_name,
                        line = %trimmed,
                        "skipping non-response line on stdout"
                    );
                }
            }
        }
    }

    /// Terminate the child: wait for a graceful exit within `grace`, then
    /// force-kill. Idempotent — a second call, or a call after the process
    /// already exited, is a no-op.
    pub async fn stop(&mut self, grace: Duration) {
        // Closing stdin first lets servers that loop on read exit on EOF
        // instead of sitting out the whole grace period.
        drop(self.writer.take());

        let Some(mut child) = self.child.take() else {
            return;
        };

        match tokio::time::timeout(grace, child.wait()).await {
            Ok(Ok(status)) => {
                tracing::info!(server = %self.server_name, %status, "server exited");
            }
            _ => {
                tracing::warn!(server = %self.server_name, "server did not exit in time, killing");
                let _ = child.kill().await;
            }
        }
    }
}

/// Drain the child's stderr as diagnostic log lines.
///
/// Failures here cost log visibility only, never protocol correctness.
fn spawn_stderr_drain(server_name: String, stderr: tokio::process::ChildStderr) {
    tokio::spawn(async move {
        let mut lines = BufReader::new(stderr).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            tracing::warn!(server = %server_name, "[server stderr] {line}");
        }
    });
}

// ─── Tests ───────────────────────────────────────────────────────────────────
