//! The turn-taking loop: model replies alternate with tool execution until a
//! reply arrives with no further calls.
//!
//! Each round: send the accumulated conversation, inspect the reply, dispatch
//! every requested invocation in order (no deduplication — the same tool may
//! legitimately be requested twice with different arguments), fold the batch
//! of results back, and go again. Tool failures ride along as error payloads;
//! only model or session failures abort the turn.

use std::collections::HashMap;

use async_trait::async_trait;
use uuid::Uuid;

use crate::mcp::errors::McpError;
use crate::mcp::session::McpSession;
use crate::mcp::types::ToolOutcome;
use crate::model::client::GeminiClient;
use crate::model::errors::ModelError;
use crate::model::types::{Content, FunctionCall, FunctionResponse, ModelReply, ToolDeclarations};

use super::conversation::Conversation;
use super::errors::AgentError;

// ─── Constants ───────────────────────────────────────────────────────────────

/// Maximum model/tool rounds per turn before the turn is declared stuck.
const MAX_TOOL_ROUNDS: usize = 10;

// ─── Seams ───────────────────────────────────────────────────────────────────

/// The conversational model, as the orchestrator sees it.
#[async_trait]
pub trait ChatModel {
    async fn generate(
        &self,
        contents: &[Content],
        tools: &[ToolDeclarations],
    ) -> Result<ModelReply, ModelError>;
}

#[async_trait]
impl ChatModel for GeminiClient {
    async fn generate(
        &self,
        contents: &[Content],
        tools: &[ToolDeclarations],
    ) -> Result<ModelReply, ModelError> {
        GeminiClient::generate(self, contents, tools).await
    }
}

/// The tool-server session, as the orchestrator sees it.
///
/// `Send` is part of the contract: executors cross `.await` points inside
/// the turn loop.
#[async_trait]
pub trait ToolExecutor: Send {
    async fn execute(
        &mut self,
        name: &str,
        params: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<ToolOutcome, McpError>;

    /// Release the underlying resources. Idempotent.
    async fn shutdown(&mut self) {}
}

#[async_trait]
impl ToolExecutor for McpSession {
    async fn execute(
        &mut self,
        name: &str,
        params: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<ToolOutcome, McpError> {
        self.execute_tool(name, params).await
    }

    async fn shutdown(&mut self) {
        McpSession::shutdown(self).await;
    }
}

// ─── Invocations ─────────────────────────────────────────────────────────────

/// One requested tool call, tagged with a unique identity so its result can
/// be attributed unambiguously when the batch is folded back.
struct ToolInvocation {
    id: String,
    name: String,
    args: serde_json::Map<String, serde_json::Value>,
}

impl ToolInvocation {
    fn from_call(call: &FunctionCall) -> Self {
        Self {
            id: format!("call_{}", Uuid::new_v4()),
            name: call.name.clone(),
            args: call.args.clone(),
        }
    }
}

// ─── Orchestrator ────────────────────────────────────────────────────────────

/// Drives one user turn to completion, nested tool rounds included.
pub struct Orchestrator<M: ChatModel, E: ToolExecutor> {
    model: M,
    executor: E,
    declarations: Vec<ToolDeclarations>,
    conversation: Conversation,
}

impl<M: ChatModel, E: ToolExecutor> Orchestrator<M, E> {
    pub fn new(model: M, executor: E, declarations: Vec<ToolDeclarations>) -> Self {
        Self {
            model,
            executor,
            declarations,
            conversation: Conversation::new(),
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Run one full user-input-to-final-answer cycle.
    ///
    /// Returns the model's final text once a reply contains no tool calls.
    /// Model and session failures are turn-fatal; tool failures are not.
    pub async fn run_turn(&mut self, user_text: &str) -> Result<String, AgentError> {
        self.conversation.push_user_text(user_text);

        for round in 0..MAX_TOOL_ROUNDS {
            let reply = self
                .model
                .generate(self.conversation.contents(), &self.declarations)
                .await?;
            self.conversation.push_model_reply(reply.content.clone());

            if reply.function_calls.is_empty() {
                tracing::info!(rounds = round + 1, "turn complete");
                return Ok(reply.text);
            }

            let invocations: Vec<ToolInvocation> = reply
                .function_calls
                .iter()
                .map(ToolInvocation::from_call)
                .collect();

            // Execute sequentially (the protocol underneath is half-duplex),
            // collecting outcomes keyed by invocation identity.
            let mut outcomes: HashMap<String, ToolOutcome> = HashMap::new();
            for inv in &invocations {
                tracing::info!(
                    call = %inv.id,
                    tool = %inv.name,
                    args = %serde_json::Value::Object(inv.args.clone()),
                    "model requested tool call"
                );
                let outcome = self.executor.execute(&inv.name, &inv.args).await?;
                if !outcome.success {
                    tracing::warn!(
                        call = %inv.id,
                        tool = %inv.name,
                        error = outcome.error.as_deref().unwrap_or("unknown"),
                        "tool call failed"
                    );
                }
                outcomes.insert(inv.id.clone(), outcome);
            }

            // Fold results back in request order, one response per call.
            let responses: Vec<FunctionResponse> = invocations
                .iter()
                .map(|inv| FunctionResponse {
                    name: inv.name.clone(),
                    response: outcomes[&inv.id].response_payload(),
                })
                .collect();
            self.conversation.push_tool_results(responses);
        }

        Err(AgentError::ToolRoundsExhausted {
            rounds: MAX_TOOL_ROUNDS,
        })
    }

    /// Shut down the underlying tool-server session.
    pub async fn shutdown(&mut self) {
        self.executor.shutdown().await;
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
