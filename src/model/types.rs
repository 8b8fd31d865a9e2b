//! Gemini `generateContent` API types.
//!
//! These mirror the REST request/response shapes, used for both request
//! building and response parsing. Everything on the wire is camelCase.

use serde::{Deserialize, Serialize};

// ─── Conversation Content ───────────────────────────────────────────────────

/// One entry in the conversation: a role plus an ordered list of parts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

impl Content {
    pub fn user_text(text: &str) -> Self {
        Self {
            role: "user".to_string(),
            parts: vec![Part::text(text)],
        }
    }

    pub fn tool_responses(responses: Vec<FunctionResponse>) -> Self {
        Self {
            role: "user".to_string(),
            parts: responses
                .into_iter()
                .map(|r| Part {
                    text: None,
                    function_call: None,
                    function_response: Some(r),
                })
                .collect(),
        }
    }
}

/// A single content part: text, a requested function call, or a fed-back
/// function response. Exactly one field is populated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function_response: Option<FunctionResponse>,
}

impl Part {
    pub fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            function_call: None,
            function_response: None,
        }
    }
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    /// Flat mapping of parameter name to scalar value.
    #[serde(default)]
    pub args: serde_json::Map<String, serde_json::Value>,
}

/// A tool result fed back to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionResponse {
    pub name: String,
    pub response: serde_json::Value,
}

// ─── Function Declarations ───────────────────────────────────────────────────

/// Tool set sent with each request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDeclarations {
    pub function_declarations: Vec<FunctionDeclaration>,
}

/// One declared function the model may call.
#[derive(Debug, Clone, Serialize)]
pub struct FunctionDeclaration {
    pub name: String,
    pub description: String,
    pub parameters: ObjectSchema,
}

/// Parameter schema: always an OBJECT of scalar properties.
#[derive(Debug, Clone, Serialize)]
pub struct ObjectSchema {
    #[serde(rename = "type")]
    pub schema_type: String,
    pub properties: serde_json::Map<String, serde_json::Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
}

// ─── Request / Response ─────────────────────────────────────────────────────

/// Request body for `models/{model}:generateContent`.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolDeclarations>>,
}

/// Response body: candidates in preference order (we only use the first).
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Content,
    #[serde(default)]
    #[allow(dead_code)]
    pub finish_reason: Option<String>,
}

// ─── Parsed Reply ────────────────────────────────────────────────────────────

/// The model's reply, split into what the orchestrator inspects.
#[derive(Debug, Clone)]
pub struct ModelReply {
    /// The full content, appended verbatim to the conversation.
    pub content: Content,
    /// Concatenated text parts (the final answer when no calls remain).
    pub text: String,
    /// Tool invocations requested in this reply, in order. May repeat names.
    pub function_calls: Vec<FunctionCall>,
}

impl ModelReply {
    pub fn from_content(content: Content) -> Self {
        let text = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect::<Vec<_>>()
            .join("");
        let function_calls = content
            .parts
            .iter()
            .filter_map(|p| p.function_call.clone())
            .collect();
        Self {
            content,
            text,
            function_calls,
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn part_serializes_only_populated_field() {
        let json = serde_json::to_string(&Part::text("hello")).unwrap();
        assert_eq!(json, r#"{"text":"hello"}"#);
    }

    #[test]
    fn function_call_deserializes_camel_case_part() {
        let json = r#"{"functionCall": {"name": "echo", "args": {"text": "hi"}}}"#;
        let part: Part = serde_json::from_str(json).unwrap();
        let call = part.function_call.unwrap();
        assert_eq!(call.name, "echo");
        assert_eq!(call.args.get("text"), Some(&serde_json::json!("hi")));
    }

    #[test]
    fn tool_responses_content_uses_user_role() {
        let content = Content::tool_responses(vec![FunctionResponse {
            name: "echo".into(),
            response: serde_json::json!({"result": "hi"}),
        }]);
        assert_eq!(content.role, "user");
        assert!(content.parts[0].function_response.is_some());
        let json = serde_json::to_string(&content).unwrap();
        assert!(json.contains("functionResponse"));
    }

    #[test]
    fn reply_splits_text_and_calls() {
        let content = Content {
            role: "model".into(),
            parts: vec![
                Part::text("Looking that up. "),
                Part {
                    text: None,
                    function_call: Some(FunctionCall {
                        name: "get_asset_summary".into(),
                        args: Default::default(),
                    }),
                    function_response: None,
                },
            ],
        };
        let reply = ModelReply::from_content(content);
        assert_eq!(reply.text, "Looking that up. ");
        assert_eq!(reply.function_calls.len(), 1);
        assert_eq!(reply.function_calls[0].name, "get_asset_summary");
    }

    #[test]
    fn request_omits_tools_when_none() {
        let req = GenerateContentRequest {
            contents: vec![Content::user_text("hi")],
            tools: None,
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(!json.contains("tools"));
    }

    #[test]
    fn response_tolerates_missing_candidates() {
        let resp: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.candidates.is_empty());
    }
}
