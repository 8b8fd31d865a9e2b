//! Gemini `generateContent` client.
//!
//! Sends the accumulated conversation plus the tool declarations and returns
//! one parsed reply. Non-streaming: one request, one complete response.

use std::time::Duration;

use reqwest::Client as HttpClient;

use super::errors::ModelError;
use super::types::{
    Content, GenerateContentRequest, GenerateContentResponse, ModelReply, ToolDeclarations,
};

// ─── Constants ───────────────────────────────────────────────────────────────

/// TCP connection timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Total request timeout. Generation over a large conversation can be slow,
/// but a wedged endpoint must not hang the turn.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

// ─── GeminiClient ────────────────────────────────────────────────────────────

/// Client for one Gemini model endpoint.
pub struct GeminiClient {
    http: HttpClient,
    base_url: String,
    model_name: String,
    api_key: String,
}

impl GeminiClient {
    /// Build a client for `{base_url}/v1beta/models/{model}:generateContent`.
    ///
    /// Does not check connectivity — that happens on the first request.
    pub fn new(base_url: &str, model_name: &str, api_key: &str) -> Result<Self, ModelError> {
        let http = HttpClient::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ModelError::ConnectionFailed {
                endpoint: base_url.to_string(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            model_name: model_name.to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// The model this client targets.
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Send one generation request and parse the first candidate.
    pub async fn generate(
        &self,
        contents: &[Content],
        tools: &[ToolDeclarations],
    ) -> Result<ModelReply, ModelError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model_name
        );

        let body = GenerateContentRequest {
            contents: contents.to_vec(),
            tools: if tools.is_empty() {
                None
            } else {
                Some(tools.to_vec())
            },
        };

        tracing::info!(
            model = %self.model_name,
            content_count = body.contents.len(),
            has_tools = body.tools.is_some(),
            "sending generation request"
        );

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ModelError::Timeout {
                        duration_secs: REQUEST_TIMEOUT.as_secs(),
                    }
                } else {
                    ModelError::ConnectionFailed {
                        endpoint: url.clone(),
                        reason: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(ModelError::HttpError {
                status: status.as_u16(),
                body: body_text,
            });
        }

        let body_text = response
            .text()
            .await
            .map_err(|e| ModelError::MalformedResponse {
                reason: format!("failed to read response body: {e}"),
            })?;

        parse_reply(&body_text)
    }
}

/// Parse a response body into the first candidate's reply.
fn parse_reply(body: &str) -> Result<ModelReply, ModelError> {
    let parsed: GenerateContentResponse =
        serde_json::from_str(body).map_err(|e| ModelError::MalformedResponse {
            reason: e.to_string(),
        })?;

    let candidate = parsed
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| ModelError::MalformedResponse {
            reason: "response carries no candidates".into(),
        })?;

    Ok(ModelReply::from_content(candidate.content))
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_reply_plain_text() {
        let body = r#"{
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "You have 42 assets."}]},
                "finishReason": "STOP"
            }]
        }"#;
        let reply = parse_reply(body).unwrap();
        assert_eq!(reply.text, "You have 42 assets.");
        assert!(reply.function_calls.is_empty());
    }

    #[test]
    fn parse_reply_with_function_calls() {
        let body = r#"{
            "candidates": [{
                "content": {"role": "model", "parts": [
                    {"functionCall": {"name": "get_asset_summary", "args": {}}},
                    {"functionCall": {"name": "get_recent_assets", "args": {"limit": 3}}}
                ]}
            }]
        }"#;
        let reply = parse_reply(body).unwrap();
        assert_eq!(reply.function_calls.len(), 2);
        assert_eq!(reply.function_calls[0].name, "get_asset_summary");
        assert_eq!(reply.function_calls[1].name, "get_recent_assets");
    }

    #[test]
    fn parse_reply_rejects_empty_candidates() {
        let err = parse_reply(r#"{"candidates": []}"#).unwrap_err();
        assert!(matches!(err, ModelError::MalformedResponse { .. }));
    }

    #[test]
    fn parse_reply_rejects_garbage() {
        let err = parse_reply("not json").unwrap_err();
        assert!(matches!(err, ModelError::MalformedResponse { .. }));
    }

    #[test]
    fn client_builds_and_keeps_model_name() {
        let client = GeminiClient::new(
            "https://generativelanguage.googleapis.com/",
            "gemini-1.5-flash",
            "test-key",
        )
        .unwrap();
        assert_eq!(client.model_name(), "gemini-1.5-flash");
        assert_eq!(client.base_url, "https://generativelanguage.googleapis.com");
    }
}
