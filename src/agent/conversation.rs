//! In-memory conversation state for one session.
//!
//! Owned exclusively by the orchestrator for the duration of a turn. Holds
//! the full exchange history in the model's content format: user text, model
//! replies (including requested calls), and fed-back tool results.

use crate::model::types::{Content, FunctionResponse};

/// Accumulated exchange history, in model wire format.
#[derive(Default)]
pub struct Conversation {
    contents: Vec<Content>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> &[Content] {
        &self.contents
    }

    pub fn len(&self) -> usize {
        self.contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    pub fn push_user_text(&mut self, text: &str) {
        self.contents.push(Content::user_text(text));
    }

    /// Append a model reply verbatim, function calls included, so the model
    /// sees its own requests on the next round.
    pub fn push_model_reply(&mut self, content: Content) {
        self.contents.push(content);
    }

    /// Append one batch of tool results as a single content entry.
    pub fn push_tool_results(&mut self, responses: Vec<FunctionResponse>) {
        self.contents.push(Content::tool_responses(responses));
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::types::Part;

    #[test]
    fn turns_accumulate_in_order() {
        let mut conv = Conversation::new();
        assert!(conv.is_empty());

        conv.push_user_text("how many assets do we have?");
        conv.push_model_reply(Content {
            role: "model".into(),
            parts: vec![Part::text("42.")],
        });

        assert_eq!(conv.len(), 2);
        assert_eq!(conv.contents()[0].role, "user");
        assert_eq!(conv.contents()[1].role, "model");
    }

    #[test]
    fn tool_results_batch_into_one_entry() {
        let mut conv = Conversation::new();
        conv.push_tool_results(vec![
            FunctionResponse {
                name: "a".into(),
                response: serde_json::json!({"result": 1}),
            },
            FunctionResponse {
                name: "b".into(),
                response: serde_json::json!({"error": "boom"}),
            },
        ]);

        assert_eq!(conv.len(), 1);
        assert_eq!(conv.contents()[0].parts.len(), 2);
    }
}
