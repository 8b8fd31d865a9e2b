//! Client-side view of the tools a server advertised at initialize time.
//!
//! The server owns the real registry; this catalog exists so obviously bad
//! invocations (unknown name, missing required parameter, wrong scalar type)
//! are turned into error payloads at the boundary instead of burning a
//! round-trip.

use std::collections::HashMap;

use super::types::{ParamType, ToolSchema};

/// Why an invocation was rejected before dispatch.
///
/// These are conversation-level failures: the orchestrator feeds them back to
/// the model as tool-error payloads, it never aborts the turn over them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvocationFault {
    NotFound { name: String },
    MissingParameter { tool: String, param: String },
    WrongType { tool: String, param: String, expected: ParamType },
}

impl std::fmt::Display for InvocationFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvocationFault::NotFound { name } => write!(f, "unknown tool '{name}'"),
            InvocationFault::MissingParameter { tool, param } => {
                write!(f, "tool '{tool}' requires parameter '{param}'")
            }
            InvocationFault::WrongType { tool, param, expected } => {
                write!(f, "parameter '{param}' of tool '{tool}' must be a {expected:?}")
            }
        }
    }
}

/// Immutable set of advertised tool schemas, indexed by name.
#[derive(Debug)]
pub struct ToolCatalog {
    tools: Vec<ToolSchema>,
    by_name: HashMap<String, usize>,
}

impl ToolCatalog {
    pub fn new(tools: Vec<ToolSchema>) -> Self {
        let by_name = tools
            .iter()
            .enumerate()
            .map(|(i, t)| (t.name.clone(), i))
            .collect();
        Self { tools, by_name }
    }

    /// All advertised schemas, in the order the server declared them.
    pub fn tools(&self) -> &[ToolSchema] {
        &self.tools
    }

    pub fn get(&self, name: &str) -> Option<&ToolSchema> {
        self.by_name.get(name).map(|&i| &self.tools[i])
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Check an invocation against the advertised schema.
    pub fn validate(
        &self,
        name: &str,
        params: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<(), InvocationFault> {
        let schema = self.get(name).ok_or_else(|| InvocationFault::NotFound {
            name: name.to_string(),
        })?;

        for declared in &schema.parameters {
            match params.get(&declared.name) {
                // An explicit null counts as absent: it satisfies an optional
                // slot but never a required one.
                Some(value) if !value.is_null() => {
                    if !type_matches(declared.param_type, value) {
                        return Err(InvocationFault::WrongType {
                            tool: name.to_string(),
                            param: declared.name.clone(),
                            expected: declared.param_type,
                        });
                    }
                }
                Some(_) | None if declared.required => {
                    return Err(InvocationFault::MissingParameter {
                        tool: name.to_string(),
                        param: declared.name.clone(),
                    });
                }
                _ => {}
            }
        }

        Ok(())
    }
}

/// Scalar type check, lenient where the model commonly is: integers are
/// acceptable where numbers are declared.
fn type_matches(expected: ParamType, value: &serde_json::Value) -> bool {
    match expected {
        ParamType::String => value.is_string(),
        ParamType::Integer => value.is_i64() || value.is_u64(),
        ParamType::Number => value.is_number(),
        ParamType::Boolean => value.is_boolean(),
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
