//! Conversion from advertised tool schemas to function declarations.
//!
//! The server declares an ordered parameter list with scalar types and
//! optional defaults; the model wants an OBJECT schema with typed properties
//! and a `required` list. Defaults are surfaced in the property description
//! since the declaration format has no slot for them.

use crate::mcp::types::{ParamType, ToolSchema};

use super::types::{FunctionDeclaration, ObjectSchema, ToolDeclarations};

/// Build the single tool-declaration block sent with every model request.
pub fn declare_tools(schemas: &[ToolSchema]) -> Vec<ToolDeclarations> {
    if schemas.is_empty() {
        return Vec::new();
    }
    vec![ToolDeclarations {
        function_declarations: schemas.iter().map(declare_function).collect(),
    }]
}

fn declare_function(schema: &ToolSchema) -> FunctionDeclaration {
    let mut properties = serde_json::Map::new();
    let mut required = Vec::new();

    for param in &schema.parameters {
        let mut description = String::new();
        if let Some(default) = &param.default {
            description = format!("(default: {default})");
        }

        properties.insert(
            param.name.clone(),
            serde_json::json!({
                "type": scalar_type_name(param.param_type),
                "description": description,
            }),
        );

        if param.required {
            required.push(param.name.clone());
        }
    }

    FunctionDeclaration {
        name: schema.name.clone(),
        description: schema.description.clone(),
        parameters: ObjectSchema {
            schema_type: "OBJECT".to_string(),
            properties,
            required,
        },
    }
}

fn scalar_type_name(param_type: ParamType) -> &'static str {
    match param_type {
        ParamType::String => "STRING",
        ParamType::Integer => "INTEGER",
        ParamType::Number => "NUMBER",
        ParamType::Boolean => "BOOLEAN",
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
