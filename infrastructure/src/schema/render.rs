//! Provider wire renderings of the neutral tool descriptors
//!
//! Both renderings embed the same [`input_schema`] object; only the envelope
//! differs. The Messages convention nests the schema as `input_schema`, the
//! chat-completions convention wraps it in a `function` object as
//! `parameters`.

use serde_json::{Value, json};
use synapse_domain::ToolDescriptor;

use super::generator::{SchemaError, input_schema};

/// Render descriptors for a Messages-style `tools` array.
pub fn anthropic_tools(descriptors: &[ToolDescriptor]) -> Result<Value, SchemaError> {
    let mut tools = Vec::with_capacity(descriptors.len());
    for descriptor in descriptors {
        tools.push(json!({
            "name": descriptor.name,
            "description": descriptor.summary,
            "input_schema": input_schema(descriptor)?,
        }));
    }
    Ok(Value::Array(tools))
}

/// Render descriptors for a chat-completions-style `tools` array.
pub fn openai_tools(descriptors: &[ToolDescriptor]) -> Result<Value, SchemaError> {
    let mut tools = Vec::with_capacity(descriptors.len());
    for descriptor in descriptors {
        tools.push(json!({
            "type": "function",
            "function": {
                "name": descriptor.name,
                "description": descriptor.summary,
                "parameters": input_schema(descriptor)?,
            },
        }));
    }
    Ok(Value::Array(tools))
}
