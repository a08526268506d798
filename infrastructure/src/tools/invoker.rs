//! Registry-backed tool invoker
//!
//! Implements [`ToolInvokerPort`] over a [`ToolRegistry`]. Every failure
//! mode (unknown tool, bad JSON, validation, handler error) is folded into a
//! [`ToolExecutionResult`] so a misbehaving call can never take the
//! conversation down.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use synapse_application::ports::tool_invoker::ToolInvokerPort;
use synapse_domain::{
    ArgumentValidator, DefaultArgumentValidator, ToolCallRequest, ToolDescriptor,
    ToolExecutionResult,
};
use tracing::debug;

use super::registry::ToolRegistry;

pub struct RegistryInvoker {
    registry: Arc<ToolRegistry>,
    validator: DefaultArgumentValidator,
}

impl RegistryInvoker {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            validator: DefaultArgumentValidator,
        }
    }
}

#[async_trait]
impl ToolInvokerPort for RegistryInvoker {
    fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.registry.descriptors()
    }

    async fn invoke(&self, call: &ToolCallRequest) -> ToolExecutionResult {
        let Some(tool) = self.registry.get(&call.name) else {
            return ToolExecutionResult::handler_error(format!("unknown tool '{}'", call.name));
        };

        let args = match parse_arguments(&call.raw_arguments) {
            Ok(args) => args,
            Err(message) => return ToolExecutionResult::argument_parse(message),
        };

        if let Err(err) = self.validator.validate(&args, &tool.descriptor) {
            return ToolExecutionResult::failure(err.error_kind(), err.to_string());
        }

        debug!(tool = %call.name, "invoking handler");
        match (tool.handler)(args).await {
            Ok(Value::String(message)) => ToolExecutionResult::success(message, None),
            Ok(Value::Null) => ToolExecutionResult::success("ok", None),
            Ok(value) => ToolExecutionResult::success("ok", Some(value)),
            Err(message) => ToolExecutionResult::handler_error(one_line(&message)),
        }
    }
}

/// Parse the provider's raw argument string into an object.
///
/// Providers sometimes send an empty string for a zero-argument call; that
/// is an empty object, not a parse failure.
fn parse_arguments(raw: &str) -> Result<Map<String, Value>, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(Map::new());
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(format!(
            "arguments must be a JSON object, got {}",
            json_type_name(&other)
        )),
        Err(e) => Err(format!("arguments are not valid JSON: {e}")),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Collapse a handler error to its first line so the re-injected payload
/// stays compact.
fn one_line(message: &str) -> String {
    message.lines().next().unwrap_or_default().trim().to_string()
}
