//! JSON Schema generation for tool parameter objects
//!
//! Turns a [`ToolDescriptor`] into the `{"type": "object", ...}` parameter
//! schema both wire conventions embed. Generation is strict: a parameter
//! with no declared type is an error, never a guessed `"string"`. Property
//! order is declaration order (serde_json's preserve_order map keeps it),
//! so the same descriptor always renders byte-identically.

use serde_json::{Map, Value, json};
use synapse_domain::ToolDescriptor;
use thiserror::Error;

use crate::tools::registry::ToolRegistry;

/// Errors raised while building wire schemas or resolving tool names
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("unknown tool '{0}'")]
    UnknownTool(String),

    #[error("tool '{0}' is already registered")]
    DuplicateTool(String),

    #[error("parameter '{param}' of tool '{tool}' has no declared type")]
    AmbiguousParameter { tool: String, param: String },
}

/// Build the JSON Schema parameter object for one tool.
pub fn input_schema(descriptor: &ToolDescriptor) -> Result<Value, SchemaError> {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for param in &descriptor.params {
        let Some(kind) = &param.kind else {
            return Err(SchemaError::AmbiguousParameter {
                tool: descriptor.name.clone(),
                param: param.name.clone(),
            });
        };

        let mut property = Map::new();
        property.insert("type".into(), json!(kind.json_type()));
        if let Some(values) = kind.enum_values() {
            // The closed value set lives in the schema itself, not in the
            // description text.
            property.insert("enum".into(), json!(values));
        }
        if let Some(description) = &param.description {
            property.insert("description".into(), json!(description));
        }

        properties.insert(param.name.clone(), Value::Object(property));
        if param.required {
            required.push(param.name.clone());
        }
    }

    Ok(json!({
        "type": "object",
        "properties": properties,
        "required": required,
    }))
}

/// Startup-time schema validation over a registry.
///
/// Runs before the first provider round-trip so a bad signature fails the
/// session instead of a conversation mid-flight.
pub struct SchemaGenerator;

impl SchemaGenerator {
    /// Resolve and validate a named subset of the registry's tools.
    pub fn generate(
        registry: &ToolRegistry,
        tool_names: &[String],
    ) -> Result<Vec<ToolDescriptor>, SchemaError> {
        let descriptors = registry.select(tool_names)?;
        for descriptor in &descriptors {
            input_schema(descriptor)?;
        }
        Ok(descriptors)
    }

    /// Validate every registered tool, in registration order.
    pub fn generate_all(registry: &ToolRegistry) -> Result<Vec<ToolDescriptor>, SchemaError> {
        let descriptors = registry.descriptors();
        for descriptor in &descriptors {
            input_schema(descriptor)?;
        }
        Ok(descriptors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use synapse_domain::{ParamKind, ParamSpec};

    fn add_task() -> ToolDescriptor {
        ToolDescriptor::new("add_task", "Add a task to the tray.")
            .with_param(
                ParamSpec::new("content", ParamKind::String).with_description("Task description"),
            )
            .with_param(ParamSpec::optional(
                "priority",
                ParamKind::Enum(vec!["p1".into(), "p2".into(), "p3".into(), "p4".into()]),
            ))
    }

    #[test]
    fn object_schema_with_required_list() {
        let schema = input_schema(&add_task()).unwrap();

        assert_eq!(schema["type"], "object");
        assert_eq!(schema["required"], json!(["content"]));
        assert_eq!(schema["properties"]["content"]["type"], "string");
        assert_eq!(
            schema["properties"]["content"]["description"],
            "Task description"
        );
    }

    #[test]
    fn enum_rendered_under_property() {
        let schema = input_schema(&add_task()).unwrap();
        let priority = &schema["properties"]["priority"];

        assert_eq!(priority["type"], "string");
        assert_eq!(priority["enum"], json!(["p1", "p2", "p3", "p4"]));
        // Never smuggled into prose
        assert!(priority.get("description").is_none());
    }

    #[test]
    fn properties_follow_declaration_order() {
        let schema = input_schema(&add_task()).unwrap();
        let keys: Vec<&String> = schema["properties"].as_object().unwrap().keys().collect();
        assert_eq!(keys, ["content", "priority"]);
    }

    #[test]
    fn generation_is_deterministic() {
        let a = serde_json::to_string(&input_schema(&add_task()).unwrap()).unwrap();
        let b = serde_json::to_string(&input_schema(&add_task()).unwrap()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn undeclared_type_is_rejected() {
        let descriptor =
            ToolDescriptor::new("legacy", "Legacy op.").with_param(ParamSpec::untyped("blob"));

        let err = input_schema(&descriptor).unwrap_err();
        assert_eq!(
            err,
            SchemaError::AmbiguousParameter {
                tool: "legacy".into(),
                param: "blob".into()
            }
        );
    }

    #[test]
    fn parameterless_tool_keeps_empty_object_schema() {
        let schema = input_schema(&ToolDescriptor::new("list_tasks", "List tasks.")).unwrap();
        assert_eq!(schema["properties"], json!({}));
        assert_eq!(schema["required"], json!([]));
    }

    fn registry_with(descriptors: Vec<ToolDescriptor>) -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        for descriptor in descriptors {
            registry
                .register(descriptor, |_args| async { Ok(json!(null)) }.boxed())
                .unwrap();
        }
        registry
    }

    #[test]
    fn generate_follows_requested_order() {
        let registry = registry_with(vec![
            add_task(),
            ToolDescriptor::new("list_tasks", "List tasks."),
        ]);

        let descriptors =
            SchemaGenerator::generate(&registry, &["list_tasks".into(), "add_task".into()])
                .unwrap();
        let names: Vec<&str> = descriptors.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["list_tasks", "add_task"]);
    }

    #[test]
    fn generate_rejects_unknown_names() {
        let registry = registry_with(vec![add_task()]);
        let err = SchemaGenerator::generate(&registry, &["drop_table".into()]).unwrap_err();
        assert_eq!(err, SchemaError::UnknownTool("drop_table".into()));
    }

    #[test]
    fn generate_all_surfaces_bad_signatures_up_front() {
        let registry = registry_with(vec![
            add_task(),
            ToolDescriptor::new("legacy", "Legacy op.").with_param(ParamSpec::untyped("blob")),
        ]);

        let err = SchemaGenerator::generate_all(&registry).unwrap_err();
        assert!(matches!(err, SchemaError::AmbiguousParameter { .. }));
    }
}
