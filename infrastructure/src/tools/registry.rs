//! Tool registry
//!
//! Maps tool names to their declared signature plus an async handler
//! closure. Registration order is preserved so generated schemas list tools
//! in the order the application wired them.

use std::sync::Arc;

use futures::future::BoxFuture;
use serde_json::{Map, Value};
use synapse_domain::ToolDescriptor;

use crate::schema::generator::SchemaError;

/// Async handler for one tool.
///
/// Receives the already-parsed and validated argument object. Returns either
/// a result value (a bare string becomes the result message, anything else
/// is attached as structured data) or a one-line error description.
pub type ToolHandler =
    Arc<dyn Fn(Map<String, Value>) -> BoxFuture<'static, Result<Value, String>> + Send + Sync>;

pub(crate) struct RegisteredTool {
    pub descriptor: ToolDescriptor,
    pub handler: ToolHandler,
}

/// Registry of every tool the current session exposes.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Register a tool. Names are unique per registry.
    pub fn register<F>(
        &mut self,
        descriptor: ToolDescriptor,
        handler: F,
    ) -> Result<(), SchemaError>
    where
        F: Fn(Map<String, Value>) -> BoxFuture<'static, Result<Value, String>>
            + Send
            + Sync
            + 'static,
    {
        if self.tools.iter().any(|t| t.descriptor.name == descriptor.name) {
            return Err(SchemaError::DuplicateTool(descriptor.name));
        }
        self.tools.push(RegisteredTool {
            descriptor,
            handler: Arc::new(handler),
        });
        Ok(())
    }

    pub(crate) fn get(&self, name: &str) -> Option<&RegisteredTool> {
        self.tools.iter().find(|t| t.descriptor.name == name)
    }

    /// All descriptors, in registration order.
    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.tools.iter().map(|t| t.descriptor.clone()).collect()
    }

    /// Resolve a named subset, preserving the requested order.
    pub fn select(&self, names: &[String]) -> Result<Vec<ToolDescriptor>, SchemaError> {
        names
            .iter()
            .map(|name| {
                self.get(name)
                    .map(|t| t.descriptor.clone())
                    .ok_or_else(|| SchemaError::UnknownTool(name.clone()))
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use serde_json::json;

    fn noop_handler(_args: Map<String, Value>) -> BoxFuture<'static, Result<Value, String>> {
        async { Ok(json!(null)) }.boxed()
    }

    #[test]
    fn registration_order_is_preserved() {
        let mut registry = ToolRegistry::new();
        registry
            .register(ToolDescriptor::new("add_task", "Add a task."), noop_handler)
            .unwrap();
        registry
            .register(ToolDescriptor::new("list_tasks", "List tasks."), noop_handler)
            .unwrap();

        let names: Vec<String> = registry
            .descriptors()
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, ["add_task", "list_tasks"]);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut registry = ToolRegistry::new();
        registry
            .register(ToolDescriptor::new("add_task", "Add a task."), noop_handler)
            .unwrap();

        let err = registry
            .register(ToolDescriptor::new("add_task", "Again."), noop_handler)
            .unwrap_err();
        assert_eq!(err, SchemaError::DuplicateTool("add_task".into()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn select_resolves_or_reports_unknown() {
        let mut registry = ToolRegistry::new();
        registry
            .register(ToolDescriptor::new("add_task", "Add a task."), noop_handler)
            .unwrap();

        let selected = registry.select(&["add_task".into()]).unwrap();
        assert_eq!(selected.len(), 1);

        let err = registry.select(&["drop_table".into()]).unwrap_err();
        assert_eq!(err, SchemaError::UnknownTool("drop_table".into()));
    }
}
