//! Tool domain entities

use serde::{Deserialize, Serialize};

/// Declared type of a tool parameter, mapped onto JSON Schema types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParamKind {
    String,
    Integer,
    Number,
    Boolean,
    /// A closed set of permitted string values.
    ///
    /// Rendered as a JSON Schema `enum` directly under the property, never
    /// as description text. The declared values are the single source of
    /// truth for what the caller may pass.
    Enum(Vec<String>),
}

impl ParamKind {
    /// The JSON Schema `type` string for this kind.
    pub fn json_type(&self) -> &'static str {
        match self {
            ParamKind::String | ParamKind::Enum(_) => "string",
            ParamKind::Integer => "integer",
            ParamKind::Number => "number",
            ParamKind::Boolean => "boolean",
        }
    }

    /// The permitted values if this is an `Enum` kind.
    pub fn enum_values(&self) -> Option<&[String]> {
        match self {
            ParamKind::Enum(values) => Some(values),
            _ => None,
        }
    }
}

/// Specification of a single tool parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    /// Parameter name
    pub name: String,
    /// Parameter description, surfaced in the wire schema when present
    pub description: Option<String>,
    /// Whether this parameter must be supplied by the caller
    pub required: bool,
    /// Declared type. `None` means the registration never declared one;
    /// schema generation rejects such parameters instead of guessing.
    pub kind: Option<ParamKind>,
}

impl ParamSpec {
    /// A required parameter with a declared type.
    pub fn new(name: impl Into<String>, kind: ParamKind) -> Self {
        Self {
            name: name.into(),
            description: None,
            required: true,
            kind: Some(kind),
        }
    }

    /// An optional parameter (one whose declaration carries a default).
    pub fn optional(name: impl Into<String>, kind: ParamKind) -> Self {
        Self {
            required: false,
            ..Self::new(name, kind)
        }
    }

    /// A required parameter whose type was never declared.
    ///
    /// Kept constructible so schema generation has something to reject;
    /// a descriptor containing one can never reach a provider.
    pub fn untyped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            required: true,
            kind: None,
        }
    }

    /// A required enum parameter over the given closed value set.
    pub fn enumerated<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            name,
            ParamKind::Enum(values.into_iter().map(Into::into).collect()),
        )
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Provider-neutral description of one tool's callable signature.
///
/// Built once per active tool set and immutable afterwards. Parameter order
/// is declaration order (a `Vec`, not a map), so rendering the descriptor is
/// deterministic and byte-identical across calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Unique tool name (e.g. "add_task")
    pub name: String,
    /// One-line summary sent to the provider
    pub summary: String,
    /// Parameter specifications in declaration order
    pub params: Vec<ParamSpec>,
}

impl ToolDescriptor {
    /// Create a descriptor.
    ///
    /// Only the first sentence of `summary` is kept; implementation notes
    /// after it never reach the wire schema.
    pub fn new(name: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            summary: first_sentence(&summary.into()),
            params: Vec::new(),
        }
    }

    pub fn with_param(mut self, param: ParamSpec) -> Self {
        self.params.push(param);
        self
    }

    /// Look up a parameter spec by name.
    pub fn param(&self, name: &str) -> Option<&ParamSpec> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Names of all required parameters, in declaration order.
    pub fn required_params(&self) -> impl Iterator<Item = &str> {
        self.params
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
    }
}

/// Reduce a doc summary to its first sentence.
fn first_sentence(text: &str) -> String {
    let text = text.trim();
    let end = text
        .find(". ")
        .map(|i| i + 1)
        .or_else(|| text.find(".\n").map(|i| i + 1))
        .or_else(|| text.find('\n'))
        .unwrap_or(text.len());
    text[..end].trim_end().to_string()
}

/// A tool invocation requested by the model.
///
/// The `id` is provider-assigned and must be echoed back unchanged when the
/// result is reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Provider-assigned id (e.g. "toolu_abc123" or "call_xyz")
    pub id: String,
    /// Name of the tool to invoke
    pub name: String,
    /// JSON-encoded argument object, exactly as the provider produced it
    pub raw_arguments: String,
}

impl ToolCallRequest {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        raw_arguments: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            raw_arguments: raw_arguments.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn param_kind_json_types() {
        assert_eq!(ParamKind::String.json_type(), "string");
        assert_eq!(ParamKind::Integer.json_type(), "integer");
        assert_eq!(ParamKind::Number.json_type(), "number");
        assert_eq!(ParamKind::Boolean.json_type(), "boolean");
        assert_eq!(
            ParamKind::Enum(vec!["a".into(), "b".into()]).json_type(),
            "string"
        );
    }

    #[test]
    fn enum_values_accessor() {
        let kind = ParamKind::Enum(vec!["light".into(), "dark".into()]);
        assert_eq!(kind.enum_values().unwrap(), &["light", "dark"]);
        assert!(ParamKind::String.enum_values().is_none());
    }

    #[test]
    fn descriptor_keeps_declaration_order() {
        let tool = ToolDescriptor::new("add_task", "Add a task.")
            .with_param(ParamSpec::new("content", ParamKind::String))
            .with_param(ParamSpec::optional("priority", ParamKind::String))
            .with_param(ParamSpec::new("due", ParamKind::String));

        let names: Vec<&str> = tool.params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["content", "priority", "due"]);

        let required: Vec<&str> = tool.required_params().collect();
        assert_eq!(required, ["content", "due"]);
    }

    #[test]
    fn summary_truncated_to_first_sentence() {
        let tool = ToolDescriptor::new(
            "add_task",
            "Add a task to the tray. Internally this locks the tray mutex\nand appends.",
        );
        assert_eq!(tool.summary, "Add a task to the tray.");

        let tool = ToolDescriptor::new("list_tasks", "List all open tasks.\n\nReturns a JSON array.");
        assert_eq!(tool.summary, "List all open tasks.");

        // A bare one-liner is kept whole
        let tool = ToolDescriptor::new("noop", "Do nothing.");
        assert_eq!(tool.summary, "Do nothing.");
    }

    #[test]
    fn untyped_param_has_no_kind() {
        let spec = ParamSpec::untyped("mystery");
        assert!(spec.kind.is_none());
        assert!(spec.required);
    }
}
