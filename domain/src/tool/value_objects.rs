//! Tool domain value objects — the execution result envelope
//!
//! Every tool invocation, success or failure, produces a
//! [`ToolExecutionResult`]. The envelope is always serialized to a single
//! JSON string ([`ToolExecutionResult::to_payload`]) before it is handed to
//! a provider adapter; that invariant is what lets both wire conventions
//! treat tool output uniformly.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Classification of a failed tool invocation.
///
/// All three kinds are non-fatal: they are reported back to the model as
/// ordinary result data so it can self-correct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Arguments were not valid JSON, were missing, unknown, or mistyped.
    #[serde(rename = "ArgumentParseError")]
    ArgumentParse,
    /// An enum-constrained argument was outside the declared value set.
    #[serde(rename = "InvalidEnumValue")]
    InvalidEnumValue,
    /// The handler itself returned an error.
    #[serde(rename = "HandlerError")]
    Handler,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ArgumentParse => "ArgumentParseError",
            ErrorKind::InvalidEnumValue => "InvalidEnumValue",
            ErrorKind::Handler => "HandlerError",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome envelope of one tool invocation.
///
/// Serialized with camelCase keys so the wire payload matches the
/// `{ok, message, data?, errorKind?}` contract handlers are documented
/// against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolExecutionResult {
    /// Whether the invocation succeeded
    pub ok: bool,
    /// Human/model-readable outcome summary
    pub message: String,
    /// Structured result data (for successful invocations)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Failure classification (for failed invocations)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
}

impl ToolExecutionResult {
    /// A successful result.
    pub fn success(message: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            ok: true,
            message: message.into(),
            data,
            error_kind: None,
        }
    }

    /// A failed result with the given classification.
    pub fn failure(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
            data: None,
            error_kind: Some(kind),
        }
    }

    pub fn argument_parse(message: impl Into<String>) -> Self {
        Self::failure(ErrorKind::ArgumentParse, message)
    }

    pub fn invalid_enum(message: impl Into<String>) -> Self {
        Self::failure(ErrorKind::InvalidEnumValue, message)
    }

    pub fn handler_error(message: impl Into<String>) -> Self {
        Self::failure(ErrorKind::Handler, message)
    }

    pub fn is_ok(&self) -> bool {
        self.ok
    }

    /// Serialize the whole envelope to the single JSON string that is
    /// re-injected into the conversation.
    pub fn to_payload(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            // Value-only fields cannot fail to serialize; keep a readable
            // fallback anyway so the loop never drops a result.
            format!("{{\"ok\":{},\"message\":\"serialization failed\"}}", self.ok)
        })
    }
}
