//! Argument validation against a declared tool signature

use serde_json::{Map, Value};
use thiserror::Error;

use super::entities::{ParamKind, ToolDescriptor};
use super::value_objects::ErrorKind;

/// A reason the supplied arguments do not satisfy the declared signature.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing required argument '{0}'")]
    Missing(String),

    #[error("unknown argument '{0}'")]
    Unknown(String),

    #[error("argument '{name}' must be of type {expected}")]
    TypeMismatch { name: String, expected: &'static str },

    #[error("'{value}' is not a permitted value for '{name}' (expected one of: {permitted})")]
    EnumViolation {
        name: String,
        value: String,
        permitted: String,
    },
}

impl ValidationError {
    /// The failure classification this validation error reports as.
    pub fn error_kind(&self) -> ErrorKind {
        match self {
            ValidationError::EnumViolation { .. } => ErrorKind::InvalidEnumValue,
            _ => ErrorKind::ArgumentParse,
        }
    }
}

/// Checks a parsed argument object against a [`ToolDescriptor`].
pub trait ArgumentValidator: Send + Sync {
    fn validate(
        &self,
        args: &Map<String, Value>,
        descriptor: &ToolDescriptor,
    ) -> Result<(), ValidationError>;
}

/// Default validator: required-present, no unknown keys, declared types
/// respected, enum values inside the declared set.
///
/// Parameters whose declaration never carried a type are skipped; they
/// cannot appear in a generated schema in the first place.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultArgumentValidator;

impl ArgumentValidator for DefaultArgumentValidator {
    fn validate(
        &self,
        args: &Map<String, Value>,
        descriptor: &ToolDescriptor,
    ) -> Result<(), ValidationError> {
        for name in descriptor.required_params() {
            if !args.contains_key(name) {
                return Err(ValidationError::Missing(name.to_string()));
            }
        }

        for key in args.keys() {
            if descriptor.param(key).is_none() {
                return Err(ValidationError::Unknown(key.clone()));
            }
        }

        for spec in &descriptor.params {
            let Some(value) = args.get(&spec.name) else {
                continue;
            };
            let Some(kind) = &spec.kind else {
                continue;
            };
            check_kind(&spec.name, value, kind)?;
        }

        Ok(())
    }
}

fn check_kind(name: &str, value: &Value, kind: &ParamKind) -> Result<(), ValidationError> {
    let mismatch = || ValidationError::TypeMismatch {
        name: name.to_string(),
        expected: kind.json_type(),
    };

    match kind {
        ParamKind::String => {
            if !value.is_string() {
                return Err(mismatch());
            }
        }
        ParamKind::Integer => {
            if !value.is_i64() && !value.is_u64() {
                return Err(mismatch());
            }
        }
        ParamKind::Number => {
            if !value.is_number() {
                return Err(mismatch());
            }
        }
        ParamKind::Boolean => {
            if !value.is_boolean() {
                return Err(mismatch());
            }
        }
        ParamKind::Enum(permitted) => {
            let Some(s) = value.as_str() else {
                return Err(mismatch());
            };
            if !permitted.iter().any(|p| p == s) {
                return Err(ValidationError::EnumViolation {
                    name: name.to_string(),
                    value: s.to_string(),
                    permitted: permitted.join(", "),
                });
            }
        }
    }
    Ok(())
}
