//! Errors raised by reflected accessors and value converters.

use thiserror::Error;

/// Failure to read, write, navigate or invoke a reflected member.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReflectError {
    #[error("`{type_name}` has no reflected field `{field}`")]
    NoSuchField { type_name: &'static str, field: String },

    #[error("`{type_name}` has no reflected action `{action}`")]
    NoSuchAction { type_name: &'static str, action: String },

    #[error("field `{type_name}.{field}` is not a composite object")]
    NotComposite { type_name: &'static str, field: String },

    #[error("field `{type_name}.{field}` holds {expected}, cannot store a {found} value")]
    TypeMismatch {
        type_name: &'static str,
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("`{type_name}` has no ancestor at depth {depth}")]
    NoAncestor { type_name: &'static str, depth: usize },

    #[error("action `{type_name}.{action}` failed: {message}")]
    ActionFailed {
        type_name: &'static str,
        action: String,
        message: String,
    },
}

impl ReflectError {
    pub fn no_such_field(type_name: &'static str, field: &str) -> Self {
        ReflectError::NoSuchField {
            type_name,
            field: field.to_string(),
        }
    }

    pub fn no_such_action(type_name: &'static str, action: &str) -> Self {
        ReflectError::NoSuchAction {
            type_name,
            action: action.to_string(),
        }
    }

    pub fn not_composite(type_name: &'static str, field: &str) -> Self {
        ReflectError::NotComposite {
            type_name,
            field: field.to_string(),
        }
    }
}

/// Failure to convert between a control's representation and a field's semantic type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    #[error("no converter registered for type `{type_name}`")]
    MissingConverter { type_name: String },

    #[error("cannot convert '{input}' to {type_name}")]
    Parse { type_name: &'static str, input: String },

    #[error("{value} is out of range for {type_name}")]
    OutOfRange { type_name: &'static str, value: String },

    #[error("the {type_name} converter cannot handle a {found} value")]
    Unsupported { type_name: &'static str, found: &'static str },
}

impl ConvertError {
    pub fn parse(type_name: &'static str, input: impl Into<String>) -> Self {
        ConvertError::Parse {
            type_name,
            input: input.into(),
        }
    }

    /// Return true when the error indicates a programming error rather than bad input.
    ///
    /// ## Notes
    /// - Only a missing converter is fatal; every other conversion failure is a data condition.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ConvertError::MissingConverter { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_missing_converter_is_fatal() {
        let missing = ConvertError::MissingConverter {
            type_name: "Color".into(),
        };
        assert!(missing.is_fatal());
        assert!(!ConvertError::parse("i32", "abc").is_fatal());
        assert_eq!(missing.to_string(), "no converter registered for type `Color`");
    }

    #[test]
    fn reflect_error_messages_name_the_member() {
        let err = ReflectError::no_such_field("Server", "port");
        assert_eq!(err.to_string(), "`Server` has no reflected field `port`");
    }
}
