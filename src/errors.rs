//! Error types surfaced by the binding engine.
//!
//! ## Notes
//!
//! - [`ConfigError`] is a programming error in the annotated type or the toolkit. It is raised to the
//!   caller and never swallowed.
//! - [`BindError`] is what `bind`, `regenerate` and every control callback return.
//! - Bad user input and failing actions are data conditions: they are logged where they happen and do
//!   not appear here.

use miette::Diagnostic;
use thiserror::Error;

use reflectgrid_core::{ConvertError, ReflectError};

use crate::toolkit::ControlKind;

/// A fatal configuration error discovered while rendering or writing back a field.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum ConfigError {
    #[error("field `{type_name}.{field}` declares unknown field kind `{kind}`")]
    #[diagnostic(
        code(reflectgrid::unknown_field_kind),
        help("text fields accept `kind = \"single_line\"` or `kind = \"multi_line\"`")
    )]
    UnknownFieldKind {
        type_name: &'static str,
        field: &'static str,
        kind: &'static str,
    },

    #[error("cannot apply the editable flag to a {kind} control")]
    #[diagnostic(
        code(reflectgrid::uneditable_control),
        help("only text, selection and stepper controls can be bound to a field")
    )]
    UneditableControl { kind: ControlKind },

    #[error("no converter registered for type `{type_name}`")]
    #[diagnostic(
        code(reflectgrid::missing_converter),
        help("register a converter for this type before binding")
    )]
    MissingConverter { type_name: String },

    #[error("stepper wrap-around against a zero upper bound")]
    #[diagnostic(
        code(reflectgrid::wrap_against_zero),
        help("give the field a non-zero `max` or disable `wrap`")
    )]
    WrapAgainstZero,

    #[error("toolkit returned a {found} control where a {expected} control was requested")]
    #[diagnostic(code(reflectgrid::widget_mismatch))]
    WidgetMismatch { expected: ControlKind, found: ControlKind },

    #[error("field `{type_name}.{field}` has an invalid `{bound}` bound: {reason}")]
    #[diagnostic(code(reflectgrid::invalid_bound))]
    InvalidBound {
        type_name: &'static str,
        field: &'static str,
        bound: &'static str,
        reason: String,
    },
}

impl ConfigError {
    /// Map a converter failure into a configuration error, if it is fatal.
    ///
    /// ## Returns
    /// - `Ok(())` when the conversion failure is a data condition the caller should log.
    pub fn check_convert(err: &ConvertError) -> Result<(), ConfigError> {
        match err {
            ConvertError::MissingConverter { type_name } => Err(ConfigError::MissingConverter {
                type_name: type_name.clone(),
            }),
            _ => Ok(()),
        }
    }
}

/// Failure to bind a target or to process a control event.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum BindError {
    #[error("cannot bind a null target")]
    #[diagnostic(code(reflectgrid::null_target))]
    NullTarget,

    #[error("composite field `{type_name}.{field}` is empty and cannot be rendered")]
    #[diagnostic(
        code(reflectgrid::null_composite),
        help("initialise the field before binding, or remove its #[grid] attribute")
    )]
    NullComposite { type_name: &'static str, field: &'static str },

    #[error("composite field `{type_name}.{field}` refers back to an object that is already being rendered")]
    #[diagnostic(
        code(reflectgrid::cyclic_graph),
        help("break the cycle or remove #[grid] from the back-reference")
    )]
    CyclicGraph { type_name: &'static str, field: &'static str },

    #[error("bound target is already borrowed")]
    #[diagnostic(
        code(reflectgrid::target_busy),
        help("do not regenerate or edit a form from inside one of its own callbacks")
    )]
    TargetBusy,

    #[error(transparent)]
    #[diagnostic(code(reflectgrid::reflect))]
    Reflect(#[from] ReflectError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}
