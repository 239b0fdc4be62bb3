//! Member descriptors: the immutable record of one annotated field or action.
//!
//! Descriptors are produced by the generated accessor table (`#[derive(Reflect)]` and
//! `#[grid_actions]`) and carry the annotation configuration verbatim. The walker stamps each
//! descriptor with the ancestry `depth` of the type that declared it.

use std::any::TypeId;

use crate::value::{EnumConstant, NumericKind, TypeKey};

/// Text control flavour requested by a field annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldKind {
    #[default]
    SingleLine,
    MultiLine,
    /// A kind the engine does not know; rejected when the form is rendered.
    Named(&'static str),
}

impl FieldKind {
    /// Resolve an annotation spelling.
    ///
    /// ## Notes
    /// - Unknown spellings are kept as [`FieldKind::Named`] so the render pass can report them.
    pub fn from_name(name: &'static str) -> Self {
        match name {
            "single_line" | "text_field" => FieldKind::SingleLine,
            "multi_line" | "text_area" => FieldKind::MultiLine,
            other => FieldKind::Named(other),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::SingleLine => "single_line",
            FieldKind::MultiLine => "multi_line",
            FieldKind::Named(name) => *name,
        }
    }
}

/// Static description of a reflected enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumInfo {
    pub type_id: TypeId,
    pub type_name: &'static str,
    /// Constant names in declaration order.
    pub constants: &'static [&'static str],
}

impl EnumInfo {
    pub fn type_key(&self) -> TypeKey {
        TypeKey::Enum {
            id: self.type_id,
            name: self.type_name,
        }
    }

    /// Return the constant at `index`, if it exists.
    pub fn constant(&self, index: usize) -> Option<EnumConstant> {
        self.constants.get(index).map(|name| EnumConstant {
            type_id: self.type_id,
            type_name: self.type_name,
            index,
            name: *name,
        })
    }

    /// Look up a constant by its exact name.
    pub fn find(&self, name: &str) -> Option<EnumConstant> {
        self.constants
            .iter()
            .position(|candidate| *candidate == name)
            .and_then(|index| self.constant(index))
    }

    /// Iterate every constant in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = EnumConstant> + '_ {
        (0..self.constants.len()).filter_map(|index| self.constant(index))
    }
}

/// Semantic type of a reflected field, as seen by the classifier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldType {
    Bool,
    Char,
    Text,
    Numeric(NumericKind),
    Enum(EnumInfo),
    /// A nested object rendered as a sub-form.
    Composite { type_name: &'static str },
}

impl FieldType {
    /// Return the converter key for leaf types; composites have none.
    pub fn type_key(&self) -> Option<TypeKey> {
        match self {
            FieldType::Bool => Some(TypeKey::Bool),
            FieldType::Char => Some(TypeKey::Char),
            FieldType::Text => Some(TypeKey::Text),
            FieldType::Numeric(kind) => Some(TypeKey::Numeric(*kind)),
            FieldType::Enum(info) => Some(info.type_key()),
            FieldType::Composite { .. } => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FieldType::Composite { type_name } => *type_name,
            other => other.type_key().map_or("object", |key| key.name()),
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldType::Numeric(_))
    }
}

/// Configuration of a field-binding annotation (`#[grid(...)]` on a field).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldAnnotation {
    pub editable: bool,
    /// Fixed option list; non-empty turns the field into a string selection.
    pub options: &'static [&'static str],
    pub field_kind: FieldKind,
    pub tooltip: &'static str,
    /// Overrides the naming strategy for the label.
    pub display_name: Option<&'static str>,
    /// Stepper lower bound, as decimal text.
    pub min: Option<&'static str>,
    /// Stepper upper bound, as decimal text.
    pub max: Option<&'static str>,
    /// Stepper increment, as decimal text.
    pub step: Option<&'static str>,
    /// Stepper wrap mode.
    pub wrap: bool,
}

impl FieldAnnotation {
    pub const DEFAULT: FieldAnnotation = FieldAnnotation {
        editable: true,
        options: &[],
        field_kind: FieldKind::SingleLine,
        tooltip: "",
        display_name: None,
        min: None,
        max: None,
        step: None,
        wrap: false,
    };
}

impl Default for FieldAnnotation {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Configuration of an action-binding annotation (`#[action(...)]` on a method).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionAnnotation {
    pub enabled: bool,
    pub tooltip: &'static str,
    /// Caption of the trigger; empty falls back to the method's display name.
    pub name: &'static str,
}

impl ActionAnnotation {
    pub const DEFAULT: ActionAnnotation = ActionAnnotation {
        enabled: true,
        tooltip: "",
        name: "",
    };
}

impl Default for ActionAnnotation {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Whether a member is a data field or a callable action.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MemberKind {
    Field {
        field_type: FieldType,
        annotation: FieldAnnotation,
    },
    Action(ActionAnnotation),
}

/// One annotated member of a reflected type or one of its ancestors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemberDescriptor {
    /// Raw member identifier.
    pub name: &'static str,
    /// Type that declares the member.
    pub declaring_type: &'static str,
    /// Ancestry distance from the bound target (0 = most derived).
    pub depth: usize,
    pub kind: MemberKind,
}

impl MemberDescriptor {
    pub fn field(
        declaring_type: &'static str,
        name: &'static str,
        field_type: FieldType,
        annotation: FieldAnnotation,
    ) -> Self {
        Self {
            name,
            declaring_type,
            depth: 0,
            kind: MemberKind::Field { field_type, annotation },
        }
    }

    pub fn action(declaring_type: &'static str, name: &'static str, annotation: ActionAnnotation) -> Self {
        Self {
            name,
            declaring_type,
            depth: 0,
            kind: MemberKind::Action(annotation),
        }
    }

    /// Return a copy stamped with the given ancestry depth.
    pub fn at_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    pub fn is_field(&self) -> bool {
        matches!(self.kind, MemberKind::Field { .. })
    }

    pub fn is_action(&self) -> bool {
        matches!(self.kind, MemberKind::Action(_))
    }

    pub fn field_type(&self) -> Option<&FieldType> {
        match &self.kind {
            MemberKind::Field { field_type, .. } => Some(field_type),
            MemberKind::Action(_) => None,
        }
    }

    /// Return the annotation tooltip, if one was declared.
    pub fn tooltip(&self) -> Option<&'static str> {
        let tooltip = match &self.kind {
            MemberKind::Field { annotation, .. } => annotation.tooltip,
            MemberKind::Action(annotation) => annotation.tooltip,
        };
        (!tooltip.is_empty()).then_some(tooltip)
    }
}
