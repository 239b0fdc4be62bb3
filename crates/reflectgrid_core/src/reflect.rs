//! Reflection capability: the explicit accessor table a bindable type exposes.
//!
//! Rust has no runtime reflection, so a bindable type describes itself through [`Reflect`].
//! The implementation is normally generated by `#[derive(Reflect)]`, which lives in the defining
//! module and can therefore read and write private fields and call private methods.
//!
//! ## Notes
//! - "Inheritance" is composition: a type names one field as its parent and the walker follows
//!   [`Reflect::parent`] from the most-derived type to the root.
//! - Members of an ancestor at distance `d` are addressed by following `d` parent links; see
//!   [`ancestor`] and [`ancestor_mut`].
//! - Nested objects are reached through [`Reflect::composite`]; a shared (`Rc<RefCell<_>>`) nested
//!   object is handed out as its own [`SharedTarget`].

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::fmt::Display;
use std::rc::Rc;

use bigdecimal::BigDecimal;

use crate::descriptor::{EnumInfo, FieldType, MemberDescriptor};
use crate::errors::ReflectError;
use crate::value::{NumericKind, Value};

/// A bound target shared between the engine and the closures installed on its controls.
pub type SharedTarget = Rc<RefCell<dyn Reflect>>;

/// Read-only view of a composite field.
pub enum Composite<'a> {
    /// Owned by the parent object.
    Borrowed(&'a dyn Reflect),
    /// Shared with other owners; rendered as its own target.
    Shared(SharedTarget),
    /// An optional composite that is currently absent.
    Null,
}

/// Mutable view of a composite field.
pub enum CompositeMut<'a> {
    Borrowed(&'a mut dyn Reflect),
    Shared(SharedTarget),
    Null,
}

/// Runtime description and accessor table of a bindable type.
pub trait Reflect: Any {
    /// Short name of the concrete type.
    fn type_name(&self) -> &'static str;

    /// Annotated members declared directly on this type: fields in declaration order, then actions.
    fn declared_members(&self) -> Vec<MemberDescriptor>;

    /// The ancestor this type extends, if any.
    fn parent(&self) -> Option<&dyn Reflect> {
        None
    }

    fn parent_mut(&mut self) -> Option<&mut dyn Reflect> {
        None
    }

    /// Read a declared field.
    fn field(&self, name: &str) -> Result<Value, ReflectError>;

    /// Write a declared field. The value must already have the field's semantic type.
    fn set_field(&mut self, name: &str, value: Value) -> Result<(), ReflectError>;

    /// Navigate into a declared composite field.
    fn composite(&self, name: &str) -> Result<Composite<'_>, ReflectError> {
        Err(ReflectError::not_composite(self.type_name(), name))
    }

    fn composite_mut(&mut self, name: &str) -> Result<CompositeMut<'_>, ReflectError> {
        Err(ReflectError::not_composite(self.type_name(), name))
    }

    /// Invoke a declared zero-argument action.
    fn invoke(&mut self, name: &str) -> Result<(), ReflectError> {
        Err(ReflectError::no_such_action(self.type_name(), name))
    }

    /// Per-object observer capability.
    fn as_field_observer(&mut self) -> Option<&mut dyn FieldObserver> {
        None
    }
}

/// Follow `depth` parent links.
pub fn ancestor(target: &dyn Reflect, depth: usize) -> Result<&dyn Reflect, ReflectError> {
    let mut current = target;
    for _ in 0..depth {
        current = current.parent().ok_or(ReflectError::NoAncestor {
            type_name: target.type_name(),
            depth,
        })?;
    }
    Ok(current)
}

/// Follow `depth` parent links mutably.
pub fn ancestor_mut(target: &mut dyn Reflect, depth: usize) -> Result<&mut dyn Reflect, ReflectError> {
    let type_name = target.type_name();
    let mut current = target;
    for _ in 0..depth {
        current = current
            .parent_mut()
            .ok_or(ReflectError::NoAncestor { type_name, depth })?;
    }
    Ok(current)
}

/// Hook implemented by a bound object that wants to hear about its own field writes.
///
/// Invoked after the write took effect and before any process-wide subscriber.
pub trait FieldObserver {
    fn on_field_value_changed(&mut self, field: &MemberDescriptor);
}

/// Actions declared by a `#[grid_actions]` impl block.
pub trait GridActions {
    /// Action descriptors in declaration order.
    fn action_members() -> Vec<MemberDescriptor>;

    fn invoke_action(&mut self, name: &str) -> Result<(), ReflectError>;
}

/// Normalises the return type of an action method.
pub trait ActionOutcome {
    fn into_outcome(self) -> Result<(), String>;
}

impl ActionOutcome for () {
    fn into_outcome(self) -> Result<(), String> {
        Ok(())
    }
}

impl<E: Display> ActionOutcome for Result<(), E> {
    fn into_outcome(self) -> Result<(), String> {
        self.map_err(|err| err.to_string())
    }
}

/// A type that can be stored in a reflected field.
///
/// `from_value` hands the value back on a variant mismatch so the caller can report it.
pub trait GridField {
    fn field_type() -> FieldType
    where
        Self: Sized;

    fn to_value(&self) -> Value;

    fn from_value(value: Value) -> Result<Self, Value>
    where
        Self: Sized;

    fn composite(&self) -> Option<Composite<'_>> {
        None
    }

    fn composite_mut(&mut self) -> Option<CompositeMut<'_>> {
        None
    }
}

macro_rules! scalar_grid_field {
    ($($ty:ty => $variant:ident, $field_type:expr;)*) => {
        $(
            impl GridField for $ty {
                fn field_type() -> FieldType {
                    $field_type
                }

                fn to_value(&self) -> Value {
                    Value::$variant(*self)
                }

                fn from_value(value: Value) -> Result<Self, Value> {
                    match value {
                        Value::$variant(inner) => Ok(inner),
                        other => Err(other),
                    }
                }
            }
        )*
    };
}

scalar_grid_field! {
    bool => Bool, FieldType::Bool;
    char => Char, FieldType::Char;
    i8 => I8, FieldType::Numeric(NumericKind::I8);
    i16 => I16, FieldType::Numeric(NumericKind::I16);
    i32 => I32, FieldType::Numeric(NumericKind::I32);
    i64 => I64, FieldType::Numeric(NumericKind::I64);
    u8 => U8, FieldType::Numeric(NumericKind::U8);
    u16 => U16, FieldType::Numeric(NumericKind::U16);
    u32 => U32, FieldType::Numeric(NumericKind::U32);
    u64 => U64, FieldType::Numeric(NumericKind::U64);
    f32 => F32, FieldType::Numeric(NumericKind::F32);
    f64 => F64, FieldType::Numeric(NumericKind::F64);
}

impl GridField for String {
    fn field_type() -> FieldType {
        FieldType::Text
    }

    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Text(text) => Ok(text),
            other => Err(other),
        }
    }
}

impl GridField for BigDecimal {
    fn field_type() -> FieldType {
        FieldType::Numeric(NumericKind::Decimal)
    }

    fn to_value(&self) -> Value {
        Value::Decimal(self.clone())
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Decimal(decimal) => Ok(decimal),
            other => Err(other),
        }
    }
}

impl<T: Reflect + GridField> GridField for Option<T> {
    fn field_type() -> FieldType {
        T::field_type()
    }

    fn to_value(&self) -> Value {
        self.as_ref().map_or(Value::Null, |inner| inner.to_value())
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        Err(value)
    }

    fn composite(&self) -> Option<Composite<'_>> {
        Some(match self {
            Some(inner) => Composite::Borrowed(inner),
            None => Composite::Null,
        })
    }

    fn composite_mut(&mut self) -> Option<CompositeMut<'_>> {
        Some(match self {
            Some(inner) => CompositeMut::Borrowed(inner),
            None => CompositeMut::Null,
        })
    }
}

impl<T: Reflect + GridField> GridField for Rc<RefCell<T>> {
    fn field_type() -> FieldType {
        T::field_type()
    }

    fn to_value(&self) -> Value {
        match self.try_borrow() {
            Ok(inner) => inner.to_value(),
            Err(_) => Value::Null,
        }
    }

    fn from_value(value: Value) -> Result<Self, Value> {
        Err(value)
    }

    fn composite(&self) -> Option<Composite<'_>> {
        let shared: SharedTarget = self.clone();
        Some(Composite::Shared(shared))
    }

    fn composite_mut(&mut self) -> Option<CompositeMut<'_>> {
        let shared: SharedTarget = self.clone();
        Some(CompositeMut::Shared(shared))
    }
}

/// A fieldless enum whose constants can be offered in a selection control.
///
/// Usually derived with `#[derive(GridEnum)]`.
pub trait GridEnum: Sized + 'static {
    const TYPE_NAME: &'static str;
    const CONSTANTS: &'static [&'static str];

    /// Declaration index of this constant.
    fn index(&self) -> usize;

    fn from_index(index: usize) -> Option<Self>;

    fn enum_info() -> EnumInfo {
        EnumInfo {
            type_id: TypeId::of::<Self>(),
            type_name: Self::TYPE_NAME,
            constants: Self::CONSTANTS,
        }
    }
}

/// `GridField::to_value` for a [`GridEnum`].
pub fn enum_to_value<E: GridEnum>(value: &E) -> Value {
    E::enum_info()
        .constant(value.index())
        .map_or(Value::Null, Value::Enum)
}

/// `GridField::from_value` for a [`GridEnum`].
pub fn enum_from_value<E: GridEnum>(value: Value) -> Result<E, Value> {
    match value {
        Value::Enum(constant) if constant.type_id == TypeId::of::<E>() => {
            E::from_index(constant.index).ok_or(Value::Enum(constant))
        }
        other => Err(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{FieldAnnotation, MemberDescriptor};

    #[derive(Debug, PartialEq)]
    enum Mode {
        Fast,
        Safe,
    }

    impl GridEnum for Mode {
        const TYPE_NAME: &'static str = "Mode";
        const CONSTANTS: &'static [&'static str] = &["Fast", "Safe"];

        fn index(&self) -> usize {
            match self {
                Mode::Fast => 0,
                Mode::Safe => 1,
            }
        }

        fn from_index(index: usize) -> Option<Self> {
            match index {
                0 => Some(Mode::Fast),
                1 => Some(Mode::Safe),
                _ => None,
            }
        }
    }

    struct Leaf {
        level: i32,
        parent: Root,
    }

    struct Root {
        id: String,
    }

    impl Reflect for Root {
        fn type_name(&self) -> &'static str {
            "Root"
        }

        fn declared_members(&self) -> Vec<MemberDescriptor> {
            vec![MemberDescriptor::field(
                "Root",
                "id",
                String::field_type(),
                FieldAnnotation::DEFAULT,
            )]
        }

        fn field(&self, name: &str) -> Result<Value, ReflectError> {
            match name {
                "id" => Ok(self.id.to_value()),
                _ => Err(ReflectError::no_such_field("Root", name)),
            }
        }

        fn set_field(&mut self, name: &str, value: Value) -> Result<(), ReflectError> {
            match name {
                "id" => {
                    self.id = String::from_value(value).map_err(|found| ReflectError::TypeMismatch {
                        type_name: "Root",
                        field: name.to_string(),
                        expected: "String",
                        found: found.kind_name(),
                    })?;
                    Ok(())
                }
                _ => Err(ReflectError::no_such_field("Root", name)),
            }
        }
    }

    impl Reflect for Leaf {
        fn type_name(&self) -> &'static str {
            "Leaf"
        }

        fn declared_members(&self) -> Vec<MemberDescriptor> {
            vec![MemberDescriptor::field(
                "Leaf",
                "level",
                i32::field_type(),
                FieldAnnotation::DEFAULT,
            )]
        }

        fn parent(&self) -> Option<&dyn Reflect> {
            Some(&self.parent)
        }

        fn parent_mut(&mut self) -> Option<&mut dyn Reflect> {
            Some(&mut self.parent)
        }

        fn field(&self, name: &str) -> Result<Value, ReflectError> {
            match name {
                "level" => Ok(self.level.to_value()),
                _ => Err(ReflectError::no_such_field("Leaf", name)),
            }
        }

        fn set_field(&mut self, name: &str, _value: Value) -> Result<(), ReflectError> {
            Err(ReflectError::no_such_field("Leaf", name))
        }
    }

    #[test]
    fn ancestor_walks_parent_links() {
        let mut leaf = Leaf {
            level: 3,
            parent: Root { id: "r".into() },
        };
        assert_eq!(ancestor(&leaf, 0).unwrap().type_name(), "Leaf");
        assert_eq!(ancestor(&leaf, 1).unwrap().type_name(), "Root");
        assert!(matches!(
            ancestor(&leaf, 2),
            Err(ReflectError::NoAncestor { depth: 2, .. })
        ));

        ancestor_mut(&mut leaf, 1)
            .unwrap()
            .set_field("id", Value::Text("changed".into()))
            .unwrap();
        assert_eq!(leaf.parent.id, "changed");
        assert_eq!(leaf.field("level").unwrap(), Value::I32(3));
    }

    #[test]
    fn scalar_fields_reject_mismatched_variants() {
        assert_eq!(i32::from_value(Value::I32(7)), Ok(7));
        assert_eq!(i32::from_value(Value::I64(7)), Err(Value::I64(7)));
        assert_eq!(bool::field_type(), FieldType::Bool);
    }

    #[test]
    fn enum_helpers_round_trip_constants() {
        let value = enum_to_value(&Mode::Safe);
        match &value {
            Value::Enum(constant) => assert_eq!(constant.name, "Safe"),
            other => panic!("expected enum constant, got {other:?}"),
        }
        assert_eq!(enum_from_value::<Mode>(value), Ok(Mode::Safe));
        assert!(enum_from_value::<Mode>(Value::Text("Safe".into())).is_err());
    }

    #[test]
    fn default_accessors_report_missing_members() {
        let mut root = Root { id: "x".into() };
        assert!(matches!(root.invoke("go"), Err(ReflectError::NoSuchAction { .. })));
        assert!(matches!(root.composite("id"), Err(ReflectError::NotComposite { .. })));
        assert!(root.as_field_observer().is_none());
    }

    #[test]
    fn action_outcomes_normalise_errors() {
        assert_eq!(().into_outcome(), Ok(()));
        let failed: Result<(), String> = Err("boom".into());
        assert_eq!(failed.into_outcome(), Err("boom".to_string()));
    }
}
