//! Provide the reflection vocabulary shared by the reflectgrid engine and derive-generated code.
//!
//! This crate is intentionally small. It defines:
//! - the [`Reflect`] accessor table a bindable type exposes (normally generated by
//!   `#[derive(Reflect)]`),
//! - [`GridField`] / [`GridEnum`] for the types a reflected field may hold,
//! - member descriptors and the annotation records they carry,
//! - the boxed [`Value`] that flows between controls, converters and fields,
//! - label naming strategies.
//!
//! ## Notes
//!
//! - This is a "semantic core" crate: **no IO**, no global state, and no toolkit types.
//! - Derive-generated code refers to items through `::reflectgrid_core`, so crates using the derives
//!   depend on this crate directly.

#![deny(clippy::unwrap_used)]

pub mod descriptor;
pub mod errors;
pub mod naming;
pub mod reflect;
pub mod value;

pub use descriptor::{ActionAnnotation, EnumInfo, FieldAnnotation, FieldKind, FieldType, MemberDescriptor, MemberKind};
pub use errors::{ConvertError, ReflectError};
pub use naming::NamingStrategy;
pub use reflect::{
    ActionOutcome, Composite, CompositeMut, FieldObserver, GridActions, GridEnum, GridField, Reflect, SharedTarget,
    ancestor, ancestor_mut, enum_from_value, enum_to_value,
};
pub use value::{EnumConstant, NumericKind, TypeKey, Value};

/// Re-exported so generated code and downstream crates agree on the decimal type.
pub use bigdecimal::BigDecimal;
