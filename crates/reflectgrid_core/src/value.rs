//! Boxed values exchanged between controls, converters and reflected fields.
//!
//! A [`Value`] is the engine's type-erased view of one field. Controls produce raw values
//! (text, decimal, enum constant), the converter registry turns them into the field's semantic
//! type, and the generated accessor table unboxes them into the concrete Rust field.
//!
//! ## Notes
//! - [`TypeKey`] identifies a *semantic* type for converter lookup. Enum keys carry the concrete
//!   `TypeId` so two enums with the same name never share a converter.

use std::any::TypeId;
use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;

/// Numeric field kinds the stepper can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericKind {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    /// Arbitrary-precision decimal (`BigDecimal`).
    Decimal,
}

impl NumericKind {
    /// Every numeric kind, in a stable order.
    pub const ALL: [NumericKind; 11] = [
        NumericKind::I8,
        NumericKind::I16,
        NumericKind::I32,
        NumericKind::I64,
        NumericKind::U8,
        NumericKind::U16,
        NumericKind::U32,
        NumericKind::U64,
        NumericKind::F32,
        NumericKind::F64,
        NumericKind::Decimal,
    ];

    /// Return true for the fixed-width integer kinds.
    ///
    /// Integral targets truncate toward zero when a decimal is written back.
    pub fn is_integral(self) -> bool {
        !matches!(self, NumericKind::F32 | NumericKind::F64 | NumericKind::Decimal)
    }

    /// Return the Rust spelling of the kind.
    pub fn name(self) -> &'static str {
        match self {
            NumericKind::I8 => "i8",
            NumericKind::I16 => "i16",
            NumericKind::I32 => "i32",
            NumericKind::I64 => "i64",
            NumericKind::U8 => "u8",
            NumericKind::U16 => "u16",
            NumericKind::U32 => "u32",
            NumericKind::U64 => "u64",
            NumericKind::F32 => "f32",
            NumericKind::F64 => "f64",
            NumericKind::Decimal => "BigDecimal",
        }
    }
}

/// Identify a semantic type for converter lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKey {
    Bool,
    Char,
    Text,
    /// Generic number: integral text parses to `i64`, anything else to `f64`.
    Number,
    Numeric(NumericKind),
    Enum { id: TypeId, name: &'static str },
}

impl TypeKey {
    /// Return a human-readable type name (used in diagnostics).
    pub fn name(&self) -> &'static str {
        match self {
            TypeKey::Bool => "bool",
            TypeKey::Char => "char",
            TypeKey::Text => "String",
            TypeKey::Number => "Number",
            TypeKey::Numeric(kind) => kind.name(),
            TypeKey::Enum { name, .. } => *name,
        }
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One constant of a reflected enum, addressed by declaration index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnumConstant {
    pub type_id: TypeId,
    pub type_name: &'static str,
    pub index: usize,
    pub name: &'static str,
}

impl EnumConstant {
    /// Return the converter key of the enum this constant belongs to.
    pub fn type_key(&self) -> TypeKey {
        TypeKey::Enum {
            id: self.type_id,
            name: self.type_name,
        }
    }
}

impl fmt::Display for EnumConstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Type-erased field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Char(char),
    Text(String),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Decimal(BigDecimal),
    Enum(EnumConstant),
    /// A composite object, identified only by its type name.
    Object(&'static str),
    /// An absent optional value.
    Null,
}

impl Value {
    /// Return the converter key matching this value's variant, if it has one.
    pub fn type_key(&self) -> Option<TypeKey> {
        Some(match self {
            Value::Bool(_) => TypeKey::Bool,
            Value::Char(_) => TypeKey::Char,
            Value::Text(_) => TypeKey::Text,
            Value::I8(_) => TypeKey::Numeric(NumericKind::I8),
            Value::I16(_) => TypeKey::Numeric(NumericKind::I16),
            Value::I32(_) => TypeKey::Numeric(NumericKind::I32),
            Value::I64(_) => TypeKey::Numeric(NumericKind::I64),
            Value::U8(_) => TypeKey::Numeric(NumericKind::U8),
            Value::U16(_) => TypeKey::Numeric(NumericKind::U16),
            Value::U32(_) => TypeKey::Numeric(NumericKind::U32),
            Value::U64(_) => TypeKey::Numeric(NumericKind::U64),
            Value::F32(_) => TypeKey::Numeric(NumericKind::F32),
            Value::F64(_) => TypeKey::Numeric(NumericKind::F64),
            Value::Decimal(_) => TypeKey::Numeric(NumericKind::Decimal),
            Value::Enum(constant) => constant.type_key(),
            Value::Object(_) | Value::Null => return None,
        })
    }

    /// Return a short name for the variant (used in mismatch diagnostics).
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Char(_) => "char",
            Value::Text(_) => "text",
            Value::I8(_) => "i8",
            Value::I16(_) => "i16",
            Value::I32(_) => "i32",
            Value::I64(_) => "i64",
            Value::U8(_) => "u8",
            Value::U16(_) => "u16",
            Value::U32(_) => "u32",
            Value::U64(_) => "u64",
            Value::F32(_) => "f32",
            Value::F64(_) => "f64",
            Value::Decimal(_) => "decimal",
            Value::Enum(_) => "enum constant",
            Value::Object(_) => "object",
            Value::Null => "null",
        }
    }

    /// Return true for every numeric variant.
    pub fn is_numeric(&self) -> bool {
        matches!(self.type_key(), Some(TypeKey::Numeric(_)))
    }

    /// Widen a numeric value into a decimal.
    ///
    /// ## Returns
    /// - `None` for non-numeric values and for non-finite floats.
    ///
    /// ## Notes
    /// - Floats go through their shortest round-trip text form, so `0.1f64` becomes exactly `0.1`
    ///   rather than its binary expansion.
    pub fn to_decimal(&self) -> Option<BigDecimal> {
        match self {
            Value::I8(v) => Some(BigDecimal::from(i64::from(*v))),
            Value::I16(v) => Some(BigDecimal::from(i64::from(*v))),
            Value::I32(v) => Some(BigDecimal::from(i64::from(*v))),
            Value::I64(v) => Some(BigDecimal::from(*v)),
            Value::U8(v) => Some(BigDecimal::from(u64::from(*v))),
            Value::U16(v) => Some(BigDecimal::from(u64::from(*v))),
            Value::U32(v) => Some(BigDecimal::from(u64::from(*v))),
            Value::U64(v) => Some(BigDecimal::from(*v)),
            Value::F32(v) if v.is_finite() => BigDecimal::from_str(&v.to_string()).ok(),
            Value::F64(v) if v.is_finite() => BigDecimal::from_str(&v.to_string()).ok(),
            Value::Decimal(v) => Some(v.clone()),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{v}"),
            Value::Char(v) => write!(f, "{v}"),
            Value::Text(v) => f.write_str(v),
            Value::I8(v) => write!(f, "{v}"),
            Value::I16(v) => write!(f, "{v}"),
            Value::I32(v) => write!(f, "{v}"),
            Value::I64(v) => write!(f, "{v}"),
            Value::U8(v) => write!(f, "{v}"),
            Value::U16(v) => write!(f, "{v}"),
            Value::U32(v) => write!(f, "{v}"),
            Value::U64(v) => write!(f, "{v}"),
            Value::F32(v) => write!(f, "{v}"),
            Value::F64(v) => write!(f, "{v}"),
            Value::Decimal(v) => write!(f, "{v}"),
            Value::Enum(constant) => f.write_str(constant.name),
            Value::Object(type_name) => f.write_str(type_name),
            Value::Null => Ok(()),
        }
    }
}
