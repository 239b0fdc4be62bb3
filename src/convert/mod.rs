//! Type conversion registry.
//!
//! Converts between a control's representation (text, a decimal, a selected constant) and the
//! semantic type of a field. Every engine in the process shares one registry through
//! [`FormServices`](crate::propagation::FormServices).
//!
//! ## Notes
//!
//! - The standard scalars, `Number` and `BigDecimal` are registered up front.
//! - Enum converters are registered the first time a field of that enum is rendered, and stay for the
//!   lifetime of the registry. Adding a converter for a known type is a no-op, never an overwrite.
//! - A lookup for an unknown type is [`ConvertError::MissingConverter`], never a silent default.

pub mod builtin;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use reflectgrid_core::{ConvertError, EnumInfo, NumericKind, TypeKey, Value};

pub use builtin::{BoolConverter, CharConverter, EnumConverter, NumberConverter, NumericConverter, TextConverter};

/// Bidirectional conversion for one semantic type.
pub trait TypeConverter: Send + Sync {
    fn to_string(&self, value: &Value) -> Result<String, ConvertError>;

    fn from_string(&self, text: &str) -> Result<Value, ConvertError>;

    /// Convert a value of another representation.
    ///
    /// The default goes through the value's text form.
    fn from_value(&self, value: Value) -> Result<Value, ConvertError> {
        self.from_string(&value.to_string())
    }
}

/// Append-only map from semantic type to converter.
pub struct TypeConverterRegistry {
    converters: RwLock<HashMap<TypeKey, Arc<dyn TypeConverter>>>,
}

impl TypeConverterRegistry {
    /// Create a registry holding the built-in converters.
    pub fn new() -> Self {
        let registry = Self::empty();
        registry.add_converter(TypeKey::Bool, BoolConverter);
        registry.add_converter(TypeKey::Char, CharConverter);
        registry.add_converter(TypeKey::Text, TextConverter);
        registry.add_converter(TypeKey::Number, NumberConverter);
        for kind in NumericKind::ALL {
            registry.add_converter(TypeKey::Numeric(kind), NumericConverter::new(kind));
        }
        registry
    }

    /// Create a registry with no converters at all.
    pub fn empty() -> Self {
        Self {
            converters: RwLock::new(HashMap::new()),
        }
    }

    /// Register a converter unless one is already present for `key`.
    ///
    /// ## Returns
    /// - `true` if the converter was added.
    pub fn add_converter(&self, key: TypeKey, converter: impl TypeConverter + 'static) -> bool {
        let mut converters = self.converters.write();
        if converters.contains_key(&key) {
            return false;
        }
        converters.insert(key, Arc::new(converter));
        true
    }

    /// Register the converter of a reflected enum on first encounter.
    pub fn register_enum(&self, info: EnumInfo) -> bool {
        let key = info.type_key();
        if self.contains(key) {
            return false;
        }
        let added = self.add_converter(key, EnumConverter::new(info));
        if added {
            tracing::debug!(enum_type = info.type_name, "registered enum converter");
        }
        added
    }

    pub fn contains(&self, key: TypeKey) -> bool {
        self.converters.read().contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.converters.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lookup(&self, key: TypeKey) -> Result<Arc<dyn TypeConverter>, ConvertError> {
        self.converters
            .read()
            .get(&key)
            .cloned()
            .ok_or_else(|| ConvertError::MissingConverter {
                type_name: key.name().to_string(),
            })
    }

    /// Render a field value as text.
    ///
    /// ## Notes
    /// - An absent value is the empty string and text is returned as-is, without a lookup.
    pub fn to_string(&self, key: TypeKey, value: &Value) -> Result<String, ConvertError> {
        match value {
            Value::Null => Ok(String::new()),
            Value::Text(text) => Ok(text.clone()),
            other => self.lookup(key)?.to_string(other),
        }
    }

    /// Parse control text into a value of the semantic type `key`.
    pub fn from_string(&self, key: TypeKey, text: &str) -> Result<Value, ConvertError> {
        if key == TypeKey::Text {
            return Ok(Value::Text(text.to_string()));
        }
        self.lookup(key)?.from_string(text)
    }

    /// Convert a control value into the semantic type `key`.
    ///
    /// A value that already has the requested type is returned unchanged.
    pub fn from_value(&self, key: TypeKey, value: Value) -> Result<Value, ConvertError> {
        if matches!(value, Value::Null) || value.type_key() == Some(key) {
            return Ok(value);
        }
        self.lookup(key)?.from_value(value)
    }
}

impl Default for TypeConverterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TypeConverterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let converters = self.converters.read();
        let mut keys: Vec<&'static str> = converters.keys().map(|key| key.name()).collect();
        keys.sort_unstable();
        f.debug_struct("TypeConverterRegistry").field("types", &keys).finish()
    }
}
