//! Built-in converters for the standard scalar types and for reflected enums.

use std::str::FromStr;

use bigdecimal::BigDecimal;
use reflectgrid_core::{ConvertError, EnumInfo, NumericKind, Value};

use super::TypeConverter;
use crate::numeric::to_field_value;

/// Lenient boolean: any casing of `true` is true, everything else is false.
#[derive(Debug, Clone, Copy)]
pub struct BoolConverter;

impl TypeConverter for BoolConverter {
    fn to_string(&self, value: &Value) -> Result<String, ConvertError> {
        match value {
            Value::Bool(flag) => Ok(flag.to_string()),
            other => Err(unsupported("bool", other)),
        }
    }

    fn from_string(&self, text: &str) -> Result<Value, ConvertError> {
        Ok(Value::Bool(text.trim().eq_ignore_ascii_case("true")))
    }
}

/// First character of the trimmed text.
#[derive(Debug, Clone, Copy)]
pub struct CharConverter;

impl TypeConverter for CharConverter {
    fn to_string(&self, value: &Value) -> Result<String, ConvertError> {
        match value {
            Value::Char(c) => Ok(c.to_string()),
            other => Err(unsupported("char", other)),
        }
    }

    fn from_string(&self, text: &str) -> Result<Value, ConvertError> {
        text.trim()
            .chars()
            .next()
            .map(Value::Char)
            .ok_or_else(|| ConvertError::parse("char", text))
    }
}

/// Identity conversion for `String` fields.
#[derive(Debug, Clone, Copy)]
pub struct TextConverter;

impl TypeConverter for TextConverter {
    fn to_string(&self, value: &Value) -> Result<String, ConvertError> {
        Ok(value.to_string())
    }

    fn from_string(&self, text: &str) -> Result<Value, ConvertError> {
        Ok(Value::Text(text.to_string()))
    }
}

/// Generic number: integral text becomes an `i64`, any other number an `f64`.
#[derive(Debug, Clone, Copy)]
pub struct NumberConverter;

impl TypeConverter for NumberConverter {
    fn to_string(&self, value: &Value) -> Result<String, ConvertError> {
        if value.is_numeric() {
            Ok(value.to_string())
        } else {
            Err(unsupported("Number", value))
        }
    }

    fn from_string(&self, text: &str) -> Result<Value, ConvertError> {
        let trimmed = text.trim();
        if let Ok(integral) = trimmed.parse::<i64>() {
            return Ok(Value::I64(integral));
        }
        trimmed
            .parse::<f64>()
            .map(Value::F64)
            .map_err(|_| ConvertError::parse("Number", text))
    }

    fn from_value(&self, value: Value) -> Result<Value, ConvertError> {
        if value.is_numeric() {
            Ok(value)
        } else {
            self.from_string(&value.to_string())
        }
    }
}

/// One fixed numeric kind.
#[derive(Debug, Clone, Copy)]
pub struct NumericConverter {
    kind: NumericKind,
}

impl NumericConverter {
    pub fn new(kind: NumericKind) -> Self {
        Self { kind }
    }
}

impl TypeConverter for NumericConverter {
    fn to_string(&self, value: &Value) -> Result<String, ConvertError> {
        if value.is_numeric() {
            Ok(value.to_string())
        } else {
            Err(unsupported(self.kind.name(), value))
        }
    }

    fn from_string(&self, text: &str) -> Result<Value, ConvertError> {
        let trimmed = text.trim();
        let parse_err = || ConvertError::parse(self.kind.name(), text);
        Ok(match self.kind {
            NumericKind::I8 => Value::I8(trimmed.parse().map_err(|_| parse_err())?),
            NumericKind::I16 => Value::I16(trimmed.parse().map_err(|_| parse_err())?),
            NumericKind::I32 => Value::I32(trimmed.parse().map_err(|_| parse_err())?),
            NumericKind::I64 => Value::I64(trimmed.parse().map_err(|_| parse_err())?),
            NumericKind::U8 => Value::U8(trimmed.parse().map_err(|_| parse_err())?),
            NumericKind::U16 => Value::U16(trimmed.parse().map_err(|_| parse_err())?),
            NumericKind::U32 => Value::U32(trimmed.parse().map_err(|_| parse_err())?),
            NumericKind::U64 => Value::U64(trimmed.parse().map_err(|_| parse_err())?),
            NumericKind::F32 => Value::F32(trimmed.parse().map_err(|_| parse_err())?),
            NumericKind::F64 => Value::F64(trimmed.parse().map_err(|_| parse_err())?),
            NumericKind::Decimal => Value::Decimal(BigDecimal::from_str(trimmed).map_err(|_| parse_err())?),
        })
    }

    /// Numbers of another kind are widened to a decimal and coerced, truncating for integral kinds.
    fn from_value(&self, value: Value) -> Result<Value, ConvertError> {
        match value.to_decimal() {
            Some(decimal) => to_field_value(&decimal, self.kind),
            None => self.from_string(&value.to_string()),
        }
    }
}

/// Constants of one reflected enum, addressed by name.
#[derive(Debug, Clone, Copy)]
pub struct EnumConverter {
    info: EnumInfo,
}

impl EnumConverter {
    pub fn new(info: EnumInfo) -> Self {
        Self { info }
    }
}

impl TypeConverter for EnumConverter {
    fn to_string(&self, value: &Value) -> Result<String, ConvertError> {
        match value {
            Value::Enum(constant) if constant.type_id == self.info.type_id => Ok(constant.name.to_string()),
            other => Err(unsupported(self.info.type_name, other)),
        }
    }

    fn from_string(&self, text: &str) -> Result<Value, ConvertError> {
        self.info
            .find(text.trim())
            .map(Value::Enum)
            .ok_or_else(|| ConvertError::parse(self.info.type_name, text))
    }
}

fn unsupported(type_name: &'static str, found: &Value) -> ConvertError {
    ConvertError::Unsupported {
        type_name,
        found: found.kind_name(),
    }
}
