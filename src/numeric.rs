//! Numeric policy: the decimal model behind every numeric stepper.
//!
//! A stepper always works on an arbitrary-precision [`BigDecimal`], whatever the field type is:
//! - the value is clamped to `[min, max]` on every change; out-of-range edits snap to the nearest bound
//! - stepping past a bound clamps, unless wrap mode is on
//! - the field's own semantics (integral truncation, float precision) are applied only when the value
//!   is written back, see [`to_field_value`]
//!
//! ## Wrap formula
//!
//! With wrap enabled, incrementing past `max` lands on `min + 1` and decrementing past `min` lands on
//! `max`. Wrapping against a zero `max` is a configuration error ([`ConfigError::WrapAgainstZero`]).
//!
//! ## Exponent limit
//!
//! Rescaling a decimal costs time proportional to its exponent, so text with an exponent beyond
//! [`MAX_EXPONENT`] is rejected and stepper values are kept within it.

use std::str::FromStr;

use bigdecimal::{BigDecimal, ToPrimitive, Zero};
use reflectgrid_core::{ConvertError, NumericKind, Value};

use crate::errors::ConfigError;

/// Largest decimal exponent accepted from text, in either direction.
pub const MAX_EXPONENT: i64 = 64;

/// Bounded decimal model of a numeric stepper.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberStepper {
    value: BigDecimal,
    min: BigDecimal,
    max: BigDecimal,
    step: BigDecimal,
    wrap: bool,
}

impl NumberStepper {
    /// Create a stepper over `[min, max]` with a step of one.
    ///
    /// ## Notes
    /// - A seed outside the range falls back to `min`.
    pub fn new(seed: BigDecimal, min: BigDecimal, max: BigDecimal) -> Self {
        let seed = bounded_scale(seed);
        let value = if seed >= min && seed <= max { seed } else { min.clone() };
        Self {
            value,
            min,
            max,
            step: BigDecimal::from(1),
            wrap: false,
        }
    }

    pub fn with_step(mut self, step: BigDecimal) -> Self {
        self.step = step;
        self
    }

    pub fn with_wrap(mut self, wrap: bool) -> Self {
        self.wrap = wrap;
        self
    }

    pub fn value(&self) -> &BigDecimal {
        &self.value
    }

    pub fn min(&self) -> &BigDecimal {
        &self.min
    }

    pub fn max(&self) -> &BigDecimal {
        &self.max
    }

    pub fn step(&self) -> &BigDecimal {
        &self.step
    }

    pub fn wraps(&self) -> bool {
        self.wrap
    }

    /// Set the value, snapping it into `[min, max]`.
    pub fn set_value(&mut self, value: BigDecimal) {
        self.value = self.clamp(bounded_scale(value));
    }

    /// Move up by `steps` increments.
    pub fn increment(&mut self, steps: u32) -> Result<(), ConfigError> {
        let candidate = &self.value + &self.step * BigDecimal::from(steps);
        let next = if candidate <= self.max {
            candidate
        } else if self.wrap {
            self.wrap_value(candidate)? + BigDecimal::from(1)
        } else {
            self.max.clone()
        };
        self.set_value(next);
        Ok(())
    }

    /// Move down by `steps` increments.
    pub fn decrement(&mut self, steps: u32) -> Result<(), ConfigError> {
        let candidate = &self.value - &self.step * BigDecimal::from(steps);
        let next = if candidate >= self.min {
            candidate
        } else if self.wrap {
            self.wrap_value(candidate)? + BigDecimal::from(1)
        } else {
            self.min.clone()
        };
        self.set_value(next);
        Ok(())
    }

    fn wrap_value(&self, candidate: BigDecimal) -> Result<BigDecimal, ConfigError> {
        if self.max == BigDecimal::from(0) {
            return Err(ConfigError::WrapAgainstZero);
        }
        Ok(if candidate < self.min {
            self.max.clone()
        } else if candidate > self.max {
            self.min.clone()
        } else {
            candidate
        })
    }

    fn clamp(&self, value: BigDecimal) -> BigDecimal {
        if value < self.min {
            self.min.clone()
        } else if value > self.max {
            self.max.clone()
        } else {
            value
        }
    }
}

/// Default stepper range for a field kind.
///
/// The full `i32` range, narrowed to what the field type can hold.
pub fn default_bounds(kind: NumericKind) -> (BigDecimal, BigDecimal) {
    let (min, max): (i64, i64) = match kind {
        NumericKind::I8 => (i8::MIN.into(), i8::MAX.into()),
        NumericKind::I16 => (i16::MIN.into(), i16::MAX.into()),
        NumericKind::U8 => (0, u8::MAX.into()),
        NumericKind::U16 => (0, u16::MAX.into()),
        NumericKind::U32 | NumericKind::U64 => (0, i32::MAX.into()),
        NumericKind::I32
        | NumericKind::I64
        | NumericKind::F32
        | NumericKind::F64
        | NumericKind::Decimal => (i32::MIN.into(), i32::MAX.into()),
    };
    (BigDecimal::from(min), BigDecimal::from(max))
}

/// Parse a bound, step or stepper edit written as decimal text.
///
/// ## Errors
/// - [`ConvertError::Parse`] for malformed text, and for numbers whose exponent or integer part
///   exceeds [`MAX_EXPONENT`] digits.
pub fn parse_decimal(text: &str) -> Result<BigDecimal, ConvertError> {
    let parse_err = || ConvertError::parse("BigDecimal", text);
    let decimal = BigDecimal::from_str(text.trim()).map_err(|_| parse_err())?;
    let (_, scale) = decimal.as_bigint_and_exponent();
    if !(-MAX_EXPONENT..=MAX_EXPONENT).contains(&scale) {
        return Err(parse_err());
    }
    if decimal.digits() as i64 - scale > MAX_EXPONENT {
        return Err(parse_err());
    }
    Ok(decimal)
}

/// Bring a decimal's scale within [`MAX_EXPONENT`].
///
/// Magnitudes beyond `10^MAX_EXPONENT` keep their sign and collapse onto `±digits·10^MAX_EXPONENT`,
/// which still lies outside every parsed bound. Fractions finer than `10^-MAX_EXPONENT` are
/// truncated.
fn bounded_scale(value: BigDecimal) -> BigDecimal {
    if value.is_zero() {
        return BigDecimal::zero();
    }
    let (digits, scale) = value.as_bigint_and_exponent();
    if scale < -MAX_EXPONENT {
        BigDecimal::new(digits, -MAX_EXPONENT)
    } else if scale > MAX_EXPONENT {
        // Position of the leading digit relative to the decimal point.
        if value.digits() as i64 - scale < -MAX_EXPONENT {
            BigDecimal::zero()
        } else {
            value.with_scale(MAX_EXPONENT)
        }
    } else {
        value
    }
}

/// Coerce a stepper value into a field of the given kind.
///
/// ## Notes
/// - Integral kinds truncate toward zero (`-2.7` becomes `-2`).
/// - Values the field type cannot hold are reported, never wrapped.
pub fn to_field_value(value: &BigDecimal, kind: NumericKind) -> Result<Value, ConvertError> {
    let bounded = bounded_scale(value.clone());
    let out_of_range = || ConvertError::OutOfRange {
        type_name: kind.name(),
        value: bounded.to_string(),
    };
    let truncated = bounded.with_scale(0);
    let converted = match kind {
        NumericKind::I8 => truncated.to_i8().map(Value::I8),
        NumericKind::I16 => truncated.to_i16().map(Value::I16),
        NumericKind::I32 => truncated.to_i32().map(Value::I32),
        NumericKind::I64 => truncated.to_i64().map(Value::I64),
        NumericKind::U8 => truncated.to_u8().map(Value::U8),
        NumericKind::U16 => truncated.to_u16().map(Value::U16),
        NumericKind::U32 => truncated.to_u32().map(Value::U32),
        NumericKind::U64 => truncated.to_u64().map(Value::U64),
        NumericKind::F32 => value.to_f32().filter(|v| v.is_finite()).map(Value::F32),
        NumericKind::F64 => value.to_f64().filter(|v| v.is_finite()).map(Value::F64),
        NumericKind::Decimal => Some(Value::Decimal(value.clone())),
    };
    converted.ok_or_else(out_of_range)
}
