//! Tagged scalar values.
//!
//! A [`TaggedValue`] holds exactly one parsed scalar. Reading it back as a
//! concrete Rust type is checked against the variant: asking a string for an
//! integer fails with [`ParseError::TypeMismatch`], while numeric shapes
//! convert between each other with `as`-cast semantics.

use std::fmt;

use num_traits::AsPrimitive;

use crate::encode::escape_string;
use crate::error::{ParseError, Result};

/// Discriminant of a [`TaggedValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Empty,
    Boolean,
    Text,
    Integer,
    Float,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Empty => "an empty value",
            ValueKind::Boolean => "a boolean",
            ValueKind::Text => "a string",
            ValueKind::Integer => "an integer",
            ValueKind::Float => "a floating point number",
        };
        f.write_str(name)
    }
}

/// A single configuration scalar.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum TaggedValue {
    /// No value.
    #[default]
    Empty,
    /// Boolean value.
    Boolean(bool),
    /// UTF-8 string.
    Text(String),
    /// 64-bit signed integer.
    Integer(i64),
    /// 64-bit floating-point number.
    Float(f64),
}

mod sealed {
    pub trait Sealed {}
}

/// Signed integer widths a [`TaggedValue`] can be read as.
///
/// Conversions truncate like `as`: integers wrap to the narrower width and
/// floats round toward zero (saturating at the bounds, `NaN` becomes 0).
pub trait IntegerShape: sealed::Sealed + Copy {
    #[doc(hidden)]
    fn from_integer(n: i64) -> Self;
    #[doc(hidden)]
    fn from_float(x: f64) -> Self;
}

/// Floating widths a [`TaggedValue`] can be read as.
pub trait FloatShape: sealed::Sealed + Copy {
    #[doc(hidden)]
    fn from_integer(n: i64) -> Self;
    #[doc(hidden)]
    fn from_float(x: f64) -> Self;
}

macro_rules! impl_integer_shape {
    ($($t:ty),*) => {
        $(
            impl sealed::Sealed for $t {}

            impl IntegerShape for $t {
                fn from_integer(n: i64) -> Self {
                    n.as_()
                }

                fn from_float(x: f64) -> Self {
                    x.as_()
                }
            }

            impl From<$t> for TaggedValue {
                fn from(n: $t) -> Self {
                    TaggedValue::Integer(n.into())
                }
            }

            impl TryFrom<&TaggedValue> for $t {
                type Error = ParseError;

                fn try_from(value: &TaggedValue) -> Result<Self> {
                    value.as_integer()
                }
            }
        )*
    };
}

macro_rules! impl_float_shape {
    ($($t:ty),*) => {
        $(
            impl sealed::Sealed for $t {}

            impl FloatShape for $t {
                fn from_integer(n: i64) -> Self {
                    n.as_()
                }

                fn from_float(x: f64) -> Self {
                    x.as_()
                }
            }

            impl From<$t> for TaggedValue {
                fn from(x: $t) -> Self {
                    TaggedValue::Float(x.into())
                }
            }

            impl TryFrom<&TaggedValue> for $t {
                type Error = ParseError;

                fn try_from(value: &TaggedValue) -> Result<Self> {
                    value.as_float()
                }
            }
        )*
    };
}

impl_integer_shape!(i8, i16, i32, i64);
impl_float_shape!(f32, f64);

impl TaggedValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            TaggedValue::Empty => ValueKind::Empty,
            TaggedValue::Boolean(_) => ValueKind::Boolean,
            TaggedValue::Text(_) => ValueKind::Text,
            TaggedValue::Integer(_) => ValueKind::Integer,
            TaggedValue::Float(_) => ValueKind::Float,
        }
    }

    /// Returns `true` if no value is stored.
    pub fn is_empty(&self) -> bool {
        matches!(self, TaggedValue::Empty)
    }

    fn mismatch(&self, expected: ValueKind) -> ParseError {
        ParseError::TypeMismatch {
            expected,
            found: self.kind(),
        }
    }

    /// Read a `Boolean` value.
    pub fn as_bool(&self) -> Result<bool> {
        match self {
            TaggedValue::Boolean(b) => Ok(*b),
            _ => Err(self.mismatch(ValueKind::Boolean)),
        }
    }

    /// Read an `Integer` or `Float` value as a signed integer of width `T`.
    ///
    /// Beware of overflow: the conversion never fails on range, it truncates.
    pub fn as_integer<T: IntegerShape>(&self) -> Result<T> {
        match self {
            TaggedValue::Integer(n) => Ok(T::from_integer(*n)),
            TaggedValue::Float(x) => Ok(T::from_float(*x)),
            _ => Err(self.mismatch(ValueKind::Integer)),
        }
    }

    /// Read an `Integer` or `Float` value as a float of width `T`.
    pub fn as_float<T: FloatShape>(&self) -> Result<T> {
        match self {
            TaggedValue::Integer(n) => Ok(T::from_integer(*n)),
            TaggedValue::Float(x) => Ok(T::from_float(*x)),
            _ => Err(self.mismatch(ValueKind::Float)),
        }
    }

    /// Borrow a `Text` value.
    pub fn as_text(&self) -> Result<&str> {
        match self {
            TaggedValue::Text(s) => Ok(s),
            _ => Err(self.mismatch(ValueKind::Text)),
        }
    }

    /// Take ownership of a `Text` value.
    pub fn into_text(self) -> Result<String> {
        match self {
            TaggedValue::Text(s) => Ok(s),
            other => Err(other.mismatch(ValueKind::Text)),
        }
    }
}

impl fmt::Display for TaggedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaggedValue::Empty => f.write_str("void"),
            TaggedValue::Boolean(b) => write!(f, "{}", b),
            TaggedValue::Text(s) => write!(f, "\"{}\"", escape_string(s)),
            TaggedValue::Integer(n) => write!(f, "{}", n),
            // Debug keeps a fractional part or exponent, independent of locale.
            TaggedValue::Float(x) => write!(f, "{:?}", x),
        }
    }
}

impl From<bool> for TaggedValue {
    fn from(b: bool) -> Self {
        TaggedValue::Boolean(b)
    }
}

impl From<String> for TaggedValue {
    fn from(s: String) -> Self {
        TaggedValue::Text(s)
    }
}

impl From<&str> for TaggedValue {
    fn from(s: &str) -> Self {
        TaggedValue::Text(s.to_string())
    }
}

impl TryFrom<&TaggedValue> for bool {
    type Error = ParseError;

    fn try_from(value: &TaggedValue) -> Result<Self> {
        value.as_bool()
    }
}

impl TryFrom<&TaggedValue> for String {
    type Error = ParseError;

    fn try_from(value: &TaggedValue) -> Result<Self> {
        value.as_text().map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_default_is_empty() {
        let v = TaggedValue::default();
        assert!(v.is_empty());
        assert_eq!(v.kind(), ValueKind::Empty);
        assert_eq!(v.to_string(), "void");
    }

    #[test]
    fn test_construction_widens() {
        assert_eq!(TaggedValue::from(-3i8), TaggedValue::Integer(-3));
        assert_eq!(TaggedValue::from(70_000i32), TaggedValue::Integer(70_000));
        assert_eq!(TaggedValue::from(1.5f32), TaggedValue::Float(1.5));
        assert_eq!(TaggedValue::from("hi"), TaggedValue::Text("hi".into()));
    }

    #[test]
    fn test_bool_only_from_boolean() {
        assert!(TaggedValue::from(true).as_bool().unwrap());
        let err = TaggedValue::from(1i64).as_bool().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
        assert_eq!(err.to_string(), "Expected a boolean, found an integer");
    }

    #[test]
    fn test_integer_narrowing_truncates() {
        let v = TaggedValue::from(300i64);
        assert_eq!(v.as_integer::<i64>().unwrap(), 300);
        assert_eq!(v.as_integer::<i8>().unwrap(), 44);
        assert_eq!(TaggedValue::from(-2.9).as_integer::<i32>().unwrap(), -2);
        assert_eq!(TaggedValue::from(7.99).as_integer::<i16>().unwrap(), 7);
        assert!(TaggedValue::from("7").as_integer::<i32>().is_err());
        assert!(TaggedValue::from(false).as_integer::<i64>().is_err());
    }

    #[test]
    fn test_float_from_numeric() {
        assert_eq!(TaggedValue::from(12i64).as_float::<f64>().unwrap(), 12.0);
        assert_eq!(TaggedValue::from(0.25).as_float::<f32>().unwrap(), 0.25f32);
        let err = TaggedValue::Empty.as_float::<f64>().unwrap_err();
        assert_eq!(err.to_string(), "Expected a floating point number, found an empty value");
    }

    #[test]
    fn test_text_only_from_text() {
        let v = TaggedValue::from("abc");
        assert_eq!(v.as_text().unwrap(), "abc");
        assert_eq!(String::try_from(&v).unwrap(), "abc");
        assert_eq!(v.into_text().unwrap(), "abc");
        assert!(TaggedValue::from(1.0).as_text().is_err());
    }

    #[test]
    fn test_try_from_impls() {
        let v = TaggedValue::from(42i64);
        assert_eq!(i32::try_from(&v).unwrap(), 42);
        assert_eq!(f64::try_from(&v).unwrap(), 42.0);
        assert!(bool::try_from(&v).is_err());
    }

    #[test]
    fn test_clone_is_deep() {
        let original = TaggedValue::from("shared?");
        let mut copy = original.clone();
        if let TaggedValue::Text(s) = &mut copy {
            s.push('!');
        }
        assert_eq!(original.as_text().unwrap(), "shared?");
        assert_eq!(copy.as_text().unwrap(), "shared?!");
    }

    #[test]
    fn test_display() {
        assert_eq!(TaggedValue::from(true).to_string(), "true");
        assert_eq!(TaggedValue::from(-17i64).to_string(), "-17");
        assert_eq!(TaggedValue::from(1.0).to_string(), "1.0");
        assert_eq!(TaggedValue::from(6.626e-34).to_string(), "6.626e-34");
        assert_eq!(TaggedValue::from(1e100).to_string(), "1e100");
        assert_eq!(
            TaggedValue::from("a\"b\\c\n\u{1}").to_string(),
            "\"a\\\"b\\\\c\\n\\u0001\""
        );
    }
}
