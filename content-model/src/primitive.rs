//! Primitive values and the primitive descriptor.

use std::hash::{Hash, Hasher};

use bytes::Bytes;
use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::vocabulary;

/// Semantic kind of a primitive, one per primitive type name.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum PrimitiveKind {
    /// UTF-8 text.
    String,
    /// `true` or `false`.
    Boolean,
    /// Signed integer, 32 or 64 bits wide.
    Integer,
    /// IEEE-754 number, single or double precision.
    Float,
    /// Point in time with millisecond precision.
    Date,
    /// Opaque bytes.
    ByteSequence,
}

impl PrimitiveKind {
    /// Every primitive kind, in wire-tag order.
    pub const ALL: [Self; 6] = [
        Self::String,
        Self::Boolean,
        Self::Integer,
        Self::Float,
        Self::Date,
        Self::ByteSequence,
    ];

    /// Returns the reserved type name of this kind.
    #[must_use]
    pub const fn type_name(self) -> &'static str {
        match self {
            Self::String => vocabulary::STRING,
            Self::Boolean => vocabulary::BOOLEAN,
            Self::Integer => vocabulary::INTEGER,
            Self::Float => vocabulary::FLOAT,
            Self::Date => vocabulary::DATE,
            Self::ByteSequence => vocabulary::BYTE_SEQUENCE,
        }
    }

    /// Resolves a type name (case-insensitively) to a primitive kind.
    #[must_use]
    pub fn from_type_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.type_name().eq_ignore_ascii_case(name))
    }
}

/// A primitive value.
///
/// Floats compare and hash by bit pattern so that primitives can be used as
/// map keys. Dates are held at millisecond precision, the resolution of both
/// wire formats.
#[derive(Clone, Debug)]
pub enum PrimitiveValue {
    /// UTF-8 text.
    String(String),
    /// Boolean.
    Boolean(bool),
    /// 32-bit integer.
    Integer(i32),
    /// 64-bit integer.
    Long(i64),
    /// Single-precision float.
    Float(f32),
    /// Double-precision float.
    Double(f64),
    /// Timestamp.
    Date(DateTime<Utc>),
    /// Opaque bytes.
    ByteSequence(Bytes),
}

impl PrimitiveValue {
    /// Wraps a timestamp, truncating it to millisecond precision.
    #[must_use]
    pub fn date(value: DateTime<Utc>) -> Self {
        let truncated = DateTime::from_timestamp_millis(value.timestamp_millis()).unwrap_or(value);
        Self::Date(truncated)
    }

    /// Returns the semantic kind of the value.
    #[must_use]
    pub const fn kind(&self) -> PrimitiveKind {
        match self {
            Self::String(_) => PrimitiveKind::String,
            Self::Boolean(_) => PrimitiveKind::Boolean,
            Self::Integer(_) | Self::Long(_) => PrimitiveKind::Integer,
            Self::Float(_) | Self::Double(_) => PrimitiveKind::Float,
            Self::Date(_) => PrimitiveKind::Date,
            Self::ByteSequence(_) => PrimitiveKind::ByteSequence,
        }
    }

    /// Returns the reserved type name of the value's kind.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.kind().type_name()
    }

    /// Returns the text if the value is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the boolean if the value is one.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the value widened to `i64` if it is an integer of either width.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(i64::from(*value)),
            Self::Long(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the value widened to `f64` if it is a float of either precision.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(value) => Some(f64::from(*value)),
            Self::Double(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the timestamp if the value is a date.
    #[must_use]
    pub const fn as_date(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Date(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the bytes if the value is a byte sequence.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Self::ByteSequence(value) => Some(value),
            _ => None,
        }
    }
}

impl PartialEq for PrimitiveValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Long(a), Self::Long(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::Double(a), Self::Double(b)) => a.to_bits() == b.to_bits(),
            (Self::Date(a), Self::Date(b)) => a == b,
            (Self::ByteSequence(a), Self::ByteSequence(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for PrimitiveValue {}

impl Hash for PrimitiveValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::String(value) => value.hash(state),
            Self::Boolean(value) => value.hash(state),
            Self::Integer(value) => value.hash(state),
            Self::Long(value) => value.hash(state),
            Self::Float(value) => value.to_bits().hash(state),
            Self::Double(value) => value.to_bits().hash(state),
            Self::Date(value) => value.hash(state),
            Self::ByteSequence(value) => value.hash(state),
        }
    }
}

impl From<String> for PrimitiveValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for PrimitiveValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<bool> for PrimitiveValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i32> for PrimitiveValue {
    fn from(value: i32) -> Self {
        Self::Integer(value)
    }
}

impl From<i64> for PrimitiveValue {
    fn from(value: i64) -> Self {
        Self::Long(value)
    }
}

impl From<f32> for PrimitiveValue {
    fn from(value: f32) -> Self {
        Self::Float(value)
    }
}

impl From<f64> for PrimitiveValue {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<DateTime<Utc>> for PrimitiveValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::date(value)
    }
}

impl From<Bytes> for PrimitiveValue {
    fn from(value: Bytes) -> Self {
        Self::ByteSequence(value)
    }
}

impl From<Vec<u8>> for PrimitiveValue {
    fn from(value: Vec<u8>) -> Self {
        Self::ByteSequence(Bytes::from(value))
    }
}

/// Primitive descriptor: a type tag plus a value of that kind.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AbsPrimitive {
    kind: PrimitiveKind,
    value: PrimitiveValue,
}

impl AbsPrimitive {
    /// Wraps a value, tagging it with the value's own kind.
    #[must_use]
    pub fn wrap(value: impl Into<PrimitiveValue>) -> Self {
        let value = value.into();
        Self {
            kind: value.kind(),
            value,
        }
    }

    /// Creates a primitive tagged with `type_name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownPrimitiveType`] when `type_name` is not a
    /// primitive type, or [`Error::PrimitiveTypeMismatch`] when the value's
    /// kind differs from the tag.
    pub fn new(type_name: &str, value: impl Into<PrimitiveValue>) -> Result<Self> {
        let kind =
            PrimitiveKind::from_type_name(type_name).ok_or_else(|| Error::UnknownPrimitiveType {
                type_name: type_name.to_owned(),
            })?;
        let mut primitive = Self {
            kind,
            value: PrimitiveValue::Boolean(false),
        };
        primitive.set(value)?;
        Ok(primitive)
    }

    /// Replaces the wrapped value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PrimitiveTypeMismatch`] when the new value's kind
    /// differs from the primitive's tag; the primitive is left unchanged.
    pub fn set(&mut self, value: impl Into<PrimitiveValue>) -> Result<()> {
        let value = value.into();
        if value.kind() != self.kind {
            return Err(Error::PrimitiveTypeMismatch {
                expected: self.kind.type_name().to_owned(),
                found: value.type_name().to_owned(),
            });
        }
        self.value = value;
        Ok(())
    }

    /// Returns the type tag.
    #[must_use]
    pub const fn kind(&self) -> PrimitiveKind {
        self.kind
    }

    /// Returns the reserved type name of the tag.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }

    /// Returns the wrapped value.
    #[must_use]
    pub fn value(&self) -> &PrimitiveValue {
        &self.value
    }

    /// Consumes the primitive, returning the wrapped value.
    #[must_use]
    pub fn into_value(self) -> PrimitiveValue {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use chrono::TimeZone;

    use super::*;

    #[test]
    fn wrap_tags_with_value_kind() {
        assert_eq!(AbsPrimitive::wrap(7_i64).type_name(), vocabulary::INTEGER);
        assert_eq!(AbsPrimitive::wrap(7_i32).type_name(), vocabulary::INTEGER);
        assert_eq!(AbsPrimitive::wrap(1.5_f32).type_name(), vocabulary::FLOAT);
        assert_eq!(AbsPrimitive::wrap("x").type_name(), vocabulary::STRING);
        assert_eq!(
            AbsPrimitive::wrap(vec![1_u8, 2]).type_name(),
            vocabulary::BYTE_SEQUENCE
        );
    }

    #[test]
    fn mismatched_tag_is_rejected() {
        let err = AbsPrimitive::new(vocabulary::BOOLEAN, "yes").expect_err("mismatch");
        assert!(matches!(err, Error::PrimitiveTypeMismatch { .. }));

        let mut primitive = AbsPrimitive::wrap(3_i32);
        primitive.set("three").expect_err("mismatch");
        assert_eq!(primitive.value(), &PrimitiveValue::Integer(3));
        primitive.set(4_i64).expect("integers of either width");
        assert_eq!(primitive.value().as_i64(), Some(4));
    }

    #[test]
    fn unknown_type_name_is_rejected() {
        let err = AbsPrimitive::new("BO_Complex", 1_i32).expect_err("unknown");
        assert!(matches!(err, Error::UnknownPrimitiveType { .. }));
        assert!(AbsPrimitive::new("bo_string", "ok").is_ok());
    }

    #[test]
    fn equality_and_hash_are_value_based() {
        let mut set = HashSet::new();
        set.insert(AbsPrimitive::wrap("a"));
        set.insert(AbsPrimitive::wrap("a"));
        set.insert(AbsPrimitive::wrap(f64::NAN));
        set.insert(AbsPrimitive::wrap(f64::NAN));
        assert_eq!(set.len(), 2);
        assert_ne!(AbsPrimitive::wrap(1_i32), AbsPrimitive::wrap(1_i64));
    }

    #[test]
    fn dates_are_truncated_to_millis() {
        let precise = Utc.timestamp_opt(1_700_000_000, 123_456_789).unwrap();
        let value = PrimitiveValue::date(precise);
        assert_eq!(
            value.as_date().map(|d| d.timestamp_subsec_nanos()),
            Some(123_000_000)
        );
    }
}
