//! Native values understood by the translator.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use content_model::{AgentIdentifier, PrimitiveValue};

use crate::domain::{DomainObject, DomainValue};
use crate::wellknown::{Action, ActionResult, Done, Equals, Property};

/// Every native value kind the translator maps to descriptors.
///
/// The built-in variants translate through fixed shapes; anything else is a
/// user-defined [`DomainObject`] carried by [`NativeValue::Object`].
#[derive(Clone, Debug, PartialEq)]
pub enum NativeValue {
    /// UTF-8 text.
    String(String),
    /// Boolean flag.
    Boolean(bool),
    /// 32-bit integer.
    Integer(i32),
    /// 64-bit integer.
    Long(i64),
    /// Single-precision float.
    Float(f32),
    /// Double-precision float.
    Double(f64),
    /// Timestamp with millisecond precision.
    Date(DateTime<Utc>),
    /// Opaque bytes.
    ByteSequence(Bytes),
    /// Ordered collection.
    List(Vec<NativeValue>),
    /// Unordered collection without duplicates.
    Set(ValueSet),
    /// Agent identifier.
    AgentIdentifier(AgentIdentifier),
    /// Named property.
    Property(Box<Property>),
    /// The always-true proposition.
    TrueProposition,
    /// The always-false proposition.
    FalseProposition,
    /// An agent performing an action.
    Action(Box<Action>),
    /// Completion of an action.
    Done(Box<Done>),
    /// Outcome of an action.
    Result(Box<ActionResult>),
    /// Equality between two terms.
    Equals(Box<Equals>),
    /// Independent content elements bundled together.
    ContentElementList(Vec<NativeValue>),
    /// User-defined domain value.
    Object(DomainValue),
}

impl NativeValue {
    /// Wraps a timestamp, truncated to the millisecond precision descriptors
    /// carry.
    #[must_use]
    pub fn date(value: DateTime<Utc>) -> Self {
        match PrimitiveValue::date(value) {
            PrimitiveValue::Date(truncated) => Self::Date(truncated),
            _ => Self::Date(value),
        }
    }

    /// Wraps a user-defined domain value.
    #[must_use]
    pub fn object<T>(object: T) -> Self
    where
        T: DomainObject + Clone + PartialEq + 'static,
    {
        Self::Object(DomainValue::new(object))
    }

    /// Returns the text of a string value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    /// Returns an integer value of either width.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(i64::from(*value)),
            Self::Long(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the elements of a list or content-element-list.
    #[must_use]
    pub fn as_list(&self) -> Option<&[NativeValue]> {
        match self {
            Self::List(values) | Self::ContentElementList(values) => Some(values),
            _ => None,
        }
    }

    /// Returns the agent identifier, if this is one.
    #[must_use]
    pub fn as_agent_identifier(&self) -> Option<&AgentIdentifier> {
        match self {
            Self::AgentIdentifier(aid) => Some(aid),
            _ => None,
        }
    }

    /// Returns the domain value downcast to `T`.
    #[must_use]
    pub fn as_object<T: 'static>(&self) -> Option<&T> {
        match self {
            Self::Object(object) => object.downcast_ref::<T>(),
            _ => None,
        }
    }
}

impl From<PrimitiveValue> for NativeValue {
    fn from(value: PrimitiveValue) -> Self {
        match value {
            PrimitiveValue::String(v) => Self::String(v),
            PrimitiveValue::Boolean(v) => Self::Boolean(v),
            PrimitiveValue::Integer(v) => Self::Integer(v),
            PrimitiveValue::Long(v) => Self::Long(v),
            PrimitiveValue::Float(v) => Self::Float(v),
            PrimitiveValue::Double(v) => Self::Double(v),
            PrimitiveValue::Date(v) => Self::Date(v),
            PrimitiveValue::ByteSequence(v) => Self::ByteSequence(v),
        }
    }
}

impl From<String> for NativeValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for NativeValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<bool> for NativeValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i32> for NativeValue {
    fn from(value: i32) -> Self {
        Self::Integer(value)
    }
}

impl From<i64> for NativeValue {
    fn from(value: i64) -> Self {
        Self::Long(value)
    }
}

impl From<f32> for NativeValue {
    fn from(value: f32) -> Self {
        Self::Float(value)
    }
}

impl From<f64> for NativeValue {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<DateTime<Utc>> for NativeValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::date(value)
    }
}

impl From<Bytes> for NativeValue {
    fn from(value: Bytes) -> Self {
        Self::ByteSequence(value)
    }
}

impl From<Vec<NativeValue>> for NativeValue {
    fn from(values: Vec<NativeValue>) -> Self {
        Self::List(values)
    }
}

impl From<ValueSet> for NativeValue {
    fn from(values: ValueSet) -> Self {
        Self::Set(values)
    }
}

impl From<AgentIdentifier> for NativeValue {
    fn from(value: AgentIdentifier) -> Self {
        Self::AgentIdentifier(value)
    }
}

impl From<Property> for NativeValue {
    fn from(value: Property) -> Self {
        Self::Property(Box::new(value))
    }
}

impl From<Action> for NativeValue {
    fn from(value: Action) -> Self {
        Self::Action(Box::new(value))
    }
}

impl From<Done> for NativeValue {
    fn from(value: Done) -> Self {
        Self::Done(Box::new(value))
    }
}

impl From<ActionResult> for NativeValue {
    fn from(value: ActionResult) -> Self {
        Self::Result(Box::new(value))
    }
}

impl From<Equals> for NativeValue {
    fn from(value: Equals) -> Self {
        Self::Equals(Box::new(value))
    }
}

/// Insertion-ordered set of native values.
///
/// Native values are not hashable (floats, domain objects), so membership is
/// a linear scan. Equality ignores order.
#[derive(Clone, Debug, Default)]
pub struct ValueSet {
    values: Vec<NativeValue>,
}

impl ValueSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a value, returning `false` when an equal value was already present.
    pub fn insert(&mut self, value: NativeValue) -> bool {
        if self.contains(&value) {
            return false;
        }
        self.values.push(value);
        true
    }

    /// Returns `true` when an equal value is present.
    #[must_use]
    pub fn contains(&self, value: &NativeValue) -> bool {
        self.values.iter().any(|candidate| candidate == value)
    }

    /// Iterates in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &NativeValue> {
        self.values.iter()
    }

    /// Returns the number of values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` when the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl PartialEq for ValueSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.values.iter().all(|value| other.contains(value))
    }
}

impl FromIterator<NativeValue> for ValueSet {
    fn from_iter<I: IntoIterator<Item = NativeValue>>(iter: I) -> Self {
        let mut set = Self::new();
        for value in iter {
            set.insert(value);
        }
        set
    }
}

impl IntoIterator for ValueSet {
    type Item = NativeValue;
    type IntoIter = std::vec::IntoIter<NativeValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValueSet {
    type Item = &'a NativeValue;
    type IntoIter = std::slice::Iter<'a, NativeValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn sets_deduplicate_and_ignore_order() {
        let a: ValueSet = ["x", "y", "x"].into_iter().map(NativeValue::from).collect();
        let b: ValueSet = ["y", "x"].into_iter().map(NativeValue::from).collect();
        assert_eq!(a.len(), 2);
        assert_eq!(a, b);
        assert_ne!(a, ValueSet::new());
    }

    #[test]
    fn dates_are_truncated_to_millis() {
        let precise = Utc.timestamp_opt(1_700_000_000, 123_456_789).unwrap();
        let NativeValue::Date(date) = NativeValue::date(precise) else {
            panic!("expected a date");
        };
        assert_eq!(date.timestamp_subsec_nanos(), 123_000_000);
    }

    #[test]
    fn primitive_widths_survive_conversion() {
        assert_eq!(NativeValue::from(PrimitiveValue::Long(7)), NativeValue::Long(7));
        assert_eq!(NativeValue::from(PrimitiveValue::Float(1.5)), NativeValue::Float(1.5));
        assert_eq!(NativeValue::Integer(7).as_i64(), Some(7));
    }
}
