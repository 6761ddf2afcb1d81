//! Schema-free frames.
//!
//! Frames mirror the descriptor tree shape for callers that have no ontology
//! at hand. Agent identifiers may appear natively inside a frame tree; codecs
//! rewrite them to and from the reserved `agent-identifier` qualified frame.

use crate::ids::AgentIdentifier;
use crate::primitive::PrimitiveValue;

/// Any value that can appear inside a frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FrameValue {
    /// Leaf value.
    Primitive(PrimitiveValue),
    /// Positional frame.
    Ordered(OrderedFrame),
    /// Frame with named slots.
    Qualified(QualifiedFrame),
    /// Agent identifier carried natively.
    AgentIdentifier(AgentIdentifier),
}

impl FrameValue {
    /// Wraps a primitive value.
    #[must_use]
    pub fn primitive(value: impl Into<PrimitiveValue>) -> Self {
        Self::Primitive(value.into())
    }

    /// Returns the primitive if the value is one.
    #[must_use]
    pub fn as_primitive(&self) -> Option<&PrimitiveValue> {
        match self {
            Self::Primitive(value) => Some(value),
            _ => None,
        }
    }
}

impl From<PrimitiveValue> for FrameValue {
    fn from(value: PrimitiveValue) -> Self {
        Self::Primitive(value)
    }
}

impl From<OrderedFrame> for FrameValue {
    fn from(value: OrderedFrame) -> Self {
        Self::Ordered(value)
    }
}

impl From<QualifiedFrame> for FrameValue {
    fn from(value: QualifiedFrame) -> Self {
        Self::Qualified(value)
    }
}

impl From<AgentIdentifier> for FrameValue {
    fn from(value: AgentIdentifier) -> Self {
        Self::AgentIdentifier(value)
    }
}

/// Frame holding a type name and positional elements.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderedFrame {
    type_name: String,
    elements: Vec<FrameValue>,
}

impl OrderedFrame {
    /// Creates an empty ordered frame.
    #[must_use]
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            elements: Vec::new(),
        }
    }

    /// Returns the type name.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Appends an element.
    pub fn push(&mut self, element: impl Into<FrameValue>) {
        self.elements.push(element.into());
    }

    /// Appends an element, returning the frame for chaining.
    #[must_use]
    pub fn with(mut self, element: impl Into<FrameValue>) -> Self {
        self.push(element);
        self
    }

    /// Iterates the elements in order.
    pub fn iter(&self) -> impl Iterator<Item = &FrameValue> {
        self.elements.iter()
    }

    /// Returns the number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns `true` when the frame has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// Frame holding a type name and ordered named slots.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QualifiedFrame {
    type_name: String,
    slots: Vec<(String, FrameValue)>,
}

impl QualifiedFrame {
    /// Creates an empty qualified frame.
    #[must_use]
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            slots: Vec::new(),
        }
    }

    /// Returns the type name.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Sets a slot, replacing an existing value in place or appending a new slot.
    pub fn put(&mut self, name: impl Into<String>, value: impl Into<FrameValue>) {
        let name = name.into();
        let value = value.into();
        if let Some(entry) = self.slots.iter_mut().find(|(slot, _)| *slot == name) {
            entry.1 = value;
        } else {
            self.slots.push((name, value));
        }
    }

    /// Sets a slot, returning the frame for chaining.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FrameValue>) -> Self {
        self.put(name, value);
        self
    }

    /// Returns the value of a slot.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FrameValue> {
        self.slots
            .iter()
            .find(|(slot, _)| slot == name)
            .map(|(_, value)| value)
    }

    /// Iterates `(name, value)` pairs in order.
    pub fn slots(&self) -> impl Iterator<Item = (&str, &FrameValue)> {
        self.slots.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Returns the number of set slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` when no slot is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
