//! Abstract descriptor trees.
//!
//! A descriptor tree is the schema-checked, language-neutral representation of
//! a piece of structured content. Trees are built per encode/decode call and
//! carry no identity beyond their structure.

use crate::error::{Error, Result};
use crate::primitive::{AbsPrimitive, PrimitiveValue};
use crate::vocabulary;

/// Flavour of a composite descriptor.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum CompositeKind {
    /// An entity of the domain; a term.
    Concept,
    /// A proposition that can be true or false; a content element.
    Predicate,
    /// An action an agent can perform; both a term and a content element.
    AgentAction,
}

impl CompositeKind {
    /// Returns `true` when composites of this kind may appear as aggregate elements.
    #[must_use]
    pub const fn is_term(self) -> bool {
        matches!(self, Self::Concept | Self::AgentAction)
    }

    /// Returns `true` when composites of this kind may appear in a content-element-list.
    #[must_use]
    pub const fn is_content_element(self) -> bool {
        matches!(self, Self::Predicate | Self::AgentAction)
    }
}

/// Any node of a descriptor tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AbsObject {
    /// Typed leaf value.
    Primitive(AbsPrimitive),
    /// Named, positional collection of terms.
    Aggregate(AbsAggregate),
    /// Concept, predicate, or agent action with named slots.
    Composite(AbsComposite),
    /// Unbound placeholder.
    Variable(AbsVariable),
    /// Bundle of independent content elements.
    ContentElementList(AbsContentElementList),
}

impl AbsObject {
    /// Wraps a primitive value.
    #[must_use]
    pub fn primitive(value: impl Into<PrimitiveValue>) -> Self {
        Self::Primitive(AbsPrimitive::wrap(value))
    }

    /// Returns the type name of the node.
    #[must_use]
    pub fn type_name(&self) -> &str {
        match self {
            Self::Primitive(p) => p.type_name(),
            Self::Aggregate(a) => a.type_name(),
            Self::Composite(c) => c.type_name(),
            Self::Variable(_) => vocabulary::VARIABLE,
            Self::ContentElementList(_) => vocabulary::CONTENT_ELEMENT_LIST,
        }
    }

    /// Returns `true` when the node can be used as a value: a primitive,
    /// aggregate, variable, concept, or agent action.
    #[must_use]
    pub fn is_term(&self) -> bool {
        match self {
            Self::Primitive(_) | Self::Aggregate(_) | Self::Variable(_) => true,
            Self::Composite(c) => c.kind().is_term(),
            Self::ContentElementList(_) => false,
        }
    }

    /// Returns `true` when the node can stand alone as a message content.
    #[must_use]
    pub fn is_content_element(&self) -> bool {
        match self {
            Self::Composite(c) => c.kind().is_content_element(),
            Self::ContentElementList(_) => true,
            _ => false,
        }
    }

    /// Returns `true` when the subtree contains no variables.
    #[must_use]
    pub fn is_grounded(&self) -> bool {
        match self {
            Self::Primitive(_) => true,
            Self::Variable(_) => false,
            Self::Aggregate(a) => a.is_grounded(),
            Self::Composite(c) => c.is_grounded(),
            Self::ContentElementList(l) => l.is_grounded(),
        }
    }

    /// Returns the value of a named slot, if the node has named slots.
    #[must_use]
    pub fn slot(&self, name: &str) -> Option<&AbsObject> {
        match self {
            Self::Composite(c) => c.get(name),
            _ => None,
        }
    }

    /// Sets a named slot on a composite or variable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSlot`] when the node has no named slots, or when
    /// a variable is given a slot other than its name and value type.
    pub fn set_slot(&mut self, name: impl Into<String>, value: AbsObject) -> Result<()> {
        let name = name.into();
        match self {
            Self::Composite(c) => {
                c.set(name, value);
                Ok(())
            }
            Self::Variable(v) => v.set_slot(&name, value),
            other => Err(Error::InvalidSlot {
                type_name: other.type_name().to_owned(),
                slot: name,
            }),
        }
    }

    /// Returns the primitive if the node is one.
    #[must_use]
    pub fn as_primitive(&self) -> Option<&AbsPrimitive> {
        match self {
            Self::Primitive(p) => Some(p),
            _ => None,
        }
    }

    /// Returns the aggregate if the node is one.
    #[must_use]
    pub fn as_aggregate(&self) -> Option<&AbsAggregate> {
        match self {
            Self::Aggregate(a) => Some(a),
            _ => None,
        }
    }

    /// Returns the composite if the node is one.
    #[must_use]
    pub fn as_composite(&self) -> Option<&AbsComposite> {
        match self {
            Self::Composite(c) => Some(c),
            _ => None,
        }
    }
}

impl From<AbsPrimitive> for AbsObject {
    fn from(value: AbsPrimitive) -> Self {
        Self::Primitive(value)
    }
}

impl From<AbsAggregate> for AbsObject {
    fn from(value: AbsAggregate) -> Self {
        Self::Aggregate(value)
    }
}

impl From<AbsComposite> for AbsObject {
    fn from(value: AbsComposite) -> Self {
        Self::Composite(value)
    }
}

impl From<AbsVariable> for AbsObject {
    fn from(value: AbsVariable) -> Self {
        Self::Variable(value)
    }
}

impl From<AbsContentElementList> for AbsObject {
    fn from(value: AbsContentElementList) -> Self {
        Self::ContentElementList(value)
    }
}

/// Composite descriptor: a type name plus insertion-ordered named slots.
///
/// Slot order is preserved so that encoders emit slots deterministically;
/// lookups are by name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AbsComposite {
    kind: CompositeKind,
    type_name: String,
    slots: Vec<(String, AbsObject)>,
}

impl AbsComposite {
    /// Creates an empty composite.
    #[must_use]
    pub fn new(kind: CompositeKind, type_name: impl Into<String>) -> Self {
        Self {
            kind,
            type_name: type_name.into(),
            slots: Vec::new(),
        }
    }

    /// Creates an empty concept.
    #[must_use]
    pub fn concept(type_name: impl Into<String>) -> Self {
        Self::new(CompositeKind::Concept, type_name)
    }

    /// Creates an empty predicate.
    #[must_use]
    pub fn predicate(type_name: impl Into<String>) -> Self {
        Self::new(CompositeKind::Predicate, type_name)
    }

    /// Creates an empty agent action.
    #[must_use]
    pub fn agent_action(type_name: impl Into<String>) -> Self {
        Self::new(CompositeKind::AgentAction, type_name)
    }

    /// Returns the composite flavour.
    #[must_use]
    pub const fn kind(&self) -> CompositeKind {
        self.kind
    }

    /// Returns the type name.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Sets a slot, replacing an existing value in place or appending a new slot.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<AbsObject>) {
        let name = name.into();
        let value = value.into();
        if let Some(entry) = self.slots.iter_mut().find(|(slot, _)| *slot == name) {
            entry.1 = value;
        } else {
            self.slots.push((name, value));
        }
    }

    /// Sets a slot, returning the composite for chaining.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<AbsObject>) -> Self {
        self.set(name, value);
        self
    }

    /// Returns the value of a slot.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&AbsObject> {
        self.slots
            .iter()
            .find(|(slot, _)| slot == name)
            .map(|(_, value)| value)
    }

    /// Removes a slot, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<AbsObject> {
        let index = self.slots.iter().position(|(slot, _)| slot == name)?;
        Some(self.slots.remove(index).1)
    }

    /// Iterates slot names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|(name, _)| name.as_str())
    }

    /// Iterates `(name, value)` pairs in insertion order.
    pub fn slots(&self) -> impl Iterator<Item = (&str, &AbsObject)> {
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

    /// Returns `true` when no slot value contains a variable.
    #[must_use]
    pub fn is_grounded(&self) -> bool {
        self.slots.iter().all(|(_, value)| value.is_grounded())
    }
}

/// Aggregate descriptor: a named sequence of terms.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AbsAggregate {
    type_name: String,
    elements: Vec<AbsObject>,
}

impl AbsAggregate {
    /// Creates an empty aggregate with the given type name.
    #[must_use]
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            elements: Vec::new(),
        }
    }

    /// Creates an empty `sequence`.
    #[must_use]
    pub fn sequence() -> Self {
        Self::new(vocabulary::SEQUENCE)
    }

    /// Creates an empty `set`.
    #[must_use]
    pub fn set() -> Self {
        Self::new(vocabulary::SET)
    }

    /// Returns the type name.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Appends an element.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotATerm`] when the element is not a term; the
    /// aggregate is left unchanged.
    pub fn add(&mut self, element: impl Into<AbsObject>) -> Result<()> {
        let element = element.into();
        if !element.is_term() {
            return Err(Error::NotATerm {
                type_name: element.type_name().to_owned(),
            });
        }
        self.elements.push(element);
        Ok(())
    }

    /// Returns the element at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&AbsObject> {
        self.elements.get(index)
    }

    /// Iterates the elements in order.
    pub fn iter(&self) -> impl Iterator<Item = &AbsObject> {
        self.elements.iter()
    }

    /// Returns the number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns `true` when the aggregate has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Consumes the aggregate, returning its elements.
    #[must_use]
    pub fn into_elements(self) -> Vec<AbsObject> {
        self.elements
    }

    fn is_grounded(&self) -> bool {
        self.elements.iter().all(AbsObject::is_grounded)
    }
}

/// Content-element-list: several independent content elements bundled together.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AbsContentElementList {
    elements: Vec<AbsObject>,
}

impl AbsContentElementList {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an element.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotAContentElement`] when the element is neither a
    /// predicate, an agent action, nor a nested list.
    pub fn add(&mut self, element: impl Into<AbsObject>) -> Result<()> {
        let element = element.into();
        if !element.is_content_element() {
            return Err(Error::NotAContentElement {
                type_name: element.type_name().to_owned(),
            });
        }
        self.elements.push(element);
        Ok(())
    }

    /// Iterates the elements in order.
    pub fn iter(&self) -> impl Iterator<Item = &AbsObject> {
        self.elements.iter()
    }

    /// Returns the number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns `true` when the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Consumes the list, returning its elements.
    #[must_use]
    pub fn into_elements(self) -> Vec<AbsObject> {
        self.elements
    }

    fn is_grounded(&self) -> bool {
        self.elements.iter().all(AbsObject::is_grounded)
    }
}

/// Unbound variable standing in for a term.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AbsVariable {
    name: String,
    value_type: Option<String>,
}

impl AbsVariable {
    /// Creates a variable with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value_type: None,
        }
    }

    /// Restricts the type of values the variable may be bound to.
    #[must_use]
    pub fn with_value_type(mut self, value_type: impl Into<String>) -> Self {
        self.value_type = Some(value_type.into());
        self
    }

    /// Returns the variable name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the declared value type, if any.
    #[must_use]
    pub fn value_type(&self) -> Option<&str> {
        self.value_type.as_deref()
    }

    fn set_slot(&mut self, slot: &str, value: AbsObject) -> Result<()> {
        let text = match &value {
            AbsObject::Primitive(p) => p.value().as_str().map(str::to_owned),
            _ => None,
        };
        match (slot, text) {
            (vocabulary::VARIABLE_NAME, Some(text)) => self.name = text,
            (vocabulary::VARIABLE_VALUE_TYPE, Some(text)) => self.value_type = Some(text),
            _ => {
                return Err(Error::InvalidSlot {
                    type_name: vocabulary::VARIABLE.to_owned(),
                    slot: slot.to_owned(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(name: &str) -> AbsComposite {
        AbsComposite::concept("person").with("name", AbsObject::primitive(name))
    }

    #[test]
    fn composite_slots_keep_insertion_order() {
        let mut composite = person("ada").with("age", AbsObject::primitive(36_i32));
        composite.set("name", AbsObject::primitive("grace"));

        let names: Vec<_> = composite.names().collect();
        assert_eq!(names, ["name", "age"]);
        assert_eq!(
            composite.get("name"),
            Some(&AbsObject::primitive("grace"))
        );
        assert_eq!(composite.remove("age"), Some(AbsObject::primitive(36_i32)));
        assert_eq!(composite.len(), 1);
    }

    #[test]
    fn aggregate_rejects_non_terms() {
        let mut aggregate = AbsAggregate::sequence();
        aggregate.add(person("ada")).expect("concept is a term");
        aggregate
            .add(AbsComposite::agent_action("sell"))
            .expect("action is a term");

        let err = aggregate
            .add(AbsComposite::predicate("owns"))
            .expect_err("predicate is not a term");
        assert!(matches!(err, Error::NotATerm { type_name } if type_name == "owns"));

        let err = aggregate
            .add(AbsContentElementList::new())
            .expect_err("list is not a term");
        assert!(matches!(err, Error::NotATerm { .. }));
        assert_eq!(aggregate.len(), 2);
    }

    #[test]
    fn content_element_list_rejects_concepts() {
        let mut list = AbsContentElementList::new();
        list.add(AbsComposite::predicate("owns")).expect("predicate");
        let err = list.add(person("ada")).expect_err("concept");
        assert!(matches!(err, Error::NotAContentElement { .. }));
        let err = list.add(AbsObject::primitive(1_i32)).expect_err("primitive");
        assert!(matches!(err, Error::NotAContentElement { .. }));
    }

    #[test]
    fn groundedness_tracks_variables() {
        let grounded = AbsObject::from(person("ada"));
        assert!(grounded.is_grounded());
        assert!(AbsObject::primitive(1_i32).is_grounded());

        let mut aggregate = AbsAggregate::sequence();
        aggregate.add(AbsVariable::new("x")).expect("variable is a term");
        let open = AbsComposite::predicate("owns").with("items", aggregate);
        assert!(!AbsObject::from(open).is_grounded());
    }

    #[test]
    fn variable_slots() {
        let mut variable = AbsObject::from(AbsVariable::new("x"));
        variable
            .set_slot(vocabulary::VARIABLE_VALUE_TYPE, AbsObject::primitive("person"))
            .expect("value type");
        let AbsObject::Variable(inner) = &variable else {
            panic!("expected variable");
        };
        assert_eq!(inner.value_type(), Some("person"));

        let err = variable
            .set_slot("colour", AbsObject::primitive("red"))
            .expect_err("unknown slot");
        assert!(matches!(err, Error::InvalidSlot { .. }));

        let err = AbsObject::primitive(1_i32)
            .set_slot("x", AbsObject::primitive(2_i32))
            .expect_err("primitives have no slots");
        assert!(matches!(err, Error::InvalidSlot { .. }));
    }
}
