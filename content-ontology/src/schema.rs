//! Type schemas and slot declarations.

use std::sync::Arc;

use content_model::{
    AbsAggregate, AbsComposite, AbsContentElementList, AbsObject, AbsVariable, CompositeKind,
    vocabulary,
};

use crate::error::{SchemaError, SchemaResult};

/// Family a schema belongs to; decides which descriptor it instantiates.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum SchemaKind {
    /// Leaf value type.
    Primitive,
    /// Positional collection type.
    Aggregate,
    /// Domain entity.
    Concept,
    /// Proposition.
    Predicate,
    /// Action an agent can perform.
    AgentAction,
    /// Bundle of content elements.
    ContentElementList,
    /// Unbound placeholder.
    Variable,
}

impl SchemaKind {
    /// Returns the composite flavour instantiated by this kind, if any.
    #[must_use]
    pub const fn composite_kind(self) -> Option<CompositeKind> {
        match self {
            Self::Concept => Some(CompositeKind::Concept),
            Self::Predicate => Some(CompositeKind::Predicate),
            Self::AgentAction => Some(CompositeKind::AgentAction),
            _ => None,
        }
    }

    /// Returns the abstract base name every schema of this kind descends from.
    #[must_use]
    pub const fn base_name(self) -> Option<&'static str> {
        match self {
            Self::Concept => Some(vocabulary::CONCEPT),
            Self::Predicate => Some(vocabulary::PREDICATE),
            Self::AgentAction => Some(vocabulary::AGENT_ACTION),
            _ => None,
        }
    }
}

/// Whether a single-valued slot must be present.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Presence {
    /// The slot must be set.
    Mandatory,
    /// The slot may be absent.
    Optional,
}

/// Inclusive bounds on the number of values a slot holds.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Cardinality {
    min: usize,
    max: Option<usize>,
}

impl Cardinality {
    /// Exactly one value.
    pub const ONE: Self = Self {
        min: 1,
        max: Some(1),
    };

    /// Creates bounds; `None` as maximum means unlimited. Bounds are checked
    /// when the slot is added to a schema.
    #[must_use]
    pub const fn new(min: usize, max: Option<usize>) -> Self {
        Self { min, max }
    }

    /// Returns the minimum.
    #[must_use]
    pub const fn min(self) -> usize {
        self.min
    }

    /// Returns the maximum, `None` when unlimited.
    #[must_use]
    pub const fn max(self) -> Option<usize> {
        self.max
    }

    /// Returns `true` when `count` lies within the bounds.
    #[must_use]
    pub fn admits(self, count: usize) -> bool {
        count >= self.min && self.max.is_none_or(|max| count <= max)
    }

    fn check(self, slot: &str) -> SchemaResult<()> {
        match self.max {
            Some(max) if self.min > max => Err(SchemaError::InvalidCardinality {
                slot: slot.to_owned(),
                min: self.min,
                max,
            }),
            _ => Ok(()),
        }
    }
}

/// Declaration of one named slot.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SlotDecl {
    name: String,
    type_name: String,
    cardinality: Cardinality,
    optional: bool,
    aggregate_type: Option<String>,
}

impl SlotDecl {
    /// Returns the slot name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the slot type, or the element type for aggregate slots.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Returns the cardinality bounds.
    #[must_use]
    pub const fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    /// Returns `true` when the slot may be absent.
    #[must_use]
    pub const fn is_optional(&self) -> bool {
        self.optional
    }

    /// Returns the aggregate type holding the values of a multi-valued slot.
    #[must_use]
    pub fn aggregate_type(&self) -> Option<&str> {
        self.aggregate_type.as_deref()
    }

    fn same_shape(&self, other: &Self) -> bool {
        self.type_name.eq_ignore_ascii_case(&other.type_name)
            && self.aggregate_type == other.aggregate_type
    }
}

/// A named type declaration: kind, super-schemas, and slots.
#[derive(Clone, Debug)]
pub struct Schema {
    name: String,
    kind: SchemaKind,
    supers: Vec<Arc<Schema>>,
    slots: Vec<SlotDecl>,
}

impl Schema {
    /// Starts building a schema.
    #[must_use]
    pub fn builder(name: impl Into<String>, kind: SchemaKind) -> SchemaBuilder {
        SchemaBuilder {
            schema: Self {
                name: name.into(),
                kind,
                supers: Vec::new(),
                slots: Vec::new(),
            },
        }
    }

    /// Returns the type name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the kind.
    #[must_use]
    pub const fn kind(&self) -> SchemaKind {
        self.kind
    }

    /// Returns the direct super-schemas.
    #[must_use]
    pub fn supers(&self) -> &[Arc<Schema>] {
        &self.supers
    }

    /// Returns the slots declared directly on this schema.
    #[must_use]
    pub fn own_slots(&self) -> &[SlotDecl] {
        &self.slots
    }

    /// Returns the effective slots: inherited slots first, depth-first in
    /// super-schema order, then this schema's own slots.
    #[must_use]
    pub fn slots(&self) -> Vec<&SlotDecl> {
        let mut slots: Vec<&SlotDecl> = Vec::new();
        self.collect_slots(&mut slots);
        slots
    }

    fn collect_slots<'a>(&'a self, out: &mut Vec<&'a SlotDecl>) {
        for parent in &self.supers {
            parent.collect_slots(out);
        }
        for slot in &self.slots {
            if !out.iter().any(|seen| seen.name == slot.name) {
                out.push(slot);
            }
        }
    }

    /// Looks up a slot by name, walking the super-schema chain.
    #[must_use]
    pub fn slot(&self, name: &str) -> Option<&SlotDecl> {
        self.slots
            .iter()
            .find(|slot| slot.name == name)
            .or_else(|| self.supers.iter().find_map(|parent| parent.slot(name)))
    }

    /// Returns the effective slot names in [`slots`](Self::slots) order.
    #[must_use]
    pub fn slot_names(&self) -> Vec<&str> {
        self.slots().into_iter().map(SlotDecl::name).collect()
    }

    /// Returns `true` when this schema is `name`, descends from it, or `name`
    /// is the abstract base of this schema's kind. Names compare case-insensitively.
    #[must_use]
    pub fn is_subtype_of(&self, name: &str) -> bool {
        if self.name.eq_ignore_ascii_case(name) {
            return true;
        }
        let is_base = |kind: SchemaKind| {
            kind.base_name()
                .is_some_and(|base| base.eq_ignore_ascii_case(name))
        };
        if is_base(self.kind)
            || (self.kind == SchemaKind::AgentAction && is_base(SchemaKind::Concept))
        {
            return true;
        }
        self.supers.iter().any(|parent| parent.is_subtype_of(name))
    }

    /// Creates an empty descriptor of this schema's kind.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::NotInstantiable`] for primitive schemas, which
    /// have no value-less form.
    pub fn new_instance(&self) -> SchemaResult<AbsObject> {
        let instance: AbsObject = match self.kind {
            SchemaKind::Primitive => {
                return Err(SchemaError::NotInstantiable {
                    name: self.name.clone(),
                });
            }
            SchemaKind::Aggregate => AbsAggregate::new(self.name.as_str()).into(),
            SchemaKind::ContentElementList => AbsContentElementList::new().into(),
            SchemaKind::Variable => AbsVariable::new(String::new()).into(),
            SchemaKind::Concept => AbsComposite::concept(self.name.as_str()).into(),
            SchemaKind::Predicate => AbsComposite::predicate(self.name.as_str()).into(),
            SchemaKind::AgentAction => AbsComposite::agent_action(self.name.as_str()).into(),
        };
        Ok(instance)
    }
}

/// Builder for [`Schema`].
#[derive(Debug)]
pub struct SchemaBuilder {
    schema: Schema,
}

impl SchemaBuilder {
    /// Adds a super-schema whose slots this schema inherits.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::IncompatibleSuper`] when the super-schema is of
    /// a different kind (an agent action may extend a concept).
    pub fn extends(mut self, parent: Arc<Schema>) -> SchemaResult<Self> {
        let compatible = parent.kind == self.schema.kind
            || (self.schema.kind == SchemaKind::AgentAction && parent.kind == SchemaKind::Concept);
        if !compatible {
            return Err(SchemaError::IncompatibleSuper {
                schema: self.schema.name.clone(),
                kind: self.schema.kind,
                super_name: parent.name.clone(),
                super_kind: parent.kind,
            });
        }
        self.schema.supers.push(parent);
        Ok(self)
    }

    /// Declares a single-valued slot.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::DuplicateSlot`] when the name is already declared
    /// (here or on an ancestor) with a different type. Re-declaring an
    /// identical slot is a no-op.
    pub fn add_slot(
        self,
        name: impl Into<String>,
        type_name: impl Into<String>,
        presence: Presence,
    ) -> SchemaResult<Self> {
        let optional = presence == Presence::Optional;
        let slot = SlotDecl {
            name: name.into(),
            type_name: type_name.into(),
            cardinality: Cardinality::new(usize::from(!optional), Some(1)),
            optional,
            aggregate_type: None,
        };
        self.push_slot(slot)
    }

    /// Declares a multi-valued slot holding an aggregate of `element_type`
    /// values. A minimum of zero makes the slot optional.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::InvalidCardinality`] when `min` exceeds `max`, or
    /// [`SchemaError::DuplicateSlot`] as for [`add_slot`](Self::add_slot).
    pub fn add_aggregate_slot(
        self,
        name: impl Into<String>,
        element_type: impl Into<String>,
        aggregate_type: impl Into<String>,
        cardinality: Cardinality,
    ) -> SchemaResult<Self> {
        let name = name.into();
        cardinality.check(&name)?;
        let slot = SlotDecl {
            name,
            type_name: element_type.into(),
            cardinality,
            optional: cardinality.min() == 0,
            aggregate_type: Some(aggregate_type.into()),
        };
        self.push_slot(slot)
    }

    fn push_slot(mut self, slot: SlotDecl) -> SchemaResult<Self> {
        if let Some(existing) = self.schema.slot(&slot.name) {
            if existing.same_shape(&slot) {
                return Ok(self);
            }
            return Err(SchemaError::DuplicateSlot {
                schema: self.schema.name.clone(),
                slot: slot.name,
            });
        }
        self.schema.slots.push(slot);
        Ok(self)
    }

    /// Finalises the schema.
    #[must_use]
    pub fn build(self) -> Schema {
        self.schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thing() -> Arc<Schema> {
        Arc::new(
            Schema::builder("thing", SchemaKind::Concept)
                .add_slot("id", vocabulary::STRING, Presence::Mandatory)
                .unwrap()
                .build(),
        )
    }

    #[test]
    fn inverted_cardinality_is_rejected() {
        let err = Schema::builder("basket", SchemaKind::Concept)
            .add_aggregate_slot(
                "items",
                vocabulary::STRING,
                vocabulary::SEQUENCE,
                Cardinality::new(3, Some(1)),
            )
            .expect_err("min > max");
        assert_eq!(
            err,
            SchemaError::InvalidCardinality {
                slot: "items".into(),
                min: 3,
                max: 1
            }
        );
    }

    #[test]
    fn duplicate_slot_with_other_type_is_rejected() {
        let builder = Schema::builder("book", SchemaKind::Concept)
            .add_slot("title", vocabulary::STRING, Presence::Mandatory)
            .unwrap()
            .add_slot("title", vocabulary::STRING, Presence::Mandatory)
            .expect("identical redeclaration is a no-op");
        let err = builder
            .add_slot("title", vocabulary::INTEGER, Presence::Mandatory)
            .expect_err("conflicting type");
        assert!(matches!(err, SchemaError::DuplicateSlot { slot, .. } if slot == "title"));
    }

    #[test]
    fn inherited_slot_conflicts_are_detected() {
        let err = Schema::builder("book", SchemaKind::Concept)
            .extends(thing())
            .unwrap()
            .add_slot("id", vocabulary::INTEGER, Presence::Optional)
            .expect_err("conflicts with inherited slot");
        assert!(matches!(err, SchemaError::DuplicateSlot { .. }));
    }

    #[test]
    fn effective_slots_walk_ancestors_first() {
        let book = Schema::builder("book", SchemaKind::Concept)
            .extends(thing())
            .unwrap()
            .add_slot("title", vocabulary::STRING, Presence::Optional)
            .unwrap()
            .build();
        assert_eq!(book.slot_names(), ["id", "title"]);
        assert!(book.slot("id").is_some());
        assert!(book.slot("isbn").is_none());
        assert!(book.is_subtype_of("THING"));
        assert!(book.is_subtype_of(vocabulary::CONCEPT));
        assert!(!book.is_subtype_of(vocabulary::PREDICATE));
    }

    #[test]
    fn kinds_do_not_mix() {
        let err = Schema::builder("owns", SchemaKind::Predicate)
            .extends(thing())
            .expect_err("predicate cannot extend concept");
        assert!(matches!(err, SchemaError::IncompatibleSuper { .. }));
        assert!(
            Schema::builder("sell", SchemaKind::AgentAction)
                .extends(thing())
                .is_ok()
        );
    }

    #[test]
    fn new_instance_matches_kind() {
        let predicate = Schema::builder("owns", SchemaKind::Predicate).build();
        let instance = predicate.new_instance().unwrap();
        assert_eq!(
            instance.as_composite().map(AbsComposite::kind),
            Some(CompositeKind::Predicate)
        );
        let primitive = Schema::builder(vocabulary::STRING, SchemaKind::Primitive).build();
        assert!(matches!(
            primitive.new_instance(),
            Err(SchemaError::NotInstantiable { .. })
        ));
    }

    #[test]
    fn cardinality_bounds() {
        let bounds = Cardinality::new(1, Some(2));
        assert!(!bounds.admits(0));
        assert!(bounds.admits(2));
        assert!(!bounds.admits(3));
        assert!(Cardinality::new(0, None).admits(10_000));
    }
}
