//! Bidirectional translation between native values and descriptor trees.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use content_model::{
    AbsAggregate, AbsComposite, AbsContentElementList, AbsObject, AgentIdentifier, vocabulary,
};
use content_ontology::{Ontology, SchemaError, SchemaKind};
use tracing::trace;

use crate::domain::{DomainObject, DomainValue};
use crate::error::{ContentError, ContentResult};
use crate::value::{NativeValue, ValueSet};
use crate::wellknown::{Action, ActionResult, Done, Equals, Property};

type Factory = Arc<dyn Fn() -> DomainValue + Send + Sync>;

/// Translates native values to descriptor trees and back.
///
/// Built-in value kinds use fixed shapes. User-defined types are registered
/// by type name with a factory producing an empty instance; their slots are
/// read and written through [`DomainObject`].
#[derive(Default)]
pub struct Translator {
    factories: RwLock<HashMap<String, Factory>>,
}

impl fmt::Debug for Translator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let factories = self.factories.read().expect("translator registry poisoned");
        let mut names: Vec<_> = factories.keys().cloned().collect();
        names.sort_unstable();
        f.debug_struct("Translator")
            .field("registered", &names)
            .finish()
    }
}

impl Translator {
    /// Creates a translator with no domain types registered.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a domain type built from its `Default` value.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::DuplicateMapping`] when the name (ignoring
    /// case) is already registered.
    ///
    /// # Panics
    ///
    /// Panics if the internal registry lock is poisoned.
    pub fn register<T>(&self, type_name: &str) -> ContentResult<()>
    where
        T: DomainObject + Clone + PartialEq + Default + 'static,
    {
        self.register_factory(type_name, || DomainValue::new(T::default()))
    }

    /// Registers a factory producing empty instances of a domain type.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::DuplicateMapping`] when the name (ignoring
    /// case) is already registered.
    ///
    /// # Panics
    ///
    /// Panics if the internal registry lock is poisoned.
    pub fn register_factory<F>(&self, type_name: &str, factory: F) -> ContentResult<()>
    where
        F: Fn() -> DomainValue + Send + Sync + 'static,
    {
        let mut factories = self.factories.write().expect("translator registry poisoned");
        let key = type_name.to_ascii_lowercase();
        if factories.contains_key(&key) {
            return Err(ContentError::DuplicateMapping {
                type_name: type_name.to_owned(),
            });
        }
        factories.insert(key, Arc::new(factory));
        Ok(())
    }

    /// Returns `true` when a domain type is registered under `type_name`.
    ///
    /// # Panics
    ///
    /// Panics if the internal registry lock is poisoned.
    #[must_use]
    pub fn is_registered(&self, type_name: &str) -> bool {
        self.factory(type_name).is_some()
    }

    fn factory(&self, type_name: &str) -> Option<Factory> {
        self.factories
            .read()
            .expect("translator registry poisoned")
            .get(&type_name.to_ascii_lowercase())
            .cloned()
    }

    /// Converts a native value into a descriptor tree.
    ///
    /// Domain objects are written slot by slot in the order their schema
    /// declares, skipping unset slots.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::UnknownSchema`] when a domain object has no
    /// schema in `ontology`, or [`ContentError::Model`] when a collection
    /// holds a value that cannot be one of its elements.
    pub fn to_abstract(&self, value: &NativeValue, ontology: &Ontology) -> ContentResult<AbsObject> {
        let abs = match value {
            NativeValue::String(v) => AbsObject::primitive(v.as_str()),
            NativeValue::Boolean(v) => AbsObject::primitive(*v),
            NativeValue::Integer(v) => AbsObject::primitive(*v),
            NativeValue::Long(v) => AbsObject::primitive(*v),
            NativeValue::Float(v) => AbsObject::primitive(*v),
            NativeValue::Double(v) => AbsObject::primitive(*v),
            NativeValue::Date(v) => AbsObject::primitive(*v),
            NativeValue::ByteSequence(v) => AbsObject::primitive(v.clone()),
            NativeValue::List(values) => {
                self.aggregate(AbsAggregate::sequence(), values, ontology)?
            }
            NativeValue::Set(values) => self.aggregate(AbsAggregate::set(), values, ontology)?,
            NativeValue::AgentIdentifier(aid) => aid.to_abs()?.into(),
            NativeValue::Property(property) => AbsComposite::concept(vocabulary::PROPERTY)
                .with(vocabulary::PROPERTY_NAME, AbsObject::primitive(property.name()))
                .with(
                    vocabulary::PROPERTY_VALUE,
                    self.to_abstract(property.value(), ontology)?,
                )
                .into(),
            NativeValue::TrueProposition => {
                AbsComposite::predicate(vocabulary::TRUE_PROPOSITION).into()
            }
            NativeValue::FalseProposition => {
                AbsComposite::predicate(vocabulary::FALSE_PROPOSITION).into()
            }
            NativeValue::Action(action) => AbsComposite::agent_action(vocabulary::ACTION)
                .with(vocabulary::ACTION_ACTOR, action.actor().to_abs()?)
                .with(
                    vocabulary::ACTION_ACTION,
                    self.to_abstract(action.action(), ontology)?,
                )
                .into(),
            NativeValue::Done(done) => {
                let mut abs = AbsComposite::predicate(vocabulary::DONE).with(
                    vocabulary::DONE_ACTION,
                    self.to_abstract(done.action(), ontology)?,
                );
                if let Some(condition) = done.condition() {
                    abs.set(
                        vocabulary::DONE_CONDITION,
                        self.to_abstract(condition, ontology)?,
                    );
                }
                abs.into()
            }
            NativeValue::Result(result) => AbsComposite::predicate(vocabulary::RESULT)
                .with(
                    vocabulary::RESULT_ACTION,
                    self.to_abstract(result.action(), ontology)?,
                )
                .with(
                    vocabulary::RESULT_VALUE,
                    self.to_abstract(result.value(), ontology)?,
                )
                .into(),
            NativeValue::Equals(equals) => AbsComposite::predicate(vocabulary::EQUALS)
                .with(
                    vocabulary::EQUALS_LEFT,
                    self.to_abstract(equals.left(), ontology)?,
                )
                .with(
                    vocabulary::EQUALS_RIGHT,
                    self.to_abstract(equals.right(), ontology)?,
                )
                .into(),
            NativeValue::ContentElementList(values) => {
                let mut list = AbsContentElementList::new();
                for value in values {
                    list.add(self.to_abstract(value, ontology)?)?;
                }
                list.into()
            }
            NativeValue::Object(object) => self.object_to_abstract(object, ontology)?,
        };
        Ok(abs)
    }

    /// Drains an iterator into a `sequence` aggregate.
    ///
    /// # Errors
    ///
    /// As for [`to_abstract`](Self::to_abstract).
    pub fn iter_to_abstract<I>(&self, values: I, ontology: &Ontology) -> ContentResult<AbsObject>
    where
        I: IntoIterator<Item = NativeValue>,
    {
        let mut sequence = AbsAggregate::sequence();
        for value in values {
            sequence.add(self.to_abstract(&value, ontology)?)?;
        }
        Ok(sequence.into())
    }

    fn aggregate<'a>(
        &self,
        mut aggregate: AbsAggregate,
        values: impl IntoIterator<Item = &'a NativeValue>,
        ontology: &Ontology,
    ) -> ContentResult<AbsObject> {
        for value in values {
            aggregate.add(self.to_abstract(value, ontology)?)?;
        }
        Ok(aggregate.into())
    }

    fn object_to_abstract(
        &self,
        object: &DomainValue,
        ontology: &Ontology,
    ) -> ContentResult<AbsObject> {
        let schema = ontology
            .schema(object.type_name())
            .map_err(unknown_schema)?;
        let kind = schema.kind().composite_kind().ok_or_else(|| {
            ContentError::malformed(schema.name(), "domain objects must map to composite schemas")
        })?;
        trace!(type_name = schema.name(), "reading domain object slots");

        let mut composite = AbsComposite::new(kind, schema.name());
        for decl in schema.slots() {
            let Some(value) = object.get(decl.name()) else {
                continue;
            };
            let abs = match (decl.aggregate_type(), &value) {
                (Some(aggregate_type), NativeValue::List(values)) => {
                    self.aggregate(AbsAggregate::new(aggregate_type), values, ontology)?
                }
                _ => self.to_abstract(&value, ontology)?,
            };
            composite.set(decl.name(), abs);
        }
        Ok(composite.into())
    }

    /// Converts a descriptor tree into a native value.
    ///
    /// Aggregates named `set` become [`NativeValue::Set`]; every other
    /// aggregate known to `ontology` becomes a [`NativeValue::List`].
    /// `agent-identifier` composites always become agent identifiers.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::Ungrounded`] when the tree contains variables,
    /// [`ContentError::UnknownSchema`] when a type name matches neither a
    /// built-in shape nor a registered domain type, and
    /// [`ContentError::Malformed`] when a built-in composite lacks a slot.
    pub fn to_native(&self, abs: &AbsObject, ontology: &Ontology) -> ContentResult<NativeValue> {
        if !abs.is_grounded() {
            return Err(ContentError::Ungrounded {
                type_name: abs.type_name().to_owned(),
            });
        }
        self.native(abs, ontology)
    }

    fn native(&self, abs: &AbsObject, ontology: &Ontology) -> ContentResult<NativeValue> {
        match abs {
            AbsObject::Primitive(primitive) => Ok(primitive.value().clone().into()),
            AbsObject::Aggregate(aggregate) => {
                let values = aggregate
                    .iter()
                    .map(|element| self.native(element, ontology))
                    .collect::<ContentResult<Vec<_>>>()?;
                let type_name = aggregate.type_name();
                if type_name.eq_ignore_ascii_case(vocabulary::SET) {
                    return Ok(NativeValue::Set(values.into_iter().collect::<ValueSet>()));
                }
                let known = type_name.eq_ignore_ascii_case(vocabulary::SEQUENCE)
                    || ontology
                        .schema(type_name)
                        .is_ok_and(|schema| schema.kind() == SchemaKind::Aggregate);
                if known {
                    Ok(NativeValue::List(values))
                } else {
                    Err(ContentError::UnknownSchema {
                        type_name: type_name.to_owned(),
                    })
                }
            }
            AbsObject::ContentElementList(list) => list
                .iter()
                .map(|element| self.native(element, ontology))
                .collect::<ContentResult<Vec<_>>>()
                .map(NativeValue::ContentElementList),
            AbsObject::Variable(_) => Err(ContentError::Ungrounded {
                type_name: vocabulary::VARIABLE.to_owned(),
            }),
            AbsObject::Composite(composite) => self.composite_to_native(composite, ontology),
        }
    }

    fn composite_to_native(
        &self,
        composite: &AbsComposite,
        ontology: &Ontology,
    ) -> ContentResult<NativeValue> {
        if vocabulary::is_agent_identifier(composite.type_name()) {
            return Ok(AgentIdentifier::try_from_abs(composite)?.into());
        }

        let value: NativeValue = match composite.type_name().to_ascii_lowercase().as_str() {
            vocabulary::PROPERTY => {
                let name = required(composite, vocabulary::PROPERTY_NAME)?
                    .as_primitive()
                    .and_then(|p| p.value().as_str())
                    .ok_or_else(|| {
                        ContentError::malformed(vocabulary::PROPERTY, "name must be a string")
                    })?;
                let value = self.native(required(composite, vocabulary::PROPERTY_VALUE)?, ontology)?;
                Property::new(name, value).into()
            }
            vocabulary::TRUE_PROPOSITION => NativeValue::TrueProposition,
            vocabulary::FALSE_PROPOSITION => NativeValue::FalseProposition,
            vocabulary::ACTION => {
                let actor = required(composite, vocabulary::ACTION_ACTOR)?
                    .as_composite()
                    .ok_or_else(|| {
                        ContentError::malformed(vocabulary::ACTION, "actor must be an agent identifier")
                    })?;
                let actor = AgentIdentifier::try_from_abs(actor)?;
                let action = self.native(required(composite, vocabulary::ACTION_ACTION)?, ontology)?;
                Action::new(actor, action).into()
            }
            vocabulary::DONE => {
                let action = self.native(required(composite, vocabulary::DONE_ACTION)?, ontology)?;
                let mut done = Done::new(action);
                if let Some(condition) = composite.get(vocabulary::DONE_CONDITION) {
                    done = done.with_condition(self.native(condition, ontology)?);
                }
                done.into()
            }
            vocabulary::RESULT => ActionResult::new(
                self.native(required(composite, vocabulary::RESULT_ACTION)?, ontology)?,
                self.native(required(composite, vocabulary::RESULT_VALUE)?, ontology)?,
            )
            .into(),
            vocabulary::EQUALS => Equals::new(
                self.native(required(composite, vocabulary::EQUALS_LEFT)?, ontology)?,
                self.native(required(composite, vocabulary::EQUALS_RIGHT)?, ontology)?,
            )
            .into(),
            _ => self.object_to_native(composite, ontology)?,
        };
        Ok(value)
    }

    fn object_to_native(
        &self,
        composite: &AbsComposite,
        ontology: &Ontology,
    ) -> ContentResult<NativeValue> {
        let factory =
            self.factory(composite.type_name())
                .ok_or_else(|| ContentError::UnknownSchema {
                    type_name: composite.type_name().to_owned(),
                })?;
        trace!(
            type_name = composite.type_name(),
            slots = composite.len(),
            "writing domain object slots"
        );

        let mut object = factory();
        for (slot, value) in composite.slots() {
            let value = self.native(value, ontology)?;
            object.set(slot, value)?;
        }
        Ok(NativeValue::Object(object))
    }
}

fn required<'a>(composite: &'a AbsComposite, slot: &str) -> ContentResult<&'a AbsObject> {
    composite.get(slot).ok_or_else(|| {
        ContentError::malformed(composite.type_name(), format!("missing slot `{slot}`"))
    })
}

fn unknown_schema(error: SchemaError) -> ContentError {
    match error {
        SchemaError::SchemaNotFound { name } => ContentError::UnknownSchema { type_name: name },
        other => other.into(),
    }
}
