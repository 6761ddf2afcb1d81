//! Validation of descriptor trees against an ontology.

use content_model::{AbsComposite, AbsObject, vocabulary};

use crate::error::{SchemaError, SchemaResult};
use crate::ontology::Ontology;
use crate::schema::{SchemaKind, SlotDecl};

impl Ontology {
    /// Checks a descriptor tree against this ontology's schemas.
    ///
    /// Every composite must resolve to a schema of the matching kind, carry
    /// only declared slots, set every mandatory slot, and hold values
    /// compatible with each slot's declared type and cardinality. Variables
    /// are accepted wherever a term is expected.
    ///
    /// # Errors
    ///
    /// Returns the first [`SchemaError`] found, walking the tree depth-first.
    pub fn validate(&self, abs: &AbsObject) -> SchemaResult<()> {
        match abs {
            AbsObject::Primitive(_) | AbsObject::Variable(_) => Ok(()),
            AbsObject::Aggregate(aggregate) => aggregate.iter().try_for_each(|e| self.validate(e)),
            AbsObject::ContentElementList(list) => list.iter().try_for_each(|e| self.validate(e)),
            AbsObject::Composite(composite) => self.validate_composite(composite),
        }
    }

    fn validate_composite(&self, composite: &AbsComposite) -> SchemaResult<()> {
        let schema = self.schema(composite.type_name())?;
        if schema.kind().composite_kind() != Some(composite.kind()) {
            return Err(SchemaError::KindMismatch {
                type_name: composite.type_name().to_owned(),
                expected: schema.kind(),
                found: composite.kind(),
            });
        }

        for (name, value) in composite.slots() {
            let decl = schema.slot(name).ok_or_else(|| SchemaError::UnknownSlot {
                schema: schema.name().to_owned(),
                slot: name.to_owned(),
            })?;
            self.check_slot(schema.name(), decl, value)?;
            self.validate(value)?;
        }

        for decl in schema.slots() {
            if !decl.is_optional() && composite.get(decl.name()).is_none() {
                return Err(SchemaError::MissingSlot {
                    schema: schema.name().to_owned(),
                    slot: decl.name().to_owned(),
                });
            }
        }
        Ok(())
    }

    fn check_slot(&self, schema: &str, decl: &SlotDecl, value: &AbsObject) -> SchemaResult<()> {
        let incompatible = |expected: &str, found: &AbsObject| SchemaError::IncompatibleValue {
            schema: schema.to_owned(),
            slot: decl.name().to_owned(),
            expected: expected.to_owned(),
            found: found.type_name().to_owned(),
        };

        if matches!(value, AbsObject::Variable(_)) {
            return Ok(());
        }

        let Some(aggregate_type) = decl.aggregate_type() else {
            return if self.conforms(decl.type_name(), value)? {
                Ok(())
            } else {
                Err(incompatible(decl.type_name(), value))
            };
        };

        let AbsObject::Aggregate(aggregate) = value else {
            return Err(incompatible(aggregate_type, value));
        };
        if !decl.cardinality().admits(aggregate.len()) {
            return Err(SchemaError::CardinalityViolation {
                schema: schema.to_owned(),
                slot: decl.name().to_owned(),
                count: aggregate.len(),
            });
        }
        for element in aggregate.iter() {
            if !self.conforms(decl.type_name(), element)? {
                return Err(incompatible(decl.type_name(), element));
            }
        }
        Ok(())
    }

    fn conforms(&self, expected: &str, value: &AbsObject) -> SchemaResult<bool> {
        if matches!(value, AbsObject::Variable(_)) {
            return Ok(true);
        }
        if expected.eq_ignore_ascii_case(vocabulary::TERM) {
            return Ok(value.is_term());
        }

        let expected_schema = self.schema(expected)?;
        let conforms = match (expected_schema.kind(), value) {
            (SchemaKind::Primitive, AbsObject::Primitive(p)) => {
                p.type_name().eq_ignore_ascii_case(expected_schema.name())
            }
            (SchemaKind::Aggregate, AbsObject::Aggregate(a)) => {
                a.type_name().eq_ignore_ascii_case(expected_schema.name())
            }
            (SchemaKind::ContentElementList, AbsObject::ContentElementList(_)) => true,
            (
                SchemaKind::Concept | SchemaKind::Predicate | SchemaKind::AgentAction,
                AbsObject::Composite(c),
            ) => self.schema(c.type_name())?.is_subtype_of(expected),
            _ => false,
        };
        Ok(conforms)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use content_model::{AbsAggregate, AbsVariable};

    use super::*;
    use crate::basic::basic_ontology;
    use crate::schema::{Cardinality, Presence, Schema};

    fn library() -> Ontology {
        Ontology::builder("library")
            .extends(basic_ontology())
            .add_schema(
                Schema::builder("book", SchemaKind::Concept)
                    .add_slot("title", vocabulary::STRING, Presence::Mandatory)
                    .unwrap()
                    .add_aggregate_slot(
                        "authors",
                        vocabulary::AGENT_IDENTIFIER,
                        vocabulary::SEQUENCE,
                        Cardinality::new(1, Some(3)),
                    )
                    .unwrap()
                    .build(),
            )
            .unwrap()
            .build()
    }

    fn author(name: &str) -> AbsObject {
        AbsComposite::concept(vocabulary::AGENT_IDENTIFIER)
            .with(vocabulary::AID_NAME, AbsObject::primitive(name))
            .into()
    }

    fn authors(count: usize) -> AbsAggregate {
        let mut seq = AbsAggregate::sequence();
        for i in 0..count {
            seq.add(author(&format!("a{i}@p"))).unwrap();
        }
        seq
    }

    fn book(title: AbsObject, count: usize) -> AbsObject {
        AbsComposite::concept("book")
            .with("title", title)
            .with("authors", authors(count))
            .into()
    }

    #[test]
    fn well_formed_tree_validates() {
        let ontology = library();
        ontology
            .validate(&book(AbsObject::primitive("Dune"), 2))
            .expect("valid");
    }

    #[test]
    fn slot_type_and_cardinality_are_checked() {
        let ontology = library();
        let err = ontology
            .validate(&book(AbsObject::primitive(7_i32), 1))
            .expect_err("wrong primitive");
        assert!(matches!(err, SchemaError::IncompatibleValue { slot, .. } if slot == "title"));

        let err = ontology
            .validate(&book(AbsObject::primitive("Dune"), 4))
            .expect_err("too many authors");
        assert!(matches!(err, SchemaError::CardinalityViolation { count: 4, .. }));
    }

    #[test]
    fn missing_and_unknown_slots_are_reported() {
        let ontology = library();
        let missing = AbsComposite::concept("book").with("authors", authors(1));
        assert!(matches!(
            ontology.validate(&missing.into()),
            Err(SchemaError::MissingSlot { slot, .. }) if slot == "title"
        ));

        let unknown = AbsComposite::concept("book")
            .with("title", AbsObject::primitive("Dune"))
            .with("authors", authors(1))
            .with("isbn", AbsObject::primitive("123"));
        assert!(matches!(
            ontology.validate(&unknown.into()),
            Err(SchemaError::UnknownSlot { slot, .. }) if slot == "isbn"
        ));
    }

    #[test]
    fn variables_are_compatible_with_any_slot() {
        let ontology = library();
        ontology
            .validate(&book(AbsVariable::new("t").into(), 1))
            .expect("variable title");
    }

    #[test]
    fn kind_mismatch_is_reported() {
        let ontology = library();
        let wrong = AbsComposite::predicate("book");
        assert!(matches!(
            ontology.validate(&wrong.into()),
            Err(SchemaError::KindMismatch { .. })
        ));
    }

    #[test]
    fn well_known_predicates_validate() {
        let ontology: Arc<Ontology> = basic_ontology();
        let action = AbsComposite::agent_action(vocabulary::ACTION)
            .with(vocabulary::ACTION_ACTOR, author("a1@p"))
            .with(
                vocabulary::ACTION_ACTION,
                AbsComposite::agent_action("INFORM")
                    .with(vocabulary::ACL_CONTENT, AbsObject::primitive("hello")),
            );
        let done = AbsComposite::predicate(vocabulary::DONE).with(vocabulary::DONE_ACTION, action);
        ontology.validate(&done.into()).expect("done");
    }
}
