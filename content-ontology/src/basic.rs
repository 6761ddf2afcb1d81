//! The basic ontology every content ontology extends.

use std::sync::{Arc, OnceLock};

use content_model::{AgentIdentifier, PrimitiveKind, vocabulary};

use crate::error::SchemaResult;
use crate::ontology::{Ontology, SchemaDeriver};
use crate::schema::{Cardinality, Presence, Schema, SchemaKind};

/// Name of the basic ontology.
pub const BASIC_ONTOLOGY_NAME: &str = "basic-ontology";

const UNBOUNDED: Cardinality = Cardinality::new(0, None);

/// Returns the process-wide basic ontology: primitive, aggregate, and
/// variable schemas, the abstract bases, agent identifiers, the well-known
/// predicates and actions, and one lazily derived message schema per
/// communicative-act performative.
///
/// # Panics
///
/// Panics if the built-in schema table is inconsistent, which is a
/// programming error caught by this crate's tests.
#[must_use]
pub fn basic_ontology() -> Arc<Ontology> {
    static BASIC: OnceLock<Arc<Ontology>> = OnceLock::new();
    Arc::clone(BASIC.get_or_init(|| {
        Arc::new(build_basic_ontology().expect("basic ontology schema table is consistent"))
    }))
}

fn build_basic_ontology() -> SchemaResult<Ontology> {
    let mut builder = Ontology::builder(BASIC_ONTOLOGY_NAME);
    for kind in PrimitiveKind::ALL {
        builder =
            builder.add_schema(Schema::builder(kind.type_name(), SchemaKind::Primitive).build())?;
    }

    builder = builder
        .add_schema(Schema::builder(vocabulary::SEQUENCE, SchemaKind::Aggregate).build())?
        .add_schema(Schema::builder(vocabulary::SET, SchemaKind::Aggregate).build())?
        .add_schema(
            Schema::builder(vocabulary::CONTENT_ELEMENT_LIST, SchemaKind::ContentElementList)
                .build(),
        )?
        .add_schema(
            Schema::builder(vocabulary::VARIABLE, SchemaKind::Variable)
                .add_slot(vocabulary::VARIABLE_NAME, vocabulary::STRING, Presence::Mandatory)?
                .add_slot(
                    vocabulary::VARIABLE_VALUE_TYPE,
                    vocabulary::STRING,
                    Presence::Optional,
                )?
                .build(),
        )?
        .add_schema(Schema::builder(vocabulary::CONCEPT, SchemaKind::Concept).build())?
        .add_schema(Schema::builder(vocabulary::PREDICATE, SchemaKind::Predicate).build())?
        .add_schema(Schema::builder(vocabulary::AGENT_ACTION, SchemaKind::AgentAction).build())?;

    builder = builder
        .add_schema_for::<AgentIdentifier>(
            Schema::builder(vocabulary::AGENT_IDENTIFIER, SchemaKind::Concept)
                .add_slot(vocabulary::AID_NAME, vocabulary::STRING, Presence::Mandatory)?
                .add_aggregate_slot(
                    vocabulary::AID_ADDRESSES,
                    vocabulary::STRING,
                    vocabulary::SEQUENCE,
                    UNBOUNDED,
                )?
                .add_aggregate_slot(
                    vocabulary::AID_RESOLVERS,
                    vocabulary::AGENT_IDENTIFIER,
                    vocabulary::SEQUENCE,
                    UNBOUNDED,
                )?
                .build(),
        )?
        .add_schema(
            Schema::builder(vocabulary::PROPERTY, SchemaKind::Concept)
                .add_slot(vocabulary::PROPERTY_NAME, vocabulary::STRING, Presence::Mandatory)?
                .add_slot(vocabulary::PROPERTY_VALUE, vocabulary::TERM, Presence::Mandatory)?
                .build(),
        )?;

    builder = builder
        .add_schema(Schema::builder(vocabulary::TRUE_PROPOSITION, SchemaKind::Predicate).build())?
        .add_schema(Schema::builder(vocabulary::FALSE_PROPOSITION, SchemaKind::Predicate).build())?
        .add_schema(
            Schema::builder(vocabulary::DONE, SchemaKind::Predicate)
                .add_slot(vocabulary::DONE_ACTION, vocabulary::AGENT_ACTION, Presence::Mandatory)?
                .add_slot(vocabulary::DONE_CONDITION, vocabulary::PREDICATE, Presence::Optional)?
                .build(),
        )?
        .add_schema(
            Schema::builder(vocabulary::RESULT, SchemaKind::Predicate)
                .add_slot(vocabulary::RESULT_ACTION, vocabulary::AGENT_ACTION, Presence::Mandatory)?
                .add_slot(vocabulary::RESULT_VALUE, vocabulary::TERM, Presence::Mandatory)?
                .build(),
        )?
        .add_schema(
            Schema::builder(vocabulary::EQUALS, SchemaKind::Predicate)
                .add_slot(vocabulary::EQUALS_LEFT, vocabulary::TERM, Presence::Mandatory)?
                .add_slot(vocabulary::EQUALS_RIGHT, vocabulary::TERM, Presence::Mandatory)?
                .build(),
        )?
        .add_schema(
            Schema::builder(vocabulary::ACTION, SchemaKind::AgentAction)
                .add_slot(
                    vocabulary::ACTION_ACTOR,
                    vocabulary::AGENT_IDENTIFIER,
                    Presence::Mandatory,
                )?
                .add_slot(vocabulary::ACTION_ACTION, vocabulary::AGENT_ACTION, Presence::Mandatory)?
                .build(),
        )?;

    let message = Arc::new(acl_message_schema()?);
    builder = builder
        .add_schema(Schema::clone(&message))?
        .with_deriver(Arc::new(PerformativeSchemas { message }));

    Ok(builder.build())
}

fn acl_message_schema() -> SchemaResult<Schema> {
    let mut builder = Schema::builder(vocabulary::ACL_MESSAGE, SchemaKind::AgentAction)
        .add_slot(
            vocabulary::ACL_SENDER,
            vocabulary::AGENT_IDENTIFIER,
            Presence::Optional,
        )?
        .add_aggregate_slot(
            vocabulary::ACL_RECEIVERS,
            vocabulary::AGENT_IDENTIFIER,
            vocabulary::SEQUENCE,
            UNBOUNDED,
        )?
        .add_aggregate_slot(
            vocabulary::ACL_REPLY_TO,
            vocabulary::AGENT_IDENTIFIER,
            vocabulary::SEQUENCE,
            UNBOUNDED,
        )?;
    for slot in [
        vocabulary::ACL_CONTENT,
        vocabulary::ACL_LANGUAGE,
        vocabulary::ACL_ENCODING,
        vocabulary::ACL_ONTOLOGY,
        vocabulary::ACL_PROTOCOL,
        vocabulary::ACL_CONVERSATION_ID,
        vocabulary::ACL_IN_REPLY_TO,
        vocabulary::ACL_REPLY_WITH,
    ] {
        builder = builder.add_slot(slot, vocabulary::STRING, Presence::Optional)?;
    }
    Ok(builder
        .add_slot(vocabulary::ACL_REPLY_BY, vocabulary::DATE, Presence::Optional)?
        .build())
}

/// Derives one agent-action schema per performative, each extending the
/// common message schema.
struct PerformativeSchemas {
    message: Arc<Schema>,
}

impl SchemaDeriver for PerformativeSchemas {
    fn derive(&self, name: &str, _ontology: &Ontology) -> SchemaResult<Option<Schema>> {
        let Some(performative) = vocabulary::PERFORMATIVES
            .iter()
            .find(|p| p.eq_ignore_ascii_case(name))
        else {
            return Ok(None);
        };
        let schema = Schema::builder(*performative, SchemaKind::AgentAction)
            .extends(Arc::clone(&self.message))?
            .build();
        Ok(Some(schema))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SchemaError;

    #[test]
    fn basic_ontology_is_a_singleton() {
        assert!(Arc::ptr_eq(&basic_ontology(), &basic_ontology()));
    }

    #[test]
    fn well_known_schemas_resolve() {
        let ontology = basic_ontology();
        let aid = ontology.schema(vocabulary::AGENT_IDENTIFIER).unwrap();
        assert_eq!(aid.slot_names(), ["name", "addresses", "resolvers"]);
        assert_eq!(
            ontology.schema_for::<AgentIdentifier>().unwrap().name(),
            vocabulary::AGENT_IDENTIFIER
        );
        for name in [vocabulary::DONE, vocabulary::RESULT, vocabulary::EQUALS] {
            assert_eq!(
                ontology.schema(name).unwrap().kind(),
                SchemaKind::Predicate
            );
        }
    }

    #[test]
    fn performatives_derive_from_the_message_schema() {
        let ontology = basic_ontology();
        let inform = ontology.schema("inform").unwrap();
        assert_eq!(inform.name(), "INFORM");
        assert_eq!(inform.kind(), SchemaKind::AgentAction);
        assert!(inform.is_subtype_of(vocabulary::ACL_MESSAGE));
        assert!(inform.slot(vocabulary::ACL_CONTENT).is_some());
        assert!(Arc::ptr_eq(&inform, &ontology.schema("INFORM").unwrap()));

        assert!(matches!(
            ontology.schema("GOSSIP"),
            Err(SchemaError::SchemaNotFound { .. })
        ));
    }

    #[test]
    fn extending_ontologies_see_derived_schemas() {
        let child = Ontology::builder("child").extends(basic_ontology()).build();
        assert_eq!(child.schema("query-ref").unwrap().name(), "QUERY-REF");
    }
}
