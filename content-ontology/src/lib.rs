//! Schema registry for MXP structured content.
//!
//! An [`Ontology`] maps type names (and native Rust types) to [`Schema`]s,
//! falls back to base ontologies on a miss, and validates descriptor trees.
//! Every domain ontology is expected to extend [`basic_ontology`].

#![warn(missing_docs, clippy::pedantic)]

mod basic;
mod error;
mod ontology;
mod schema;
mod validate;

/// The shared basic ontology.
pub use basic::{BASIC_ONTOLOGY_NAME, basic_ontology};
/// Error type and result alias for schema operations.
pub use error::{SchemaError, SchemaResult};
/// Registry types.
pub use ontology::{Ontology, OntologyBuilder, SchemaDeriver};
/// Schema declarations.
pub use schema::{Cardinality, Presence, Schema, SchemaBuilder, SchemaKind, SlotDecl};
