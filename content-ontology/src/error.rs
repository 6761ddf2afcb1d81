//! Error types for schema registration, lookup, and validation.

use content_model::CompositeKind;
use thiserror::Error;

use crate::schema::SchemaKind;

/// Result alias for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors emitted by schemas and ontologies.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    /// No schema is registered (or derivable) under the name.
    #[error("schema `{name}` not found")]
    SchemaNotFound {
        /// The unresolved type name.
        name: String,
    },

    /// No schema is bound to the native type.
    #[error("no schema bound to native type `{type_name}`")]
    NativeTypeNotBound {
        /// Rust type name of the unbound type.
        type_name: String,
    },

    /// A slot declaration has a minimum cardinality above its maximum.
    #[error("slot `{slot}` has inverted cardinality {min}..{max}")]
    InvalidCardinality {
        /// Slot being declared.
        slot: String,
        /// Declared minimum.
        min: usize,
        /// Declared maximum.
        max: usize,
    },

    /// A slot name was declared twice with different types.
    #[error("slot `{slot}` is already declared on `{schema}` with a different type")]
    DuplicateSlot {
        /// Schema being built.
        schema: String,
        /// Conflicting slot name.
        slot: String,
    },

    /// A schema name was registered twice in one ontology.
    #[error("schema `{name}` is already registered")]
    DuplicateSchema {
        /// Conflicting schema name.
        name: String,
    },

    /// A super-schema belongs to a different kind family.
    #[error("`{schema}` ({kind:?}) cannot extend `{super_name}` ({super_kind:?})")]
    IncompatibleSuper {
        /// Schema being built.
        schema: String,
        /// Kind of the schema being built.
        kind: SchemaKind,
        /// Rejected super-schema.
        super_name: String,
        /// Kind of the rejected super-schema.
        super_kind: SchemaKind,
    },

    /// The schema cannot produce an empty descriptor.
    #[error("schema `{name}` cannot be instantiated")]
    NotInstantiable {
        /// Schema name.
        name: String,
    },

    /// A descriptor carries a slot its schema does not declare.
    #[error("`{schema}` has no slot `{slot}`")]
    UnknownSlot {
        /// Schema of the descriptor.
        schema: String,
        /// Undeclared slot.
        slot: String,
    },

    /// A mandatory slot is absent.
    #[error("mandatory slot `{slot}` of `{schema}` is missing")]
    MissingSlot {
        /// Schema of the descriptor.
        schema: String,
        /// Missing slot.
        slot: String,
    },

    /// An aggregate slot holds a number of elements outside its cardinality.
    #[error("slot `{slot}` of `{schema}` holds {count} elements, outside its cardinality")]
    CardinalityViolation {
        /// Schema of the descriptor.
        schema: String,
        /// Offending slot.
        slot: String,
        /// Number of elements found.
        count: usize,
    },

    /// A slot value does not conform to the declared slot type.
    #[error("slot `{slot}` of `{schema}` expects `{expected}`, found `{found}`")]
    IncompatibleValue {
        /// Schema of the descriptor.
        schema: String,
        /// Offending slot.
        slot: String,
        /// Declared slot type.
        expected: String,
        /// Type name of the value found.
        found: String,
    },

    /// A composite's flavour disagrees with its schema's kind.
    #[error("`{type_name}` is declared as {expected:?} but the descriptor is a {found:?}")]
    KindMismatch {
        /// Type name of the descriptor.
        type_name: String,
        /// Kind declared by the schema.
        expected: SchemaKind,
        /// Flavour of the descriptor.
        found: CompositeKind,
    },
}

impl SchemaError {
    /// Helper to construct [`SchemaError::SchemaNotFound`].
    #[must_use]
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::SchemaNotFound { name: name.into() }
    }
}
