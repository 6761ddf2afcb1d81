//! Error types for native translation.

use thiserror::Error;

/// Result alias for translation operations.
pub type ContentResult<T> = Result<T, ContentError>;

/// Errors raised while translating between native values and descriptors.
#[derive(Debug, Error)]
pub enum ContentError {
    /// No well-known type, registered domain type, or schema matches the name.
    #[error("no translation known for type `{type_name}`")]
    UnknownSchema {
        /// The unrecognised type name.
        type_name: String,
    },

    /// The descriptor still contains unbound variables.
    #[error("cannot translate ungrounded content of type `{type_name}`")]
    Ungrounded {
        /// Type name of the root descriptor.
        type_name: String,
    },

    /// A well-known composite or collection does not have the expected shape.
    #[error("malformed `{type_name}`: {reason}")]
    Malformed {
        /// Type name being translated.
        type_name: String,
        /// Human-readable reason.
        reason: String,
    },

    /// A domain object rejected a slot access.
    #[error("domain object `{type_name}` rejected slot `{slot}`: {reason}")]
    Mapper {
        /// Domain type name.
        type_name: String,
        /// Slot being accessed.
        slot: String,
        /// Human-readable reason.
        reason: String,
    },

    /// A domain type name was registered twice.
    #[error("domain type `{type_name}` is already registered")]
    DuplicateMapping {
        /// The conflicting type name.
        type_name: String,
    },

    /// Schema lookup failed.
    #[error(transparent)]
    Schema(#[from] content_ontology::SchemaError),

    /// Descriptor construction failed.
    #[error(transparent)]
    Model(#[from] content_model::Error),
}

impl ContentError {
    /// Creates a [`ContentError::Malformed`] for the given type.
    #[must_use]
    pub fn malformed(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            type_name: type_name.into(),
            reason: reason.into(),
        }
    }

    /// Creates a [`ContentError::Mapper`] for a rejected slot.
    #[must_use]
    pub fn mapper(
        type_name: impl Into<String>,
        slot: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Mapper {
            type_name: type_name.into(),
            slot: slot.into(),
            reason: reason.into(),
        }
    }
}
