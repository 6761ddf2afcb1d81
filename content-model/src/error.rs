//! Shared error definitions for the descriptor model.

use thiserror::Error;

/// Result alias used throughout the descriptor model.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or mutating descriptor trees.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// A primitive was given a value whose kind does not match its type tag.
    #[error("primitive type mismatch: expected `{expected}`, found `{found}`")]
    PrimitiveTypeMismatch {
        /// Type name the primitive is tagged with.
        expected: String,
        /// Type name of the offered value.
        found: String,
    },

    /// The type name does not denote any primitive type.
    #[error("unknown primitive type `{type_name}`")]
    UnknownPrimitiveType {
        /// The offending type name.
        type_name: String,
    },

    /// A non-term descriptor was added to an aggregate.
    #[error("`{type_name}` is not a term and cannot be an aggregate element")]
    NotATerm {
        /// Type name of the rejected element.
        type_name: String,
    },

    /// A descriptor that is not a content element was added to a content-element-list.
    #[error("`{type_name}` is not a content element")]
    NotAContentElement {
        /// Type name of the rejected element.
        type_name: String,
    },

    /// A slot was set on a descriptor that cannot carry it.
    #[error("`{type_name}` has no slot `{slot}`")]
    InvalidSlot {
        /// Type name of the descriptor.
        type_name: String,
        /// The rejected slot name.
        slot: String,
    },

    /// An agent identifier could not be built or recovered from a generic tree.
    #[error("invalid agent identifier: {reason}")]
    InvalidAgentIdentifier {
        /// Human-readable reason for rejection.
        reason: String,
    },
}

impl Error {
    /// Helper to construct [`Error::InvalidAgentIdentifier`] from string-like values.
    #[must_use]
    pub fn invalid_agent_identifier(reason: impl Into<String>) -> Self {
        Self::InvalidAgentIdentifier {
            reason: reason.into(),
        }
    }
}
