//! Codec error types.

use thiserror::Error;

/// Result alias for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors raised while encoding or decoding content.
///
/// Decoding never yields a partial tree: any error fails the whole call.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The input ended before the current element was complete.
    #[error("input truncated at {position}: {needed} more byte(s) required")]
    Truncated {
        /// Offset at which more input was required.
        position: usize,
        /// Number of bytes or characters missing.
        needed: usize,
    },

    /// A tag or marker byte is not valid at this point of the stream.
    #[error("unexpected tag 0x{tag:02x} at {position}")]
    UnexpectedTag {
        /// The offending byte.
        tag: u8,
        /// Offset of the byte.
        position: usize,
    },

    /// A string back-reference points past the end of the string table.
    #[error("string table index {index} out of range at {position}")]
    InvalidStringIndex {
        /// The offending index.
        index: u8,
        /// Offset of the index byte.
        position: usize,
    },

    /// A type or slot name is too long for a 16-bit length prefix.
    #[error("name of {len} bytes exceeds the short string limit")]
    StringTooLong {
        /// UTF-8 length of the name.
        len: usize,
    },

    /// A string is not valid UTF-8.
    #[error("invalid UTF-8 in string at {position}")]
    InvalidUtf8 {
        /// Offset of the string payload.
        position: usize,
    },

    /// A date is out of the representable range or badly formatted.
    #[error("invalid date at {position}")]
    InvalidDate {
        /// Offset of the date.
        position: usize,
    },

    /// Input continues after the root element.
    #[error("trailing input at {position}")]
    TrailingInput {
        /// Offset of the first unconsumed byte or character.
        position: usize,
    },

    /// Nesting exceeds the configured maximum depth.
    #[error("nesting deeper than {limit} levels")]
    DepthExceeded {
        /// Configured limit.
        limit: usize,
    },

    /// Text or structure that the grammar does not accept.
    #[error("malformed content at {position}: {reason}")]
    Malformed {
        /// Offset of the problem.
        position: usize,
        /// Human-readable reason.
        reason: String,
    },

    /// A composite type name could not be resolved.
    #[error(transparent)]
    Schema(#[from] content_ontology::SchemaError),

    /// A decoded element was rejected by the descriptor model.
    #[error(transparent)]
    Model(#[from] content_model::Error),
}

impl CodecError {
    /// Creates a [`CodecError::Malformed`].
    #[must_use]
    pub fn malformed(position: usize, reason: impl Into<String>) -> Self {
        Self::Malformed {
            position,
            reason: reason.into(),
        }
    }
}
