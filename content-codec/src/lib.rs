//! Wire codecs for MXP structured content.
//!
//! [`BinaryCodec`] writes descriptor trees (or frames) in a compact tagged
//! layout with a per-call string dictionary. [`TextCodec`] writes frames as
//! parenthesised text and can bridge descriptor trees through them.

#![warn(missing_docs, clippy::pedantic)]

mod binary;
mod bridge;
mod config;
mod error;
mod text;
mod wire;

/// Binary codec.
pub use binary::BinaryCodec;
/// Shared codec configuration.
pub use config::CodecConfig;
/// Error type and result alias for encoding and decoding.
pub use error::{CodecError, CodecResult};
/// Textual codec.
pub use text::TextCodec;
/// Binary tag bytes.
pub use wire::tags;
