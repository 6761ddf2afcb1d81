//! Structured content marshalling for MXP agents.
//!
//! Depend on this crate via `cargo add mxp-content`. It bundles the content
//! crates behind feature flags: descriptor trees and frames are always
//! available, while the ontology, translator, and codecs can be disabled when
//! an agent only forwards content it never inspects.

#![warn(missing_docs, clippy::pedantic)]

/// Descriptors, frames, and agent identifiers.
pub use content_model as model;

/// Schema registry and the basic ontology (enabled by `ontology` feature).
#[cfg(feature = "ontology")]
pub use content_ontology as ontology;

/// Native value translation (enabled by `translator` feature).
#[cfg(feature = "translator")]
pub use content_translator as translator;

/// Binary and textual codecs (enabled by `codec` feature).
#[cfg(feature = "codec")]
pub use content_codec as codec;
