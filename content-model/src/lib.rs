//! Core content types for MXP agents: abstract descriptors, frames, and agent
//! identifiers.
//!
//! Descriptors are the schema-checked tree form of structured content; frames
//! are their schema-free sibling. Both are consumed by the ontology,
//! translator, and codec crates.

#![warn(missing_docs, clippy::pedantic)]

mod descriptor;
mod error;
mod frame;
mod ids;
mod primitive;
pub mod vocabulary;

/// Descriptor tree nodes.
pub use descriptor::{
    AbsAggregate, AbsComposite, AbsContentElementList, AbsObject, AbsVariable, CompositeKind,
};
/// Error type and result alias shared across the model.
pub use error::{Error, Result};
/// Schema-free frame tree nodes.
pub use frame::{FrameValue, OrderedFrame, QualifiedFrame};
/// Identifier of an agent participating in a conversation.
pub use ids::AgentIdentifier;
/// Primitive values and the primitive descriptor.
pub use primitive::{AbsPrimitive, PrimitiveKind, PrimitiveValue};
