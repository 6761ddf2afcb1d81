//! Native value translation for MXP structured content.
//!
//! [`Translator`] maps [`NativeValue`]s to descriptor trees and back. Built-in
//! platform types have fixed shapes; user types plug in through
//! [`DomainObject`].

#![warn(missing_docs, clippy::pedantic)]

mod domain;
mod error;
mod translator;
mod value;
mod wellknown;

/// Capability traits for user-defined domain types.
pub use domain::{DomainObject, DomainValue, DynDomainObject};
/// Error type and result alias for translation.
pub use error::{ContentError, ContentResult};
/// The translator.
pub use translator::Translator;
/// Native value union.
pub use value::{NativeValue, ValueSet};
/// Well-known platform types.
pub use wellknown::{Action, ActionResult, Done, Equals, Property};
