//! Platform types with fixed descriptor shapes.

use content_model::AgentIdentifier;

use crate::value::NativeValue;

/// A named value attached to some entity.
#[derive(Clone, Debug, PartialEq)]
pub struct Property {
    name: String,
    value: NativeValue,
}

impl Property {
    /// Creates a property.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<NativeValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Returns the property name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the property value.
    #[must_use]
    pub fn value(&self) -> &NativeValue {
        &self.value
    }
}

/// An agent performing an action.
#[derive(Clone, Debug, PartialEq)]
pub struct Action {
    actor: AgentIdentifier,
    action: NativeValue,
}

impl Action {
    /// Creates an action performed by `actor`.
    #[must_use]
    pub fn new(actor: AgentIdentifier, action: impl Into<NativeValue>) -> Self {
        Self {
            actor,
            action: action.into(),
        }
    }

    /// Returns the performing agent.
    #[must_use]
    pub fn actor(&self) -> &AgentIdentifier {
        &self.actor
    }

    /// Returns the performed action.
    #[must_use]
    pub fn action(&self) -> &NativeValue {
        &self.action
    }
}

/// States that an action has been performed, optionally under a condition.
#[derive(Clone, Debug, PartialEq)]
pub struct Done {
    action: NativeValue,
    condition: Option<NativeValue>,
}

impl Done {
    /// Creates an unconditional completion.
    #[must_use]
    pub fn new(action: impl Into<NativeValue>) -> Self {
        Self {
            action: action.into(),
            condition: None,
        }
    }

    /// Attaches the condition under which the action was done.
    #[must_use]
    pub fn with_condition(mut self, condition: impl Into<NativeValue>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    /// Returns the completed action.
    #[must_use]
    pub fn action(&self) -> &NativeValue {
        &self.action
    }

    /// Returns the condition, if any.
    #[must_use]
    pub fn condition(&self) -> Option<&NativeValue> {
        self.condition.as_ref()
    }
}

/// The value an action produced.
#[derive(Clone, Debug, PartialEq)]
pub struct ActionResult {
    action: NativeValue,
    value: NativeValue,
}

impl ActionResult {
    /// Pairs an action with its outcome.
    #[must_use]
    pub fn new(action: impl Into<NativeValue>, value: impl Into<NativeValue>) -> Self {
        Self {
            action: action.into(),
            value: value.into(),
        }
    }

    /// Returns the action.
    #[must_use]
    pub fn action(&self) -> &NativeValue {
        &self.action
    }

    /// Returns the outcome.
    #[must_use]
    pub fn value(&self) -> &NativeValue {
        &self.value
    }
}

/// Equality between two terms.
#[derive(Clone, Debug, PartialEq)]
pub struct Equals {
    left: NativeValue,
    right: NativeValue,
}

impl Equals {
    /// Creates the proposition `left = right`.
    #[must_use]
    pub fn new(left: impl Into<NativeValue>, right: impl Into<NativeValue>) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
        }
    }

    /// Returns the left-hand term.
    #[must_use]
    pub fn left(&self) -> &NativeValue {
        &self.left
    }

    /// Returns the right-hand term.
    #[must_use]
    pub fn right(&self) -> &NativeValue {
        &self.right
    }
}
