//! Slot-accessor capability for user-defined domain types.

use std::any::Any;
use std::fmt;
use std::ops::{Deref, DerefMut};

use crate::error::ContentResult;
use crate::value::NativeValue;

/// Named-slot access to a domain type declared in a user ontology.
///
/// The translator reads slots in schema order when producing descriptors and
/// writes them back one by one when reconstructing the value. Slots that are
/// absent on the native side return `None` and are omitted from the tree.
pub trait DomainObject: fmt::Debug + Send + Sync {
    /// Returns the ontology type name this value translates to.
    fn type_name(&self) -> &str;

    /// Returns the current value of `slot`, or `None` when it is unset.
    fn get(&self, slot: &str) -> Option<NativeValue>;

    /// Stores `value` in `slot`.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::Mapper`](crate::ContentError::Mapper) when the
    /// slot is unknown or the value has the wrong shape.
    fn set(&mut self, slot: &str, value: NativeValue) -> ContentResult<()>;
}

/// Object-safe cloning, comparison, and downcasting on top of
/// [`DomainObject`]. Implemented for every `Clone + PartialEq` domain type.
pub trait DynDomainObject: DomainObject {
    /// Clones the value behind a fresh box.
    fn clone_boxed(&self) -> Box<dyn DynDomainObject>;

    /// Compares with another domain object of possibly different type.
    fn eq_dyn(&self, other: &dyn DynDomainObject) -> bool;

    /// Upcasts for downcasting to the concrete type.
    fn as_any(&self) -> &dyn Any;
}

impl<T> DynDomainObject for T
where
    T: DomainObject + Clone + PartialEq + 'static,
{
    fn clone_boxed(&self) -> Box<dyn DynDomainObject> {
        Box::new(self.clone())
    }

    fn eq_dyn(&self, other: &dyn DynDomainObject) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| self == other)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Owned, type-erased domain value carried by [`NativeValue::Object`].
pub struct DomainValue(Box<dyn DynDomainObject>);

impl DomainValue {
    /// Boxes a domain object.
    #[must_use]
    pub fn new<T>(object: T) -> Self
    where
        T: DomainObject + Clone + PartialEq + 'static,
    {
        Self(Box::new(object))
    }

    /// Returns the concrete value when it is a `T`.
    #[must_use]
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }
}

impl Deref for DomainValue {
    type Target = dyn DynDomainObject;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

impl DerefMut for DomainValue {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.0.as_mut()
    }
}

impl Clone for DomainValue {
    fn clone(&self) -> Self {
        Self(self.0.clone_boxed())
    }
}

impl PartialEq for DomainValue {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_dyn(other.0.as_ref())
    }
}

impl fmt::Debug for DomainValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.0.as_ref(), f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ContentError;

    #[derive(Clone, Debug, Default, PartialEq)]
    struct Counter {
        hits: i32,
    }

    impl DomainObject for Counter {
        fn type_name(&self) -> &str {
            "counter"
        }

        fn get(&self, slot: &str) -> Option<NativeValue> {
            (slot == "hits").then_some(NativeValue::Integer(self.hits))
        }

        fn set(&mut self, slot: &str, value: NativeValue) -> ContentResult<()> {
            match (slot, value) {
                ("hits", NativeValue::Integer(hits)) => {
                    self.hits = hits;
                    Ok(())
                }
                (slot, _) => Err(ContentError::mapper("counter", slot, "unsupported")),
            }
        }
    }

    #[derive(Clone, Debug, PartialEq)]
    struct Other;

    impl DomainObject for Other {
        fn type_name(&self) -> &str {
            "other"
        }

        fn get(&self, _slot: &str) -> Option<NativeValue> {
            None
        }

        fn set(&mut self, slot: &str, _value: NativeValue) -> ContentResult<()> {
            Err(ContentError::mapper("other", slot, "no slots"))
        }
    }

    #[test]
    fn erased_values_compare_by_concrete_type() {
        let a = DomainValue::new(Counter { hits: 3 });
        let b = a.clone();
        assert_eq!(a, b);
        assert_ne!(a, DomainValue::new(Counter { hits: 4 }));
        assert_ne!(a, DomainValue::new(Other));
        assert_eq!(a.downcast_ref::<Counter>(), Some(&Counter { hits: 3 }));
        assert!(a.downcast_ref::<Other>().is_none());
    }

    #[test]
    fn slot_access_goes_through_the_box() {
        let mut value = DomainValue::new(Counter::default());
        value.set("hits", NativeValue::Integer(9)).expect("set hits");
        assert_eq!(value.get("hits"), Some(NativeValue::Integer(9)));
        assert!(matches!(
            value.set("misses", NativeValue::Integer(1)),
            Err(ContentError::Mapper { .. })
        ));
    }
}
