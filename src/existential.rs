//! Existential values: values held without their concrete type.
//!
//! An [`Existential`] owns its value behind `Arc<dyn Any + Send + Sync>`, so
//! a heterogeneous sequence is simply a `Vec<Existential>`. Clones share the
//! value, which lets narrowing hand out views that alias the stored instance.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use crate::contract::Contract;
use crate::registry::{short_type_name, ConformanceRegistry};

#[derive(Clone)]
pub struct Existential {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl Existential {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self::from_shared(Arc::new(value))
    }
    pub fn from_shared<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        Self {
            value,
            type_name: short_type_name::<T>(),
        }
    }
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
    pub fn concrete_type_id(&self) -> TypeId {
        self.as_any().type_id()
    }
    pub fn as_any(&self) -> &dyn Any {
        &*self.value
    }
    pub fn shared(&self) -> Arc<dyn Any + Send + Sync> {
        Arc::clone(&self.value)
    }
    // narrowing to a concrete type needs no registry
    pub fn is<T: Any>(&self) -> bool {
        self.as_any().is::<T>()
    }
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
    pub fn narrow<'a, C: Contract + ?Sized>(&'a self, registry: &ConformanceRegistry) -> Option<&'a C> {
        registry.narrow::<C>(self.as_any())
    }
    pub fn narrow_shared<C: Contract + ?Sized>(&self, registry: &ConformanceRegistry) -> Option<Arc<C>> {
        registry.narrow_shared::<C>(self.shared())
    }
    pub fn conforms<C: Contract + ?Sized>(&self, registry: &ConformanceRegistry) -> bool {
        registry.conforms::<C>(self.as_any())
    }
    /// Whether both existentials hold the very same stored value.
    pub fn same_value(&self, other: &Existential) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }
}

impl fmt::Debug for Existential {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Existential({})", self.type_name)
    }
}

/// Builds a `Vec<Existential>` from values of any mix of types.
///
/// ```
/// use conformant::existentials;
///
/// let values = existentials![2_i64, true, "Word"];
/// assert!(values[1].is::<bool>());
/// assert_eq!(values[2].downcast_ref::<&str>(), Some(&"Word"));
/// ```
#[macro_export]
macro_rules! existentials {
    ($($value:expr),* $(,)?) => {
        vec![$($crate::existential::Existential::new($value)),*]
    };
}
