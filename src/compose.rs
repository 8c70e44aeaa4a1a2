//! Unnamed conjunctions of contracts.
//!
//! Statically a composition is nothing more than a bound listing several
//! contract traits, `impl Named + Aged`, and no trait has to be declared for
//! it. A type that does not satisfy every member of the bound is refused:
//!
//! ```compile_fail
//! use conformant::catalog::{wish_happy_birthday, Person};
//!
//! // a Person is FullyNamed, but neither Named nor Aged
//! let person = Person::new("John Appleseed");
//! wish_happy_birthday(&person);
//! ```
//!
//! At runtime a [`Composition`] names the same conjunction so that a
//! [`ConformanceRegistry`](crate::registry::ConformanceRegistry) can test a
//! type-erased value against it.

use std::any::TypeId;
use std::collections::BTreeMap;
use std::fmt;

use crate::contract::{Contract, ContractDescriptor};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Composition {
    // keyed by the contract's type so that the order of `and` does not matter
    contracts: BTreeMap<TypeId, &'static ContractDescriptor>,
}

impl Composition {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn of<C: Contract + ?Sized>() -> Self {
        Self::new().and::<C>()
    }
    pub fn and<C: Contract + ?Sized>(mut self) -> Self {
        self.contracts.insert(TypeId::of::<C>(), C::descriptor());
        self
    }
    pub fn contains<C: Contract + ?Sized>(&self) -> bool {
        self.contracts.contains_key(&TypeId::of::<C>())
    }
    pub fn len(&self) -> usize {
        self.contracts.len()
    }
    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }
    pub(crate) fn contract_ids(&self) -> impl Iterator<Item = TypeId> + '_ {
        self.contracts.keys().copied()
    }
    /// Contract names in alphabetical order.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self
            .contracts
            .values()
            .map(|descriptor| descriptor.name())
            .collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Display for Composition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.names().join(" & "))
    }
}
