//! Conformant – capability contracts, conformance and narrowing for type-erased values.
//!
//! A *contract* is a named set of member requirements that any type may
//! declare it satisfies. Contracts are plain Rust traits:
//! * A [`contract::ContractDescriptor`] mirrors a contract's requirements,
//!   its inherited contracts and whether it is restricted to reference types.
//! * The [`contract!`] macro turns a trait into a [`contract::Contract`].
//! * The [`conforms!`] macro makes a type castable to the contracts it implements.
//! * A [`registry::ConformanceRegistry`] keeps the declared conformances and
//!   narrows `&dyn Any` values to contract views in a single hash probe.
//!
//! Conformances and descriptors are owned by "keeper" structures (see the
//! `registry` module). A keeper reports whether something was previously kept,
//! so declaring the same conformance twice is harmless.
//!
//! ## Modules
//! * [`contract`] – Contract descriptors, members and the contract macros.
//! * [`conformance`] – Type descriptors and the audit of a type against a contract.
//! * [`registry`] – The conformance registry, narrowing and the registry report.
//! * [`existential`] – Values held without their concrete type.
//! * [`object`] – Reference semantics through shared handles with an identity.
//! * [`compose`] – Runtime compositions of several contracts.
//! * [`catalog`] – Contracts and conforming types covering each kind of requirement.
//! * [`game`] – A dice game reporting to a delegate.
//! * [`settings`] – Layered configuration for the demonstration binary.
//!
//! ## Quick Start
//! ```
//! use conformant::catalog::{self, HasValue, StructWithValue, ClassWithValue};
//! use conformant::existentials;
//!
//! let registry = catalog::registry().unwrap();
//! let values = existentials![2_i64, StructWithValue::new(3), true, ClassWithValue::new(6), "Word"];
//! let found: Vec<i64> = registry
//!     .matches::<dyn HasValue>(&values)
//!     .iter()
//!     .map(|value| value.value())
//!     .collect();
//! assert_eq!(found, vec![3, 6]);
//! ```
//!
//! ## Status
//! Runtime narrowing only knows about conformances that have been declared on
//! the registry. A type that implements a contract trait but was never
//! declared does not narrow.

pub mod catalog;
pub mod compose;
pub mod conformance;
pub mod contract;
pub mod error;
pub mod existential;
pub mod game;
pub mod object;
pub mod registry;
pub mod settings;

pub use error::{ConformantError, Result};

// used by the contract! expansion
#[doc(hidden)]
pub use lazy_static::lazy_static;
