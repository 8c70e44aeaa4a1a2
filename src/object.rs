//! Reference semantics.
//!
//! Rust values have no identity of their own, so a reference type here is a
//! type built on a [`Shared`] handle: clones alias one instance, and the
//! instance has an [`ObjectId`]. Contracts restricted to reference types use
//! [`Object`] as a supertrait.
//!
//! An object hands out the handle it is stored behind, and only [`Shared`]
//! is a [`Handle`]. The identity methods come from [`Identity`], which every
//! object gets and none can redefine. A plain value type therefore cannot
//! pass itself off as an object:
//!
//! ```compile_fail
//! use conformant::object::{Object, ObjectId};
//!
//! struct Point { x: i64, y: i64 }
//! impl Object for Point {
//!     fn object_id(&self) -> ObjectId { ObjectId(0) }
//! }
//! ```
//!
//! Nor can it borrow an identity from a handle it does not keep:
//!
//! ```compile_fail
//! use conformant::object::{Handle, Object, Shared};
//!
//! #[derive(Clone, Copy)]
//! struct Spot { latitude: f64, longitude: f64 }
//! impl Object for Spot {
//!     fn handle(&self) -> &dyn Handle { &Shared::new(()) }
//! }
//! ```

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::contract::{ContractDescriptor, Member};

static NEXT_OBJECT_ID: AtomicU64 = AtomicU64::new(1);

// Ids are never handed out twice, even after the instance is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(u64);

impl ObjectId {
    fn next() -> Self {
        ObjectId(NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// Seal Handle so that Shared stays its only implementation.
mod sealed {
    pub trait Sealed {}
    impl<T> Sealed for super::Shared<T> {}
}

/// Storage with an identity.
pub trait Handle: sealed::Sealed + Send + Sync {
    fn id(&self) -> ObjectId;
}

pub trait Object: Send + Sync + 'static {
    /// The handle the instance is stored behind.
    fn handle(&self) -> &dyn Handle;
}
crate::contract!(Object => ContractDescriptor::new("Object")
    .require(Member::method("handle", &[], "&dyn Handle"))
    .reference_only());

pub trait Identity {
    fn object_id(&self) -> ObjectId;
    fn same_object(&self, other: &dyn Object) -> bool;
}
impl<O: Object + ?Sized> Identity for O {
    fn object_id(&self) -> ObjectId {
        self.handle().id()
    }
    fn same_object(&self, other: &dyn Object) -> bool {
        self.object_id() == other.object_id()
    }
}

// ------------- Shared -------------
pub struct Shared<T> {
    cell: Arc<RwLock<T>>,
    id: ObjectId,
}

impl<T: Send + Sync + 'static> Shared<T> {
    pub fn new(value: T) -> Self {
        Self {
            cell: Arc::new(RwLock::new(value)),
            id: ObjectId::next(),
        }
    }
    // A panic while holding the lock cannot leave a plain value half written,
    // so poisoning is ignored.
    pub fn read(&self) -> RwLockReadGuard<'_, T> {
        self.cell.read().unwrap_or_else(PoisonError::into_inner)
    }
    pub fn write(&self) -> RwLockWriteGuard<'_, T> {
        self.cell.write().unwrap_or_else(PoisonError::into_inner)
    }
    pub fn ptr_eq(&self, other: &Shared<T>) -> bool {
        Arc::ptr_eq(&self.cell, &other.cell)
    }
    /// Number of live handles to the instance.
    pub fn handles(&self) -> usize {
        Arc::strong_count(&self.cell)
    }
}
impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Arc::clone(&self.cell),
            id: self.id,
        }
    }
}
impl<T: Send + Sync> Handle for Shared<T> {
    fn id(&self) -> ObjectId {
        self.id
    }
}
impl<T: Send + Sync + 'static> Object for Shared<T> {
    fn handle(&self) -> &dyn Handle {
        self
    }
}
impl<T: fmt::Debug + Send + Sync + 'static> fmt::Debug for Shared<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Shared")
            .field("id", &self.id)
            .field("value", &*self.read())
            .finish()
    }
}
