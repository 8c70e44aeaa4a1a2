//! The conformance registry.
//!
//! Rust has no built-in way to ask a `dyn Any` whether its concrete type
//! implements some trait. The registry answers that question: for every
//! declared (type, contract) pair it keeps a caster that turns the erased
//! value back into the contract object. Looking a caster up is a single hash
//! probe on the value's `TypeId`, and a failed lookup is simply `None`.
//!
//! Descriptors and conformances are owned by keepers, in the same manner as
//! the rest of the crate: a keeper reports whether something was previously
//! kept, and the registry wires the keepers together.

use std::any::{Any, TypeId};
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::BuildHasherDefault;
use std::sync::{Arc, PoisonError, RwLock};

use lazy_static::lazy_static;
use seahash::SeaHasher;
use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::compose::Composition;
use crate::conformance::{verify, Described};
use crate::contract::{Contract, ContractDescriptor, Member};
use crate::error::{ConformantError, Result};
use crate::existential::Existential;

pub type TypeHasher = BuildHasherDefault<SeaHasher>;

lazy_static! {
    static ref SHORT_TYPE_NAMES: RwLock<HashMap<&'static str, &'static str, TypeHasher>> =
        RwLock::new(HashMap::default());
}

/// Strips module paths, `conformant::catalog::Circle` becomes `Circle` and
/// `&alloc::vec::Vec<conformant::catalog::Circle>` becomes `&Vec<Circle>`.
pub fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    if full.chars().all(|c| c.is_alphanumeric() || c == '_' || c == ':') {
        return full.rsplit("::").next().unwrap_or(full);
    }
    // composite names are shortened once per type and kept for the process
    if let Some(short) = SHORT_TYPE_NAMES
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(full)
    {
        return short;
    }
    let mut names = SHORT_TYPE_NAMES
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    names
        .entry(full)
        .or_insert_with(|| Box::leak(shorten_paths(full).into_boxed_str()))
}

fn shorten_paths(full: &str) -> String {
    let mut short = String::with_capacity(full.len());
    // where the path currently being copied starts in `short`
    let mut path_start = 0;
    let mut chars = full.chars().peekable();
    while let Some(c) = chars.next() {
        if c == ':' && chars.peek() == Some(&':') {
            chars.next();
            short.truncate(path_start);
        } else {
            short.push(c);
            if !(c.is_alphanumeric() || c == '_') {
                path_start = short.len();
            }
        }
    }
    short
}

// ------------- Conforms -------------
/// Implemented through [`conforms!`](crate::conforms!) for every type that
/// declares conformance to the contract `C`.
pub trait Conforms<C: ?Sized>: Any + Send + Sync {
    fn as_contract(&self) -> &C;
    fn as_contract_mut(&mut self) -> &mut C;
    fn into_contract(self: Arc<Self>) -> Arc<C>;
}

// ------------- Caster -------------
pub struct Caster<C: ?Sized + 'static> {
    by_ref: fn(&dyn Any) -> Option<&C>,
    by_mut: fn(&mut dyn Any) -> Option<&mut C>,
    shared: fn(Arc<dyn Any + Send + Sync>) -> Option<Arc<C>>,
}
impl<C: ?Sized + 'static> Caster<C> {
    fn of<T: Conforms<C>>() -> Self {
        Self {
            by_ref: cast_ref::<T, C>,
            by_mut: cast_mut::<T, C>,
            shared: cast_shared::<T, C>,
        }
    }
}
impl<C: ?Sized + 'static> Clone for Caster<C> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<C: ?Sized + 'static> Copy for Caster<C> {}

fn cast_ref<T: Conforms<C>, C: ?Sized + 'static>(value: &dyn Any) -> Option<&C> {
    value.downcast_ref::<T>().map(|concrete| concrete.as_contract())
}
fn cast_mut<T: Conforms<C>, C: ?Sized + 'static>(value: &mut dyn Any) -> Option<&mut C> {
    value.downcast_mut::<T>().map(|concrete| concrete.as_contract_mut())
}
fn cast_shared<T: Conforms<C>, C: ?Sized + 'static>(
    value: Arc<dyn Any + Send + Sync>,
) -> Option<Arc<C>> {
    value
        .downcast::<T>()
        .ok()
        .map(|concrete| <T as Conforms<C>>::into_contract(concrete))
}

// ------------- Conformance -------------
pub struct Conformance {
    type_id: TypeId,
    type_name: &'static str,
    contract_id: TypeId,
    contract: &'static ContractDescriptor,
    // always a Caster<C> for the contract identified by contract_id
    caster: Box<dyn Any + Send + Sync>,
}
impl Conformance {
    pub fn new<T: Conforms<C>, C: Contract + ?Sized>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: short_type_name::<T>(),
            contract_id: TypeId::of::<C>(),
            contract: C::descriptor(),
            caster: Box::new(Caster::<C>::of::<T>()),
        }
    }
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
    pub fn contract(&self) -> &'static ContractDescriptor {
        self.contract
    }
}
impl fmt::Debug for Conformance {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.type_name, self.contract.name())
    }
}

#[derive(Debug)]
pub struct ConformanceKeeper {
    kept: HashMap<(TypeId, TypeId), Conformance, TypeHasher>,
    // lets parent checks work from descriptor names alone
    named: HashSet<(TypeId, &'static str), TypeHasher>,
    // declaration order, so reports come out stable
    order: Vec<(TypeId, TypeId)>,
}
impl ConformanceKeeper {
    pub fn new() -> Self {
        Self {
            kept: HashMap::default(),
            named: HashSet::default(),
            order: Vec::new(),
        }
    }
    pub fn keep(&mut self, conformance: Conformance) -> bool {
        let key = (conformance.type_id, conformance.contract_id);
        match self.kept.entry(key) {
            Entry::Occupied(_) => true,
            Entry::Vacant(e) => {
                self.named
                    .insert((conformance.type_id, conformance.contract.name()));
                self.order.push(key);
                e.insert(conformance);
                false
            }
        }
    }
    pub fn caster<C: ?Sized + 'static>(&self, type_id: TypeId) -> Option<Caster<C>> {
        self.kept
            .get(&(type_id, TypeId::of::<C>()))
            .and_then(|conformance| conformance.caster.downcast_ref::<Caster<C>>())
            .copied()
    }
    pub fn contains(&self, type_id: TypeId, contract_id: TypeId) -> bool {
        self.kept.contains_key(&(type_id, contract_id))
    }
    pub fn contains_named(&self, type_id: TypeId, contract: &'static str) -> bool {
        self.named.contains(&(type_id, contract))
    }
    pub fn iter(&self) -> impl Iterator<Item = &Conformance> {
        self.order.iter().filter_map(|key| self.kept.get(key))
    }
    pub fn len(&self) -> usize {
        self.kept.len()
    }
    pub fn is_empty(&self) -> bool {
        self.kept.is_empty()
    }
}
impl Default for ConformanceKeeper {
    fn default() -> Self {
        Self::new()
    }
}

// ------------- ContractKeeper -------------
#[derive(Debug)]
pub struct ContractKeeper {
    kept: HashMap<&'static str, &'static ContractDescriptor, TypeHasher>,
    order: Vec<&'static str>,
}
impl ContractKeeper {
    pub fn new() -> Self {
        Self {
            kept: HashMap::default(),
            order: Vec::new(),
        }
    }
    /// Keeps the descriptor together with its ancestors. Two different
    /// descriptors may not share a name.
    pub fn keep(&mut self, descriptor: &'static ContractDescriptor) -> Result<bool> {
        for ancestor in descriptor.lineage() {
            self.keep_one(ancestor)?;
        }
        self.keep_one(descriptor)
    }
    fn keep_one(&mut self, descriptor: &'static ContractDescriptor) -> Result<bool> {
        match self.kept.entry(descriptor.name()) {
            Entry::Occupied(e) => {
                if *e.get() != descriptor {
                    return Err(ConformantError::Invariant(format!(
                        "two different contracts are named {}",
                        descriptor.name()
                    )));
                }
                Ok(true)
            }
            Entry::Vacant(e) => {
                e.insert(descriptor);
                self.order.push(descriptor.name());
                Ok(false)
            }
        }
    }
    pub fn get(&self, name: &str) -> Option<&'static ContractDescriptor> {
        self.kept.get(name).copied()
    }
    pub fn iter(&self) -> impl Iterator<Item = &'static ContractDescriptor> + '_ {
        self.order.iter().filter_map(|name| self.kept.get(name).copied())
    }
    pub fn len(&self) -> usize {
        self.kept.len()
    }
    pub fn is_empty(&self) -> bool {
        self.kept.is_empty()
    }
}
impl Default for ContractKeeper {
    fn default() -> Self {
        Self::new()
    }
}

// ------------- ConformanceRegistry -------------
pub struct ConformanceRegistry {
    contract_keeper: Arc<RwLock<ContractKeeper>>,
    conformance_keeper: Arc<RwLock<ConformanceKeeper>>,
}

impl ConformanceRegistry {
    pub fn new() -> Self {
        Self {
            contract_keeper: Arc::new(RwLock::new(ContractKeeper::new())),
            conformance_keeper: Arc::new(RwLock::new(ConformanceKeeper::new())),
        }
    }
    pub fn contract_keeper(&self) -> Arc<RwLock<ContractKeeper>> {
        Arc::clone(&self.contract_keeper)
    }
    pub fn conformance_keeper(&self) -> Arc<RwLock<ConformanceKeeper>> {
        Arc::clone(&self.conformance_keeper)
    }

    /// Records that `T` conforms to `C`. Every ancestor of `C` must already be
    /// declared for `T`. Returns whether the conformance was previously kept.
    pub fn declare<T, C>(&self) -> Result<bool>
    where
        T: Conforms<C>,
        C: Contract + ?Sized,
    {
        let contract = C::descriptor();
        let type_id = TypeId::of::<T>();
        let type_name = short_type_name::<T>();
        self.contract_keeper
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .keep(contract)?;
        let mut keeper = self
            .conformance_keeper
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(parent) = contract
            .lineage()
            .into_iter()
            .find(|parent| !keeper.contains_named(type_id, parent.name()))
        {
            warn!(type_name, contract = contract.name(), parent = parent.name(), "conformance declared before its parent");
            return Err(ConformantError::MissingParent {
                type_name,
                contract: contract.name(),
                parent: parent.name(),
            });
        }
        let previously_kept = keeper.keep(Conformance::new::<T, C>());
        debug!(type_name, contract = contract.name(), previously_kept, "declared conformance");
        Ok(previously_kept)
    }

    /// Audits the published description of `T` against `C` before declaring.
    pub fn declare_described<T, C>(&self) -> Result<bool>
    where
        T: Conforms<C> + Described,
        C: Contract + ?Sized,
    {
        let described = T::describe();
        if let Err(violation) = verify(&described, C::descriptor()) {
            warn!(%violation, "rejected conformance");
            return Err(violation.into());
        }
        self.declare::<T, C>()
    }

    fn caster<C: ?Sized + 'static>(&self, type_id: TypeId) -> Option<Caster<C>> {
        self.conformance_keeper
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .caster::<C>(type_id)
    }

    /// Views the value through the contract, or `None` when its type has not
    /// declared conformance.
    pub fn narrow<'v, C: Contract + ?Sized>(&self, value: &'v dyn Any) -> Option<&'v C> {
        match self.caster::<C>(value.type_id()) {
            Some(caster) => (caster.by_ref)(value),
            None => {
                trace!(contract = C::descriptor().name(), "value does not conform");
                None
            }
        }
    }
    pub fn narrow_mut<'v, C: Contract + ?Sized>(&self, value: &'v mut dyn Any) -> Option<&'v mut C> {
        let type_id = (*value).type_id();
        let caster = self.caster::<C>(type_id)?;
        (caster.by_mut)(value)
    }
    /// Like [`narrow`](Self::narrow), but the returned handle shares the
    /// allocation of `value`.
    pub fn narrow_shared<C: Contract + ?Sized>(
        &self,
        value: Arc<dyn Any + Send + Sync>,
    ) -> Option<Arc<C>> {
        let type_id = (*value).type_id();
        let caster = self.caster::<C>(type_id)?;
        (caster.shared)(value)
    }
    pub fn conforms<C: Contract + ?Sized>(&self, value: &dyn Any) -> bool {
        self.conformance_keeper
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(value.type_id(), TypeId::of::<C>())
    }
    /// True when the value conforms to every contract of the composition.
    pub fn conforms_to(&self, value: &dyn Any, composition: &Composition) -> bool {
        let type_id = value.type_id();
        let keeper = self
            .conformance_keeper
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        composition
            .contract_ids()
            .all(|contract_id| keeper.contains(type_id, contract_id))
    }
    pub fn narrow_both<'v, A, B>(&self, value: &'v dyn Any) -> Option<(&'v A, &'v B)>
    where
        A: Contract + ?Sized,
        B: Contract + ?Sized,
    {
        Some((self.narrow::<A>(value)?, self.narrow::<B>(value)?))
    }

    // ------------- sequences -------------
    /// One entry per value, in order.
    pub fn narrow_each<'v, C: Contract + ?Sized>(
        &self,
        values: &'v [Existential],
    ) -> Vec<Option<&'v C>> {
        values
            .iter()
            .map(|value| self.narrow::<C>(value.as_any()))
            .collect()
    }
    /// Only the values that conform, in order.
    pub fn matches<'v, C: Contract + ?Sized>(&self, values: &'v [Existential]) -> Vec<&'v C> {
        values
            .iter()
            .filter_map(|value| self.narrow::<C>(value.as_any()))
            .collect()
    }
    pub fn test_each<C: Contract + ?Sized>(&self, values: &[Existential]) -> Vec<bool> {
        values
            .iter()
            .map(|value| self.conforms::<C>(value.as_any()))
            .collect()
    }

    // ------------- introspection -------------
    pub fn contracts_of(&self, type_id: TypeId) -> Vec<&'static str> {
        self.conformance_keeper
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|conformance| conformance.type_id == type_id)
            .map(|conformance| conformance.contract.name())
            .collect()
    }
    pub fn conformers_of<C: Contract + ?Sized>(&self) -> Vec<&'static str> {
        let contract_id = TypeId::of::<C>();
        self.conformance_keeper
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|conformance| conformance.contract_id == contract_id)
            .map(|conformance| conformance.type_name)
            .collect()
    }
    pub fn contract(&self, name: &str) -> Option<&'static ContractDescriptor> {
        self.contract_keeper
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
    }
    pub fn report(&self) -> Report {
        let contracts = self
            .contract_keeper
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let conformances = self
            .conformance_keeper
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let entries = contracts
            .iter()
            .map(|descriptor| ContractEntry {
                name: descriptor.name(),
                parents: descriptor.parents().iter().map(|parent| parent.name()).collect(),
                reference_only: descriptor.is_reference_only(),
                requirements: descriptor
                    .effective_requirements()
                    .into_iter()
                    .cloned()
                    .collect(),
                optional: descriptor.effective_optional().into_iter().cloned().collect(),
                conformers: conformances
                    .iter()
                    .filter(|conformance| conformance.contract.name() == descriptor.name())
                    .map(|conformance| conformance.type_name)
                    .collect(),
            })
            .collect();
        Report { contracts: entries }
    }
}
impl Default for ConformanceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ------------- Report -------------
#[derive(Debug, Clone, Serialize)]
pub struct ContractEntry {
    pub name: &'static str,
    pub parents: Vec<&'static str>,
    pub reference_only: bool,
    pub requirements: Vec<Member>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub optional: Vec<Member>,
    pub conformers: Vec<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub contracts: Vec<ContractEntry>,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for entry in &self.contracts {
            write!(f, "{}", entry.name)?;
            if !entry.parents.is_empty() {
                write!(f, ": {}", entry.parents.join(" + "))?;
            }
            if entry.reference_only {
                write!(f, " (reference types only)")?;
            }
            writeln!(f)?;
            for requirement in &entry.requirements {
                writeln!(f, "    {}", requirement)?;
            }
            for optional in &entry.optional {
                writeln!(f, "    optional {}", optional)?;
            }
            if entry.conformers.is_empty() {
                writeln!(f, "    conformers: none")?;
            } else {
                writeln!(f, "    conformers: {}", entry.conformers.join(", "))?;
            }
        }
        Ok(())
    }
}
