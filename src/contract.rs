//! Contract descriptors.
//!
//! A contract is an ordinary Rust trait. What the compiler knows about it is
//! mirrored by a [`ContractDescriptor`]: the contract's name, its member
//! requirements, the contracts it inherits from and whether it is restricted
//! to reference types. The descriptor is what the registry reports and what
//! [`crate::conformance::verify`] audits type descriptors against.
//!
//! A trait becomes a contract through the [`contract!`](crate::contract!)
//! macro, which implements [`Contract`] for `dyn Trait`. A type that
//! implements the trait is made castable by the registry with
//! [`conforms!`](crate::conforms!).

use std::fmt;

use serde::{Serialize, Serializer};

// ------------- Access -------------
// Ordered so that a stronger access compares greater than a weaker one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Access {
    Get,
    GetSet,
}
impl Access {
    /// Read-write satisfies read-only, but not the other way around.
    pub fn satisfies(self, required: Access) -> bool {
        self >= required
    }
}
impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Access::Get => write!(f, "{{ get }}"),
            Access::GetSet => write!(f, "{{ get set }}"),
        }
    }
}

// ------------- Member -------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberKind {
    Property,
    Method,
    TypeMember,
    Initializer,
}

/// A member a contract requires, or a member a type provides.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Member {
    Property {
        name: &'static str,
        value_type: &'static str,
        access: Access,
    },
    Method {
        name: &'static str,
        parameters: Vec<&'static str>,
        returns: &'static str,
        mutating: bool,
    },
    TypeMember {
        name: &'static str,
        signature: &'static str,
    },
    Initializer {
        name: &'static str,
        parameters: Vec<&'static str>,
    },
}

impl Member {
    pub fn property(name: &'static str, value_type: &'static str, access: Access) -> Self {
        Member::Property {
            name,
            value_type,
            access,
        }
    }
    pub fn method(name: &'static str, parameters: &[&'static str], returns: &'static str) -> Self {
        Member::Method {
            name,
            parameters: parameters.to_vec(),
            returns,
            mutating: false,
        }
    }
    /// A method that needs exclusive access to its receiver.
    pub fn mutating_method(
        name: &'static str,
        parameters: &[&'static str],
        returns: &'static str,
    ) -> Self {
        Member::Method {
            name,
            parameters: parameters.to_vec(),
            returns,
            mutating: true,
        }
    }
    pub fn type_member(name: &'static str, signature: &'static str) -> Self {
        Member::TypeMember { name, signature }
    }
    pub fn initializer(name: &'static str, parameters: &[&'static str]) -> Self {
        Member::Initializer {
            name,
            parameters: parameters.to_vec(),
        }
    }
    pub fn name(&self) -> &'static str {
        match self {
            Member::Property { name, .. }
            | Member::Method { name, .. }
            | Member::TypeMember { name, .. }
            | Member::Initializer { name, .. } => *name,
        }
    }
    pub fn kind(&self) -> MemberKind {
        match self {
            Member::Property { .. } => MemberKind::Property,
            Member::Method { .. } => MemberKind::Method,
            Member::TypeMember { .. } => MemberKind::TypeMember,
            Member::Initializer { .. } => MemberKind::Initializer,
        }
    }
    // members are identified by kind and name, so a property and a method may share a name
    pub(crate) fn same_slot(&self, other: &Member) -> bool {
        self.kind() == other.kind() && self.name() == other.name()
    }
}
impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Member::Property {
                name,
                value_type,
                access,
            } => write!(f, "property {}: {} {}", name, value_type, access),
            Member::Method {
                name,
                parameters,
                returns,
                mutating,
            } => {
                let receiver = if *mutating { "&mut self" } else { "&self" };
                let mut signature = vec![receiver];
                signature.extend(parameters.iter().copied());
                write!(f, "fn {}({}) -> {}", name, signature.join(", "), returns)
            }
            Member::TypeMember { name, signature } => write!(f, "type member {}: {}", name, signature),
            Member::Initializer { name, parameters } => {
                write!(f, "init {}({})", name, parameters.join(", "))
            }
        }
    }
}

// ------------- ContractDescriptor -------------
#[derive(Debug, Clone, Serialize)]
pub struct ContractDescriptor {
    name: &'static str,
    requirements: Vec<Member>,
    // members an implementer may leave out, checked only when provided
    optional: Vec<Member>,
    #[serde(serialize_with = "parent_names")]
    parents: Vec<&'static ContractDescriptor>,
    reference_only: bool,
}

fn parent_names<S: Serializer>(
    parents: &[&'static ContractDescriptor],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(parents.iter().map(|parent| parent.name()))
}

impl ContractDescriptor {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            requirements: Vec::new(),
            optional: Vec::new(),
            parents: Vec::new(),
            reference_only: false,
        }
    }
    pub fn require(mut self, member: Member) -> Self {
        self.requirements.push(member);
        self
    }
    pub fn offer(mut self, member: Member) -> Self {
        self.optional.push(member);
        self
    }
    pub fn inherits(mut self, parent: &'static ContractDescriptor) -> Self {
        self.parents.push(parent);
        self
    }
    pub fn reference_only(mut self) -> Self {
        self.reference_only = true;
        self
    }
    pub fn name(&self) -> &'static str {
        self.name
    }
    /// Requirements declared directly on this contract.
    pub fn requirements(&self) -> &[Member] {
        &self.requirements
    }
    pub fn optional(&self) -> &[Member] {
        &self.optional
    }
    pub fn parents(&self) -> &[&'static ContractDescriptor] {
        &self.parents
    }
    /// Restricted either directly or through any ancestor.
    pub fn is_reference_only(&self) -> bool {
        self.reference_only || self.parents.iter().any(|parent| parent.is_reference_only())
    }
    /// The union of inherited and own requirements, ancestors first.
    ///
    /// When a contract redeclares an inherited member, the redeclaration
    /// replaces the inherited one in place.
    pub fn effective_requirements(&self) -> Vec<&Member> {
        let mut effective: Vec<&Member> = Vec::new();
        for parent in &self.parents {
            for member in parent.effective_requirements() {
                merge(&mut effective, member);
            }
        }
        for member in &self.requirements {
            merge(&mut effective, member);
        }
        effective
    }
    pub fn effective_optional(&self) -> Vec<&Member> {
        let mut effective: Vec<&Member> = Vec::new();
        for parent in &self.parents {
            for member in parent.effective_optional() {
                merge(&mut effective, member);
            }
        }
        for member in &self.optional {
            merge(&mut effective, member);
        }
        effective
    }
    /// Every ancestor, depth first, each listed once.
    pub fn lineage(&self) -> Vec<&'static ContractDescriptor> {
        let mut lineage: Vec<&'static ContractDescriptor> = Vec::new();
        for parent in &self.parents {
            for ancestor in parent.lineage().into_iter().chain(std::iter::once(*parent)) {
                if !lineage.iter().any(|kept| kept.name == ancestor.name) {
                    lineage.push(ancestor);
                }
            }
        }
        lineage
    }
    pub fn extends(&self, name: &str) -> bool {
        self.lineage().iter().any(|ancestor| ancestor.name == name)
    }
}

fn merge<'a>(effective: &mut Vec<&'a Member>, member: &'a Member) {
    match effective.iter().position(|kept| kept.same_slot(member)) {
        Some(index) => effective[index] = member,
        None => effective.push(member),
    }
}

impl PartialEq for ContractDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.requirements == other.requirements
            && self.optional == other.optional
            && self.reference_only == other.reference_only
            && self.parents.len() == other.parents.len()
            && self
                .parents
                .iter()
                .zip(other.parents.iter())
                .all(|(a, b)| a.name == b.name)
    }
}
impl Eq for ContractDescriptor {}

impl fmt::Display for ContractDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.parents.is_empty() {
            let parents: Vec<&str> = self.parents.iter().map(|parent| parent.name).collect();
            write!(f, ": {}", parents.join(" + "))?;
        }
        if self.reference_only {
            write!(f, " (reference types only)")?;
        }
        Ok(())
    }
}

// ------------- Contract -------------
/// Implemented for `dyn Trait` of every trait that acts as a contract.
pub trait Contract: 'static {
    fn descriptor() -> &'static ContractDescriptor;
}

/// Turns a trait into a contract.
///
/// ```
/// use conformant::contract;
/// use conformant::contract::{Access, Contract, ContractDescriptor, Member};
///
/// pub trait Labelled {
///     fn label(&self) -> String;
/// }
/// contract!(Labelled => ContractDescriptor::new("Labelled")
///     .require(Member::property("label", "String", Access::Get)));
///
/// assert_eq!(<dyn Labelled as Contract>::descriptor().name(), "Labelled");
/// ```
#[macro_export]
macro_rules! contract {
    ($contract:ident => $descriptor:expr) => {
        impl $crate::contract::Contract for dyn $contract {
            fn descriptor() -> &'static $crate::contract::ContractDescriptor {
                $crate::lazy_static! {
                    static ref DESCRIPTOR: $crate::contract::ContractDescriptor = $descriptor;
                }
                &*DESCRIPTOR
            }
        }
    };
}

/// Declares that a type conforms to one or more contracts, making it castable
/// by a [`ConformanceRegistry`](crate::registry::ConformanceRegistry).
///
/// The expansion coerces the type to each contract object, so naming a
/// contract the type does not implement is a compile error.
///
/// ```
/// use conformant::{contract, conforms};
/// use conformant::contract::{Access, ContractDescriptor, Member};
/// use conformant::registry::ConformanceRegistry;
///
/// pub trait Labelled {
///     fn label(&self) -> String;
/// }
/// contract!(Labelled => ContractDescriptor::new("Labelled")
///     .require(Member::property("label", "String", Access::Get)));
///
/// struct Tag(&'static str);
/// impl Labelled for Tag {
///     fn label(&self) -> String { self.0.to_string() }
/// }
/// conforms!(Tag => Labelled);
///
/// let registry = ConformanceRegistry::new();
/// registry.declare::<Tag, dyn Labelled>().unwrap();
/// let tag = Tag("fragile");
/// let view = registry.narrow::<dyn Labelled>(&tag).unwrap();
/// assert_eq!(view.label(), "fragile");
/// ```
///
/// ```compile_fail
/// use conformant::{contract, conforms};
/// use conformant::contract::ContractDescriptor;
///
/// pub trait Labelled {
///     fn label(&self) -> String;
/// }
/// contract!(Labelled => ContractDescriptor::new("Labelled"));
///
/// struct Untagged;
/// conforms!(Untagged => Labelled);
/// ```
#[macro_export]
macro_rules! conforms {
    ($ty:ty => $($contract:ident),+ $(,)?) => {
        $(
            impl $crate::registry::Conforms<dyn $contract> for $ty {
                fn as_contract(&self) -> &(dyn $contract + 'static) {
                    self
                }
                fn as_contract_mut(&mut self) -> &mut (dyn $contract + 'static) {
                    self
                }
                fn into_contract(
                    self: ::std::sync::Arc<Self>,
                ) -> ::std::sync::Arc<dyn $contract + 'static> {
                    self
                }
            }
        )+
    };
}
