//! Auditing what a type provides against what a contract requires.
//!
//! The compiler is what actually refuses a type that does not satisfy a
//! contract trait. The audit here repeats that check on descriptors, so a
//! registry can refuse a declaration whose published description has drifted
//! from the contract it claims to satisfy.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::contract::{ContractDescriptor, Member};

// ------------- Semantics -------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Semantics {
    /// Copies are independent of each other.
    Value,
    /// Copies alias one shared instance with an identity.
    Reference,
}

// ------------- TypeDescriptor -------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeDescriptor {
    name: &'static str,
    semantics: Semantics,
    members: Vec<Member>,
}
impl TypeDescriptor {
    pub fn new(name: &'static str, semantics: Semantics) -> Self {
        Self {
            name,
            semantics,
            members: Vec::new(),
        }
    }
    pub fn provide(mut self, member: Member) -> Self {
        self.members.push(member);
        self
    }
    pub fn name(&self) -> &'static str {
        self.name
    }
    pub fn semantics(&self) -> Semantics {
        self.semantics
    }
    pub fn members(&self) -> &[Member] {
        &self.members
    }
    fn find(&self, required: &Member) -> Option<&Member> {
        self.members.iter().find(|member| member.same_slot(required))
    }
}
impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let semantics = match self.semantics {
            Semantics::Value => "value",
            Semantics::Reference => "reference",
        };
        write!(f, "{} ({} type)", self.name, semantics)
    }
}

/// Types that publish a description of their members.
pub trait Described {
    fn describe() -> TypeDescriptor;
}

// ------------- ContractViolation -------------
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContractViolation {
    #[error("{type_name} does not provide `{member}` required by {contract}")]
    MissingMember {
        type_name: &'static str,
        contract: &'static str,
        member: String,
    },
    #[error("{type_name} provides `{provided}` but {contract} requires `{required}`")]
    InsufficientAccess {
        type_name: &'static str,
        contract: &'static str,
        provided: String,
        required: String,
    },
    #[error("{type_name} provides `{provided}` but {contract} requires `{required}`")]
    SignatureMismatch {
        type_name: &'static str,
        contract: &'static str,
        provided: String,
        required: String,
    },
    #[error("{contract} is restricted to reference types but {type_name} has value semantics")]
    ValueSemantics {
        type_name: &'static str,
        contract: &'static str,
    },
}

/// Checks every requirement of `contract`, inherited ones included, against
/// the members `described` provides. The first unmet requirement is returned.
pub fn verify(
    described: &TypeDescriptor,
    contract: &ContractDescriptor,
) -> Result<(), ContractViolation> {
    let type_name = described.name();
    if contract.is_reference_only() && described.semantics() == Semantics::Value {
        return Err(ContractViolation::ValueSemantics {
            type_name,
            contract: contract.name(),
        });
    }
    for required in contract.effective_requirements() {
        match described.find(required) {
            Some(provided) => check(described, contract, provided, required)?,
            None => {
                return Err(ContractViolation::MissingMember {
                    type_name,
                    contract: contract.name(),
                    member: required.to_string(),
                });
            }
        }
    }
    // optional members may be absent, but must match when they are there
    for offered in contract.effective_optional() {
        if let Some(provided) = described.find(offered) {
            check(described, contract, provided, offered)?;
        }
    }
    Ok(())
}

fn check(
    described: &TypeDescriptor,
    contract: &ContractDescriptor,
    provided: &Member,
    required: &Member,
) -> Result<(), ContractViolation> {
    let compatible = match (provided, required) {
        (
            Member::Property {
                value_type: provided_type,
                access: provided_access,
                ..
            },
            Member::Property {
                value_type: required_type,
                access: required_access,
                ..
            },
        ) => {
            if provided_type != required_type {
                false
            } else if !provided_access.satisfies(*required_access) {
                return Err(ContractViolation::InsufficientAccess {
                    type_name: described.name(),
                    contract: contract.name(),
                    provided: provided.to_string(),
                    required: required.to_string(),
                });
            } else {
                true
            }
        }
        (
            Member::Method {
                parameters: provided_parameters,
                returns: provided_returns,
                mutating: provided_mutating,
                ..
            },
            Member::Method {
                parameters: required_parameters,
                returns: required_returns,
                mutating: required_mutating,
                ..
            },
        ) => {
            // a method that leaves its receiver alone satisfies a mutating
            // requirement, the reverse is not true
            provided_parameters == required_parameters
                && provided_returns == required_returns
                && (!provided_mutating || *required_mutating)
        }
        (
            Member::TypeMember {
                signature: provided_signature,
                ..
            },
            Member::TypeMember {
                signature: required_signature,
                ..
            },
        ) => provided_signature == required_signature,
        (
            Member::Initializer {
                parameters: provided_parameters,
                ..
            },
            Member::Initializer {
                parameters: required_parameters,
                ..
            },
        ) => provided_parameters == required_parameters,
        _ => false,
    };
    if compatible {
        Ok(())
    } else {
        Err(ContractViolation::SignatureMismatch {
            type_name: described.name(),
            contract: contract.name(),
            provided: provided.to_string(),
            required: required.to_string(),
        })
    }
}
