use thiserror::Error;

use crate::conformance::ContractViolation;

#[derive(Error, Debug)]
pub enum ConformantError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("Contract violation: {0}")]
    Violation(#[from] ContractViolation),
    #[error("{type_name} must conform to {parent} before it can conform to {contract}")]
    MissingParent {
        type_name: &'static str,
        contract: &'static str,
        parent: &'static str,
    },
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Internal invariant violated: {0}")]
    Invariant(String),
}

pub type Result<T> = std::result::Result<T, ConformantError>;

// Helper conversions
impl From<config::ConfigError> for ConformantError {
    fn from(e: config::ConfigError) -> Self { Self::Config(e.to_string()) }
}
impl From<serde_json::Error> for ConformantError {
    fn from(e: serde_json::Error) -> Self { Self::Serialization(e.to_string()) }
}
