//! Policy domain errors

use thiserror::Error;

/// Errors raised by policy operations
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("Invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Missing required field: {0}")]
    MissingRequiredField(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Beneficiary percentages must total 100, got {0}")]
    BeneficiaryPercentages(rust_decimal::Decimal),

    #[error("Policy term is invalid: {0}")]
    InvalidTerm(String),
}
