//! Claims domain errors

use thiserror::Error;

/// Errors raised by claim operations
#[derive(Debug, Error)]
pub enum ClaimError {
    #[error("Invalid state transition: {from} -> {to}")]
    InvalidStatusTransition { from: String, to: String },

    #[error("Claim amount exceeds policy coverage")]
    ExceedsCoverage,

    #[error("Claims can only be filed against active policies")]
    PolicyNotActive,

    #[error("Approved amount cannot exceed the claimed amount")]
    ApprovedAmountTooHigh,

    #[error("A rejection requires a reason")]
    MissingRejectionReason,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Money error: {0}")]
    Money(#[from] core_kernel::MoneyError),
}
