//! Billing domain errors

use thiserror::Error;

/// Errors raised by billing operations
#[derive(Debug, Error)]
pub enum BillingError {
    #[error("Invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Premium already paid")]
    AlreadyPaid,

    #[error("Premium is not yet past its due date")]
    NotPastDue,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Gateway error: {0}")]
    Gateway(String),

    #[error("Webhook signature verification failed")]
    InvalidSignature,

    #[error("Money error: {0}")]
    Money(#[from] core_kernel::MoneyError),
}
