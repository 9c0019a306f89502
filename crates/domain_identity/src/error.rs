//! Identity domain errors

use thiserror::Error;

/// Errors raised by identity operations
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("User already exists with this email")]
    EmailAlreadyRegistered,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Account is locked until {0}")]
    AccountLocked(chrono::DateTime<chrono::Utc>),

    #[error("Account is deactivated")]
    AccountDeactivated,

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Validation error: {0}")]
    Validation(String),
}
