//! Identity Domain
//!
//! User accounts for the insurance administration system: registration,
//! credential verification with Argon2, role assignment, and the
//! failed-login lockout policy.

pub mod error;
pub mod password;
pub mod user;

pub use error::IdentityError;
pub use password::{hash_password, verify_password};
pub use user::{User, LOCKOUT_DURATION_HOURS, MAX_FAILED_LOGIN_ATTEMPTS};
