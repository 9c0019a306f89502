//! Policy Administration Domain
//!
//! The Policy aggregate: lifecycle (active, inactive, expired, cancelled),
//! coverage and premium terms, beneficiary designations, renewal and
//! cancellation, and next-premium-due scheduling.

pub mod beneficiary;
pub mod error;
pub mod policy;

pub use beneficiary::{validate_beneficiaries, Beneficiary};
pub use error::PolicyError;
pub use policy::{Policy, PolicyBuilder, PolicyKind, PolicyStatus, PremiumFrequency};
