//! Shared test infrastructure for the Coverline test suite
//!
//! - `fixtures`: canonical users, policies, installments, and claims
//! - `builders`: fluent construction of test aggregates with sensible
//!   defaults
//! - `assertions`: domain-aware assertion helpers

pub mod assertions;
pub mod builders;
pub mod fixtures;

pub use assertions::*;
pub use builders::*;
pub use fixtures::*;
