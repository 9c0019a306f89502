//! Claims Domain
//!
//! Claim intake, review decisions, and settlement. A claim moves from
//! submitted through review to approval or rejection, and an approved
//! claim is closed by payment.

pub mod claim;
pub mod error;
pub mod intake;

pub use claim::{Claim, ClaimStatus, DEFAULT_PROCESSING_DAYS};
pub use error::ClaimError;
pub use intake::validate_against_policy;
