//! Request handlers

pub mod admin;
pub mod auth;
pub mod claims;
pub mod health;
pub mod payments;
pub mod policies;
pub mod premiums;
pub mod users;

use core_kernel::CallerIdentity;

use crate::error::ApiError;

/// Guards an admin-only operation
pub(crate) fn require_admin(caller: &CallerIdentity) -> Result<(), ApiError> {
    if caller.role.is_admin() {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "Administrator access required".to_string(),
        ))
    }
}

/// Guards an operation reserved for claim reviewers (agents and admins)
pub(crate) fn require_reviewer(caller: &CallerIdentity) -> Result<(), ApiError> {
    if caller.role.can_review_claims() {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "Reviewer access required".to_string(),
        ))
    }
}
