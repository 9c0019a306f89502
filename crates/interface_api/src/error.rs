//! API error handling
//!
//! Every error leaves the service as a JSON envelope:
//! `{ "status": "error", "message": ..., "errors": [...] }`
//! with the HTTP status carrying the class of failure.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use infra_db::DatabaseError;

/// One field-level validation failure
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    #[error("Unprocessable: {0}")]
    Unprocessable(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Convenience constructor for a single-field validation failure
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        ApiError::Validation(vec![FieldError {
            field: field.to_string(),
            message: message.into(),
        }])
    }
}

/// Error response envelope
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub status: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, errors) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Authentication required".to_string(),
                None,
            ),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg, None),
            ApiError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                "Validation failed".to_string(),
                Some(errors),
            ),
            ApiError::Unprocessable(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg, None),
            ApiError::Internal(msg) => {
                // Internal detail is logged, never leaked to the client.
                error!(detail = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
        };

        let body = ErrorResponse {
            status: "error",
            message,
            errors,
        };

        (status, Json(body)).into_response()
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(msg) => ApiError::NotFound(msg),
            DatabaseError::DuplicateEntry(msg) => ApiError::BadRequest(msg),
            DatabaseError::ConcurrentModification(msg) => ApiError::Conflict(msg),
            DatabaseError::ForeignKeyViolation(msg) => ApiError::BadRequest(msg),
            DatabaseError::ConstraintViolation(msg) => ApiError::Unprocessable(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<domain_identity::IdentityError> for ApiError {
    fn from(err: domain_identity::IdentityError) -> Self {
        use domain_identity::IdentityError;
        match err {
            IdentityError::EmailAlreadyRegistered => ApiError::BadRequest(err.to_string()),
            IdentityError::InvalidCredentials => ApiError::Unauthorized,
            IdentityError::AccountLocked(_) | IdentityError::AccountDeactivated => {
                ApiError::Forbidden(err.to_string())
            }
            IdentityError::Validation(msg) => ApiError::Unprocessable(msg),
            IdentityError::Hashing(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<domain_policy::PolicyError> for ApiError {
    fn from(err: domain_policy::PolicyError) -> Self {
        use domain_policy::PolicyError;
        match err {
            PolicyError::InvalidStateTransition { .. } => ApiError::Conflict(err.to_string()),
            other => ApiError::Unprocessable(other.to_string()),
        }
    }
}

impl From<domain_billing::BillingError> for ApiError {
    fn from(err: domain_billing::BillingError) -> Self {
        use domain_billing::BillingError;
        match err {
            BillingError::AlreadyPaid | BillingError::InvalidStateTransition { .. } => {
                ApiError::Conflict(err.to_string())
            }
            BillingError::InvalidSignature => ApiError::Unauthorized,
            BillingError::Gateway(msg) => ApiError::Internal(msg),
            other => ApiError::Unprocessable(other.to_string()),
        }
    }
}

impl From<domain_claims::ClaimError> for ApiError {
    fn from(err: domain_claims::ClaimError) -> Self {
        use domain_claims::ClaimError;
        match err {
            ClaimError::InvalidStatusTransition { .. } => ApiError::Conflict(err.to_string()),
            other => ApiError::Unprocessable(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_errors_map_to_status_classes() {
        let conflict: ApiError =
            DatabaseError::ConcurrentModification("premium already paid".to_string()).into();
        assert!(matches!(conflict, ApiError::Conflict(_)));

        let missing: ApiError = DatabaseError::not_found("Policy", "x").into();
        assert!(matches!(missing, ApiError::NotFound(_)));

        let duplicate: ApiError =
            DatabaseError::DuplicateEntry("users_email_key".to_string()).into();
        assert!(matches!(duplicate, ApiError::BadRequest(_)));
    }

    #[test]
    fn duplicate_email_is_a_bad_request() {
        let err = ApiError::from(domain_identity::IdentityError::EmailAlreadyRegistered);
        match &err {
            ApiError::BadRequest(msg) => {
                assert_eq!(msg, "User already exists with this email");
            }
            other => panic!("expected BadRequest, got {other:?}"),
        }
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn validation_failures_are_bad_requests() {
        let response = ApiError::invalid_field("email", "Email address is not valid")
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn internal_detail_is_not_leaked() {
        let response = ApiError::Internal("connection string with password".to_string())
            .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
