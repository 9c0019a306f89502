//! API middleware

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use tracing::{info, warn};

use core_kernel::CallerIdentity;

use crate::auth::{caller_from_claims, validate_token, TokenType};
use crate::error::ApiError;
use crate::AppState;

/// Authentication middleware
///
/// Validates the bearer token and inserts the resulting [`CallerIdentity`]
/// into request extensions for handlers to extract.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) if header.starts_with("Bearer ") => &header[7..],
        _ => {
            warn!("Missing or invalid Authorization header");
            return Err(ApiError::Unauthorized);
        }
    };

    let claims = validate_token(token, &state.config.jwt_secret, TokenType::Access)
        .map_err(|e| {
            warn!(error = %e, "Token validation failed");
            ApiError::Unauthorized
        })?;

    let caller = caller_from_claims(&claims).map_err(|_| ApiError::Unauthorized)?;
    request.extensions_mut().insert(caller);

    Ok(next.run(request).await)
}

/// Audit logging middleware
///
/// Logs every API request with its caller, outcome, and latency.
pub async fn audit_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let caller = request
        .extensions()
        .get::<CallerIdentity>()
        .map(|c| c.user_id.to_string())
        .unwrap_or_else(|| "anonymous".to_string());

    let start = Utc::now();
    let response = next.run(request).await;
    let duration = Utc::now() - start;

    info!(
        method = %method,
        uri = %uri,
        caller = %caller,
        status = response.status().as_u16(),
        duration_ms = duration.num_milliseconds(),
        "API request"
    );

    response
}
