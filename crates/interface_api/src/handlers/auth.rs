//! Authentication handlers
//!
//! Registration, login with lockout bookkeeping, token refresh, and
//! self-service profile operations.

use axum::{extract::State, http::StatusCode, Extension, Json};
use chrono::Utc;
use serde_json::json;
use tracing::info;

use core_kernel::{CallerIdentity, Role};
use domain_identity::{hash_password, verify_password, IdentityError, User};
use infra_db::DatabaseError;

use crate::auth::{caller_from_claims, issue_token_pair, validate_token, TokenType};
use crate::dto::auth::{
    AuthResponse, ChangePasswordRequest, LoginRequest, RefreshRequest, RegisterRequest,
    UpdateProfileRequest, UserResponse,
};
use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::validation::validate_request;
use crate::AppState;

/// POST /api/v1/auth/register
///
/// Public self-registration always yields a customer account; staff
/// accounts are created by administrators.
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthResponse>>), ApiError> {
    validate_request(&request)?;

    let mut user = User::register(
        &request.email,
        &request.password,
        &request.full_name,
        Role::Customer,
    )?;
    user.phone = request.phone;

    state.users().insert(&user).await.map_err(|e| match e {
        DatabaseError::DuplicateEntry(_) => {
            ApiError::from(IdentityError::EmailAlreadyRegistered)
        }
        other => ApiError::from(other),
    })?;

    state.mailer.send(
        &user.email,
        "welcome",
        json!({ "full_name": user.full_name }),
    );

    let tokens = issue_token_pair(
        &user,
        &state.config.jwt_secret,
        state.config.access_token_secs,
        state.config.refresh_token_secs,
    )
    .map_err(|e| ApiError::Internal(e.to_string()))?;

    info!(user_id = %user.id, "User registered");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(AuthResponse {
            user: UserResponse::from(&user),
            tokens,
        })),
    ))
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, ApiError> {
    validate_request(&request)?;
    let now = Utc::now();

    let mut user = state
        .users()
        .find_by_email(&request.email)
        .await?
        .ok_or(ApiError::from(IdentityError::InvalidCredentials))?;

    user.check_can_authenticate(now).map_err(ApiError::from)?;

    if !verify_password(&request.password, &user.password_hash) {
        user.record_failed_login(now);
        state.users().update(&user).await?;
        info!(user_id = %user.id, attempts = user.failed_login_attempts, "Login failed");
        return Err(IdentityError::InvalidCredentials.into());
    }

    user.record_successful_login(now);
    state.users().update(&user).await?;

    let tokens = issue_token_pair(
        &user,
        &state.config.jwt_secret,
        state.config.access_token_secs,
        state.config.refresh_token_secs,
    )
    .map_err(|e| ApiError::Internal(e.to_string()))?;

    info!(user_id = %user.id, "User logged in");
    Ok(Json(ApiResponse::ok(AuthResponse {
        user: UserResponse::from(&user),
        tokens,
    })))
}

/// POST /api/v1/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, ApiError> {
    validate_request(&request)?;

    let claims = validate_token(
        &request.refresh_token,
        &state.config.jwt_secret,
        TokenType::Refresh,
    )
    .map_err(|_| ApiError::Unauthorized)?;
    let caller = caller_from_claims(&claims).map_err(|_| ApiError::Unauthorized)?;

    // Re-load the account so a deactivation or lockout revokes refresh.
    let user = state.users().find_by_id(caller.user_id).await?;
    user.check_can_authenticate(Utc::now())
        .map_err(ApiError::from)?;

    let tokens = issue_token_pair(
        &user,
        &state.config.jwt_secret,
        state.config.access_token_secs,
        state.config.refresh_token_secs,
    )
    .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(ApiResponse::ok(AuthResponse {
        user: UserResponse::from(&user),
        tokens,
    })))
}

/// GET /api/v1/auth/me
pub async fn me(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let user = state.users().find_by_id(caller.user_id).await?;
    Ok(Json(ApiResponse::ok(UserResponse::from(&user))))
}

/// PUT /api/v1/auth/me
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    validate_request(&request)?;

    let mut user = state.users().find_by_id(caller.user_id).await?;
    user.update_profile(request.full_name, request.phone);
    state.users().update(&user).await?;

    Ok(Json(ApiResponse::with_message(
        UserResponse::from(&user),
        "Profile updated",
    )))
}

/// PUT /api/v1/auth/password
pub async fn change_password(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    validate_request(&request)?;

    let mut user = state.users().find_by_id(caller.user_id).await?;
    if !verify_password(&request.current_password, &user.password_hash) {
        return Err(ApiError::invalid_field(
            "current_password",
            "Current password is incorrect",
        ));
    }

    user.password_hash = hash_password(&request.new_password)?;
    user.updated_at = Utc::now();
    state.users().update(&user).await?;

    info!(user_id = %user.id, "Password changed");
    Ok(Json(ApiResponse::message("Password changed")))
}
