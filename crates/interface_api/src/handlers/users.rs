//! User administration handlers (admin only)

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use tracing::info;
use uuid::Uuid;

use core_kernel::{CallerIdentity, Role, UserId};
use domain_identity::{IdentityError, User};
use infra_db::DatabaseError;

use crate::dto::auth::UserResponse;
use crate::dto::users::{CreateUserRequest, ListUsersQuery, SetActiveRequest};
use crate::dto::Pagination;
use crate::error::ApiError;
use crate::handlers::require_admin;
use crate::response::ApiResponse;
use crate::validation::validate_request;
use crate::AppState;

/// GET /api/v1/users
pub async fn list_users(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Query(query): Query<ListUsersQuery>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<ApiResponse<Vec<UserResponse>>>, ApiError> {
    require_admin(&caller)?;

    let role = query
        .role
        .as_deref()
        .map(|r| Role::parse(r).ok_or_else(|| ApiError::invalid_field("role", "Unknown role")))
        .transpose()?;

    let users = state
        .users()
        .list(role, pagination.limit(), pagination.offset())
        .await?;

    Ok(Json(ApiResponse::ok(
        users.iter().map(UserResponse::from).collect(),
    )))
}

/// GET /api/v1/users/:id
pub async fn get_user(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    require_admin(&caller)?;
    let user = state.users().find_by_id(UserId::from(id)).await?;
    Ok(Json(ApiResponse::ok(UserResponse::from(&user))))
}

/// POST /api/v1/users
///
/// Administrators create accounts with any role, which is how agent and
/// further admin accounts come into being.
pub async fn create_user(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), ApiError> {
    require_admin(&caller)?;
    validate_request(&request)?;

    let role = Role::parse(&request.role)
        .ok_or_else(|| ApiError::invalid_field("role", "Unknown role"))?;

    let mut user = User::register(&request.email, &request.password, &request.full_name, role)?;
    user.phone = request.phone;

    state.users().insert(&user).await.map_err(|e| match e {
        DatabaseError::DuplicateEntry(_) => {
            ApiError::from(IdentityError::EmailAlreadyRegistered)
        }
        other => ApiError::from(other),
    })?;

    info!(user_id = %user.id, role = role.as_str(), created_by = %caller.user_id, "User created");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(UserResponse::from(&user))),
    ))
}

/// PUT /api/v1/users/:id/activation
pub async fn set_active(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Path(id): Path<Uuid>,
    Json(request): Json<SetActiveRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    require_admin(&caller)?;

    let mut user = state.users().find_by_id(UserId::from(id)).await?;
    user.set_active(request.active);
    state.users().update(&user).await?;

    info!(user_id = %user.id, active = request.active, by = %caller.user_id, "Account toggled");
    Ok(Json(ApiResponse::with_message(
        UserResponse::from(&user),
        if request.active {
            "Account activated"
        } else {
            "Account deactivated"
        },
    )))
}
