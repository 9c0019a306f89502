//! Administrative reporting handlers

use axum::{extract::State, Extension, Json};

use core_kernel::CallerIdentity;
use infra_db::{DashboardSummary, MonthlyRevenue};

use crate::error::ApiError;
use crate::handlers::require_admin;
use crate::response::ApiResponse;
use crate::AppState;

/// GET /api/v1/admin/summary
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
) -> Result<Json<ApiResponse<DashboardSummary>>, ApiError> {
    require_admin(&caller)?;
    let summary = state.reports().dashboard_summary().await?;
    Ok(Json(ApiResponse::ok(summary)))
}

/// GET /api/v1/admin/revenue
pub async fn monthly_revenue(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
) -> Result<Json<ApiResponse<Vec<MonthlyRevenue>>>, ApiError> {
    require_admin(&caller)?;
    let revenue = state.reports().monthly_revenue().await?;
    Ok(Json(ApiResponse::ok(revenue)))
}
