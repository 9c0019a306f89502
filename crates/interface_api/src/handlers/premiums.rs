//! Premium installment handlers
//!
//! Settlement goes through a guarded update in the repository; a second
//! payment attempt against the same installment comes back as a conflict.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use tracing::info;
use uuid::Uuid;

use core_kernel::{CallerIdentity, Money, PolicyId, PremiumId};
use domain_billing::{PaymentMethod, PremiumInstallment, PremiumStatus};
use infra_db::PremiumListFilter;

use crate::dto::premiums::{
    CreatePremiumRequest, ListPremiumsQuery, PayPremiumRequest, PremiumResponse, SweepResponse,
};
use crate::dto::Pagination;
use crate::error::ApiError;
use crate::handlers::policies::load_visible_policy;
use crate::handlers::{require_admin, require_reviewer};
use crate::response::ApiResponse;
use crate::validation::validate_request;
use crate::AppState;

/// POST /api/v1/premiums
///
/// Books an additional installment against a policy. Staff operation;
/// routine installments are created automatically at issue and renewal.
pub async fn create_premium(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Json(request): Json<CreatePremiumRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PremiumResponse>>), ApiError> {
    require_reviewer(&caller)?;

    let policy = state
        .policies()
        .find_by_id(PolicyId::from(request.policy_id))
        .await?;
    if !policy.is_active() {
        return Err(ApiError::Unprocessable(
            "Installments can only be booked against an active policy".to_string(),
        ));
    }

    let currency = policy.premium_amount.currency();
    let amount = request
        .amount
        .map(|a| Money::new(a, currency))
        .unwrap_or(policy.premium_amount);

    let mut installment =
        PremiumInstallment::new(policy.id, policy.policyholder_id, amount, request.due_date)?;
    if let Some(discount) = request.discount {
        installment = installment.with_discount(Money::new(discount, currency))?;
    }

    state.premiums().insert(&installment).await?;

    info!(premium_id = %installment.id, policy_id = %policy.id, "Installment booked");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(PremiumResponse::from(&installment))),
    ))
}

/// GET /api/v1/premiums
pub async fn list_premiums(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Query(query): Query<ListPremiumsQuery>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<ApiResponse<Vec<PremiumResponse>>>, ApiError> {
    let filter = PremiumListFilter {
        status: query
            .status
            .as_deref()
            .map(|s| {
                PremiumStatus::parse(s)
                    .ok_or_else(|| ApiError::invalid_field("status", "Unknown premium status"))
            })
            .transpose()?,
        policy_id: query.policy_id.map(PolicyId::from),
    };

    let premiums = state
        .premiums()
        .list(
            &caller.scope(),
            &filter,
            pagination.limit(),
            pagination.offset(),
        )
        .await?;

    Ok(Json(ApiResponse::ok(
        premiums.iter().map(PremiumResponse::from).collect(),
    )))
}

/// GET /api/v1/premiums/:id
pub async fn get_premium(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<PremiumResponse>>, ApiError> {
    let installment = load_visible_premium(&state, &caller, PremiumId::from(id)).await?;
    Ok(Json(ApiResponse::ok(PremiumResponse::from(&installment))))
}

/// POST /api/v1/premiums/:id/pay
///
/// Direct settlement with an externally obtained transaction id. The
/// guarded update means exactly one of two racing payments wins; the
/// other receives 409.
pub async fn pay_premium(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Path(id): Path<Uuid>,
    Json(request): Json<PayPremiumRequest>,
) -> Result<Json<ApiResponse<PremiumResponse>>, ApiError> {
    validate_request(&request)?;

    let method = PaymentMethod::parse(&request.payment_method)
        .ok_or_else(|| ApiError::invalid_field("payment_method", "Unknown payment method"))?;

    // Visibility check before the settlement attempt.
    load_visible_premium(&state, &caller, PremiumId::from(id)).await?;

    let settled = state
        .premiums()
        .settle_payment(
            PremiumId::from(id),
            method,
            &request.transaction_id,
            request.payment_reference.as_deref(),
        )
        .await?;

    info!(premium_id = %settled.id, by = %caller.user_id, "Premium paid");
    Ok(Json(ApiResponse::with_message(
        PremiumResponse::from(&settled),
        "Payment recorded",
    )))
}

/// POST /api/v1/premiums/:id/mark-overdue
///
/// Marks a single pending installment overdue, applying the late fee.
/// The state machine refuses a repeat, so the fee cannot stack.
pub async fn mark_overdue(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<PremiumResponse>>, ApiError> {
    require_admin(&caller)?;

    let mut installment = state.premiums().find_by_id(PremiumId::from(id)).await?;
    installment.mark_overdue(chrono::Utc::now().date_naive())?;
    state.premiums().update(&installment).await?;

    info!(premium_id = %installment.id, "Installment marked overdue");
    Ok(Json(ApiResponse::with_message(
        PremiumResponse::from(&installment),
        "Installment marked overdue",
    )))
}

/// POST /api/v1/premiums/sweep-overdue
///
/// Marks overdue every pending installment past its due date, applying
/// the late fee once per installment. Admin operation, typically driven
/// by a scheduler.
pub async fn sweep_overdue(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
) -> Result<Json<ApiResponse<SweepResponse>>, ApiError> {
    require_admin(&caller)?;

    let today = chrono::Utc::now().date_naive();
    let marked_overdue = state.premiums().sweep_overdue(today).await?;

    Ok(Json(ApiResponse::ok(SweepResponse { marked_overdue })))
}

/// Loads an installment and enforces the caller's visibility
///
/// Agent visibility follows the owning policy's servicing agent.
pub(crate) async fn load_visible_premium(
    state: &AppState,
    caller: &CallerIdentity,
    id: PremiumId,
) -> Result<PremiumInstallment, ApiError> {
    let installment = state.premiums().find_by_id(id).await?;
    let policy = load_visible_policy(state, caller, installment.policy_id)
        .await
        .map_err(|_| ApiError::NotFound(format!("Premium '{id}' not found")))?;
    debug_assert_eq!(policy.policyholder_id, installment.policyholder_id);
    Ok(installment)
}
