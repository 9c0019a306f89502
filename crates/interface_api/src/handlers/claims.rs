//! Claim handlers
//!
//! Customers file claims against their own active policies; agents and
//! admins review them; settlement is an admin operation.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use core_kernel::{CallerIdentity, ClaimId, Money, PolicyId};
use domain_claims::{intake, Claim, ClaimStatus};
use infra_db::ClaimListFilter;

use crate::dto::claims::{
    ClaimResponse, ListClaimsQuery, PayClaimRequest, ReviewClaimRequest, ReviewDecision,
    SubmitClaimRequest,
};
use crate::dto::Pagination;
use crate::error::ApiError;
use crate::handlers::policies::load_visible_policy;
use crate::handlers::{require_admin, require_reviewer};
use crate::response::ApiResponse;
use crate::validation::validate_request;
use crate::AppState;

/// POST /api/v1/claims
pub async fn submit_claim(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Json(request): Json<SubmitClaimRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ClaimResponse>>), ApiError> {
    validate_request(&request)?;

    let policy = load_visible_policy(&state, &caller, PolicyId::from(request.policy_id)).await?;
    let claim_amount = Money::new(request.claim_amount, policy.coverage_amount.currency());

    intake::validate_against_policy(&policy, request.incident_date, claim_amount)?;

    let claim = Claim::submit(
        policy.id,
        caller.user_id,
        request.incident_date,
        request.description,
        claim_amount,
    )?;
    state.claims().insert(&claim).await?;

    info!(claim_id = %claim.id, policy_id = %policy.id, "Claim submitted");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(ClaimResponse::from(&claim))),
    ))
}

/// GET /api/v1/claims
pub async fn list_claims(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Query(query): Query<ListClaimsQuery>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<ApiResponse<Vec<ClaimResponse>>>, ApiError> {
    let filter = ClaimListFilter {
        status: query
            .status
            .as_deref()
            .map(|s| {
                ClaimStatus::parse(s)
                    .ok_or_else(|| ApiError::invalid_field("status", "Unknown claim status"))
            })
            .transpose()?,
        policy_id: query.policy_id.map(PolicyId::from),
    };

    let claims = state
        .claims()
        .list(
            &caller.scope(),
            &filter,
            pagination.limit(),
            pagination.offset(),
        )
        .await?;

    Ok(Json(ApiResponse::ok(
        claims.iter().map(ClaimResponse::from).collect(),
    )))
}

/// GET /api/v1/claims/:id
pub async fn get_claim(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ClaimResponse>>, ApiError> {
    let claim = load_visible_claim(&state, &caller, ClaimId::from(id)).await?;
    Ok(Json(ApiResponse::ok(ClaimResponse::from(&claim))))
}

/// POST /api/v1/claims/:id/review
///
/// Takes the review decision: approve (optionally for a partial amount)
/// or reject with a reason.
pub async fn review_claim(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Path(id): Path<Uuid>,
    Json(request): Json<ReviewClaimRequest>,
) -> Result<Json<ApiResponse<ClaimResponse>>, ApiError> {
    require_reviewer(&caller)?;

    let mut claim = state.claims().find_by_id(ClaimId::from(id)).await?;

    match request.decision {
        ReviewDecision::Approve => {
            let approved = request
                .approved_amount
                .map(|a| Money::new(a, claim.claim_amount.currency()));
            claim.approve(caller.user_id, approved)?;
        }
        ReviewDecision::Reject => {
            let reason = request.rejection_reason.clone().ok_or_else(|| {
                ApiError::invalid_field("rejection_reason", "A rejection requires a reason")
            })?;
            claim.reject(caller.user_id, reason)?;
        }
    }

    state.claims().update(&claim).await?;
    notify_claimant(&state, &claim).await;

    info!(
        claim_id = %claim.id,
        status = claim.status.as_str(),
        reviewer = %caller.user_id,
        "Claim reviewed"
    );
    Ok(Json(ApiResponse::with_message(
        ClaimResponse::from(&claim),
        "Review recorded",
    )))
}

/// POST /api/v1/claims/:id/pay
pub async fn pay_claim(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Path(id): Path<Uuid>,
    Json(request): Json<PayClaimRequest>,
) -> Result<Json<ApiResponse<ClaimResponse>>, ApiError> {
    require_admin(&caller)?;
    validate_request(&request)?;

    let mut claim = state.claims().find_by_id(ClaimId::from(id)).await?;
    claim.pay(request.payment_reference)?;
    state.claims().update(&claim).await?;
    notify_claimant(&state, &claim).await;

    info!(claim_id = %claim.id, by = %caller.user_id, "Claim settled");
    Ok(Json(ApiResponse::with_message(
        ClaimResponse::from(&claim),
        "Claim settled",
    )))
}

async fn notify_claimant(state: &AppState, claim: &Claim) {
    if let Ok(claimant) = state.users().find_by_id(claim.claimant_id).await {
        state.mailer.send(
            &claimant.email,
            "claim_status_changed",
            json!({
                "claim_number": claim.claim_number,
                "status": claim.status.as_str(),
            }),
        );
    }
}

/// Loads a claim and enforces the caller's visibility
///
/// Agent visibility follows the claimed policy's servicing agent.
async fn load_visible_claim(
    state: &AppState,
    caller: &CallerIdentity,
    id: ClaimId,
) -> Result<Claim, ApiError> {
    let claim = state.claims().find_by_id(id).await?;
    let policy = state.policies().find_by_id(claim.policy_id).await?;
    if !caller.may_access(claim.claimant_id, policy.servicing_agent_id) {
        return Err(ApiError::NotFound(format!("Claim '{id}' not found")));
    }
    Ok(claim)
}
