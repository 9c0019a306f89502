//! Policy handlers
//!
//! Issuing a policy also books its first premium installment in the same
//! transaction. Reads are scoped by the caller's role; a record outside
//! the caller's scope is reported as not found rather than forbidden.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use core_kernel::{CallerIdentity, Currency, Money, PolicyId, RecordFilter, Role, UserId};
use domain_billing::{PremiumInstallment, PremiumStatus};
use domain_policy::{PolicyBuilder, PolicyKind, PolicyStatus, PremiumFrequency};
use infra_db::{PolicyListFilter, PremiumListFilter};

use crate::dto::policies::{
    CancelPolicyRequest, CreatePolicyRequest, ListPoliciesQuery, NextDueResponse,
    PolicyResponse, RenewPolicyRequest, UpdateBeneficiariesRequest,
};
use crate::dto::Pagination;
use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::validation::validate_request;
use crate::AppState;

/// POST /api/v1/policies
pub async fn create_policy(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Json(request): Json<CreatePolicyRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PolicyResponse>>), ApiError> {
    validate_request(&request)?;

    let kind = PolicyKind::parse(&request.kind)
        .ok_or_else(|| ApiError::invalid_field("kind", "Unknown policy kind"))?;
    let frequency = PremiumFrequency::parse(&request.premium_frequency)
        .ok_or_else(|| ApiError::invalid_field("premium_frequency", "Unknown frequency"))?;
    let currency = Currency::parse(&request.currency)
        .map_err(|_| ApiError::invalid_field("currency", "Unsupported currency"))?;

    // Customers issue for themselves; staff may issue on a customer's behalf.
    let policyholder_id = match request.policyholder_id {
        Some(id) if UserId::from(id) != caller.user_id => {
            if caller.role == Role::Customer {
                return Err(ApiError::Forbidden(
                    "Customers may only create their own policies".to_string(),
                ));
            }
            UserId::from(id)
        }
        _ => caller.user_id,
    };

    let servicing_agent_id = match request.servicing_agent_id {
        Some(id) => Some(UserId::from(id)),
        None if caller.role == Role::Agent => Some(caller.user_id),
        None => None,
    };

    let mut builder = PolicyBuilder::new()
        .kind(kind)
        .policyholder(policyholder_id)
        .coverage(Money::new(request.coverage_amount, currency))
        .premium(Money::new(request.premium_amount, currency), frequency)
        .term(request.start_date, request.end_date)
        .beneficiaries(
            request
                .beneficiaries
                .into_iter()
                .map(Into::into)
                .collect(),
        );
    if let Some(agent) = servicing_agent_id {
        builder = builder.servicing_agent(agent);
    }
    let policy = builder.build()?;

    // The first installment falls due one frequency period into the term;
    // a term shorter than one period collects at its end.
    let first_due = policy.next_premium_due(None).unwrap_or(policy.end_date);
    let first_installment = PremiumInstallment::new(
        policy.id,
        policy.policyholder_id,
        policy.premium_amount,
        first_due,
    )?;

    state
        .policies()
        .insert_with_first_installment(&policy, &first_installment)
        .await?;

    if let Ok(holder) = state.users().find_by_id(policy.policyholder_id).await {
        state.mailer.send(
            &holder.email,
            "policy_issued",
            json!({
                "policy_number": policy.policy_number,
                "kind": policy.kind.as_str(),
            }),
        );
    }

    info!(policy_id = %policy.id, by = %caller.user_id, "Policy created");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(PolicyResponse::from(&policy))),
    ))
}

/// GET /api/v1/policies
pub async fn list_policies(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Query(query): Query<ListPoliciesQuery>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<ApiResponse<Vec<PolicyResponse>>>, ApiError> {
    let filter = PolicyListFilter {
        status: parse_status(query.status.as_deref())?,
        kind: query
            .kind
            .as_deref()
            .map(|k| {
                PolicyKind::parse(k)
                    .ok_or_else(|| ApiError::invalid_field("kind", "Unknown policy kind"))
            })
            .transpose()?,
    };

    let policies = state
        .policies()
        .list(
            &caller.scope(),
            &filter,
            pagination.limit(),
            pagination.offset(),
        )
        .await?;

    Ok(Json(ApiResponse::ok(
        policies.iter().map(PolicyResponse::from).collect(),
    )))
}

/// GET /api/v1/policies/:id
pub async fn get_policy(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<PolicyResponse>>, ApiError> {
    let policy = load_visible_policy(&state, &caller, PolicyId::from(id)).await?;
    Ok(Json(ApiResponse::ok(PolicyResponse::from(&policy))))
}

/// GET /api/v1/policies/:id/next-due
pub async fn next_premium_due(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<NextDueResponse>>, ApiError> {
    let policy = load_visible_policy(&state, &caller, PolicyId::from(id)).await?;

    // Most recent paid installment anchors the next step.
    let filter = PremiumListFilter {
        status: Some(PremiumStatus::Paid),
        policy_id: Some(policy.id),
    };
    let last_paid = state
        .premiums()
        .list(&RecordFilter::All, &filter, 1, 0)
        .await?
        .into_iter()
        .next()
        .map(|installment| installment.due_date);

    Ok(Json(ApiResponse::ok(NextDueResponse {
        policy_id: *policy.id.as_uuid(),
        next_premium_due: policy.next_premium_due(last_paid),
    })))
}

/// PUT /api/v1/policies/:id/beneficiaries
pub async fn update_beneficiaries(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateBeneficiariesRequest>,
) -> Result<Json<ApiResponse<PolicyResponse>>, ApiError> {
    validate_request(&request)?;

    let mut policy = load_visible_policy(&state, &caller, PolicyId::from(id)).await?;
    policy.set_beneficiaries(request.beneficiaries.into_iter().map(Into::into).collect())?;
    state.policies().update(&policy).await?;

    Ok(Json(ApiResponse::with_message(
        PolicyResponse::from(&policy),
        "Beneficiaries updated",
    )))
}

/// POST /api/v1/policies/:id/renew
pub async fn renew_policy(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Path(id): Path<Uuid>,
    Json(request): Json<RenewPolicyRequest>,
) -> Result<Json<ApiResponse<PolicyResponse>>, ApiError> {
    validate_request(&request)?;

    let mut policy = load_visible_policy(&state, &caller, PolicyId::from(id)).await?;
    let new_premium = request
        .new_premium
        .map(|amount| Money::new(amount, policy.premium_amount.currency()));

    policy.renew(request.extension_months, new_premium)?;
    state.policies().update(&policy).await?;

    info!(policy_id = %policy.id, months = request.extension_months, "Policy renewed");
    Ok(Json(ApiResponse::with_message(
        PolicyResponse::from(&policy),
        "Policy renewed",
    )))
}

/// POST /api/v1/policies/:id/cancel
///
/// Cancelling cascades to the policy's pending installments; both writes
/// share one transaction in the repository.
pub async fn cancel_policy(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Path(id): Path<Uuid>,
    Json(request): Json<CancelPolicyRequest>,
) -> Result<Json<ApiResponse<PolicyResponse>>, ApiError> {
    validate_request(&request)?;

    let mut policy = load_visible_policy(&state, &caller, PolicyId::from(id)).await?;
    policy.cancel(request.reason)?;
    let cascaded = state.policies().cancel_with_cascade(&policy).await?;

    info!(policy_id = %policy.id, cascaded, by = %caller.user_id, "Policy cancelled");
    Ok(Json(ApiResponse::with_message(
        PolicyResponse::from(&policy),
        "Policy cancelled",
    )))
}

fn parse_status(status: Option<&str>) -> Result<Option<PolicyStatus>, ApiError> {
    status
        .map(|s| {
            PolicyStatus::parse(s)
                .ok_or_else(|| ApiError::invalid_field("status", "Unknown policy status"))
        })
        .transpose()
}

/// Loads a policy and enforces the caller's visibility
///
/// Records outside the caller's scope surface as not found so the
/// endpoint does not confirm their existence.
pub(crate) async fn load_visible_policy(
    state: &AppState,
    caller: &CallerIdentity,
    id: PolicyId,
) -> Result<domain_policy::Policy, ApiError> {
    let policy = state.policies().find_by_id(id).await?;
    if !caller.may_access(policy.policyholder_id, policy.servicing_agent_id) {
        return Err(ApiError::NotFound(format!("Policy '{id}' not found")));
    }
    Ok(policy)
}
