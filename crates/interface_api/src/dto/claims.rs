//! Claim DTOs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use domain_claims::Claim;

#[derive(Debug, Deserialize, Validate)]
pub struct SubmitClaimRequest {
    pub policy_id: Uuid,
    pub incident_date: NaiveDate,
    #[validate(length(min = 10, message = "Description must be at least 10 characters"))]
    pub description: String,
    pub claim_amount: Decimal,
}

/// Review decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    Approve,
    Reject,
}

#[derive(Debug, Deserialize)]
pub struct ReviewClaimRequest {
    pub decision: ReviewDecision,
    /// Omitted on approval means the full claimed amount
    pub approved_amount: Option<Decimal>,
    /// Required on rejection
    pub rejection_reason: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PayClaimRequest {
    #[validate(length(min = 1, message = "Payment reference is required"))]
    pub payment_reference: String,
}

/// Filter parameters; pagination is extracted separately
#[derive(Debug, Deserialize, Default)]
pub struct ListClaimsQuery {
    pub status: Option<String>,
    pub policy_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct ClaimResponse {
    pub id: Uuid,
    pub claim_number: String,
    pub policy_id: Uuid,
    pub claimant_id: Uuid,
    pub status: String,
    pub incident_date: NaiveDate,
    pub description: String,
    pub claim_amount: Decimal,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_reference: Option<String>,
    pub estimated_processing_days: i64,
    /// Computed at read time against the promised turnaround
    pub is_overdue: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&Claim> for ClaimResponse {
    fn from(claim: &Claim) -> Self {
        Self {
            id: *claim.id.as_uuid(),
            claim_number: claim.claim_number.clone(),
            policy_id: *claim.policy_id.as_uuid(),
            claimant_id: *claim.claimant_id.as_uuid(),
            status: claim.status.as_str().to_string(),
            incident_date: claim.incident_date,
            description: claim.description.clone(),
            claim_amount: claim.claim_amount.amount(),
            currency: claim.claim_amount.currency().code().to_string(),
            approved_amount: claim.approved_amount.map(|a| a.amount()),
            rejection_reason: claim.rejection_reason.clone(),
            reviewed_by: claim.reviewed_by.map(|r| *r.as_uuid()),
            review_date: claim.review_date,
            payment_date: claim.payment_date,
            payment_reference: claim.payment_reference.clone(),
            estimated_processing_days: claim.estimated_processing_days,
            is_overdue: claim.is_overdue(Utc::now()),
            created_at: claim.created_at,
        }
    }
}
