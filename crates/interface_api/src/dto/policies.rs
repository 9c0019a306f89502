//! Policy DTOs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use domain_policy::{Beneficiary, Policy};

#[derive(Debug, Deserialize, Validate)]
pub struct BeneficiaryDto {
    #[validate(length(min = 1, message = "Beneficiary name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Relationship is required"))]
    pub relationship: String,
    pub percentage: Decimal,
}

impl From<BeneficiaryDto> for Beneficiary {
    fn from(dto: BeneficiaryDto) -> Self {
        Beneficiary {
            name: dto.name,
            relationship: dto.relationship,
            percentage: dto.percentage,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePolicyRequest {
    /// life, health, auto, home, or travel
    pub kind: String,
    /// Defaults to the caller; agents and admins may issue for others
    pub policyholder_id: Option<Uuid>,
    pub servicing_agent_id: Option<Uuid>,
    pub coverage_amount: Decimal,
    pub premium_amount: Decimal,
    /// ISO 4217 code
    pub currency: String,
    /// monthly, quarterly, semi_annual, or annual
    pub premium_frequency: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[validate(nested)]
    #[serde(default)]
    pub beneficiaries: Vec<BeneficiaryDto>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RenewPolicyRequest {
    #[validate(range(min = 1, max = 120, message = "Extension must be 1-120 months"))]
    pub extension_months: u32,
    pub new_premium: Option<Decimal>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CancelPolicyRequest {
    #[validate(length(min = 1, message = "Cancellation reason is required"))]
    pub reason: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateBeneficiariesRequest {
    #[validate(nested)]
    pub beneficiaries: Vec<BeneficiaryDto>,
}

/// Filter parameters; pagination is extracted separately
#[derive(Debug, Deserialize, Default)]
pub struct ListPoliciesQuery {
    pub status: Option<String>,
    pub kind: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BeneficiaryResponse {
    pub name: String,
    pub relationship: String,
    pub percentage: Decimal,
}

#[derive(Debug, Serialize)]
pub struct PolicyResponse {
    pub id: Uuid,
    pub policy_number: String,
    pub kind: String,
    pub policyholder_id: Uuid,
    pub servicing_agent_id: Option<Uuid>,
    pub status: String,
    pub coverage_amount: Decimal,
    pub premium_amount: Decimal,
    pub currency: String,
    pub premium_frequency: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub beneficiaries: Vec<BeneficiaryResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancellation_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&Policy> for PolicyResponse {
    fn from(policy: &Policy) -> Self {
        Self {
            id: *policy.id.as_uuid(),
            policy_number: policy.policy_number.clone(),
            kind: policy.kind.as_str().to_string(),
            policyholder_id: *policy.policyholder_id.as_uuid(),
            servicing_agent_id: policy.servicing_agent_id.map(|a| *a.as_uuid()),
            status: policy.status.as_str().to_string(),
            coverage_amount: policy.coverage_amount.amount(),
            premium_amount: policy.premium_amount.amount(),
            currency: policy.coverage_amount.currency().code().to_string(),
            premium_frequency: policy.premium_frequency.as_str().to_string(),
            start_date: policy.start_date,
            end_date: policy.end_date,
            beneficiaries: policy
                .beneficiaries
                .iter()
                .map(|b| BeneficiaryResponse {
                    name: b.name.clone(),
                    relationship: b.relationship.clone(),
                    percentage: b.percentage,
                })
                .collect(),
            cancellation_reason: policy.cancellation_reason.clone(),
            created_at: policy.created_at,
        }
    }
}

/// Response for the next-premium-due lookup
#[derive(Debug, Serialize)]
pub struct NextDueResponse {
    pub policy_id: Uuid,
    /// None once no installment can fall due before the policy ends
    pub next_premium_due: Option<NaiveDate>,
}
