//! Premium installment DTOs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use domain_billing::PremiumInstallment;

#[derive(Debug, Deserialize)]
pub struct CreatePremiumRequest {
    pub policy_id: Uuid,
    /// Defaults to the policy's installment premium
    pub amount: Option<Decimal>,
    pub due_date: NaiveDate,
    pub discount: Option<Decimal>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PayPremiumRequest {
    /// card, bank_transfer, wallet, or cash
    pub payment_method: String,
    #[validate(length(min = 1, message = "Transaction id is required"))]
    pub transaction_id: String,
    pub payment_reference: Option<String>,
}

/// Filter parameters; pagination is extracted separately
#[derive(Debug, Deserialize, Default)]
pub struct ListPremiumsQuery {
    pub status: Option<String>,
    pub policy_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct PremiumResponse {
    pub id: Uuid,
    pub policy_id: Uuid,
    pub policyholder_id: Uuid,
    pub amount: Decimal,
    pub late_fee: Decimal,
    pub discount: Decimal,
    pub final_amount: Decimal,
    pub currency: String,
    pub status: String,
    pub due_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_reference: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&PremiumInstallment> for PremiumResponse {
    fn from(installment: &PremiumInstallment) -> Self {
        Self {
            id: *installment.id.as_uuid(),
            policy_id: *installment.policy_id.as_uuid(),
            policyholder_id: *installment.policyholder_id.as_uuid(),
            amount: installment.amount.amount(),
            late_fee: installment.late_fee.amount(),
            discount: installment.discount.amount(),
            final_amount: installment.final_amount.amount(),
            currency: installment.amount.currency().code().to_string(),
            status: installment.status.as_str().to_string(),
            due_date: installment.due_date,
            paid_date: installment.paid_date,
            payment_method: installment.payment_method.map(|m| m.as_str().to_string()),
            transaction_id: installment.transaction_id.clone(),
            payment_reference: installment.payment_reference.clone(),
            created_at: installment.created_at,
        }
    }
}

/// Result of the overdue sweep
#[derive(Debug, Serialize)]
pub struct SweepResponse {
    pub marked_overdue: u64,
}
