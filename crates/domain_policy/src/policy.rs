//! Policy aggregate
//!
//! # Invariants
//!
//! - Coverage and premium amounts must be positive
//! - The policy term must end after it starts
//! - Beneficiary percentages, when present, total exactly 100
//! - Cancellation and expiry are terminal states

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{add_months, days_between, Money, PolicyId, UserId};

use crate::beneficiary::{validate_beneficiaries, Beneficiary};
use crate::error::PolicyError;

/// Product line of a policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    Life,
    Health,
    Auto,
    Home,
    Travel,
}

impl PolicyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyKind::Life => "life",
            PolicyKind::Health => "health",
            PolicyKind::Auto => "auto",
            PolicyKind::Home => "home",
            PolicyKind::Travel => "travel",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "life" => Some(PolicyKind::Life),
            "health" => Some(PolicyKind::Health),
            "auto" => Some(PolicyKind::Auto),
            "home" => Some(PolicyKind::Home),
            "travel" => Some(PolicyKind::Travel),
            _ => None,
        }
    }
}

/// Policy lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyStatus {
    /// In force
    Active,
    /// Suspended by an administrator
    Inactive,
    /// Past its end date
    Expired,
    /// Cancelled by the policyholder or an administrator
    Cancelled,
}

impl PolicyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyStatus::Active => "active",
            PolicyStatus::Inactive => "inactive",
            PolicyStatus::Expired => "expired",
            PolicyStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(PolicyStatus::Active),
            "inactive" => Some(PolicyStatus::Inactive),
            "expired" => Some(PolicyStatus::Expired),
            "cancelled" => Some(PolicyStatus::Cancelled),
            _ => None,
        }
    }

    /// Terminal states admit no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, PolicyStatus::Expired | PolicyStatus::Cancelled)
    }
}

/// How often a premium installment falls due
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PremiumFrequency {
    Monthly,
    Quarterly,
    SemiAnnual,
    Annual,
}

impl PremiumFrequency {
    /// Calendar months between consecutive due dates
    pub fn months_per_period(&self) -> u32 {
        match self {
            PremiumFrequency::Monthly => 1,
            PremiumFrequency::Quarterly => 3,
            PremiumFrequency::SemiAnnual => 6,
            PremiumFrequency::Annual => 12,
        }
    }

    /// Number of installments per year
    pub fn payments_per_year(&self) -> u32 {
        12 / self.months_per_period()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PremiumFrequency::Monthly => "monthly",
            PremiumFrequency::Quarterly => "quarterly",
            PremiumFrequency::SemiAnnual => "semi_annual",
            PremiumFrequency::Annual => "annual",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "monthly" => Some(PremiumFrequency::Monthly),
            "quarterly" => Some(PremiumFrequency::Quarterly),
            "semi_annual" => Some(PremiumFrequency::SemiAnnual),
            "annual" => Some(PremiumFrequency::Annual),
            _ => None,
        }
    }
}

/// An insurance policy owned by a policyholder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Policy {
    /// Unique identifier
    pub id: PolicyId,
    /// Human-readable policy number
    pub policy_number: String,
    /// Product line
    pub kind: PolicyKind,
    /// Owning policyholder
    pub policyholder_id: UserId,
    /// Optional servicing agent
    pub servicing_agent_id: Option<UserId>,
    /// Lifecycle state
    pub status: PolicyStatus,
    /// Maximum claimable amount
    pub coverage_amount: Money,
    /// Premium per installment
    pub premium_amount: Money,
    /// Installment frequency
    pub premium_frequency: PremiumFrequency,
    /// Term start
    pub start_date: NaiveDate,
    /// Term end
    pub end_date: NaiveDate,
    /// Named beneficiaries
    pub beneficiaries: Vec<Beneficiary>,
    /// Cancellation reason, when cancelled
    pub cancellation_reason: Option<String>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Policy {
    /// True while the policy is in force
    pub fn is_active(&self) -> bool {
        self.status == PolicyStatus::Active
    }

    /// Days remaining until the term ends (negative once past)
    pub fn days_until_expiry(&self, today: NaiveDate) -> i64 {
        days_between(today, self.end_date)
    }

    /// Whether the term has run out at `today`
    pub fn is_past_term(&self, today: NaiveDate) -> bool {
        today > self.end_date
    }

    /// Computes the next premium due date
    ///
    /// Anchors on the last paid installment's due date, or the policy start
    /// when nothing has been paid, and steps one frequency period forward.
    /// Returns `None` once the computed date falls after the policy end
    /// date: no installment can be owed past expiry.
    pub fn next_premium_due(&self, last_premium_paid: Option<NaiveDate>) -> Option<NaiveDate> {
        let anchor = last_premium_paid.unwrap_or(self.start_date);
        let next = add_months(anchor, self.premium_frequency.months_per_period());

        if next > self.end_date {
            None
        } else {
            Some(next)
        }
    }

    /// Renews the policy, extending the end date by `extension_months` and
    /// optionally changing the installment premium.
    ///
    /// Permitted from active or expired; an expired policy returns to
    /// active on renewal.
    pub fn renew(
        &mut self,
        extension_months: u32,
        new_premium: Option<Money>,
    ) -> Result<(), PolicyError> {
        match self.status {
            PolicyStatus::Active | PolicyStatus::Expired => {
                if extension_months == 0 {
                    return Err(PolicyError::InvalidTerm(
                        "Renewal must extend the term".to_string(),
                    ));
                }
                self.end_date = add_months(self.end_date, extension_months);
                if let Some(premium) = new_premium {
                    if !premium.is_positive() {
                        return Err(PolicyError::Validation(
                            "Premium amount must be positive".to_string(),
                        ));
                    }
                    self.premium_amount = premium;
                }
                self.status = PolicyStatus::Active;
                self.updated_at = Utc::now();
                Ok(())
            }
            _ => Err(PolicyError::InvalidStateTransition {
                from: self.status.as_str().to_string(),
                to: "active".to_string(),
            }),
        }
    }

    /// Cancels the policy
    ///
    /// The caller is responsible for cascading cancellation to pending
    /// premium installments in the same transaction.
    pub fn cancel(&mut self, reason: impl Into<String>) -> Result<(), PolicyError> {
        if self.status.is_terminal() {
            return Err(PolicyError::InvalidStateTransition {
                from: self.status.as_str().to_string(),
                to: "cancelled".to_string(),
            });
        }
        self.status = PolicyStatus::Cancelled;
        self.cancellation_reason = Some(reason.into());
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Marks the policy expired once past its term
    pub fn mark_expired(&mut self, today: NaiveDate) -> Result<(), PolicyError> {
        if self.status != PolicyStatus::Active {
            return Err(PolicyError::InvalidStateTransition {
                from: self.status.as_str().to_string(),
                to: "expired".to_string(),
            });
        }
        if !self.is_past_term(today) {
            return Err(PolicyError::InvalidTerm(
                "Policy term has not ended".to_string(),
            ));
        }
        self.status = PolicyStatus::Expired;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Suspends or resumes the policy (admin operation)
    pub fn set_suspended(&mut self, suspended: bool) -> Result<(), PolicyError> {
        if self.status.is_terminal() {
            return Err(PolicyError::InvalidStateTransition {
                from: self.status.as_str().to_string(),
                to: if suspended { "inactive" } else { "active" }.to_string(),
            });
        }
        self.status = if suspended {
            PolicyStatus::Inactive
        } else {
            PolicyStatus::Active
        };
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Replaces the beneficiary designations after validation
    pub fn set_beneficiaries(&mut self, beneficiaries: Vec<Beneficiary>) -> Result<(), PolicyError> {
        validate_beneficiaries(&beneficiaries)?;
        self.beneficiaries = beneficiaries;
        self.updated_at = Utc::now();
        Ok(())
    }
}

/// Builder for creating new policies with field validation
pub struct PolicyBuilder {
    kind: Option<PolicyKind>,
    policyholder_id: Option<UserId>,
    servicing_agent_id: Option<UserId>,
    coverage_amount: Option<Money>,
    premium_amount: Option<Money>,
    premium_frequency: PremiumFrequency,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    beneficiaries: Vec<Beneficiary>,
}

impl PolicyBuilder {
    pub fn new() -> Self {
        Self {
            kind: None,
            policyholder_id: None,
            servicing_agent_id: None,
            coverage_amount: None,
            premium_amount: None,
            premium_frequency: PremiumFrequency::Monthly,
            start_date: None,
            end_date: None,
            beneficiaries: Vec::new(),
        }
    }

    pub fn kind(mut self, kind: PolicyKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn policyholder(mut self, id: UserId) -> Self {
        self.policyholder_id = Some(id);
        self
    }

    pub fn servicing_agent(mut self, id: UserId) -> Self {
        self.servicing_agent_id = Some(id);
        self
    }

    pub fn coverage(mut self, amount: Money) -> Self {
        self.coverage_amount = Some(amount);
        self
    }

    pub fn premium(mut self, amount: Money, frequency: PremiumFrequency) -> Self {
        self.premium_amount = Some(amount);
        self.premium_frequency = frequency;
        self
    }

    pub fn term(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }

    pub fn beneficiaries(mut self, beneficiaries: Vec<Beneficiary>) -> Self {
        self.beneficiaries = beneficiaries;
        self
    }

    /// Builds the policy, validating all invariants
    pub fn build(self) -> Result<Policy, PolicyError> {
        let kind = self
            .kind
            .ok_or_else(|| PolicyError::MissingRequiredField("kind".to_string()))?;
        let policyholder_id = self
            .policyholder_id
            .ok_or_else(|| PolicyError::MissingRequiredField("policyholder_id".to_string()))?;
        let coverage_amount = self
            .coverage_amount
            .ok_or_else(|| PolicyError::MissingRequiredField("coverage_amount".to_string()))?;
        let premium_amount = self
            .premium_amount
            .ok_or_else(|| PolicyError::MissingRequiredField("premium_amount".to_string()))?;
        let start_date = self
            .start_date
            .ok_or_else(|| PolicyError::MissingRequiredField("start_date".to_string()))?;
        let end_date = self
            .end_date
            .ok_or_else(|| PolicyError::MissingRequiredField("end_date".to_string()))?;

        if !coverage_amount.is_positive() {
            return Err(PolicyError::Validation(
                "Coverage amount must be positive".to_string(),
            ));
        }
        if !premium_amount.is_positive() {
            return Err(PolicyError::Validation(
                "Premium amount must be positive".to_string(),
            ));
        }
        if end_date <= start_date {
            return Err(PolicyError::InvalidTerm(
                "End date must be after start date".to_string(),
            ));
        }
        validate_beneficiaries(&self.beneficiaries)?;

        let now = Utc::now();
        let id = PolicyId::new_v7();
        Ok(Policy {
            id,
            policy_number: generate_policy_number(kind, id, now),
            kind,
            policyholder_id,
            servicing_agent_id: self.servicing_agent_id,
            status: PolicyStatus::Active,
            coverage_amount,
            premium_amount,
            premium_frequency: self.premium_frequency,
            start_date,
            end_date,
            beneficiaries: self.beneficiaries,
            cancellation_reason: None,
            created_at: now,
            updated_at: now,
        })
    }
}

impl Default for PolicyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Generates a policy number: {KIND}-{YEAR}{MONTH}-{SUFFIX}
///
/// The suffix is the random tail of the policy's own id, so concurrently
/// issued policies cannot collide.
fn generate_policy_number(kind: PolicyKind, id: PolicyId, now: DateTime<Utc>) -> String {
    let hex = id.as_uuid().simple().to_string();
    format!(
        "{}-{}-{}",
        kind.as_str().to_uppercase(),
        now.format("%Y%m"),
        &hex[24..]
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn test_policy(frequency: PremiumFrequency) -> Policy {
        PolicyBuilder::new()
            .kind(PolicyKind::Health)
            .policyholder(UserId::new())
            .coverage(Money::new(dec!(500000), Currency::USD))
            .premium(Money::new(dec!(1000), Currency::USD), frequency)
            .term(d(2024, 1, 1), d(2025, 1, 1))
            .build()
            .unwrap()
    }

    #[test]
    fn policy_numbers_do_not_collide_under_rapid_issue() {
        let numbers: std::collections::HashSet<_> = (0..256)
            .map(|_| test_policy(PremiumFrequency::Monthly).policy_number)
            .collect();
        assert_eq!(numbers.len(), 256);
    }

    #[test]
    fn first_due_date_is_one_period_after_start() {
        let policy = test_policy(PremiumFrequency::Monthly);
        assert_eq!(policy.next_premium_due(None), Some(d(2024, 2, 1)));
    }

    #[test]
    fn monthly_next_due_steps_one_month() {
        let policy = test_policy(PremiumFrequency::Monthly);
        assert_eq!(
            policy.next_premium_due(Some(d(2024, 1, 1))),
            Some(d(2024, 2, 1))
        );
    }

    #[test]
    fn frequency_steps() {
        let quarterly = test_policy(PremiumFrequency::Quarterly);
        assert_eq!(
            quarterly.next_premium_due(Some(d(2024, 1, 1))),
            Some(d(2024, 4, 1))
        );

        let semi = test_policy(PremiumFrequency::SemiAnnual);
        assert_eq!(
            semi.next_premium_due(Some(d(2024, 1, 1))),
            Some(d(2024, 7, 1))
        );

        let annual = test_policy(PremiumFrequency::Annual);
        assert_eq!(
            annual.next_premium_due(Some(d(2024, 1, 1))),
            Some(d(2025, 1, 1))
        );
    }

    #[test]
    fn no_due_date_past_expiry() {
        let policy = test_policy(PremiumFrequency::Annual);
        // One annual step from 2024-06-01 lands past the 2025-01-01 end date.
        assert_eq!(policy.next_premium_due(Some(d(2024, 6, 1))), None);
    }

    #[test]
    fn renewal_extends_term_and_reactivates() {
        let mut policy = test_policy(PremiumFrequency::Monthly);
        policy.status = PolicyStatus::Expired;

        policy
            .renew(12, Some(Money::new(dec!(1100), Currency::USD)))
            .unwrap();

        assert_eq!(policy.status, PolicyStatus::Active);
        assert_eq!(policy.end_date, d(2026, 1, 1));
        assert_eq!(policy.premium_amount.amount(), dec!(1100));
    }

    #[test]
    fn cancelled_policy_cannot_renew() {
        let mut policy = test_policy(PremiumFrequency::Monthly);
        policy.cancel("customer request").unwrap();
        assert!(matches!(
            policy.renew(12, None),
            Err(PolicyError::InvalidStateTransition { .. })
        ));
    }

    #[test]
    fn cancel_is_not_repeatable() {
        let mut policy = test_policy(PremiumFrequency::Monthly);
        policy.cancel("first").unwrap();
        assert!(policy.cancel("second").is_err());
        assert_eq!(policy.cancellation_reason.as_deref(), Some("first"));
    }

    #[test]
    fn builder_rejects_inverted_term() {
        let result = PolicyBuilder::new()
            .kind(PolicyKind::Auto)
            .policyholder(UserId::new())
            .coverage(Money::new(dec!(10000), Currency::USD))
            .premium(Money::new(dec!(100), Currency::USD), PremiumFrequency::Monthly)
            .term(d(2024, 6, 1), d(2024, 1, 1))
            .build();
        assert!(matches!(result, Err(PolicyError::InvalidTerm(_))));
    }

    #[test]
    fn builder_validates_beneficiaries() {
        let result = PolicyBuilder::new()
            .kind(PolicyKind::Life)
            .policyholder(UserId::new())
            .coverage(Money::new(dec!(250000), Currency::USD))
            .premium(Money::new(dec!(200), Currency::USD), PremiumFrequency::Monthly)
            .term(d(2024, 1, 1), d(2034, 1, 1))
            .beneficiaries(vec![Beneficiary::new("Ana", "spouse", dec!(50))])
            .build();
        assert!(matches!(
            result,
            Err(PolicyError::BeneficiaryPercentages(_))
        ));
    }

    #[test]
    fn expiry_requires_elapsed_term() {
        let mut policy = test_policy(PremiumFrequency::Monthly);
        assert!(policy.mark_expired(d(2024, 6, 1)).is_err());
        policy.mark_expired(d(2025, 1, 2)).unwrap();
        assert_eq!(policy.status, PolicyStatus::Expired);
    }

    #[test]
    fn days_until_expiry_counts_down() {
        let policy = test_policy(PremiumFrequency::Monthly);
        assert_eq!(policy.days_until_expiry(d(2024, 12, 31)), 1);
        assert_eq!(policy.days_until_expiry(d(2025, 1, 2)), -1);
    }
}
