//! Claim intake checks
//!
//! Cross-aggregate validation performed before a claim is accepted. The
//! claim itself only knows its own fields; the intake check holds it up
//! against the policy it targets.

use chrono::NaiveDate;

use core_kernel::Money;
use domain_policy::{Policy, PolicyStatus};

use crate::error::ClaimError;

/// Validates a prospective claim against its policy
///
/// A claim is accepted only when the policy is in force, the incident
/// falls inside the policy term, and the claimed amount does not exceed
/// the coverage ceiling.
pub fn validate_against_policy(
    policy: &Policy,
    incident_date: NaiveDate,
    claim_amount: Money,
) -> Result<(), ClaimError> {
    if policy.status != PolicyStatus::Active {
        return Err(ClaimError::PolicyNotActive);
    }

    if incident_date < policy.start_date || incident_date > policy.end_date {
        return Err(ClaimError::Validation(
            "Incident date falls outside the policy term".to_string(),
        ));
    }

    if claim_amount.currency() != policy.coverage_amount.currency() {
        return Err(ClaimError::Validation(
            "Claim currency does not match the policy".to_string(),
        ));
    }

    if claim_amount.amount() > policy.coverage_amount.amount() {
        return Err(ClaimError::ExceedsCoverage);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::{Currency, UserId};
    use domain_policy::{PolicyBuilder, PolicyKind, PremiumFrequency};
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn active_policy() -> Policy {
        PolicyBuilder::new()
            .kind(PolicyKind::Auto)
            .policyholder(UserId::new())
            .coverage(Money::new(dec!(50000), Currency::USD))
            .premium(Money::new(dec!(120), Currency::USD), PremiumFrequency::Monthly)
            .term(date(2024, 1, 1), date(2025, 1, 1))
            .build()
            .unwrap()
    }

    #[test]
    fn claim_within_coverage_accepted() {
        let policy = active_policy();
        let result = validate_against_policy(
            &policy,
            date(2024, 6, 15),
            Money::new(dec!(50000), Currency::USD),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn claim_over_coverage_rejected() {
        let policy = active_policy();
        let result = validate_against_policy(
            &policy,
            date(2024, 6, 15),
            Money::new(dec!(50000.01), Currency::USD),
        );
        assert!(matches!(result, Err(ClaimError::ExceedsCoverage)));
    }

    #[test]
    fn cancelled_policy_rejects_claims() {
        let mut policy = active_policy();
        policy.cancel("non-payment").unwrap();
        let result = validate_against_policy(
            &policy,
            date(2024, 6, 15),
            Money::new(dec!(100), Currency::USD),
        );
        assert!(matches!(result, Err(ClaimError::PolicyNotActive)));
    }

    #[test]
    fn incident_outside_term_rejected() {
        let policy = active_policy();
        let result = validate_against_policy(
            &policy,
            date(2023, 12, 31),
            Money::new(dec!(100), Currency::USD),
        );
        assert!(result.is_err());
    }

    #[test]
    fn currency_mismatch_rejected() {
        let policy = active_policy();
        let result = validate_against_policy(
            &policy,
            date(2024, 6, 15),
            Money::new(dec!(100), Currency::EUR),
        );
        assert!(result.is_err());
    }
}
