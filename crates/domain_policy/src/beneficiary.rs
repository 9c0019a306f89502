//! Beneficiary designations
//!
//! A policy may name beneficiaries with a payout percentage each. When any
//! beneficiary is present the percentages must total exactly 100.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use core_kernel::Money;

use crate::error::PolicyError;

/// A named beneficiary on a policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Beneficiary {
    /// Full name
    pub name: String,
    /// Relationship to the policyholder (spouse, child, ...)
    pub relationship: String,
    /// Share of the payout, 0-100
    pub percentage: Decimal,
}

impl Beneficiary {
    pub fn new(
        name: impl Into<String>,
        relationship: impl Into<String>,
        percentage: Decimal,
    ) -> Self {
        Self {
            name: name.into(),
            relationship: relationship.into(),
            percentage,
        }
    }

    /// This beneficiary's share of a payout amount
    pub fn share_of(&self, payout: Money) -> Money {
        payout.percentage_share(self.percentage)
    }
}

/// Validates a beneficiary list: each share in (0, 100], total exactly 100
/// when the list is non-empty.
pub fn validate_beneficiaries(beneficiaries: &[Beneficiary]) -> Result<(), PolicyError> {
    if beneficiaries.is_empty() {
        return Ok(());
    }

    for b in beneficiaries {
        if b.name.trim().is_empty() {
            return Err(PolicyError::Validation(
                "Beneficiary name is required".to_string(),
            ));
        }
        if b.percentage <= dec!(0) || b.percentage > dec!(100) {
            return Err(PolicyError::Validation(format!(
                "Beneficiary percentage {} is out of range",
                b.percentage
            )));
        }
    }

    let total: Decimal = beneficiaries.iter().map(|b| b.percentage).sum();
    if total != dec!(100) {
        return Err(PolicyError::BeneficiaryPercentages(total));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Currency;

    #[test]
    fn empty_list_is_valid() {
        assert!(validate_beneficiaries(&[]).is_ok());
    }

    #[test]
    fn total_must_be_exactly_100() {
        let benes = vec![
            Beneficiary::new("Ana", "spouse", dec!(60)),
            Beneficiary::new("Ben", "child", dec!(40)),
        ];
        assert!(validate_beneficiaries(&benes).is_ok());

        let short = vec![
            Beneficiary::new("Ana", "spouse", dec!(60)),
            Beneficiary::new("Ben", "child", dec!(30)),
        ];
        assert!(matches!(
            validate_beneficiaries(&short),
            Err(PolicyError::BeneficiaryPercentages(total)) if total == dec!(90)
        ));
    }

    #[test]
    fn zero_or_oversized_share_rejected() {
        let zero = vec![Beneficiary::new("Ana", "spouse", dec!(0))];
        assert!(validate_beneficiaries(&zero).is_err());

        let oversized = vec![Beneficiary::new("Ana", "spouse", dec!(101))];
        assert!(validate_beneficiaries(&oversized).is_err());
    }

    #[test]
    fn share_of_payout() {
        let b = Beneficiary::new("Ana", "spouse", dec!(25));
        let payout = Money::new(dec!(100000), Currency::USD);
        assert_eq!(b.share_of(payout).amount(), dec!(25000));
    }
}
