//! Canonical test fixtures
//!
//! Fixed, predictable aggregates for tests that do not care about the
//! particulars. Anything that needs variation goes through
//! [`crate::builders`] instead.

use chrono::NaiveDate;
use fake::faker::internet::en::SafeEmail;
use fake::Fake;
use rust_decimal_macros::dec;

use core_kernel::{Currency, Money, Role, UserId};
use domain_billing::PremiumInstallment;
use domain_claims::Claim;
use domain_identity::User;
use domain_policy::{Policy, PolicyBuilder, PolicyKind, PremiumFrequency};

/// Password used by every fixture user
pub const TEST_PASSWORD: &str = "correct-horse-battery";

/// A date inside every fixture policy's term
pub fn mid_term_date() -> NaiveDate {
    date(2024, 6, 15)
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// A registered customer with a random but well-formed email
pub fn customer() -> User {
    user_with_role(Role::Customer)
}

/// A registered agent
pub fn agent() -> User {
    user_with_role(Role::Agent)
}

/// A registered administrator
pub fn admin() -> User {
    user_with_role(Role::Admin)
}

fn user_with_role(role: Role) -> User {
    let email: String = SafeEmail().fake();
    User::register(&email, TEST_PASSWORD, "Test User", role).expect("fixture user is valid")
}

/// An active health policy for the given holder, 2024 calendar-year term
pub fn active_policy(policyholder: UserId) -> Policy {
    PolicyBuilder::new()
        .kind(PolicyKind::Health)
        .policyholder(policyholder)
        .coverage(Money::new(dec!(500000), Currency::USD))
        .premium(Money::new(dec!(1000), Currency::USD), PremiumFrequency::Monthly)
        .term(date(2024, 1, 1), date(2025, 1, 1))
        .build()
        .expect("fixture policy is valid")
}

/// A pending installment against the given policy
pub fn pending_installment(policy: &Policy) -> PremiumInstallment {
    PremiumInstallment::new(
        policy.id,
        policy.policyholder_id,
        policy.premium_amount,
        policy.start_date,
    )
    .expect("fixture installment is valid")
}

/// A freshly submitted claim against the given policy
pub fn submitted_claim(policy: &Policy) -> Claim {
    Claim::submit(
        policy.id,
        policy.policyholder_id,
        mid_term_date(),
        "Water damage to insured property",
        Money::new(dec!(2500), Currency::USD),
    )
    .expect("fixture claim is valid")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixture_users_carry_their_role() {
        assert_eq!(customer().role, Role::Customer);
        assert_eq!(agent().role, Role::Agent);
        assert_eq!(admin().role, Role::Admin);
    }

    #[test]
    fn fixture_claim_fits_fixture_policy() {
        let policy = active_policy(UserId::new());
        let claim = submitted_claim(&policy);
        domain_claims::validate_against_policy(&policy, claim.incident_date, claim.claim_amount)
            .expect("fixture claim passes intake");
    }
}
