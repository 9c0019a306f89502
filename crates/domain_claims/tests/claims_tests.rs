//! Claim lifecycle integration tests

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use core_kernel::{Currency, Money, UserId};
use domain_claims::{validate_against_policy, Claim, ClaimError, ClaimStatus};
use domain_policy::{Policy, PolicyBuilder, PolicyKind, PremiumFrequency};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn health_policy(holder: UserId) -> Policy {
    PolicyBuilder::new()
        .kind(PolicyKind::Health)
        .policyholder(holder)
        .coverage(Money::new(dec!(100000), Currency::USD))
        .premium(Money::new(dec!(350), Currency::USD), PremiumFrequency::Monthly)
        .term(date(2024, 1, 1), date(2026, 1, 1))
        .build()
        .unwrap()
}

#[test]
fn submit_review_approve_pay() {
    let holder = UserId::new();
    let policy = health_policy(holder);
    let incident = date(2024, 5, 20);
    let amount = Money::new(dec!(12000), Currency::USD);

    validate_against_policy(&policy, incident, amount).unwrap();

    let mut claim = Claim::submit(
        policy.id,
        holder,
        incident,
        "Emergency appendectomy, three-night stay",
        amount,
    )
    .unwrap();

    claim.begin_review().unwrap();
    claim
        .approve(UserId::new(), Some(Money::new(dec!(11500), Currency::USD)))
        .unwrap();
    claim.pay("SETL-2024-0042").unwrap();

    assert_eq!(claim.status, ClaimStatus::Paid);
    assert_eq!(claim.approved_amount.unwrap().amount(), dec!(11500));
    assert_eq!(claim.payment_reference.as_deref(), Some("SETL-2024-0042"));
}

#[test]
fn rejected_claim_never_pays() {
    let holder = UserId::new();
    let policy = health_policy(holder);

    let mut claim = Claim::submit(
        policy.id,
        holder,
        date(2024, 5, 20),
        "Elective cosmetic procedure",
        Money::new(dec!(8000), Currency::USD),
    )
    .unwrap();

    claim
        .reject(UserId::new(), "Elective procedures are excluded")
        .unwrap();

    assert_eq!(claim.status, ClaimStatus::Rejected);
    assert!(matches!(
        claim.pay("SETL-x"),
        Err(ClaimError::InvalidStatusTransition { .. })
    ));
    assert!(claim.approved_amount.is_none());
}

#[test]
fn intake_enforces_coverage_ceiling() {
    let holder = UserId::new();
    let policy = health_policy(holder);

    let result = validate_against_policy(
        &policy,
        date(2024, 5, 20),
        Money::new(dec!(100001), Currency::USD),
    );
    assert!(matches!(result, Err(ClaimError::ExceedsCoverage)));
}
