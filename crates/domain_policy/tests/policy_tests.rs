//! Policy domain integration tests

use chrono::NaiveDate;
use core_kernel::{Currency, Money, UserId};
use domain_policy::{
    Beneficiary, Policy, PolicyBuilder, PolicyKind, PolicyStatus, PremiumFrequency,
};
use rust_decimal_macros::dec;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn life_policy() -> Policy {
    PolicyBuilder::new()
        .kind(PolicyKind::Life)
        .policyholder(UserId::new())
        .servicing_agent(UserId::new())
        .coverage(Money::new(dec!(500000), Currency::USD))
        .premium(Money::new(dec!(450), Currency::USD), PremiumFrequency::Monthly)
        .term(d(2024, 1, 1), d(2044, 1, 1))
        .beneficiaries(vec![
            Beneficiary::new("Ana Ortiz", "spouse", dec!(60)),
            Beneficiary::new("Ben Ortiz", "child", dec!(40)),
        ])
        .build()
        .unwrap()
}

#[test]
fn new_policy_is_active_with_numbered_contract() {
    let policy = life_policy();
    assert_eq!(policy.status, PolicyStatus::Active);
    assert!(policy.policy_number.starts_with("LIFE-"));
    assert_eq!(policy.beneficiaries.len(), 2);
}

#[test]
fn month_end_due_dates_clamp() {
    let policy = PolicyBuilder::new()
        .kind(PolicyKind::Auto)
        .policyholder(UserId::new())
        .coverage(Money::new(dec!(30000), Currency::USD))
        .premium(Money::new(dec!(120), Currency::USD), PremiumFrequency::Monthly)
        .term(d(2024, 1, 31), d(2025, 1, 31))
        .build()
        .unwrap();

    assert_eq!(
        policy.next_premium_due(Some(d(2024, 1, 31))),
        Some(d(2024, 2, 29))
    );
}

#[test]
fn schedule_walk_stops_at_expiry() {
    let policy = PolicyBuilder::new()
        .kind(PolicyKind::Travel)
        .policyholder(UserId::new())
        .coverage(Money::new(dec!(5000), Currency::USD))
        .premium(Money::new(dec!(50), Currency::USD), PremiumFrequency::Monthly)
        .term(d(2024, 1, 1), d(2024, 4, 1))
        .build()
        .unwrap();

    let mut last_paid = None;
    let mut due_dates = Vec::new();
    while let Some(due) = policy.next_premium_due(last_paid) {
        due_dates.push(due);
        last_paid = Some(due);
    }

    assert_eq!(due_dates, vec![d(2024, 2, 1), d(2024, 3, 1), d(2024, 4, 1)]);
}

#[test]
fn beneficiary_shares_split_the_coverage() {
    let policy = life_policy();
    let payout = policy.coverage_amount;
    let total: rust_decimal::Decimal = policy
        .beneficiaries
        .iter()
        .map(|b| b.share_of(payout).amount())
        .sum();
    assert_eq!(total, payout.amount());
}

#[test]
fn suspension_round_trip() {
    let mut policy = life_policy();
    policy.set_suspended(true).unwrap();
    assert_eq!(policy.status, PolicyStatus::Inactive);
    policy.set_suspended(false).unwrap();
    assert_eq!(policy.status, PolicyStatus::Active);

    policy.cancel("moving abroad").unwrap();
    assert!(policy.set_suspended(true).is_err());
}
