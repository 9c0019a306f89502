//! Cross-domain workflow tests
//!
//! These verify end-to-end scenarios that involve multiple crates working
//! together, built on the shared fixtures and builders.

use chrono::Utc;
use core_kernel::{Currency, Money, UserId};
use rust_decimal_macros::dec;
use test_utils::{date, TestPolicy};

mod policy_to_claim_workflow {
    use super::*;
    use domain_claims::{validate_against_policy, Claim, ClaimStatus};
    use domain_policy::{PolicyKind, PolicyStatus, PremiumFrequency};

    fn issued_policy(policyholder: UserId) -> domain_policy::Policy {
        TestPolicy::new()
            .kind(PolicyKind::Health)
            .held_by(policyholder)
            .coverage(dec!(500000))
            .premium(dec!(1200), PremiumFrequency::Monthly)
            .term(date(2024, 1, 1), date(2025, 1, 1))
            .build()
    }

    /// A freshly issued policy is active with a generated policy number
    #[test]
    fn test_create_policy() {
        let policy = issued_policy(UserId::new());

        assert_eq!(policy.status, PolicyStatus::Active);
        assert!(policy.policy_number.starts_with("HEALTH-"));
        assert!(policy.is_active());
    }

    /// A claim filed against an active policy flows submit -> approve -> pay
    #[test]
    fn test_claim_settlement_workflow() {
        let policyholder = UserId::new();
        let policy = issued_policy(policyholder);

        let incident = date(2024, 3, 15);
        let claimed = Money::new(dec!(20000), Currency::USD);
        validate_against_policy(&policy, incident, claimed).expect("Intake check failed");

        let mut claim = Claim::submit(
            policy.id,
            policyholder,
            incident,
            "Hospitalization after a fall",
            claimed,
        )
        .expect("Failed to submit claim");
        assert_eq!(claim.status, ClaimStatus::Submitted);

        let reviewer = UserId::new();
        claim.begin_review().unwrap();
        claim
            .approve(reviewer, Some(Money::new(dec!(18000), Currency::USD)))
            .unwrap();
        claim.pay("DISB-2024-0001").unwrap();

        assert_eq!(claim.status, ClaimStatus::Paid);
        assert_eq!(claim.approved_amount.unwrap().amount(), dec!(18000));
        assert_eq!(claim.reviewed_by, Some(reviewer));
    }

    /// A claim above the coverage ceiling is refused at intake
    #[test]
    fn test_claim_exceeding_coverage_is_rejected() {
        let policy = issued_policy(UserId::new());

        let result = validate_against_policy(
            &policy,
            date(2024, 3, 15),
            Money::new(dec!(600000), Currency::USD),
        );
        assert!(result.is_err());
    }

    /// Cancelling the policy closes the door on new claims
    #[test]
    fn test_cancelled_policy_refuses_claims() {
        let mut policy = issued_policy(UserId::new());
        policy.cancel("non-payment").unwrap();

        let result = validate_against_policy(
            &policy,
            date(2024, 3, 15),
            Money::new(dec!(1000), Currency::USD),
        );
        assert!(result.is_err());
    }
}

mod premium_lifecycle {
    use super::*;
    use domain_billing::{PaymentMethod, PremiumInstallment, PremiumStatus};
    use domain_policy::{PolicyKind, PremiumFrequency};

    fn installment() -> PremiumInstallment {
        let policy = TestPolicy::new()
            .kind(PolicyKind::Auto)
            .coverage(dec!(30000))
            .premium(dec!(100), PremiumFrequency::Monthly)
            .term(date(2024, 1, 1), date(2025, 1, 1))
            .build();

        let due = policy.next_premium_due(None).unwrap();
        PremiumInstallment::new(policy.id, policy.policyholder_id, policy.premium_amount, due)
            .unwrap()
    }

    /// Overdue marking applies the late fee exactly once
    #[test]
    fn test_overdue_applies_late_fee_once() {
        let mut premium = installment();
        assert_eq!(premium.final_amount.amount(), dec!(100));

        premium.mark_overdue(date(2024, 2, 5)).unwrap();
        assert_eq!(premium.status, PremiumStatus::Overdue);
        assert_eq!(premium.late_fee.amount(), dec!(2));
        assert_eq!(premium.final_amount.amount(), dec!(102));

        // A second marking is an invalid transition, so the fee cannot stack.
        assert!(premium.mark_overdue(date(2024, 2, 6)).is_err());
        assert_eq!(premium.final_amount.amount(), dec!(102));
    }

    /// An overdue installment can still be settled, at the surcharged amount
    #[test]
    fn test_pay_after_overdue() {
        let mut premium = installment();
        premium.mark_overdue(date(2024, 2, 5)).unwrap();

        premium
            .process_payment(PaymentMethod::Card, "txn_123", None)
            .unwrap();

        assert_eq!(premium.status, PremiumStatus::Paid);
        assert_eq!(premium.final_amount.amount(), dec!(102));
        assert!(premium.paid_date.is_some());
    }

    /// A settled installment refuses a second payment
    #[test]
    fn test_double_payment_is_rejected() {
        let mut premium = installment();
        premium
            .process_payment(PaymentMethod::BankTransfer, "txn_1", None)
            .unwrap();

        let second = premium.process_payment(PaymentMethod::Card, "txn_2", None);
        assert!(second.is_err());
        assert_eq!(premium.transaction_id.as_deref(), Some("txn_1"));
    }
}

mod premium_scheduling {
    use super::*;
    use domain_policy::{PolicyKind, PremiumFrequency};

    /// Walking the schedule from payment to payment covers the whole term
    #[test]
    fn test_schedule_walk_stops_at_expiry() {
        let policy = TestPolicy::new()
            .kind(PolicyKind::Travel)
            .coverage(dec!(5000))
            .premium(dec!(50), PremiumFrequency::Quarterly)
            .term(date(2024, 1, 1), date(2025, 1, 1))
            .build();

        let mut due_dates = Vec::new();
        let mut last_paid = None;
        while let Some(due) = policy.next_premium_due(last_paid) {
            due_dates.push(due);
            last_paid = Some(due);
        }

        assert_eq!(
            due_dates,
            vec![
                date(2024, 4, 1),
                date(2024, 7, 1),
                date(2024, 10, 1),
                date(2025, 1, 1),
            ]
        );
    }

    /// Month-end anchors clamp instead of overflowing into the next month
    #[test]
    fn test_month_end_clamping() {
        let policy = TestPolicy::new()
            .kind(PolicyKind::Home)
            .coverage(dec!(200000))
            .premium(dec!(80), PremiumFrequency::Monthly)
            .term(date(2024, 1, 31), date(2025, 1, 31))
            .build();

        assert_eq!(policy.next_premium_due(None), Some(date(2024, 2, 29)));
        assert_eq!(
            policy.next_premium_due(Some(date(2024, 2, 29))),
            Some(date(2024, 3, 29))
        );
    }
}

mod account_lifecycle {
    use super::*;
    use core_kernel::Role;
    use domain_identity::{verify_password, User};

    /// Registration normalizes the email and hashes the credential
    #[test]
    fn test_registration() {
        let user = User::register(
            "  Casey.Adams@Example.COM ",
            "a-long-enough-password",
            "Casey Adams",
            Role::Customer,
        )
        .expect("Failed to register");

        assert_eq!(user.email, "casey.adams@example.com");
        assert!(user.is_active);
        assert_ne!(user.password_hash, "a-long-enough-password");
        assert!(verify_password("a-long-enough-password", &user.password_hash));
    }

    /// Repeated failures lock the account; a success clears the slate
    #[test]
    fn test_lockout_and_recovery() {
        let mut user = test_utils::customer();

        let now = Utc::now();
        for _ in 0..5 {
            user.record_failed_login(now);
        }
        assert!(user.is_locked(now));
        assert!(user.check_can_authenticate(now).is_err());

        // Lockout expires on its own; a successful login resets the counter.
        let later = now + chrono::Duration::hours(3);
        assert!(user.check_can_authenticate(later).is_ok());
        user.record_successful_login(later);
        assert_eq!(user.failed_login_attempts, 0);
        assert!(user.locked_until.is_none());
    }

    /// Deactivation refuses authentication regardless of lockout state
    #[test]
    fn test_deactivated_account_cannot_authenticate() {
        let mut user = test_utils::agent();

        user.set_active(false);
        assert!(user.check_can_authenticate(Utc::now()).is_err());
    }
}

mod gateway_signatures {
    use domain_billing::{sign_payload, verify_signature};

    /// A signature verifies only against the secret that produced it
    #[test]
    fn test_signature_roundtrip() {
        let payload = br#"{"event":"payment.completed","order_id":"order_1"}"#;
        let signature = sign_payload("whsec_test", payload);

        assert!(verify_signature("whsec_test", payload, &signature));
        assert!(!verify_signature("whsec_other", payload, &signature));
        assert!(!verify_signature("whsec_test", b"tampered", &signature));
    }
}

mod money_operations {
    use super::*;
    use core_kernel::Rate;

    /// Rate application for the late-fee computation
    #[test]
    fn test_rate_application() {
        let rate = Rate::from_percentage(dec!(2));
        let premium = Money::new(dec!(1500), Currency::USD);

        assert_eq!(rate.apply(&premium).amount(), dec!(30));
    }

    /// Checked arithmetic refuses to mix currencies
    #[test]
    fn test_currency_mismatch() {
        let usd = Money::new(dec!(1000), Currency::USD);
        let eur = Money::new(dec!(1000), Currency::EUR);

        assert!(usd.checked_add(&eur).is_err());
        assert!(usd.checked_sub(&eur).is_err());
    }

    /// Minor-unit conversion used at the payment gateway boundary
    #[test]
    fn test_minor_unit_roundtrip() {
        let amount = Money::new(dec!(102.50), Currency::USD);
        assert_eq!(amount.to_minor(), 10250);
        assert_eq!(Money::from_minor(10250, Currency::USD), amount);
    }
}
