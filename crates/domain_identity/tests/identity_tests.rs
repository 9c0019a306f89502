//! Identity domain integration tests

use chrono::{Duration, Utc};
use core_kernel::Role;
use domain_identity::{
    verify_password, IdentityError, User, LOCKOUT_DURATION_HOURS, MAX_FAILED_LOGIN_ATTEMPTS,
};

#[test]
fn full_login_failure_cycle() {
    let mut user = User::register(
        "customer@example.com",
        "a-strong-password",
        "Customer One",
        Role::Customer,
    )
    .unwrap();

    let now = Utc::now();

    // Burn through the allowed attempts.
    for attempt in 1..=MAX_FAILED_LOGIN_ATTEMPTS {
        assert!(
            user.check_can_authenticate(now).is_ok(),
            "attempt {} should still be allowed",
            attempt
        );
        user.record_failed_login(now);
    }

    // Locked for the lockout window.
    match user.check_can_authenticate(now) {
        Err(IdentityError::AccountLocked(until)) => {
            assert_eq!(until, now + Duration::hours(LOCKOUT_DURATION_HOURS));
        }
        other => panic!("expected AccountLocked, got {:?}", other.err()),
    }

    // After the window a good login clears everything.
    let later = now + Duration::hours(LOCKOUT_DURATION_HOURS) + Duration::seconds(1);
    user.check_can_authenticate(later).unwrap();
    user.record_successful_login(later);
    assert_eq!(user.failed_login_attempts, 0);
    assert!(user.locked_until.is_none());
}

#[test]
fn profile_update_preserves_credentials() {
    let mut user = User::register(
        "agent@example.com",
        "original-password",
        "Agent Smith",
        Role::Agent,
    )
    .unwrap();

    user.update_profile(Some("Agent Jones".to_string()), Some("+1555000".to_string()));

    assert_eq!(user.full_name, "Agent Jones");
    assert_eq!(user.phone.as_deref(), Some("+1555000"));
    assert!(verify_password("original-password", &user.password_hash));
}

#[test]
fn roles_gate_claim_review() {
    assert!(Role::Agent.can_review_claims());
    assert!(Role::Admin.can_review_claims());
    assert!(!Role::Customer.can_review_claims());
}
