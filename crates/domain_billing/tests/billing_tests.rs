//! Billing lifecycle integration tests

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use core_kernel::{Currency, Money, PolicyId, UserId};
use domain_billing::{
    BillingError, GatewayKind, GatewayPayment, GatewayPaymentStatus, PaymentGateway,
    PaymentMethod, PremiumInstallment, PremiumStatus, SignedGateway,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn usd(amount: i64) -> Money {
    Money::new(rust_decimal::Decimal::new(amount, 0), Currency::USD)
}

#[test]
fn pending_to_overdue_to_paid() {
    let mut inst =
        PremiumInstallment::new(PolicyId::new(), UserId::new(), usd(1500), date(2024, 6, 1))
            .unwrap();
    assert_eq!(inst.status, PremiumStatus::Pending);

    inst.mark_overdue(date(2024, 6, 10)).unwrap();
    assert_eq!(inst.status, PremiumStatus::Overdue);
    assert_eq!(inst.late_fee.amount(), dec!(30));
    assert_eq!(inst.final_amount.amount(), dec!(1530));

    inst.process_payment(PaymentMethod::BankTransfer, "txn_late", None)
        .unwrap();
    assert_eq!(inst.status, PremiumStatus::Paid);
    // The late fee stays part of the settled amount.
    assert_eq!(inst.final_amount.amount(), dec!(1530));
}

#[test]
fn cancellation_is_terminal() {
    let mut inst =
        PremiumInstallment::new(PolicyId::new(), UserId::new(), usd(1500), date(2024, 6, 1))
            .unwrap();
    inst.cancel().unwrap();

    assert!(matches!(
        inst.mark_overdue(date(2024, 6, 10)),
        Err(BillingError::InvalidStateTransition { .. })
    ));
    assert!(inst
        .process_payment(PaymentMethod::Card, "txn", None)
        .is_err());
    assert!(inst.cancel().is_err());
}

#[tokio::test]
async fn gateway_checkout_end_to_end() {
    let gateway = SignedGateway::new(GatewayKind::Stripe, "whsec_integration");
    let mut inst =
        PremiumInstallment::new(PolicyId::new(), UserId::new(), usd(1020), date(2024, 6, 1))
            .unwrap();

    let order = gateway.create_order(inst.final_amount).await.unwrap();
    assert_eq!(order.amount_minor, 102_000);

    let mut payment = GatewayPayment::new(
        inst.id,
        inst.policyholder_id,
        gateway.kind(),
        order.order_id.clone(),
        inst.final_amount,
    );

    // Gateway callback carries a signature over "<order_id>|<payment_id>".
    let payload = format!("{}|{}", order.order_id, "pay_001");
    let signature = gateway.sign(payload.as_bytes());
    assert!(gateway.verify_signature(payload.as_bytes(), &signature));

    payment.complete();
    inst.process_payment(PaymentMethod::Card, "pay_001", Some(order.order_id))
        .unwrap();

    assert_eq!(payment.status, GatewayPaymentStatus::Completed);
    assert_eq!(inst.status, PremiumStatus::Paid);
}

#[tokio::test]
async fn forged_signature_rejected() {
    let gateway = SignedGateway::new(GatewayKind::Razorpay, "rzp_secret");
    let other = SignedGateway::new(GatewayKind::Razorpay, "attacker");

    let payload = b"order_1|pay_1";
    let forged = other.sign(payload);
    assert!(!gateway.verify_signature(payload, &forged));
}
