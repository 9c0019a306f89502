//! Premium installments
//!
//! One installment obligation against a policy/policyholder pair.
//!
//! # State machine
//!
//! pending -> paid | overdue | cancelled
//! overdue -> paid
//!
//! Paid and cancelled are terminal. `final_amount` is derived:
//! amount + late_fee - discount, recomputed whenever one of its inputs
//! changes; payment never recomputes it.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use core_kernel::{Money, PolicyId, PremiumId, Rate, UserId};

use crate::error::BillingError;

/// Late-fee surcharge applied once when an installment goes overdue
pub const LATE_FEE_PERCENT: rust_decimal::Decimal = dec!(2);

/// Installment lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PremiumStatus {
    /// Due but not yet paid
    Pending,
    /// Settled
    Paid,
    /// Past its due date, late fee applied
    Overdue,
    /// Cancelled alongside its policy
    Cancelled,
}

impl PremiumStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PremiumStatus::Pending => "pending",
            PremiumStatus::Paid => "paid",
            PremiumStatus::Overdue => "overdue",
            PremiumStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(PremiumStatus::Pending),
            "paid" => Some(PremiumStatus::Paid),
            "overdue" => Some(PremiumStatus::Overdue),
            "cancelled" => Some(PremiumStatus::Cancelled),
            _ => None,
        }
    }

    /// States from which payment is accepted
    pub fn is_payable(&self) -> bool {
        matches!(self, PremiumStatus::Pending | PremiumStatus::Overdue)
    }
}

/// How an installment was settled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Card,
    BankTransfer,
    Wallet,
    Cash,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "card",
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::Wallet => "wallet",
            PaymentMethod::Cash => "cash",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "card" => Some(PaymentMethod::Card),
            "bank_transfer" => Some(PaymentMethod::BankTransfer),
            "wallet" => Some(PaymentMethod::Wallet),
            "cash" => Some(PaymentMethod::Cash),
            _ => None,
        }
    }
}

/// A single premium installment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PremiumInstallment {
    /// Unique identifier
    pub id: PremiumId,
    /// Policy this installment belongs to
    pub policy_id: PolicyId,
    /// The policyholder who owes it
    pub policyholder_id: UserId,
    /// Base amount
    pub amount: Money,
    /// Late fee, zero until the installment goes overdue
    pub late_fee: Money,
    /// Discount applied
    pub discount: Money,
    /// Derived: amount + late_fee - discount
    pub final_amount: Money,
    /// Lifecycle state
    pub status: PremiumStatus,
    /// Due date
    pub due_date: NaiveDate,
    /// When payment was received
    pub paid_date: Option<DateTime<Utc>>,
    /// Settlement method
    pub payment_method: Option<PaymentMethod>,
    /// Gateway transaction id
    pub transaction_id: Option<String>,
    /// Free-form payment reference
    pub payment_reference: Option<String>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl PremiumInstallment {
    /// Creates a pending installment
    pub fn new(
        policy_id: PolicyId,
        policyholder_id: UserId,
        amount: Money,
        due_date: NaiveDate,
    ) -> Result<Self, BillingError> {
        if !amount.is_positive() {
            return Err(BillingError::Validation(
                "Installment amount must be positive".to_string(),
            ));
        }

        let now = Utc::now();
        let currency = amount.currency();
        let mut installment = Self {
            id: PremiumId::new_v7(),
            policy_id,
            policyholder_id,
            amount,
            late_fee: Money::zero(currency),
            discount: Money::zero(currency),
            final_amount: Money::zero(currency),
            status: PremiumStatus::Pending,
            due_date,
            paid_date: None,
            payment_method: None,
            transaction_id: None,
            payment_reference: None,
            created_at: now,
            updated_at: now,
        };
        installment.recompute_final_amount();
        Ok(installment)
    }

    /// Applies a discount before issue
    pub fn with_discount(mut self, discount: Money) -> Result<Self, BillingError> {
        if discount.is_negative() {
            return Err(BillingError::Validation(
                "Discount cannot be negative".to_string(),
            ));
        }
        self.discount = discount;
        self.recompute_final_amount();
        Ok(self)
    }

    /// True once the due date has passed without payment
    pub fn is_past_due(&self, today: NaiveDate) -> bool {
        self.status == PremiumStatus::Pending && today > self.due_date
    }

    /// Marks a pending installment overdue, applying the late fee once
    ///
    /// Only valid from pending with the due date already past; re-invoking
    /// on an overdue installment is an invalid transition, so the fee can
    /// never be applied twice.
    pub fn mark_overdue(&mut self, today: NaiveDate) -> Result<(), BillingError> {
        if self.status != PremiumStatus::Pending {
            return Err(BillingError::InvalidStateTransition {
                from: self.status.as_str().to_string(),
                to: "overdue".to_string(),
            });
        }
        if today <= self.due_date {
            return Err(BillingError::NotPastDue);
        }

        self.late_fee = Rate::from_percentage(LATE_FEE_PERCENT).apply(&self.amount);
        self.status = PremiumStatus::Overdue;
        self.recompute_final_amount();
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Settles the installment
    ///
    /// Accepted from pending or overdue. `final_amount` keeps its
    /// pre-payment value; the amount received is trusted from the caller,
    /// which has already verified the gateway transaction.
    pub fn process_payment(
        &mut self,
        method: PaymentMethod,
        transaction_id: impl Into<String>,
        reference: Option<String>,
    ) -> Result<(), BillingError> {
        match self.status {
            PremiumStatus::Paid => Err(BillingError::AlreadyPaid),
            PremiumStatus::Cancelled => Err(BillingError::InvalidStateTransition {
                from: "cancelled".to_string(),
                to: "paid".to_string(),
            }),
            PremiumStatus::Pending | PremiumStatus::Overdue => {
                let now = Utc::now();
                self.status = PremiumStatus::Paid;
                self.paid_date = Some(now);
                self.payment_method = Some(method);
                self.transaction_id = Some(transaction_id.into());
                self.payment_reference = reference;
                self.updated_at = now;
                Ok(())
            }
        }
    }

    /// Cancels a pending installment (policy cancellation cascade)
    pub fn cancel(&mut self) -> Result<(), BillingError> {
        if self.status != PremiumStatus::Pending {
            return Err(BillingError::InvalidStateTransition {
                from: self.status.as_str().to_string(),
                to: "cancelled".to_string(),
            });
        }
        self.status = PremiumStatus::Cancelled;
        self.updated_at = Utc::now();
        Ok(())
    }

    fn recompute_final_amount(&mut self) {
        self.final_amount = self.amount + self.late_fee - self.discount;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn installment(amount: i64) -> PremiumInstallment {
        PremiumInstallment::new(
            PolicyId::new(),
            UserId::new(),
            Money::new(rust_decimal::Decimal::new(amount, 0), Currency::USD),
            d(2024, 3, 1),
        )
        .unwrap()
    }

    #[test]
    fn final_amount_derives_from_components() {
        let inst = installment(1000);
        assert_eq!(inst.final_amount.amount(), dec!(1000));

        let discounted = installment(1000)
            .with_discount(Money::new(dec!(50), Currency::USD))
            .unwrap();
        assert_eq!(discounted.final_amount.amount(), dec!(950));
    }

    #[test]
    fn overdue_applies_two_percent_once() {
        let mut inst = installment(1000);
        inst.mark_overdue(d(2024, 3, 2)).unwrap();

        assert_eq!(inst.status, PremiumStatus::Overdue);
        assert_eq!(inst.late_fee.amount(), dec!(20));
        assert_eq!(inst.final_amount.amount(), dec!(1020));

        // The state machine itself forbids a second application.
        assert!(matches!(
            inst.mark_overdue(d(2024, 3, 3)),
            Err(BillingError::InvalidStateTransition { .. })
        ));
        assert_eq!(inst.late_fee.amount(), dec!(20));
    }

    #[test]
    fn overdue_requires_elapsed_due_date() {
        let mut inst = installment(1000);
        assert!(matches!(
            inst.mark_overdue(d(2024, 3, 1)),
            Err(BillingError::NotPastDue)
        ));
        assert_eq!(inst.status, PremiumStatus::Pending);
    }

    #[test]
    fn payment_fixes_final_amount() {
        let mut inst = installment(1000);
        inst.mark_overdue(d(2024, 3, 2)).unwrap();
        let before = inst.final_amount;

        inst.process_payment(PaymentMethod::Card, "txn_123", None)
            .unwrap();

        assert_eq!(inst.status, PremiumStatus::Paid);
        assert_eq!(inst.final_amount, before);
        assert!(inst.paid_date.is_some());
        assert_eq!(inst.transaction_id.as_deref(), Some("txn_123"));
    }

    #[test]
    fn double_payment_rejected() {
        let mut inst = installment(1000);
        inst.process_payment(PaymentMethod::Card, "txn_1", None)
            .unwrap();
        assert!(matches!(
            inst.process_payment(PaymentMethod::Card, "txn_2", None),
            Err(BillingError::AlreadyPaid)
        ));
        assert_eq!(inst.transaction_id.as_deref(), Some("txn_1"));
    }

    #[test]
    fn cancelled_installment_rejects_payment() {
        let mut inst = installment(1000);
        inst.cancel().unwrap();
        assert!(inst
            .process_payment(PaymentMethod::Card, "txn", None)
            .is_err());
    }

    #[test]
    fn only_pending_installments_cancel() {
        let mut paid = installment(1000);
        paid.process_payment(PaymentMethod::Cash, "txn", None).unwrap();
        assert!(paid.cancel().is_err());
    }

    #[test]
    fn negative_discount_rejected() {
        let result =
            installment(1000).with_discount(Money::new(dec!(-5), Currency::USD));
        assert!(result.is_err());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use core_kernel::Currency;
    use proptest::prelude::*;
    use rust_decimal::Decimal;

    proptest! {
        #[test]
        fn late_fee_is_always_two_percent(amount in 1i64..10_000_000i64) {
            let mut inst = PremiumInstallment::new(
                PolicyId::new(),
                UserId::new(),
                Money::from_minor(amount, Currency::USD),
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            ).unwrap();

            inst.mark_overdue(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()).unwrap();

            let expected = inst.amount.amount() * Decimal::new(2, 2);
            prop_assert_eq!(inst.late_fee.amount(), expected.round_dp(4));
            prop_assert_eq!(
                inst.final_amount.amount(),
                (inst.amount.amount() + inst.late_fee.amount()).round_dp(4)
            );
        }
    }
}
