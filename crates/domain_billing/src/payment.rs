//! Gateway payment records
//!
//! One record per checkout attempt against a premium installment. The
//! gateway order is created first; completion arrives either from the
//! client confirm call or from a verified webhook.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{Money, PaymentId, PremiumId, UserId};

use crate::gateway::GatewayKind;

/// Lifecycle of a gateway checkout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayPaymentStatus {
    /// Order created at the gateway, awaiting completion
    Created,
    /// Gateway confirmed the charge
    Completed,
    /// Gateway reported failure
    Failed,
}

impl GatewayPaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GatewayPaymentStatus::Created => "created",
            GatewayPaymentStatus::Completed => "completed",
            GatewayPaymentStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "created" => Some(GatewayPaymentStatus::Created),
            "completed" => Some(GatewayPaymentStatus::Completed),
            "failed" => Some(GatewayPaymentStatus::Failed),
            _ => None,
        }
    }
}

/// A payment attempt routed through an external gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayPayment {
    /// Unique identifier
    pub id: PaymentId,
    /// Installment being paid
    pub premium_id: PremiumId,
    /// Paying user
    pub payer_id: UserId,
    /// Which gateway holds the order
    pub gateway: GatewayKind,
    /// Gateway-side order identifier
    pub order_id: String,
    /// Amount of the order
    pub amount: Money,
    /// Checkout state
    pub status: GatewayPaymentStatus,
    /// Failure detail from the gateway, if any
    pub failure_reason: Option<String>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// When the gateway confirmed completion
    pub completed_at: Option<DateTime<Utc>>,
}

impl GatewayPayment {
    /// Records a freshly created gateway order
    pub fn new(
        premium_id: PremiumId,
        payer_id: UserId,
        gateway: GatewayKind,
        order_id: impl Into<String>,
        amount: Money,
    ) -> Self {
        Self {
            id: PaymentId::new_v7(),
            premium_id,
            payer_id,
            gateway,
            order_id: order_id.into(),
            amount,
            status: GatewayPaymentStatus::Created,
            failure_reason: None,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    /// Marks the checkout completed
    pub fn complete(&mut self) {
        self.status = GatewayPaymentStatus::Completed;
        self.completed_at = Some(Utc::now());
    }

    /// Marks the checkout failed
    pub fn fail(&mut self, reason: impl Into<String>) {
        self.status = GatewayPaymentStatus::Failed;
        self.failure_reason = Some(reason.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    #[test]
    fn checkout_lifecycle() {
        let mut payment = GatewayPayment::new(
            PremiumId::new(),
            UserId::new(),
            GatewayKind::Stripe,
            "order_abc",
            Money::new(dec!(1020), Currency::USD),
        );
        assert_eq!(payment.status, GatewayPaymentStatus::Created);

        payment.complete();
        assert_eq!(payment.status, GatewayPaymentStatus::Completed);
        assert!(payment.completed_at.is_some());
    }

    #[test]
    fn failure_records_reason() {
        let mut payment = GatewayPayment::new(
            PremiumId::new(),
            UserId::new(),
            GatewayKind::Razorpay,
            "order_xyz",
            Money::new(dec!(500), Currency::INR),
        );
        payment.fail("card declined");
        assert_eq!(payment.status, GatewayPaymentStatus::Failed);
        assert_eq!(payment.failure_reason.as_deref(), Some("card declined"));
    }
}
