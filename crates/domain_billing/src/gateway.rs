//! Payment gateway port
//!
//! The two supported gateways are external collaborators; the domain sees
//! only this trait: create an order for an amount, verify a completion
//! signature. Amounts cross the boundary in minor units, as both vendors
//! expect.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use core_kernel::Money;

use crate::error::BillingError;
use crate::webhook;

/// Supported payment gateways
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayKind {
    Stripe,
    Razorpay,
}

impl GatewayKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GatewayKind::Stripe => "stripe",
            GatewayKind::Razorpay => "razorpay",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "stripe" => Some(GatewayKind::Stripe),
            "razorpay" => Some(GatewayKind::Razorpay),
            _ => None,
        }
    }
}

/// A created order at the gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayOrder {
    /// Gateway-side order identifier
    pub order_id: String,
    /// Amount in minor units (cents, paise)
    pub amount_minor: i64,
    /// ISO 4217 currency code
    pub currency: String,
}

/// Port to an external payment gateway
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Which gateway this adapter fronts
    fn kind(&self) -> GatewayKind;

    /// Creates a payment order for the given amount
    async fn create_order(&self, amount: Money) -> Result<GatewayOrder, BillingError>;

    /// Verifies a signature over a payload (confirm call or webhook body)
    fn verify_signature(&self, payload: &[u8], signature_hex: &str) -> bool;
}

/// Gateway adapter backed by a shared signing secret
///
/// Order ids are issued locally; completion is accepted only with a valid
/// HMAC signature from the configured secret. This is the adapter wired in
/// production configuration as well as in tests, since the gateways are
/// interface-only collaborators here.
pub struct SignedGateway {
    kind: GatewayKind,
    secret: String,
}

impl SignedGateway {
    pub fn new(kind: GatewayKind, secret: impl Into<String>) -> Self {
        Self {
            kind,
            secret: secret.into(),
        }
    }

    /// Signs a payload with this gateway's secret (test/webhook emission)
    pub fn sign(&self, payload: &[u8]) -> String {
        webhook::sign_payload(&self.secret, payload)
    }
}

#[async_trait]
impl PaymentGateway for SignedGateway {
    fn kind(&self) -> GatewayKind {
        self.kind
    }

    async fn create_order(&self, amount: Money) -> Result<GatewayOrder, BillingError> {
        if !amount.is_positive() {
            return Err(BillingError::Validation(
                "Order amount must be positive".to_string(),
            ));
        }

        let prefix = match self.kind {
            GatewayKind::Stripe => "pi",
            GatewayKind::Razorpay => "order",
        };

        Ok(GatewayOrder {
            order_id: format!("{}_{}", prefix, Uuid::new_v4().simple()),
            amount_minor: amount.to_minor(),
            currency: amount.currency().code().to_string(),
        })
    }

    fn verify_signature(&self, payload: &[u8], signature_hex: &str) -> bool {
        webhook::verify_signature(&self.secret, payload, signature_hex)
    }
}
