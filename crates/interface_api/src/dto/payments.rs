//! Gateway payment DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use domain_billing::GatewayPayment;

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub premium_id: Uuid,
    /// stripe or razorpay
    pub gateway: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ConfirmPaymentRequest {
    #[validate(length(min = 1, message = "Order id is required"))]
    pub order_id: String,
    /// Hex HMAC signature over the order id
    #[validate(length(min = 1, message = "Signature is required"))]
    pub signature: String,
}

/// Body of a gateway webhook callback
#[derive(Debug, Deserialize)]
pub struct WebhookEvent {
    /// payment.completed or payment.failed
    pub event: String,
    pub order_id: String,
    pub reason: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub id: Uuid,
    pub premium_id: Uuid,
    pub gateway: String,
    pub order_id: String,
    pub amount: Decimal,
    pub currency: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<&GatewayPayment> for PaymentResponse {
    fn from(payment: &GatewayPayment) -> Self {
        Self {
            id: *payment.id.as_uuid(),
            premium_id: *payment.premium_id.as_uuid(),
            gateway: payment.gateway.as_str().to_string(),
            order_id: payment.order_id.clone(),
            amount: payment.amount.amount(),
            currency: payment.amount.currency().code().to_string(),
            status: payment.status.as_str().to_string(),
            failure_reason: payment.failure_reason.clone(),
            created_at: payment.created_at,
            completed_at: payment.completed_at,
        }
    }
}

/// Checkout response handed to the front-end to launch the gateway flow
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub payment: PaymentResponse,
    /// Amount in the gateway's minor units
    pub amount_minor: i64,
}
