//! Billing Domain
//!
//! Premium installments and their lifecycle (pending, paid, overdue,
//! cancelled), the 2% late-fee rule, gateway payment records, and HMAC
//! webhook signature verification.

pub mod error;
pub mod gateway;
pub mod installment;
pub mod payment;
pub mod webhook;

pub use error::BillingError;
pub use gateway::{GatewayKind, GatewayOrder, PaymentGateway, SignedGateway};
pub use installment::{PaymentMethod, PremiumInstallment, PremiumStatus, LATE_FEE_PERCENT};
pub use payment::{GatewayPayment, GatewayPaymentStatus};
pub use webhook::{sign_payload, verify_signature};
