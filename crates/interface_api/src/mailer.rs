//! Outbound notification port
//!
//! Notifications are best-effort side effects: a failed email never fails
//! the request that triggered it. Handlers call [`Mailer::send`] after the
//! transaction commits.

use serde_json::Value;
use tracing::info;

/// Port for outbound user notifications
pub trait Mailer: Send + Sync {
    /// Queues a templated message to a recipient
    ///
    /// `template` names the message kind (e.g. "welcome",
    /// "payment_receipt", "claim_decision"); `data` carries the
    /// substitution values.
    fn send(&self, to: &str, template: &str, data: Value);
}

/// Mailer that records notifications in the structured log
///
/// Used in development and tests; a delivery-backed implementation plugs
/// in behind the same trait.
#[derive(Debug, Clone, Default)]
pub struct TracingMailer;

impl Mailer for TracingMailer {
    fn send(&self, to: &str, template: &str, data: Value) {
        info!(to, template, %data, "Notification queued");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tracing_mailer_accepts_any_template() {
        let mailer = TracingMailer;
        mailer.send(
            "user@example.com",
            "payment_receipt",
            json!({ "amount": "USD 102.00", "reference": "order_1" }),
        );
    }
}
