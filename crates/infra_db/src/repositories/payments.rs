//! Gateway payment repository
//!
//! Completing a checkout settles the underlying premium in the same
//! transaction: the payment row moves to completed and the installment's
//! guarded update moves it to paid, or neither happens.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::{info, warn};
use uuid::Uuid;

use core_kernel::{Currency, Money, PaymentId, PremiumId, RecordFilter, UserId};
use domain_billing::{GatewayKind, GatewayPayment, GatewayPaymentStatus, PaymentMethod};

use crate::error::DatabaseError;
use crate::repositories::premiums::PremiumRow;

/// Database row representation of a gateway payment
#[derive(Debug, Clone, FromRow)]
pub struct PaymentRow {
    pub id: Uuid,
    pub premium_id: Uuid,
    pub payer_id: Uuid,
    pub gateway: String,
    pub order_id: String,
    pub amount: rust_decimal::Decimal,
    pub currency: String,
    pub status: String,
    pub failure_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl TryFrom<PaymentRow> for GatewayPayment {
    type Error = DatabaseError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        let gateway = GatewayKind::parse(&row.gateway).ok_or_else(|| {
            DatabaseError::SerializationError(format!("Unknown gateway '{}'", row.gateway))
        })?;
        let status = GatewayPaymentStatus::parse(&row.status).ok_or_else(|| {
            DatabaseError::SerializationError(format!("Unknown payment status '{}'", row.status))
        })?;
        let currency = Currency::parse(&row.currency)
            .map_err(|e| DatabaseError::SerializationError(e.to_string()))?;

        Ok(GatewayPayment {
            id: PaymentId::from(row.id),
            premium_id: PremiumId::from(row.premium_id),
            payer_id: UserId::from(row.payer_id),
            gateway,
            order_id: row.order_id,
            amount: Money::new(row.amount, currency),
            status,
            failure_reason: row.failure_reason,
            created_at: row.created_at,
            completed_at: row.completed_at,
        })
    }
}

const SELECT_PAYMENT: &str = r#"
    SELECT id, premium_id, payer_id, gateway, order_id, amount, currency,
           status, failure_reason, created_at, completed_at
    FROM payments
"#;

/// Repository for gateway payment records
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    pool: PgPool,
}

impl PaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Records a freshly created gateway order
    pub async fn insert(&self, payment: &GatewayPayment) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO payments (
                id, premium_id, payer_id, gateway, order_id, amount, currency,
                status, failure_reason, created_at, completed_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(Uuid::from(payment.id))
        .bind(Uuid::from(payment.premium_id))
        .bind(Uuid::from(payment.payer_id))
        .bind(payment.gateway.as_str())
        .bind(&payment.order_id)
        .bind(payment.amount.amount())
        .bind(payment.amount.currency().code())
        .bind(payment.status.as_str())
        .bind(&payment.failure_reason)
        .bind(payment.created_at)
        .bind(payment.completed_at)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)?;

        info!(payment_id = %payment.id, order_id = %payment.order_id, "Gateway order recorded");
        Ok(())
    }

    /// Fetches a payment by its gateway order identifier
    pub async fn find_by_order_id(&self, order_id: &str) -> Result<GatewayPayment, DatabaseError> {
        let row =
            sqlx::query_as::<_, PaymentRow>(&format!("{SELECT_PAYMENT} WHERE order_id = $1"))
                .bind(order_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(DatabaseError::from_sqlx)?
                .ok_or_else(|| DatabaseError::not_found("Payment", order_id))?;

        row.try_into()
    }

    /// Completes a checkout and settles its premium atomically
    ///
    /// Both the payment row and the installment carry state guards in
    /// their UPDATE predicates; a replayed webhook or a double confirm
    /// finds no matching row and surfaces as `ConcurrentModification`.
    pub async fn complete_and_settle(
        &self,
        order_id: &str,
        method: PaymentMethod,
    ) -> Result<GatewayPayment, DatabaseError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await.map_err(DatabaseError::from_sqlx)?;

        let payment_row = sqlx::query_as::<_, PaymentRow>(&format!(
            r#"
            UPDATE payments
            SET status = 'completed', completed_at = $2
            WHERE order_id = $1 AND status = 'created'
            RETURNING id, premium_id, payer_id, gateway, order_id, amount,
                      currency, status, failure_reason, created_at, completed_at
            "#
        ))
        .bind(order_id)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await
        .map_err(DatabaseError::from_sqlx)?;

        let payment_row = match payment_row {
            Some(row) => row,
            None => {
                let exists = sqlx::query_scalar::<_, bool>(
                    "SELECT EXISTS (SELECT 1 FROM payments WHERE order_id = $1)",
                )
                .bind(order_id)
                .fetch_one(&mut *tx)
                .await
                .map_err(DatabaseError::from_sqlx)?;

                return if exists {
                    warn!(order_id, "Completion rejected: order already settled or failed");
                    Err(DatabaseError::ConcurrentModification(format!(
                        "Payment order '{order_id}' is not awaiting completion"
                    )))
                } else {
                    Err(DatabaseError::not_found("Payment", order_id))
                };
            }
        };

        let settled = sqlx::query_as::<_, PremiumRow>(
            r#"
            UPDATE premiums
            SET status = 'paid',
                paid_date = $2,
                payment_method = $3,
                transaction_id = $4,
                payment_reference = $4,
                updated_at = $2
            WHERE id = $1 AND status IN ('pending', 'overdue')
            RETURNING id, policy_id, policyholder_id, amount, late_fee,
                      discount, final_amount, currency, status, due_date,
                      paid_date, payment_method, transaction_id,
                      payment_reference, created_at, updated_at
            "#,
        )
        .bind(payment_row.premium_id)
        .bind(now)
        .bind(method.as_str())
        .bind(order_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(DatabaseError::from_sqlx)?;

        if settled.is_none() {
            // Roll back the payment completion as well.
            tx.rollback().await.map_err(DatabaseError::from_sqlx)?;
            warn!(order_id, "Settlement rejected: installment not payable");
            return Err(DatabaseError::ConcurrentModification(format!(
                "Premium behind order '{order_id}' is not in a payable state"
            )));
        }

        tx.commit().await.map_err(DatabaseError::from_sqlx)?;
        info!(order_id, "Checkout completed and premium settled");
        payment_row.try_into()
    }

    /// Marks a checkout failed with the gateway's reason
    pub async fn mark_failed(&self, order_id: &str, reason: &str) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE payments
            SET status = 'failed', failure_reason = $2
            WHERE order_id = $1 AND status = 'created'
            "#,
        )
        .bind(order_id)
        .bind(reason)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Payment", order_id));
        }
        Ok(())
    }

    /// Checks whether the caller may see a payment record
    pub fn visible_to(&self, payment: &GatewayPayment, scope: &RecordFilter) -> bool {
        match scope {
            RecordFilter::All => true,
            RecordFilter::OwnedBy(id) | RecordFilter::OwnedOrServicedBy(id) => {
                payment.payer_id == *id
            }
        }
    }
}
