//! Premium installment repository
//!
//! Settlement uses a guarded update: the row only moves to paid when it is
//! still in a payable state, so two concurrent payment attempts cannot both
//! succeed.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tracing::{debug, info, warn};
use uuid::Uuid;

use core_kernel::{Currency, Money, PolicyId, PremiumId, RecordFilter, UserId};
use domain_billing::{PaymentMethod, PremiumInstallment, PremiumStatus};

use crate::error::DatabaseError;
use crate::repositories::push_scope;

/// Database row representation of a premium installment
#[derive(Debug, Clone, FromRow)]
pub struct PremiumRow {
    pub id: Uuid,
    pub policy_id: Uuid,
    pub policyholder_id: Uuid,
    pub amount: rust_decimal::Decimal,
    pub late_fee: rust_decimal::Decimal,
    pub discount: rust_decimal::Decimal,
    pub final_amount: rust_decimal::Decimal,
    pub currency: String,
    pub status: String,
    pub due_date: NaiveDate,
    pub paid_date: Option<DateTime<Utc>>,
    pub payment_method: Option<String>,
    pub transaction_id: Option<String>,
    pub payment_reference: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<PremiumRow> for PremiumInstallment {
    type Error = DatabaseError;

    fn try_from(row: PremiumRow) -> Result<Self, Self::Error> {
        let status = PremiumStatus::parse(&row.status).ok_or_else(|| {
            DatabaseError::SerializationError(format!("Unknown premium status '{}'", row.status))
        })?;
        let payment_method = row
            .payment_method
            .as_deref()
            .map(|m| {
                PaymentMethod::parse(m).ok_or_else(|| {
                    DatabaseError::SerializationError(format!("Unknown payment method '{m}'"))
                })
            })
            .transpose()?;
        let currency = Currency::parse(&row.currency)
            .map_err(|e| DatabaseError::SerializationError(e.to_string()))?;

        Ok(PremiumInstallment {
            id: PremiumId::from(row.id),
            policy_id: PolicyId::from(row.policy_id),
            policyholder_id: UserId::from(row.policyholder_id),
            amount: Money::new(row.amount, currency),
            late_fee: Money::new(row.late_fee, currency),
            discount: Money::new(row.discount, currency),
            final_amount: Money::new(row.final_amount, currency),
            status,
            due_date: row.due_date,
            paid_date: row.paid_date,
            payment_method,
            transaction_id: row.transaction_id,
            payment_reference: row.payment_reference,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const SELECT_PREMIUM: &str = r#"
    SELECT pr.id, pr.policy_id, pr.policyholder_id, pr.amount, pr.late_fee,
           pr.discount, pr.final_amount, pr.currency, pr.status, pr.due_date,
           pr.paid_date, pr.payment_method, pr.transaction_id,
           pr.payment_reference, pr.created_at, pr.updated_at
    FROM premiums pr
"#;

/// Optional list filters beyond the caller's scope
#[derive(Debug, Clone, Default)]
pub struct PremiumListFilter {
    pub status: Option<PremiumStatus>,
    pub policy_id: Option<PolicyId>,
}

/// Repository for premium installments
#[derive(Debug, Clone)]
pub struct PremiumRepository {
    pool: PgPool,
}

impl PremiumRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a new installment
    pub async fn insert(&self, installment: &PremiumInstallment) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::from_sqlx)?;
        insert_installment(&mut tx, installment).await?;
        tx.commit().await.map_err(DatabaseError::from_sqlx)?;
        Ok(())
    }

    /// Fetches an installment by identifier
    pub async fn find_by_id(&self, id: PremiumId) -> Result<PremiumInstallment, DatabaseError> {
        let row = sqlx::query_as::<_, PremiumRow>(&format!("{SELECT_PREMIUM} WHERE pr.id = $1"))
            .bind(Uuid::from(id))
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from_sqlx)?
            .ok_or_else(|| DatabaseError::not_found("Premium", id))?;

        row.try_into()
    }

    /// Lists installments visible to the caller
    ///
    /// Agent scoping goes through the owning policy's servicing agent.
    pub async fn list(
        &self,
        scope: &RecordFilter,
        filter: &PremiumListFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PremiumInstallment>, DatabaseError> {
        let mut qb: QueryBuilder<'_, Postgres> = QueryBuilder::new(format!(
            "{SELECT_PREMIUM} JOIN policies p ON pr.policy_id = p.id WHERE TRUE"
        ));
        push_scope(&mut qb, scope, "pr.policyholder_id", "p.servicing_agent_id");
        if let Some(status) = filter.status {
            qb.push(" AND pr.status = ").push_bind(status.as_str());
        }
        if let Some(policy_id) = filter.policy_id {
            qb.push(" AND pr.policy_id = ").push_bind(Uuid::from(policy_id));
        }
        qb.push(" ORDER BY pr.due_date DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let rows = qb
            .build_query_as::<PremiumRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::from_sqlx)?;

        rows.into_iter().map(PremiumInstallment::try_from).collect()
    }

    /// Settles an installment with a guarded update
    ///
    /// The WHERE clause admits only payable states, so a concurrent payment
    /// of the same installment makes exactly one of the two updates win;
    /// the loser surfaces as `ConcurrentModification`.
    pub async fn settle_payment(
        &self,
        id: PremiumId,
        method: PaymentMethod,
        transaction_id: &str,
        payment_reference: Option<&str>,
    ) -> Result<PremiumInstallment, DatabaseError> {
        let now = Utc::now();
        let row = sqlx::query_as::<_, PremiumRow>(&format!(
            r#"
            UPDATE premiums pr
            SET status = 'paid',
                paid_date = $2,
                payment_method = $3,
                transaction_id = $4,
                payment_reference = $5,
                updated_at = $2
            WHERE pr.id = $1 AND pr.status IN ('pending', 'overdue')
            RETURNING pr.id, pr.policy_id, pr.policyholder_id, pr.amount,
                      pr.late_fee, pr.discount, pr.final_amount, pr.currency,
                      pr.status, pr.due_date, pr.paid_date, pr.payment_method,
                      pr.transaction_id, pr.payment_reference, pr.created_at,
                      pr.updated_at
            "#
        ))
        .bind(Uuid::from(id))
        .bind(now)
        .bind(method.as_str())
        .bind(transaction_id)
        .bind(payment_reference)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)?;

        match row {
            Some(row) => {
                info!(premium_id = %id, transaction_id, "Premium settled");
                row.try_into()
            }
            None => {
                // Distinguish a missing record from one that already moved on.
                let exists = sqlx::query_scalar::<_, bool>(
                    "SELECT EXISTS (SELECT 1 FROM premiums WHERE id = $1)",
                )
                .bind(Uuid::from(id))
                .fetch_one(&self.pool)
                .await
                .map_err(DatabaseError::from_sqlx)?;

                if exists {
                    warn!(premium_id = %id, "Settlement rejected: installment not payable");
                    Err(DatabaseError::ConcurrentModification(format!(
                        "Premium '{id}' is not in a payable state"
                    )))
                } else {
                    Err(DatabaseError::not_found("Premium", id))
                }
            }
        }
    }

    /// Marks overdue every pending installment whose due date has passed
    ///
    /// Rows are locked for the duration of the sweep; the late fee is
    /// computed by the domain state machine, not in SQL.
    pub async fn sweep_overdue(&self, today: NaiveDate) -> Result<u64, DatabaseError> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::from_sqlx)?;

        let rows = sqlx::query_as::<_, PremiumRow>(&format!(
            "{SELECT_PREMIUM} WHERE pr.status = 'pending' AND pr.due_date < $1 FOR UPDATE"
        ))
        .bind(today)
        .fetch_all(&mut *tx)
        .await
        .map_err(DatabaseError::from_sqlx)?;

        let mut swept = 0u64;
        for row in rows {
            let mut installment: PremiumInstallment = row.try_into()?;
            installment
                .mark_overdue(today)
                .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))?;
            update_installment(&mut tx, &installment).await?;
            swept += 1;
        }

        tx.commit().await.map_err(DatabaseError::from_sqlx)?;
        if swept > 0 {
            info!(count = swept, "Installments marked overdue");
        }
        Ok(swept)
    }

    /// Persists the mutable state of an installment
    pub async fn update(&self, installment: &PremiumInstallment) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::from_sqlx)?;
        update_installment(&mut tx, installment).await?;
        tx.commit().await.map_err(DatabaseError::from_sqlx)?;
        Ok(())
    }
}

/// Inserts an installment within an existing transaction
pub(crate) async fn insert_installment(
    tx: &mut sqlx::Transaction<'_, Postgres>,
    installment: &PremiumInstallment,
) -> Result<(), DatabaseError> {
    sqlx::query(
        r#"
        INSERT INTO premiums (
            id, policy_id, policyholder_id, amount, late_fee, discount,
            final_amount, currency, status, due_date, paid_date,
            payment_method, transaction_id, payment_reference,
            created_at, updated_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
        "#,
    )
    .bind(Uuid::from(installment.id))
    .bind(Uuid::from(installment.policy_id))
    .bind(Uuid::from(installment.policyholder_id))
    .bind(installment.amount.amount())
    .bind(installment.late_fee.amount())
    .bind(installment.discount.amount())
    .bind(installment.final_amount.amount())
    .bind(installment.amount.currency().code())
    .bind(installment.status.as_str())
    .bind(installment.due_date)
    .bind(installment.paid_date)
    .bind(installment.payment_method.map(|m| m.as_str()))
    .bind(&installment.transaction_id)
    .bind(&installment.payment_reference)
    .bind(installment.created_at)
    .bind(installment.updated_at)
    .execute(&mut **tx)
    .await
    .map_err(DatabaseError::from_sqlx)?;

    debug!(premium_id = %installment.id, "Installment inserted");
    Ok(())
}

async fn update_installment(
    tx: &mut sqlx::Transaction<'_, Postgres>,
    installment: &PremiumInstallment,
) -> Result<(), DatabaseError> {
    let result = sqlx::query(
        r#"
        UPDATE premiums
        SET late_fee = $2,
            discount = $3,
            final_amount = $4,
            status = $5,
            paid_date = $6,
            payment_method = $7,
            transaction_id = $8,
            payment_reference = $9,
            updated_at = $10
        WHERE id = $1
        "#,
    )
    .bind(Uuid::from(installment.id))
    .bind(installment.late_fee.amount())
    .bind(installment.discount.amount())
    .bind(installment.final_amount.amount())
    .bind(installment.status.as_str())
    .bind(installment.paid_date)
    .bind(installment.payment_method.map(|m| m.as_str()))
    .bind(&installment.transaction_id)
    .bind(&installment.payment_reference)
    .bind(installment.updated_at)
    .execute(&mut **tx)
    .await
    .map_err(DatabaseError::from_sqlx)?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::not_found("Premium", installment.id));
    }
    Ok(())
}
