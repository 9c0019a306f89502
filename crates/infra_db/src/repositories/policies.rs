//! Policy repository
//!
//! Issuing a policy also books its first premium installment; the two
//! inserts share a transaction so a half-issued policy can never exist.
//! Cancellation likewise cascades to pending installments atomically.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tracing::{debug, info};
use uuid::Uuid;

use core_kernel::{Currency, Money, PolicyId, RecordFilter, UserId};
use domain_billing::PremiumInstallment;
use domain_policy::{Beneficiary, Policy, PolicyKind, PolicyStatus, PremiumFrequency};

use crate::error::DatabaseError;
use crate::repositories::premiums::insert_installment;
use crate::repositories::push_scope;

/// Database row representation of a policy
#[derive(Debug, Clone, FromRow)]
pub struct PolicyRow {
    pub id: Uuid,
    pub policy_number: String,
    pub kind: String,
    pub policyholder_id: Uuid,
    pub servicing_agent_id: Option<Uuid>,
    pub status: String,
    pub coverage_amount: rust_decimal::Decimal,
    pub premium_amount: rust_decimal::Decimal,
    pub currency: String,
    pub premium_frequency: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub beneficiaries: serde_json::Value,
    pub cancellation_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<PolicyRow> for Policy {
    type Error = DatabaseError;

    fn try_from(row: PolicyRow) -> Result<Self, Self::Error> {
        let kind = PolicyKind::parse(&row.kind).ok_or_else(|| {
            DatabaseError::SerializationError(format!("Unknown policy kind '{}'", row.kind))
        })?;
        let status = PolicyStatus::parse(&row.status).ok_or_else(|| {
            DatabaseError::SerializationError(format!("Unknown policy status '{}'", row.status))
        })?;
        let frequency = PremiumFrequency::parse(&row.premium_frequency).ok_or_else(|| {
            DatabaseError::SerializationError(format!(
                "Unknown premium frequency '{}'",
                row.premium_frequency
            ))
        })?;
        let currency = Currency::parse(&row.currency)
            .map_err(|e| DatabaseError::SerializationError(e.to_string()))?;
        let beneficiaries: Vec<Beneficiary> = serde_json::from_value(row.beneficiaries)
            .map_err(|e| DatabaseError::SerializationError(e.to_string()))?;

        Ok(Policy {
            id: PolicyId::from(row.id),
            policy_number: row.policy_number,
            kind,
            policyholder_id: UserId::from(row.policyholder_id),
            servicing_agent_id: row.servicing_agent_id.map(UserId::from),
            status,
            coverage_amount: Money::new(row.coverage_amount, currency),
            premium_amount: Money::new(row.premium_amount, currency),
            premium_frequency: frequency,
            start_date: row.start_date,
            end_date: row.end_date,
            beneficiaries,
            cancellation_reason: row.cancellation_reason,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const SELECT_POLICY: &str = r#"
    SELECT id, policy_number, kind, policyholder_id, servicing_agent_id,
           status, coverage_amount, premium_amount, currency,
           premium_frequency, start_date, end_date, beneficiaries,
           cancellation_reason, created_at, updated_at
    FROM policies
"#;

/// Optional list filters beyond the caller's scope
#[derive(Debug, Clone, Default)]
pub struct PolicyListFilter {
    pub status: Option<PolicyStatus>,
    pub kind: Option<PolicyKind>,
}

/// Repository for policy aggregates
#[derive(Debug, Clone)]
pub struct PolicyRepository {
    pool: PgPool,
}

impl PolicyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Issues a policy together with its first premium installment
    ///
    /// Both inserts run in one transaction.
    pub async fn insert_with_first_installment(
        &self,
        policy: &Policy,
        first_installment: &PremiumInstallment,
    ) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::from_sqlx)?;

        insert_policy(&mut tx, policy).await?;
        insert_installment(&mut tx, first_installment).await?;

        tx.commit().await.map_err(DatabaseError::from_sqlx)?;
        info!(policy_id = %policy.id, premium_id = %first_installment.id, "Policy issued");
        Ok(())
    }

    /// Fetches a policy by identifier
    pub async fn find_by_id(&self, id: PolicyId) -> Result<Policy, DatabaseError> {
        let row = sqlx::query_as::<_, PolicyRow>(&format!("{SELECT_POLICY} WHERE id = $1"))
            .bind(Uuid::from(id))
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from_sqlx)?
            .ok_or_else(|| DatabaseError::not_found("Policy", id))?;

        row.try_into()
    }

    /// Lists policies visible to the caller
    pub async fn list(
        &self,
        scope: &RecordFilter,
        filter: &PolicyListFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Policy>, DatabaseError> {
        let mut qb: QueryBuilder<'_, Postgres> = QueryBuilder::new(SELECT_POLICY);
        qb.push(" WHERE TRUE");
        push_scope(&mut qb, scope, "policyholder_id", "servicing_agent_id");
        if let Some(status) = filter.status {
            qb.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(kind) = filter.kind {
            qb.push(" AND kind = ").push_bind(kind.as_str());
        }
        qb.push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let rows = qb
            .build_query_as::<PolicyRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::from_sqlx)?;

        rows.into_iter().map(Policy::try_from).collect()
    }

    /// Persists the mutable state of a policy (renewals, beneficiary
    /// changes, suspension, expiry)
    pub async fn update(&self, policy: &Policy) -> Result<(), DatabaseError> {
        let beneficiaries = serde_json::to_value(&policy.beneficiaries)
            .map_err(|e| DatabaseError::SerializationError(e.to_string()))?;

        let result = sqlx::query(
            r#"
            UPDATE policies
            SET status = $2,
                premium_amount = $3,
                end_date = $4,
                beneficiaries = $5,
                cancellation_reason = $6,
                updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(Uuid::from(policy.id))
        .bind(policy.status.as_str())
        .bind(policy.premium_amount.amount())
        .bind(policy.end_date)
        .bind(beneficiaries)
        .bind(&policy.cancellation_reason)
        .bind(policy.updated_at)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Policy", policy.id));
        }
        debug!(policy_id = %policy.id, status = policy.status.as_str(), "Policy updated");
        Ok(())
    }

    /// Cancels a policy and its pending installments in one transaction
    ///
    /// The policy aggregate has already transitioned to cancelled; this
    /// persists it and cascades to every still-pending premium.
    pub async fn cancel_with_cascade(&self, policy: &Policy) -> Result<u64, DatabaseError> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::from_sqlx)?;

        let updated = sqlx::query(
            r#"
            UPDATE policies
            SET status = $2, cancellation_reason = $3, updated_at = $4
            WHERE id = $1
            "#,
        )
        .bind(Uuid::from(policy.id))
        .bind(policy.status.as_str())
        .bind(&policy.cancellation_reason)
        .bind(policy.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(DatabaseError::from_sqlx)?;

        if updated.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Policy", policy.id));
        }

        let cascaded = sqlx::query(
            r#"
            UPDATE premiums
            SET status = 'cancelled', updated_at = $2
            WHERE policy_id = $1 AND status = 'pending'
            "#,
        )
        .bind(Uuid::from(policy.id))
        .bind(policy.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(DatabaseError::from_sqlx)?;

        tx.commit().await.map_err(DatabaseError::from_sqlx)?;
        info!(
            policy_id = %policy.id,
            cancelled_installments = cascaded.rows_affected(),
            "Policy cancelled"
        );
        Ok(cascaded.rows_affected())
    }
}

async fn insert_policy(
    tx: &mut sqlx::Transaction<'_, Postgres>,
    policy: &Policy,
) -> Result<(), DatabaseError> {
    let beneficiaries = serde_json::to_value(&policy.beneficiaries)
        .map_err(|e| DatabaseError::SerializationError(e.to_string()))?;

    sqlx::query(
        r#"
        INSERT INTO policies (
            id, policy_number, kind, policyholder_id, servicing_agent_id,
            status, coverage_amount, premium_amount, currency,
            premium_frequency, start_date, end_date, beneficiaries,
            cancellation_reason, created_at, updated_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
        "#,
    )
    .bind(Uuid::from(policy.id))
    .bind(&policy.policy_number)
    .bind(policy.kind.as_str())
    .bind(Uuid::from(policy.policyholder_id))
    .bind(policy.servicing_agent_id.map(Uuid::from))
    .bind(policy.status.as_str())
    .bind(policy.coverage_amount.amount())
    .bind(policy.premium_amount.amount())
    .bind(policy.coverage_amount.currency().code())
    .bind(policy.premium_frequency.as_str())
    .bind(policy.start_date)
    .bind(policy.end_date)
    .bind(beneficiaries)
    .bind(&policy.cancellation_reason)
    .bind(policy.created_at)
    .bind(policy.updated_at)
    .execute(&mut **tx)
    .await
    .map_err(DatabaseError::from_sqlx)?;

    Ok(())
}
