//! Claim repository

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tracing::{debug, info};
use uuid::Uuid;

use core_kernel::{ClaimId, Currency, Money, PolicyId, RecordFilter, UserId};
use domain_claims::{Claim, ClaimStatus};

use crate::error::DatabaseError;
use crate::repositories::push_scope;

/// Database row representation of a claim
#[derive(Debug, Clone, FromRow)]
pub struct ClaimRow {
    pub id: Uuid,
    pub claim_number: String,
    pub policy_id: Uuid,
    pub claimant_id: Uuid,
    pub status: String,
    pub incident_date: NaiveDate,
    pub description: String,
    pub claim_amount: rust_decimal::Decimal,
    pub currency: String,
    pub approved_amount: Option<rust_decimal::Decimal>,
    pub rejection_reason: Option<String>,
    pub reviewed_by: Option<Uuid>,
    pub review_date: Option<DateTime<Utc>>,
    pub payment_date: Option<DateTime<Utc>>,
    pub payment_reference: Option<String>,
    pub estimated_processing_days: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ClaimRow> for Claim {
    type Error = DatabaseError;

    fn try_from(row: ClaimRow) -> Result<Self, Self::Error> {
        let status = ClaimStatus::parse(&row.status).ok_or_else(|| {
            DatabaseError::SerializationError(format!("Unknown claim status '{}'", row.status))
        })?;
        let currency = Currency::parse(&row.currency)
            .map_err(|e| DatabaseError::SerializationError(e.to_string()))?;

        Ok(Claim {
            id: ClaimId::from(row.id),
            claim_number: row.claim_number,
            policy_id: PolicyId::from(row.policy_id),
            claimant_id: UserId::from(row.claimant_id),
            status,
            incident_date: row.incident_date,
            description: row.description,
            claim_amount: Money::new(row.claim_amount, currency),
            approved_amount: row.approved_amount.map(|a| Money::new(a, currency)),
            rejection_reason: row.rejection_reason,
            reviewed_by: row.reviewed_by.map(UserId::from),
            review_date: row.review_date,
            payment_date: row.payment_date,
            payment_reference: row.payment_reference,
            estimated_processing_days: row.estimated_processing_days,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const SELECT_CLAIM: &str = r#"
    SELECT c.id, c.claim_number, c.policy_id, c.claimant_id, c.status,
           c.incident_date, c.description, c.claim_amount, c.currency,
           c.approved_amount, c.rejection_reason, c.reviewed_by,
           c.review_date, c.payment_date, c.payment_reference,
           c.estimated_processing_days, c.created_at, c.updated_at
    FROM claims c
"#;

/// Optional list filters beyond the caller's scope
#[derive(Debug, Clone, Default)]
pub struct ClaimListFilter {
    pub status: Option<ClaimStatus>,
    pub policy_id: Option<PolicyId>,
}

/// Repository for claim aggregates
#[derive(Debug, Clone)]
pub struct ClaimRepository {
    pool: PgPool,
}

impl ClaimRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a newly filed claim
    pub async fn insert(&self, claim: &Claim) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO claims (
                id, claim_number, policy_id, claimant_id, status,
                incident_date, description, claim_amount, currency,
                approved_amount, rejection_reason, reviewed_by, review_date,
                payment_date, payment_reference, estimated_processing_days,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12,
                      $13, $14, $15, $16, $17, $18)
            "#,
        )
        .bind(Uuid::from(claim.id))
        .bind(&claim.claim_number)
        .bind(Uuid::from(claim.policy_id))
        .bind(Uuid::from(claim.claimant_id))
        .bind(claim.status.as_str())
        .bind(claim.incident_date)
        .bind(&claim.description)
        .bind(claim.claim_amount.amount())
        .bind(claim.claim_amount.currency().code())
        .bind(claim.approved_amount.map(|a| a.amount()))
        .bind(&claim.rejection_reason)
        .bind(claim.reviewed_by.map(Uuid::from))
        .bind(claim.review_date)
        .bind(claim.payment_date)
        .bind(&claim.payment_reference)
        .bind(claim.estimated_processing_days)
        .bind(claim.created_at)
        .bind(claim.updated_at)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)?;

        info!(claim_id = %claim.id, claim_number = %claim.claim_number, "Claim filed");
        Ok(())
    }

    /// Fetches a claim by identifier
    pub async fn find_by_id(&self, id: ClaimId) -> Result<Claim, DatabaseError> {
        let row = sqlx::query_as::<_, ClaimRow>(&format!("{SELECT_CLAIM} WHERE c.id = $1"))
            .bind(Uuid::from(id))
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from_sqlx)?
            .ok_or_else(|| DatabaseError::not_found("Claim", id))?;

        row.try_into()
    }

    /// Lists claims visible to the caller
    ///
    /// Agent scoping goes through the claimed policy's servicing agent.
    pub async fn list(
        &self,
        scope: &RecordFilter,
        filter: &ClaimListFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Claim>, DatabaseError> {
        let mut qb: QueryBuilder<'_, Postgres> = QueryBuilder::new(format!(
            "{SELECT_CLAIM} JOIN policies p ON c.policy_id = p.id WHERE TRUE"
        ));
        push_scope(&mut qb, scope, "c.claimant_id", "p.servicing_agent_id");
        if let Some(status) = filter.status {
            qb.push(" AND c.status = ").push_bind(status.as_str());
        }
        if let Some(policy_id) = filter.policy_id {
            qb.push(" AND c.policy_id = ").push_bind(Uuid::from(policy_id));
        }
        qb.push(" ORDER BY c.created_at DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let rows = qb
            .build_query_as::<ClaimRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::from_sqlx)?;

        rows.into_iter().map(Claim::try_from).collect()
    }

    /// Persists the mutable state of a claim (review decisions, settlement)
    pub async fn update(&self, claim: &Claim) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE claims
            SET status = $2,
                approved_amount = $3,
                rejection_reason = $4,
                reviewed_by = $5,
                review_date = $6,
                payment_date = $7,
                payment_reference = $8,
                updated_at = $9
            WHERE id = $1
            "#,
        )
        .bind(Uuid::from(claim.id))
        .bind(claim.status.as_str())
        .bind(claim.approved_amount.map(|a| a.amount()))
        .bind(&claim.rejection_reason)
        .bind(claim.reviewed_by.map(Uuid::from))
        .bind(claim.review_date)
        .bind(claim.payment_date)
        .bind(&claim.payment_reference)
        .bind(claim.updated_at)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Claim", claim.id));
        }
        debug!(claim_id = %claim.id, status = claim.status.as_str(), "Claim updated");
        Ok(())
    }
}
