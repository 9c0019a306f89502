//! Administrative reporting queries
//!
//! Read-only aggregates for the admin dashboard. These queries cross
//! aggregate boundaries on purpose; nothing here mutates state.

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use crate::error::DatabaseError;

/// A label/count pair from a GROUP BY query
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}

/// Revenue collected in one calendar month
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MonthlyRevenue {
    /// First day of the month
    pub month: chrono::NaiveDate,
    pub collected: Decimal,
}

/// Aggregate figures for the admin dashboard
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub total_users: i64,
    pub policies_by_status: Vec<StatusCount>,
    pub claims_by_status: Vec<StatusCount>,
    pub premiums_by_status: Vec<StatusCount>,
    /// Sum of final amounts over paid installments
    pub revenue_collected: Decimal,
    /// Sum of final amounts over overdue installments
    pub revenue_overdue: Decimal,
    /// Sum of approved amounts over paid claims
    pub claims_paid_out: Decimal,
}

/// Repository for admin reporting
#[derive(Debug, Clone)]
pub struct ReportsRepository {
    pool: PgPool,
}

impl ReportsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Builds the dashboard summary in one round of aggregate queries
    pub async fn dashboard_summary(&self) -> Result<DashboardSummary, DatabaseError> {
        let total_users = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::from_sqlx)?;

        let policies_by_status = self.status_counts("policies").await?;
        let claims_by_status = self.status_counts("claims").await?;
        let premiums_by_status = self.status_counts("premiums").await?;

        let revenue_collected = sqlx::query_scalar::<_, Option<Decimal>>(
            "SELECT SUM(final_amount) FROM premiums WHERE status = 'paid'",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)?
        .unwrap_or_default();

        let revenue_overdue = sqlx::query_scalar::<_, Option<Decimal>>(
            "SELECT SUM(final_amount) FROM premiums WHERE status = 'overdue'",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)?
        .unwrap_or_default();

        let claims_paid_out = sqlx::query_scalar::<_, Option<Decimal>>(
            "SELECT SUM(approved_amount) FROM claims WHERE status = 'paid'",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)?
        .unwrap_or_default();

        Ok(DashboardSummary {
            total_users,
            policies_by_status,
            claims_by_status,
            premiums_by_status,
            revenue_collected,
            revenue_overdue,
            claims_paid_out,
        })
    }

    /// Premium revenue collected per month over the trailing year
    pub async fn monthly_revenue(&self) -> Result<Vec<MonthlyRevenue>, DatabaseError> {
        let rows = sqlx::query_as::<_, MonthlyRevenue>(
            r#"
            SELECT date_trunc('month', paid_date)::date AS month,
                   SUM(final_amount) AS collected
            FROM premiums
            WHERE status = 'paid'
              AND paid_date >= date_trunc('month', now()) - INTERVAL '11 months'
            GROUP BY 1
            ORDER BY 1
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)?;

        Ok(rows)
    }

    async fn status_counts(&self, table: &str) -> Result<Vec<StatusCount>, DatabaseError> {
        // `table` is one of three compile-time constants; never user input.
        let rows = sqlx::query_as::<_, StatusCount>(&format!(
            "SELECT status, COUNT(*) AS count FROM {table} GROUP BY status ORDER BY status"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)?;

        Ok(rows)
    }
}
