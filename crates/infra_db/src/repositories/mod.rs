//! Repository implementations for domain aggregates
//!
//! Each repository encapsulates the SQL for one aggregate and maps between
//! database rows and domain types. Multi-step writes (policy issue with its
//! first installment, cancellation cascades, payment settlement) run inside
//! a single transaction.
//!
//! List queries are scoped with [`core_kernel::RecordFilter`]: the caller's
//! role decides the predicate, the repository renders it into SQL.

pub mod claims;
pub mod payments;
pub mod policies;
pub mod premiums;
pub mod reports;
pub mod users;

pub use claims::{ClaimListFilter, ClaimRepository};
pub use payments::PaymentRepository;
pub use policies::{PolicyListFilter, PolicyRepository};
pub use premiums::{PremiumListFilter, PremiumRepository};
pub use reports::{DashboardSummary, MonthlyRevenue, ReportsRepository, StatusCount};
pub use users::UserRepository;

use core_kernel::RecordFilter;
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

/// Appends the caller's scope predicate to a query under construction
///
/// `owner_col` and `agent_col` are fully qualified column expressions for
/// the owning user and the servicing agent respectively. The query must
/// already carry a WHERE clause (use `WHERE TRUE` when there is no other
/// predicate).
pub(crate) fn push_scope(
    qb: &mut QueryBuilder<'_, Postgres>,
    filter: &RecordFilter,
    owner_col: &str,
    agent_col: &str,
) {
    match filter {
        RecordFilter::All => {}
        RecordFilter::OwnedBy(user) => {
            qb.push(" AND ")
                .push(owner_col)
                .push(" = ")
                .push_bind(Uuid::from(*user));
        }
        RecordFilter::OwnedOrServicedBy(user) => {
            let id = Uuid::from(*user);
            qb.push(" AND (")
                .push(owner_col)
                .push(" = ")
                .push_bind(id)
                .push(" OR ")
                .push(agent_col)
                .push(" = ")
                .push_bind(id)
                .push(")");
        }
    }
}
