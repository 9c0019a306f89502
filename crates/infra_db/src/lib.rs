//! Infrastructure Database Layer
//!
//! PostgreSQL persistence for the insurance administration system, built
//! on SQLx. The crate follows the repository pattern: one repository per
//! aggregate, SQL kept behind it, domain types in and out.
//!
//! Multi-step writes are transactional throughout: issuing a policy books
//! its first installment in the same transaction, cancelling a policy
//! cascades to its pending installments, and settling a payment moves the
//! payment record and the installment together or not at all.

pub mod error;
pub mod pool;
pub mod repositories;

pub use error::DatabaseError;
pub use pool::{create_pool, create_pool_from_url, run_migrations, DatabaseConfig, DatabasePool};
pub use repositories::{
    ClaimListFilter, ClaimRepository, DashboardSummary, MonthlyRevenue, PaymentRepository,
    PolicyListFilter, PolicyRepository, PremiumListFilter, PremiumRepository, ReportsRepository,
    StatusCount, UserRepository,
};
