//! Core Kernel - Foundational types for the insurance administration system
//!
//! This crate provides the building blocks shared by every domain module:
//! - Money types with precise decimal arithmetic
//! - Calendar arithmetic for premium scheduling
//! - Strongly-typed entity identifiers
//! - Role-based access scoping for list queries

pub mod access;
pub mod identifiers;
pub mod money;
pub mod temporal;

pub use access::{AccessScope, CallerIdentity, RecordFilter, Role};
pub use identifiers::{ClaimId, PaymentId, PolicyId, PremiumId, UserId};
pub use money::{Currency, Money, MoneyError, Rate};
pub use temporal::{add_months, days_between};
