//! Role-based access scoping for list queries
//!
//! Every list endpoint applies the same rule: customers see records they
//! own, agents see records they own or service, admins see everything.
//! The scoping decision is a pure function here so it can be tested without
//! a database; repositories translate the resulting [`RecordFilter`] into
//! SQL predicates.

use serde::{Deserialize, Serialize};

use crate::identifiers::UserId;

/// Roles recognised by the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Policyholder
    Customer,
    /// Servicing agent
    Agent,
    /// Administrator
    Admin,
}

impl Role {
    /// Returns the wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Agent => "agent",
            Role::Admin => "admin",
        }
    }

    /// Parses the wire representation
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "customer" => Some(Role::Customer),
            "agent" => Some(Role::Agent),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    /// True for roles allowed to review claims
    pub fn can_review_claims(&self) -> bool {
        matches!(self, Role::Agent | Role::Admin)
    }

    /// True for the administrative role
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

/// The authenticated caller, as derived from a verified bearer token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerIdentity {
    pub user_id: UserId,
    pub role: Role,
}

impl CallerIdentity {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    /// Computes the record filter this caller is allowed to query with
    pub fn scope(&self) -> RecordFilter {
        AccessScope::for_caller(self)
    }

    /// Whether the caller may read a record owned/serviced as given
    pub fn may_access(&self, owner: UserId, servicing_agent: Option<UserId>) -> bool {
        match self.scope() {
            RecordFilter::All => true,
            RecordFilter::OwnedBy(id) => owner == id,
            RecordFilter::OwnedOrServicedBy(id) => owner == id || servicing_agent == Some(id),
        }
    }
}

/// Canonical filter predicate applied to list queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFilter {
    /// No restriction (admins)
    All,
    /// Only records owned by the given user (customers)
    OwnedBy(UserId),
    /// Records owned by or assigned to the given user (agents)
    OwnedOrServicedBy(UserId),
}

/// Builder of role-scoped filters
pub struct AccessScope;

impl AccessScope {
    /// Maps a caller identity to its canonical record filter
    pub fn for_caller(caller: &CallerIdentity) -> RecordFilter {
        match caller.role {
            Role::Admin => RecordFilter::All,
            Role::Agent => RecordFilter::OwnedOrServicedBy(caller.user_id),
            Role::Customer => RecordFilter::OwnedBy(caller.user_id),
        }
    }
}
