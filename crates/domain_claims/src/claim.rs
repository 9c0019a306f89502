//! Claim aggregate
//!
//! # State machine
//!
//! submitted -> under_review -> approved -> paid
//!                           -> rejected
//!
//! A decision may also be taken directly from `submitted`. Rejected and
//! paid are terminal.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{ClaimId, Money, PolicyId, UserId};

use crate::error::ClaimError;

/// Default turnaround promised to the claimant, in days
pub const DEFAULT_PROCESSING_DAYS: i64 = 15;

/// Claim lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    /// Filed by the claimant, awaiting triage
    Submitted,
    /// Picked up by a reviewer
    UnderReview,
    /// Approved for settlement
    Approved,
    /// Rejected with a reason
    Rejected,
    /// Settled and closed
    Paid,
}

impl ClaimStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimStatus::Submitted => "submitted",
            ClaimStatus::UnderReview => "under_review",
            ClaimStatus::Approved => "approved",
            ClaimStatus::Rejected => "rejected",
            ClaimStatus::Paid => "paid",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "submitted" => Some(ClaimStatus::Submitted),
            "under_review" => Some(ClaimStatus::UnderReview),
            "approved" => Some(ClaimStatus::Approved),
            "rejected" => Some(ClaimStatus::Rejected),
            "paid" => Some(ClaimStatus::Paid),
            _ => None,
        }
    }

    /// States in which a review decision may still be taken
    pub fn is_reviewable(&self) -> bool {
        matches!(self, ClaimStatus::Submitted | ClaimStatus::UnderReview)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ClaimStatus::Rejected | ClaimStatus::Paid)
    }
}

/// A claim filed against a policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claim {
    /// Unique identifier
    pub id: ClaimId,
    /// Human-facing claim number
    pub claim_number: String,
    /// Policy the claim is filed against
    pub policy_id: PolicyId,
    /// The user who filed it
    pub claimant_id: UserId,
    /// Lifecycle state
    pub status: ClaimStatus,
    /// When the insured event occurred
    pub incident_date: NaiveDate,
    /// What happened
    pub description: String,
    /// Amount claimed
    pub claim_amount: Money,
    /// Amount granted by the reviewer
    pub approved_amount: Option<Money>,
    /// Reason given on rejection
    pub rejection_reason: Option<String>,
    /// Reviewer who took the decision
    pub reviewed_by: Option<UserId>,
    /// When the decision was taken
    pub review_date: Option<DateTime<Utc>>,
    /// When settlement was disbursed
    pub payment_date: Option<DateTime<Utc>>,
    /// Disbursement reference
    pub payment_reference: Option<String>,
    /// Promised turnaround in days
    pub estimated_processing_days: i64,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Claim {
    /// Files a new claim
    ///
    /// Policy-level checks (active status, coverage ceiling) live in
    /// [`crate::intake`]; this constructor validates only the claim's own
    /// fields.
    pub fn submit(
        policy_id: PolicyId,
        claimant_id: UserId,
        incident_date: NaiveDate,
        description: impl Into<String>,
        claim_amount: Money,
    ) -> Result<Self, ClaimError> {
        let description = description.into();
        if description.trim().is_empty() {
            return Err(ClaimError::Validation(
                "Claim description is required".to_string(),
            ));
        }
        if !claim_amount.is_positive() {
            return Err(ClaimError::Validation(
                "Claim amount must be positive".to_string(),
            ));
        }

        let now = Utc::now();
        let id = ClaimId::new_v7();
        Ok(Self {
            id,
            claim_number: generate_claim_number(id, now),
            policy_id,
            claimant_id,
            status: ClaimStatus::Submitted,
            incident_date,
            description,
            claim_amount,
            approved_amount: None,
            rejection_reason: None,
            reviewed_by: None,
            review_date: None,
            payment_date: None,
            payment_reference: None,
            estimated_processing_days: DEFAULT_PROCESSING_DAYS,
            created_at: now,
            updated_at: now,
        })
    }

    /// Moves a submitted claim into review
    pub fn begin_review(&mut self) -> Result<(), ClaimError> {
        if self.status != ClaimStatus::Submitted {
            return Err(self.invalid_transition(ClaimStatus::UnderReview));
        }
        self.status = ClaimStatus::UnderReview;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Approves the claim
    ///
    /// When `approved_amount` is omitted the full claimed amount is
    /// granted. A partial award must not exceed the claimed amount.
    pub fn approve(
        &mut self,
        reviewer: UserId,
        approved_amount: Option<Money>,
    ) -> Result<(), ClaimError> {
        if !self.status.is_reviewable() {
            return Err(self.invalid_transition(ClaimStatus::Approved));
        }

        let granted = approved_amount.unwrap_or(self.claim_amount);
        if !granted.is_positive() {
            return Err(ClaimError::Validation(
                "Approved amount must be positive".to_string(),
            ));
        }
        if granted.amount() > self.claim_amount.amount() {
            return Err(ClaimError::ApprovedAmountTooHigh);
        }

        let now = Utc::now();
        self.status = ClaimStatus::Approved;
        self.approved_amount = Some(granted);
        self.reviewed_by = Some(reviewer);
        self.review_date = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Rejects the claim with a reason
    pub fn reject(&mut self, reviewer: UserId, reason: impl Into<String>) -> Result<(), ClaimError> {
        if !self.status.is_reviewable() {
            return Err(self.invalid_transition(ClaimStatus::Rejected));
        }
        let reason = reason.into();
        if reason.trim().is_empty() {
            return Err(ClaimError::MissingRejectionReason);
        }

        let now = Utc::now();
        self.status = ClaimStatus::Rejected;
        self.rejection_reason = Some(reason);
        self.reviewed_by = Some(reviewer);
        self.review_date = Some(now);
        self.updated_at = now;
        Ok(())
    }

    /// Settles an approved claim
    pub fn pay(&mut self, reference: impl Into<String>) -> Result<(), ClaimError> {
        if self.status != ClaimStatus::Approved {
            return Err(self.invalid_transition(ClaimStatus::Paid));
        }

        let now = Utc::now();
        self.status = ClaimStatus::Paid;
        self.payment_date = Some(now);
        self.payment_reference = Some(reference.into());
        self.updated_at = now;
        Ok(())
    }

    /// True when an open claim has outlived its promised turnaround
    ///
    /// Computed at read time; no stored flag to go stale.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        if self.status.is_terminal() || self.status == ClaimStatus::Approved {
            return false;
        }
        (now - self.created_at).num_days() > self.estimated_processing_days
    }

    fn invalid_transition(&self, to: ClaimStatus) -> ClaimError {
        ClaimError::InvalidStatusTransition {
            from: self.status.as_str().to_string(),
            to: to.as_str().to_string(),
        }
    }
}

/// Generates a claim number: CLM-{YEAR}{MONTH}-{SUFFIX}
///
/// The suffix is the random tail of the claim's own id, so concurrently
/// filed claims cannot collide.
fn generate_claim_number(id: ClaimId, now: DateTime<Utc>) -> String {
    use chrono::Datelike;

    let hex = id.as_uuid().simple().to_string();
    format!("CLM-{}{:02}-{}", now.year(), now.month(), &hex[24..])
}
