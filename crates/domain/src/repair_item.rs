// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Repair item types: progress statuses, outcomes, and the item itself.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::OffsetDateTime;

/// Progress of one side (labour or parts) of a repair item's pricing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    /// No lines yet and no explicit completion.
    Pending,
    /// At least one line exists.
    InProgress,
    /// Explicitly marked complete by a staff member.
    Complete,
    /// Explicitly flagged as not required for this item.
    NotApplicable,
}

impl ProgressStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Complete => "complete",
            Self::NotApplicable => "n/a",
        }
    }

    /// Returns true when this side no longer blocks quote readiness.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        matches!(self, Self::Complete | Self::NotApplicable)
    }
}

impl FromStr for ProgressStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "complete" => Ok(Self::Complete),
            "n/a" => Ok(Self::NotApplicable),
            _ => Err(DomainError::InvalidStatus(s.to_string())),
        }
    }
}

/// Quote readiness derived from labour and parts progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    /// At least one side is still unfinished.
    Pending,
    /// Both sides are finished; the item is quotable.
    Ready,
}

impl QuoteStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Ready => "ready",
        }
    }
}

impl FromStr for QuoteStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "ready" => Ok(Self::Ready),
            _ => Err(DomainError::InvalidStatus(s.to_string())),
        }
    }
}

/// The advisor/customer outcome recorded against a repair item.
///
/// `Ready` and `Incomplete` are in-progress pricing states; the rest are
/// terminal decisions that unblock job closure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// Priced and awaiting a decision.
    Ready,
    /// Pricing incomplete.
    Incomplete,
    /// Customer (or advisor on their behalf) authorised the work.
    Authorised,
    /// Work deferred to a future visit.
    Deferred,
    /// Customer declined the work.
    Declined,
    /// Item removed from the quote.
    Deleted,
}

impl OutcomeStatus {
    /// Returns the string representation of the outcome.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::Incomplete => "incomplete",
            Self::Authorised => "authorised",
            Self::Deferred => "deferred",
            Self::Declined => "declined",
            Self::Deleted => "deleted",
        }
    }

    /// Returns true if this outcome is a terminal decision.
    ///
    /// Jobs cannot close while any top-level item carries a non-terminal
    /// outcome (or none at all).
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Authorised | Self::Deferred | Self::Declined | Self::Deleted
        )
    }
}

impl FromStr for OutcomeStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ready" => Ok(Self::Ready),
            "incomplete" => Ok(Self::Incomplete),
            "authorised" => Ok(Self::Authorised),
            "deferred" => Ok(Self::Deferred),
            "declined" => Ok(Self::Declined),
            "deleted" => Ok(Self::Deleted),
            _ => Err(DomainError::InvalidOutcome(s.to_string())),
        }
    }
}

/// A repair item raised against an inspection job.
///
/// Items form a two-level tree (group -> child); aggregation and closure
/// rules apply to top-level items only. Monetary totals are minor units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairItem {
    pub item_id: i64,
    pub job_id: i64,
    /// Parent item for grouped children; `None` for top-level items.
    pub parent_id: Option<i64>,
    pub name: String,
    pub labour_status: ProgressStatus,
    pub parts_status: ProgressStatus,
    pub quote_status: QuoteStatus,
    pub outcome_status: Option<OutcomeStatus>,
    /// Explicit "no labour needed" flag with who/when.
    pub no_labour_required: bool,
    pub no_labour_required_by: Option<i64>,
    pub no_labour_required_at: Option<OffsetDateTime>,
    /// Explicit "no parts needed" flag with who/when.
    pub no_parts_required: bool,
    pub no_parts_required_by: Option<i64>,
    pub no_parts_required_at: Option<OffsetDateTime>,
    /// Who explicitly marked labour complete, and when.
    pub labour_completed_by: Option<i64>,
    pub labour_completed_at: Option<OffsetDateTime>,
    /// Who explicitly marked parts complete, and when.
    pub parts_completed_by: Option<i64>,
    pub parts_completed_at: Option<OffsetDateTime>,
    /// Set when the authorised work has been carried out.
    pub work_completed_at: Option<OffsetDateTime>,
    /// Tri-state customer decision: `None` undecided, `Some(true)` approved,
    /// `Some(false)` declined. Never reversed by the system.
    pub customer_approved: Option<bool>,
    /// The pricing option the customer chose, if any.
    pub selected_option_id: Option<i64>,
    pub labour_total: i64,
    pub parts_total: i64,
    /// Soft-delete marker; deleted items are invisible to aggregation.
    pub deleted: bool,
}

impl RepairItem {
    /// Creates a fresh, unpriced repair item.
    #[must_use]
    pub fn new(item_id: i64, job_id: i64, parent_id: Option<i64>, name: &str) -> Self {
        Self {
            item_id,
            job_id,
            parent_id,
            name: name.to_string(),
            labour_status: ProgressStatus::Pending,
            parts_status: ProgressStatus::Pending,
            quote_status: QuoteStatus::Pending,
            outcome_status: None,
            no_labour_required: false,
            no_labour_required_by: None,
            no_labour_required_at: None,
            no_parts_required: false,
            no_parts_required_by: None,
            no_parts_required_at: None,
            labour_completed_by: None,
            labour_completed_at: None,
            parts_completed_by: None,
            parts_completed_at: None,
            work_completed_at: None,
            customer_approved: None,
            selected_option_id: None,
            labour_total: 0,
            parts_total: 0,
            deleted: false,
        }
    }

    /// Returns true for items subject to aggregation and closure rules.
    #[must_use]
    pub const fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Returns true once the customer (or advisor) has recorded a decision.
    #[must_use]
    pub const fn has_customer_decision(&self) -> bool {
        self.customer_approved.is_some()
    }

    /// The item's effective outcome, folding in the legacy approval flag.
    ///
    /// Items approved through the customer channel count as authorised even
    /// if the stored outcome has not caught up yet.
    #[must_use]
    pub fn effective_outcome(&self) -> Option<OutcomeStatus> {
        match (self.outcome_status, self.customer_approved) {
            (Some(outcome), _) => Some(outcome),
            (None, Some(true)) => Some(OutcomeStatus::Authorised),
            (None, Some(false)) => Some(OutcomeStatus::Declined),
            (None, None) => None,
        }
    }
}

/// A reference to an item blocking job closure, carried in rejections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockedItem {
    pub item_id: i64,
    pub name: String,
}

impl BlockedItem {
    /// Creates a blocked-item reference from an item.
    #[must_use]
    pub fn from_item(item: &RepairItem) -> Self {
        Self {
            item_id: item.item_id,
            name: item.name.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_status_round_trip() {
        for status in [
            ProgressStatus::Pending,
            ProgressStatus::InProgress,
            ProgressStatus::Complete,
            ProgressStatus::NotApplicable,
        ] {
            assert_eq!(status.as_str().parse::<ProgressStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_outcome_terminality() {
        assert!(!OutcomeStatus::Ready.is_terminal());
        assert!(!OutcomeStatus::Incomplete.is_terminal());
        assert!(OutcomeStatus::Authorised.is_terminal());
        assert!(OutcomeStatus::Deferred.is_terminal());
        assert!(OutcomeStatus::Declined.is_terminal());
        assert!(OutcomeStatus::Deleted.is_terminal());
    }

    #[test]
    fn test_effective_outcome_legacy_approval() {
        let mut item = RepairItem::new(1, 10, None, "Front brake pads");
        assert_eq!(item.effective_outcome(), None);

        item.customer_approved = Some(true);
        assert_eq!(item.effective_outcome(), Some(OutcomeStatus::Authorised));

        item.customer_approved = Some(false);
        assert_eq!(item.effective_outcome(), Some(OutcomeStatus::Declined));

        // A stored outcome always wins over the flag.
        item.outcome_status = Some(OutcomeStatus::Deferred);
        assert_eq!(item.effective_outcome(), Some(OutcomeStatus::Deferred));
    }

    #[test]
    fn test_finished_sides() {
        assert!(ProgressStatus::Complete.is_finished());
        assert!(ProgressStatus::NotApplicable.is_finished());
        assert!(!ProgressStatus::InProgress.is_finished());
        assert!(!ProgressStatus::Pending.is_finished());
    }
}
