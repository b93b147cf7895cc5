// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::repair_item::BlockedItem;

/// Errors that can occur during domain validation.
///
/// Every rejection carries enough structured detail for the caller to render
/// an actionable message without a follow-up query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A status string could not be parsed.
    InvalidStatus(String),
    /// An outcome string could not be parsed.
    InvalidOutcome(String),
    /// The requested status is not reachable from the current status.
    InvalidTransition {
        /// The current status.
        from: String,
        /// The requested status.
        to: String,
        /// Why the transition was rejected.
        reason: String,
    },
    /// The actor lacks the capability for this transition.
    Forbidden {
        /// The action that was attempted.
        action: String,
        /// The role(s) required for this action.
        required_role: String,
    },
    /// A state-specific guard failed, or a concurrent writer won the race.
    PreconditionFailed {
        /// Why the precondition failed.
        reason: String,
    },
    /// Clock-out was requested with no open time entry for the pair.
    NotClockedIn {
        /// The inspection job.
        job_id: i64,
        /// The technician.
        technician_id: i64,
    },
    /// Closure blocked: items without a terminal outcome.
    PendingOutcomes {
        /// The offending items.
        items: Vec<BlockedItem>,
    },
    /// Closure blocked: authorised items without completed work.
    IncompleteWork {
        /// The offending items.
        items: Vec<BlockedItem>,
    },
    /// A customer decision already exists for this item.
    DecisionAlreadyRecorded {
        /// The repair item.
        item_id: i64,
    },
    /// The inspection job does not exist or is out of scope.
    JobNotFound(i64),
    /// The repair item does not exist or is out of scope.
    ItemNotFound(i64),
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidStatus(status) => write!(f, "Invalid job status: '{status}'"),
            Self::InvalidOutcome(outcome) => write!(f, "Invalid outcome status: '{outcome}'"),
            Self::InvalidTransition { from, to, reason } => {
                write!(f, "Cannot transition from '{from}' to '{to}': {reason}")
            }
            Self::Forbidden {
                action,
                required_role,
            } => {
                write!(f, "Forbidden: '{action}' requires {required_role}")
            }
            Self::PreconditionFailed { reason } => {
                write!(f, "Precondition failed: {reason}")
            }
            Self::NotClockedIn {
                job_id,
                technician_id,
            } => {
                write!(
                    f,
                    "Technician {technician_id} has no open time entry on job {job_id}"
                )
            }
            Self::PendingOutcomes { items } => {
                write!(
                    f,
                    "Cannot close: {} item(s) lack a terminal outcome: {}",
                    items.len(),
                    format_blocked(items)
                )
            }
            Self::IncompleteWork { items } => {
                write!(
                    f,
                    "Cannot close: {} authorised item(s) lack completed work: {}",
                    items.len(),
                    format_blocked(items)
                )
            }
            Self::DecisionAlreadyRecorded { item_id } => {
                write!(f, "Item {item_id} already has a customer decision recorded")
            }
            Self::JobNotFound(job_id) => write!(f, "Inspection job {job_id} not found"),
            Self::ItemNotFound(item_id) => write!(f, "Repair item {item_id} not found"),
        }
    }
}

impl std::error::Error for DomainError {}

fn format_blocked(items: &[BlockedItem]) -> String {
    items
        .iter()
        .map(|item| format!("#{} '{}'", item.item_id, item.name))
        .collect::<Vec<String>>()
        .join(", ")
}
