// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The close-out gate: what must be true before a job may complete.

use crate::error::DomainError;
use crate::repair_item::{BlockedItem, OutcomeStatus, RepairItem};

/// Checks whether a job's items permit closing it out.
///
/// Two checks run in order over top-level, non-deleted items:
///
/// 1. every item must carry a terminal outcome (authorised, deferred,
///    declined, or deleted); items with no outcome or an in-progress one
///    block with `PendingOutcomes`
/// 2. every authorised item must have its work marked complete; offenders
///    block with `IncompleteWork`
///
/// # Errors
///
/// Returns the first failing check's error, listing every offending item.
pub fn evaluate_close_gate(items: &[RepairItem]) -> Result<(), DomainError> {
    let considered: Vec<&RepairItem> = items
        .iter()
        .filter(|item| item.is_top_level() && !item.deleted)
        .collect();

    let pending: Vec<BlockedItem> = considered
        .iter()
        .filter(|item| !item.effective_outcome().is_some_and(|o| o.is_terminal()))
        .map(|item| BlockedItem::from_item(item))
        .collect();
    if !pending.is_empty() {
        return Err(DomainError::PendingOutcomes { items: pending });
    }

    let incomplete: Vec<BlockedItem> = considered
        .iter()
        .filter(|item| {
            item.effective_outcome() == Some(OutcomeStatus::Authorised)
                && item.work_completed_at.is_none()
        })
        .map(|item| BlockedItem::from_item(item))
        .collect();
    if !incomplete.is_empty() {
        return Err(DomainError::IncompleteWork { items: incomplete });
    }

    Ok(())
}
