// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Derived-status aggregation for repair items.
//!
//! The aggregator is a pure function over an item's stored flags and its
//! current labour/parts line counts. It must be re-run after every line
//! insert/update/delete and after every no-requirement toggle, and running
//! it twice with no intervening change is a no-op (`changed == false`).

use crate::repair_item::{ProgressStatus, QuoteStatus, RepairItem};

/// Current line counts for one repair item.
///
/// Counts include lines attached through the item's selected pricing
/// option; assembling that total is the caller's responsibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LineCounts {
    /// Total labour lines on the item (direct + selected option).
    pub labour: usize,
    /// Total parts lines on the item (direct + selected option).
    pub parts: usize,
}

impl LineCounts {
    /// Creates line counts.
    #[must_use]
    pub const fn new(labour: usize, parts: usize) -> Self {
        Self { labour, parts }
    }

    /// Total lines across both sides.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.labour + self.parts
    }
}

/// The aggregator's verdict: the statuses the item should now carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemProgressUpdate {
    pub labour_status: ProgressStatus,
    pub parts_status: ProgressStatus,
    pub quote_status: QuoteStatus,
    /// True when the labour completion actor/timestamp must be cleared
    /// (reverse transition: complete with zero lines).
    pub clear_labour_completion: bool,
    /// True when the parts completion actor/timestamp must be cleared.
    pub clear_parts_completion: bool,
    /// False when the update matches the stored statuses exactly;
    /// persisting it would write nothing.
    pub changed: bool,
}

/// Computes the derived statuses for one repair item.
///
/// Rules, per side:
/// - a no-requirement flag forces `n/a`
/// - explicit completion sticks while lines remain; dropping to zero lines
///   reverses it to `pending` and clears the completion actor/timestamp
/// - otherwise `in_progress` with lines, `pending` without
///
/// Quote readiness: `ready` exactly when both sides are finished
/// (`complete` or `n/a`), `pending` otherwise — unless the item already
/// carries a customer decision, in which case the stored quote status is
/// left untouched.
#[must_use]
pub fn aggregate_item_progress(item: &RepairItem, counts: &LineCounts) -> ItemProgressUpdate {
    let (labour_status, clear_labour_completion) = aggregate_side(
        item.labour_status,
        counts.labour,
        item.no_labour_required,
    );
    let (parts_status, clear_parts_completion) =
        aggregate_side(item.parts_status, counts.parts, item.no_parts_required);

    let quote_status = if item.has_customer_decision() {
        // A recorded decision freezes the quote; pricing churn afterwards
        // must not silently un-ready a decided item.
        item.quote_status
    } else if labour_status.is_finished() && parts_status.is_finished() {
        QuoteStatus::Ready
    } else {
        QuoteStatus::Pending
    };

    let changed = labour_status != item.labour_status
        || parts_status != item.parts_status
        || quote_status != item.quote_status
        || clear_labour_completion
        || clear_parts_completion;

    ItemProgressUpdate {
        labour_status,
        parts_status,
        quote_status,
        clear_labour_completion,
        clear_parts_completion,
        changed,
    }
}

/// Aggregates one side. Returns the new status and whether a stored
/// completion record must be cleared.
const fn aggregate_side(
    current: ProgressStatus,
    line_count: usize,
    not_required: bool,
) -> (ProgressStatus, bool) {
    if not_required {
        return (ProgressStatus::NotApplicable, false);
    }
    match current {
        ProgressStatus::Complete => {
            if line_count == 0 {
                // Reverse transition: the last line was removed.
                (ProgressStatus::Pending, true)
            } else {
                (ProgressStatus::Complete, false)
            }
        }
        ProgressStatus::Pending | ProgressStatus::InProgress | ProgressStatus::NotApplicable => {
            if line_count > 0 {
                (ProgressStatus::InProgress, false)
            } else {
                (ProgressStatus::Pending, false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repair_item::RepairItem;

    fn item() -> RepairItem {
        RepairItem::new(1, 10, None, "Rear discs")
    }

    #[test]
    fn test_forward_pending_to_in_progress() {
        let item = item();
        let update = aggregate_item_progress(&item, &LineCounts::new(1, 0));

        assert_eq!(update.labour_status, ProgressStatus::InProgress);
        assert_eq!(update.parts_status, ProgressStatus::Pending);
        assert_eq!(update.quote_status, QuoteStatus::Pending);
        assert!(update.changed);
    }

    #[test]
    fn test_lines_never_imply_completion() {
        let item = item();
        let update = aggregate_item_progress(&item, &LineCounts::new(4, 7));

        assert_eq!(update.labour_status, ProgressStatus::InProgress);
        assert_eq!(update.parts_status, ProgressStatus::InProgress);
    }

    #[test]
    fn test_reverse_complete_to_pending_clears_completion() {
        let mut item = item();
        item.labour_status = ProgressStatus::Complete;
        item.labour_completed_by = Some(5);

        let update = aggregate_item_progress(&item, &LineCounts::new(0, 0));

        assert_eq!(update.labour_status, ProgressStatus::Pending);
        assert!(update.clear_labour_completion);
        assert!(update.changed);
    }

    #[test]
    fn test_complete_sticks_while_lines_remain() {
        let mut item = item();
        item.labour_status = ProgressStatus::Complete;

        let update = aggregate_item_progress(&item, &LineCounts::new(2, 0));

        assert_eq!(update.labour_status, ProgressStatus::Complete);
        assert!(!update.clear_labour_completion);
    }

    #[test]
    fn test_reverse_in_progress_to_pending() {
        let mut item = item();
        item.labour_status = ProgressStatus::InProgress;

        let update = aggregate_item_progress(&item, &LineCounts::new(0, 0));

        assert_eq!(update.labour_status, ProgressStatus::Pending);
        assert!(!update.clear_labour_completion);
    }

    #[test]
    fn test_no_requirement_flag_forces_na() {
        let mut item = item();
        item.no_parts_required = true;

        let update = aggregate_item_progress(&item, &LineCounts::new(0, 0));

        assert_eq!(update.parts_status, ProgressStatus::NotApplicable);
    }

    #[test]
    fn test_quote_ready_when_both_sides_finished() {
        let mut item = item();
        item.labour_status = ProgressStatus::Complete;
        item.no_parts_required = true;

        let update = aggregate_item_progress(&item, &LineCounts::new(1, 0));

        assert_eq!(update.quote_status, QuoteStatus::Ready);
    }

    #[test]
    fn test_quote_regresses_when_side_unfinishes() {
        let mut item = item();
        item.labour_status = ProgressStatus::Complete;
        item.parts_status = ProgressStatus::Complete;
        item.quote_status = QuoteStatus::Ready;

        // Parts lines all removed: parts reverses, quote follows.
        let update = aggregate_item_progress(&item, &LineCounts::new(1, 0));

        assert_eq!(update.parts_status, ProgressStatus::Pending);
        assert_eq!(update.quote_status, QuoteStatus::Pending);
    }

    #[test]
    fn test_quote_frozen_after_customer_decision() {
        let mut item = item();
        item.labour_status = ProgressStatus::Complete;
        item.parts_status = ProgressStatus::Complete;
        item.quote_status = QuoteStatus::Ready;
        item.customer_approved = Some(true);

        let update = aggregate_item_progress(&item, &LineCounts::new(1, 0));

        assert_eq!(update.quote_status, QuoteStatus::Ready);
    }

    #[test]
    fn test_idempotence() {
        let mut item = item();
        let counts = LineCounts::new(2, 1);

        let first = aggregate_item_progress(&item, &counts);
        item.labour_status = first.labour_status;
        item.parts_status = first.parts_status;
        item.quote_status = first.quote_status;

        let second = aggregate_item_progress(&item, &counts);
        assert!(!second.changed);
        assert_eq!(second.labour_status, first.labour_status);
        assert_eq!(second.parts_status, first.parts_status);
        assert_eq!(second.quote_status, first.quote_status);
    }
}
