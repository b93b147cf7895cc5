// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use vhc_domain::JobStatus;

/// A command represents user or system intent as data only.
///
/// Commands are the only way to request state changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Request a plain status transition on a job.
    RequestTransition {
        /// The status to move to.
        to: JobStatus,
        /// Optional free-text context, recorded in history.
        note: Option<String>,
    },
    /// Clock a technician in on a job.
    ClockIn {
        /// The technician clocking in.
        technician_id: i64,
    },
    /// Clock a technician out of a job.
    ClockOut {
        /// The technician clocking out.
        technician_id: i64,
        /// True when the inspection is finished, false to pause.
        inspection_complete: bool,
    },
    /// Close a job out through the outcome gate.
    CloseJob {
        /// Optional close-out note.
        note: Option<String>,
    },
    /// Record a customer decision on one repair item.
    RecordDecision {
        /// The item being decided.
        item_id: i64,
        /// True approves the work, false declines it.
        approved: bool,
        /// The pricing option chosen, if any.
        selected_option_id: Option<i64>,
        /// Optional decline reason.
        reason: Option<String>,
    },
    /// Explicitly mark an item's labour side complete.
    MarkLabourComplete {
        /// The item whose labour is finished.
        item_id: i64,
    },
    /// Explicitly mark an item's parts side complete.
    MarkPartsComplete {
        /// The item whose parts are finished.
        item_id: i64,
    },
    /// Set or clear the "no labour needed" flag on an item.
    SetNoLabourRequired {
        /// The item being flagged.
        item_id: i64,
        /// The flag's new value.
        flag: bool,
    },
    /// Set or clear the "no parts needed" flag on an item.
    SetNoPartsRequired {
        /// The item being flagged.
        item_id: i64,
        /// The flag's new value.
        flag: bool,
    },
    /// Record that an authorised item's work has been carried out.
    MarkWorkComplete {
        /// The item whose work is done.
        item_id: i64,
    },
}
