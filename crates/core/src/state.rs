// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use vhc_audit::StatusHistoryEntry;
use vhc_domain::{InspectionJob, ItemProgressUpdate, JobStatus, TimeEntry};

use crate::effects::Effect;

/// Tunable workflow behavior.
///
/// Policy is deliberately small: every knob corresponds to a behavior
/// observed to vary between installations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkflowPolicy {
    /// When true, re-requesting the current status with a note records a
    /// no-op history entry instead of being rejected.
    pub record_noop_with_note: bool,
    /// Lifetime of a public token, in hours from send.
    pub token_ttl_hours: i64,
}

impl Default for WorkflowPolicy {
    fn default() -> Self {
        Self {
            record_noop_with_note: true,
            token_ttl_hours: 72,
        }
    }
}

/// The result of a successful state change on a job.
///
/// Transitions are atomic: they either succeed completely or fail
/// without side effects. `changed` is false for recorded no-ops and for
/// aggregator runs that only touched timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionOutcome {
    /// The job after the change.
    pub job: InspectionJob,
    /// The status before the change.
    pub prior_status: JobStatus,
    /// The history entry to append, if any.
    pub history: Option<StatusHistoryEntry>,
    /// Side effects to dispatch after the state write commits.
    pub effects: Vec<Effect>,
    /// True when the job's status actually moved.
    pub changed: bool,
}

/// The result of a clock-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockInOutcome {
    /// A stale open entry that was auto-closed first, if one existed.
    pub recovered: Option<TimeEntry>,
    /// The fresh open entry. Its `entry_id` is zero until persisted.
    pub entry: TimeEntry,
    /// The job transition this clock-in caused, if any.
    pub transition: Option<TransitionOutcome>,
    /// Side effects to dispatch after the state write commits.
    pub effects: Vec<Effect>,
}

/// The result of a clock-out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockOutOutcome {
    /// The closed entry with its computed duration.
    pub entry: TimeEntry,
    /// The job transition this clock-out caused, if any.
    pub transition: Option<TransitionOutcome>,
    /// Side effects to dispatch after the state write commits.
    pub effects: Vec<Effect>,
}

/// The result of re-aggregating an item after a pricing-line change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineChangeOutcome {
    /// The item statuses to persist, if anything moved.
    pub update: ItemProgressUpdate,
    /// The job transition the line change caused (pricing started), if any.
    pub transition: Option<TransitionOutcome>,
}
