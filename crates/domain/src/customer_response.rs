// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Job-level aggregation of per-item customer decisions.

use crate::job_status::JobStatus;
use serde::{Deserialize, Serialize};

/// Counts of decisions across a job's eligible items.
///
/// Eligible items are top-level, not deleted, and quotable; children and
/// soft-deleted items never count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DecisionTally {
    pub eligible: usize,
    pub decided: usize,
    pub approved: usize,
    pub declined: usize,
}

impl DecisionTally {
    /// Creates a tally.
    #[must_use]
    pub const fn new(eligible: usize, decided: usize, approved: usize, declined: usize) -> Self {
        Self {
            eligible,
            decided,
            approved,
            declined,
        }
    }

    /// Returns true once every eligible item carries a decision.
    #[must_use]
    pub const fn is_fully_decided(&self) -> bool {
        self.eligible > 0 && self.decided >= self.eligible
    }
}

/// Maps a decision tally to the job status it implies, if any.
///
/// - no decisions yet: `None`, the job stays where it is
/// - some but not all items decided: partial response
/// - all decided, at least one approval: authorized (a mixed outcome
///   still authorises; the approved work proceeds)
/// - all decided, all declined: declined
#[must_use]
pub const fn aggregate_customer_response(tally: &DecisionTally) -> Option<JobStatus> {
    if tally.eligible == 0 || tally.decided == 0 {
        return None;
    }
    if tally.decided < tally.eligible {
        return Some(JobStatus::PartialResponse);
    }
    if tally.approved > 0 {
        Some(JobStatus::Authorized)
    } else {
        Some(JobStatus::Declined)
    }
}
