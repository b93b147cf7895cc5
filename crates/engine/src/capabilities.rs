// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Capability projection for callers.
//!
//! Capabilities expose what actions an actor may currently perform on a
//! job without leaking the transition table. They are advisory only and
//! never replace the checks the engine runs on each operation.

use serde::Serialize;
use vhc_domain::{ActorRole, InspectionJob, JobStatus};

/// Whether an action is currently available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// The action would be accepted.
    Allowed,
    /// The action would be rejected.
    Denied,
}

impl Capability {
    /// True when the action would be accepted.
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

const fn capability(allowed: bool) -> Capability {
    if allowed {
        Capability::Allowed
    } else {
        Capability::Denied
    }
}

/// Per-job advisory capability flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct JobCapabilities {
    pub can_clock_in: Capability,
    pub can_clock_out: Capability,
    pub can_close: Capability,
    pub can_cancel: Capability,
    pub can_skip_checkin: Capability,
    pub can_record_decision: Capability,
}

/// Statuses a clocked-in technician can exist in.
const CLOCKABLE: &[JobStatus] = &[JobStatus::Assigned, JobStatus::Paused, JobStatus::InProgress];

/// Statuses the close gate accepts (the gate itself still inspects items).
const CLOSEABLE: &[JobStatus] = &[
    JobStatus::TechCompleted,
    JobStatus::AwaitingPricing,
    JobStatus::ReadyToSend,
    JobStatus::Sent,
    JobStatus::Opened,
    JobStatus::PartialResponse,
    JobStatus::Authorized,
    JobStatus::Declined,
];

/// Statuses in which a customer decision can still be recorded.
const DECIDABLE: &[JobStatus] = &[
    JobStatus::AwaitingPricing,
    JobStatus::ReadyToSend,
    JobStatus::Sent,
    JobStatus::Opened,
    JobStatus::PartialResponse,
    JobStatus::Authorized,
    JobStatus::Declined,
];

/// Computes the advisory capability flags for one actor on one job.
///
/// `actor_id` identifies the caller for assignment-sensitive checks; the
/// clock capabilities require the assigned technician (or an admin).
#[must_use]
pub fn compute_job_capabilities(
    job: &InspectionJob,
    role: ActorRole,
    actor_id: Option<i64>,
) -> JobCapabilities {
    let is_assigned =
        actor_id.is_some_and(|id| job.is_assigned_to(id)) && role == ActorRole::Technician;
    let drives_clock = is_assigned || role == ActorRole::Admin;
    let privileged = role.is_privileged();

    JobCapabilities {
        can_clock_in: capability(drives_clock && CLOCKABLE.contains(&job.status)),
        can_clock_out: capability(drives_clock && CLOCKABLE.contains(&job.status)),
        can_close: capability(privileged && CLOSEABLE.contains(&job.status)),
        can_cancel: capability(privileged && !job.status.is_terminal()),
        can_skip_checkin: capability(privileged && job.status == JobStatus::AwaitingCheckin),
        can_record_decision: capability(
            (role == ActorRole::Customer || privileged) && DECIDABLE.contains(&job.status),
        ),
    }
}
