// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use time::OffsetDateTime;
use vhc_audit::{Actor, Source, StatusHistoryEntry};
use vhc_domain::{
    DecisionTally, DomainError, InspectionJob, JobStatus, LineCounts, RepairItem, TimeEntry,
    aggregate_customer_response, aggregate_item_progress, evaluate_close_gate, validate_capability,
};

use crate::effects::Effect;
use crate::error::CoreError;
use crate::state::{
    ClockInOutcome, ClockOutOutcome, LineChangeOutcome, TransitionOutcome, WorkflowPolicy,
};

/// Applies a plain status transition request to a job.
///
/// Validation runs in order: the no-op policy, the actor's capability for
/// this transition, then the allowed-transition table. On success the
/// returned outcome carries the updated job, one history entry, and the
/// side effects this transition owes. The input job is never mutated.
///
/// # Errors
///
/// * `InvalidTransition` - the target is not reachable from the current status
/// * `Forbidden` - the actor lacks the capability for this transition
/// * `PreconditionFailed` - a state-specific guard failed (e.g. sending
///   without a live token)
pub fn apply_transition(
    job: &InspectionJob,
    to: JobStatus,
    actor: Actor,
    source: Source,
    note: Option<String>,
    policy: &WorkflowPolicy,
    now: OffsetDateTime,
) -> Result<TransitionOutcome, CoreError> {
    let from = job.status;

    if to == from && policy.record_noop_with_note && note.is_some() {
        let history =
            StatusHistoryEntry::new(job.job_id, Some(from), to, actor, source, note, now);
        return Ok(TransitionOutcome {
            job: job.clone(),
            prior_status: from,
            history: Some(history),
            effects: Vec::new(),
            changed: false,
        });
    }

    let is_assigned = actor.id.is_some_and(|id| job.is_assigned_to(id));
    validate_capability(actor.role, from, to, is_assigned).map_err(CoreError::DomainViolation)?;
    from.validate_transition(to)?;

    if to == JobStatus::Sent && !job.has_live_token(now) {
        return Err(CoreError::DomainViolation(DomainError::PreconditionFailed {
            reason: String::from("job has no live public token to send"),
        }));
    }

    let mut new_job = job.clone();
    new_job.status = to;
    new_job.stamp_status_timestamp(to, now);
    new_job.updated_at = now;

    let mut effects = vec![Effect::NotifyStatusChanged {
        job_id: job.job_id,
        from,
        to,
    }];
    match to {
        // Check-in finished (or explicitly skipped): seed the checklist.
        JobStatus::Created if from == JobStatus::AwaitingCheckin => {
            effects.push(Effect::AutoCreateItemsFromFindings { job_id: job.job_id });
        }
        JobStatus::TechCompleted => {
            effects.push(Effect::AutoGenerateRepairItems { job_id: job.job_id });
        }
        JobStatus::Sent => {
            if let Some(token) = &new_job.public_token {
                effects.push(Effect::ScheduleReminders {
                    job_id: job.job_id,
                    sent_at: now,
                    expires_at: token.expires_at,
                });
            }
        }
        JobStatus::Authorized | JobStatus::Declined => {
            new_job.fully_responded_at.get_or_insert(now);
            effects.push(Effect::CancelReminders { job_id: job.job_id });
        }
        _ => {}
    }

    let history = StatusHistoryEntry::new(job.job_id, Some(from), to, actor, source, note, now);
    Ok(TransitionOutcome {
        job: new_job,
        prior_status: from,
        history: Some(history),
        effects,
        changed: true,
    })
}

/// Clocks a technician in on a job.
///
/// A stale open entry for the same (job, technician) pair is treated as a
/// crashed session: it is auto-closed at `now` before a fresh entry opens.
/// A job sitting at `assigned` or `paused` moves to `in_progress`; a job
/// already `in_progress` stays put with no history noise.
///
/// # Errors
///
/// * `Forbidden` - the actor may not drive this job's clock
/// * `PreconditionFailed` - the job is not in a clockable status
pub fn apply_clock_in(
    job: &InspectionJob,
    technician_id: i64,
    open_entry: Option<TimeEntry>,
    actor: Actor,
    policy: &WorkflowPolicy,
    now: OffsetDateTime,
) -> Result<ClockInOutcome, CoreError> {
    // The capability check must not depend on whether a transition fires:
    // a job already in progress still only accepts its own technician.
    let is_assigned = actor.id.is_some_and(|id| job.is_assigned_to(id));
    validate_capability(actor.role, job.status, JobStatus::InProgress, is_assigned)
        .map_err(CoreError::DomainViolation)?;

    let transition = match job.status {
        JobStatus::Assigned | JobStatus::Paused => Some(apply_transition(
            job,
            JobStatus::InProgress,
            actor,
            Source::User,
            None,
            policy,
            now,
        )?),
        JobStatus::InProgress => None,
        other => {
            return Err(CoreError::DomainViolation(DomainError::PreconditionFailed {
                reason: format!("cannot clock in while job is {other}"),
            }));
        }
    };

    let recovered = open_entry.map(|entry| entry.closed_at(now));
    let entry = TimeEntry::open(0, job.job_id, technician_id, now);

    Ok(ClockInOutcome {
        recovered,
        entry,
        transition,
        effects: vec![Effect::NotifyTechnicianClockedIn {
            job_id: job.job_id,
            technician_id,
        }],
    })
}

/// Clocks a technician out of a job.
///
/// `inspection_complete` chooses the destination: `tech_completed` when
/// the inspection is done, `paused` otherwise. The job status is left
/// alone when it already sits at the destination, or when it has moved
/// past the inspection phase entirely.
///
/// # Errors
///
/// * `NotClockedIn` - no open entry exists for this (job, technician) pair
/// * `Forbidden` - the actor may not drive this job's clock
pub fn apply_clock_out(
    job: &InspectionJob,
    technician_id: i64,
    open_entry: Option<TimeEntry>,
    inspection_complete: bool,
    actor: Actor,
    policy: &WorkflowPolicy,
    now: OffsetDateTime,
) -> Result<ClockOutOutcome, CoreError> {
    let target = if inspection_complete {
        JobStatus::TechCompleted
    } else {
        JobStatus::Paused
    };

    // Closing an entry is clock-driven even when the job status stays
    // put; the guard runs before any open-entry lookup leaks state.
    let is_assigned = actor.id.is_some_and(|id| job.is_assigned_to(id));
    validate_capability(actor.role, job.status, target, is_assigned)
        .map_err(CoreError::DomainViolation)?;

    let Some(open) = open_entry else {
        return Err(CoreError::DomainViolation(DomainError::NotClockedIn {
            job_id: job.job_id,
            technician_id,
        }));
    };

    let transition = if matches!(
        job.status,
        JobStatus::InProgress | JobStatus::Paused | JobStatus::Assigned
    ) && job.status != target
    {
        Some(apply_transition(
            job,
            target,
            actor,
            Source::User,
            None,
            policy,
            now,
        )?)
    } else {
        None
    };

    let entry = open.closed_at(now);
    let duration_minutes = entry.duration_minutes.unwrap_or(0);

    Ok(ClockOutOutcome {
        entry,
        transition,
        effects: vec![Effect::NotifyTechnicianClockedOut {
            job_id: job.job_id,
            technician_id,
            duration_minutes,
        }],
    })
}

/// Statuses a job may be closed out from.
///
/// "Fully responded" jobs are the normal case; the earlier statuses cover
/// advisors who record every decision themselves without sending.
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

/// Closes a job out through the outcome gate.
///
/// # Errors
///
/// * `InvalidTransition` - the job is not in a closeable status
/// * `Forbidden` - the actor is not privileged
/// * `PendingOutcomes` / `IncompleteWork` - items block closure; the
///   rejection lists every offender
pub fn apply_close(
    job: &InspectionJob,
    items: &[RepairItem],
    actor: Actor,
    note: Option<String>,
    now: OffsetDateTime,
) -> Result<TransitionOutcome, CoreError> {
    let from = job.status;
    if !CLOSEABLE.contains(&from) {
        return Err(CoreError::DomainViolation(DomainError::InvalidTransition {
            from: from.as_str().to_string(),
            to: JobStatus::Completed.as_str().to_string(),
            reason: String::from("job is not in a closeable status"),
        }));
    }
    validate_capability(actor.role, from, JobStatus::Completed, false)
        .map_err(CoreError::DomainViolation)?;
    evaluate_close_gate(items)?;

    let mut new_job = job.clone();
    new_job.status = JobStatus::Completed;
    new_job.stamp_status_timestamp(JobStatus::Completed, now);
    new_job.updated_at = now;

    let history = StatusHistoryEntry::new(
        job.job_id,
        Some(from),
        JobStatus::Completed,
        actor,
        Source::User,
        note,
        now,
    );
    Ok(TransitionOutcome {
        job: new_job,
        prior_status: from,
        history: Some(history),
        effects: vec![
            Effect::NotifyStatusChanged {
                job_id: job.job_id,
                from,
                to: JobStatus::Completed,
            },
            Effect::CancelReminders { job_id: job.job_id },
        ],
        changed: true,
    })
}

/// Folds the current decision tally into the job's status.
///
/// Safe to re-run any number of times: it recomputes from the stored
/// tally, never from a delta. A tally that implies the job's current
/// status (or a status the table cannot reach from here) only refreshes
/// the response timestamps.
///
/// # Errors
///
/// This function is total over valid tallies and currently cannot fail;
/// the `Result` keeps its contract aligned with the other apply
/// operations.
pub fn apply_customer_decisions(
    job: &InspectionJob,
    tally: &DecisionTally,
    actor: Actor,
    now: OffsetDateTime,
) -> Result<TransitionOutcome, CoreError> {
    let from = job.status;
    let mut new_job = job.clone();
    let mut effects = Vec::new();
    let mut history = None;
    let mut changed = false;

    if tally.decided > 0 {
        new_job.first_response_at.get_or_insert(now);
    }

    if let Some(implied) = aggregate_customer_response(tally) {
        if implied != from && from.can_transition_to(implied) {
            new_job.status = implied;
            new_job.stamp_status_timestamp(implied, now);
            effects.push(Effect::NotifyStatusChanged {
                job_id: job.job_id,
                from,
                to: implied,
            });
            history = Some(StatusHistoryEntry::new(
                job.job_id,
                Some(from),
                implied,
                actor,
                Source::System,
                None,
                now,
            ));
            changed = true;
        }
        if implied.is_fully_responded() {
            new_job.fully_responded_at.get_or_insert(now);
            if changed {
                effects.push(Effect::CancelReminders { job_id: job.job_id });
            }
        }
    }
    new_job.updated_at = now;

    Ok(TransitionOutcome {
        job: new_job,
        prior_status: from,
        history,
        effects,
        changed,
    })
}

/// Re-aggregates an item after a labour/parts line change and decides
/// whether the job itself must move.
///
/// The first line added while the job sits at `tech_completed` starts the
/// pricing phase; the resulting job transition is system-driven.
///
/// # Errors
///
/// Propagates transition failures from the pricing-started cascade; the
/// aggregation itself cannot fail.
pub fn apply_line_change(
    job: &InspectionJob,
    item: &RepairItem,
    counts: &LineCounts,
    policy: &WorkflowPolicy,
    now: OffsetDateTime,
) -> Result<LineChangeOutcome, CoreError> {
    let update = aggregate_item_progress(item, counts);

    let transition = if job.status == JobStatus::TechCompleted && counts.total() > 0 {
        Some(apply_transition(
            job,
            JobStatus::AwaitingPricing,
            Actor::system(),
            Source::System,
            Some(String::from("pricing started")),
            policy,
            now,
        )?)
    } else {
        None
    };

    Ok(LineChangeOutcome { update, transition })
}
