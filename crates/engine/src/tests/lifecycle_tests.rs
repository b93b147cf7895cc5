// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! End-to-end lifecycle tests: creation, transitions, history, and the
//! no-op policy.

use vhc_core::{Command, WorkflowPolicy};
use vhc_domain::{ActorRole, JobStatus, RagCounts};
use vhc_persistence::Persistence;

use super::{advisor, create_test_engine, job_at_assigned, t0, technician};
use crate::engine::WorkflowEngine;
use crate::error::EngineError;

#[test]
fn test_create_job_starts_awaiting_arrival_with_history() {
    let (mut engine, _events) = create_test_engine();
    let job = engine
        .create_job(1, "AB12 CDE", "Jane Driver", advisor(), t0())
        .expect("create job");

    assert_eq!(job.status, JobStatus::AwaitingArrival);
    let history = engine.history(job.job_id).expect("history");
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].from_status, None);
    assert_eq!(history[0].to_status, JobStatus::AwaitingArrival);
}

#[test]
fn test_happy_path_to_assigned() {
    let (mut engine, events) = create_test_engine();
    let job_id = job_at_assigned(&mut engine);

    let job = engine.job(job_id).expect("job");
    assert_eq!(job.status, JobStatus::Assigned);
    assert_eq!(job.technician_id, Some(super::TECH_ID));
    assert_eq!(job.assigned_at, Some(t0()));

    // Check-in completion seeded the checklist from flagged findings.
    assert!(
        events
            .borrow()
            .iter()
            .any(|e| e == &format!("from_findings:{job_id}:1"))
    );
}

#[test]
fn test_invalid_transition_is_rejected() {
    let (mut engine, _events) = create_test_engine();
    let job = engine
        .create_job(1, "AB12 CDE", "Jane Driver", advisor(), t0())
        .expect("create job");

    let result = engine.request_transition(job.job_id, JobStatus::Sent, advisor(), None, t0());
    assert!(matches!(result, Err(EngineError::InvalidTransition { .. })));

    // Nothing was written.
    assert_eq!(
        engine.job(job.job_id).expect("job").status,
        JobStatus::AwaitingArrival
    );
    assert_eq!(engine.history(job.job_id).expect("history").len(), 1);
}

#[test]
fn test_capability_rejection_names_required_role() {
    let (mut engine, _events) = create_test_engine();
    let job_id = job_at_assigned(&mut engine);

    // Cancellation is privileged; the technician is refused.
    let result = engine.request_transition(job_id, JobStatus::Cancelled, technician(), None, t0());
    assert!(matches!(
        result,
        Err(EngineError::Forbidden { required_role, .. }) if required_role == "advisor or admin"
    ));
}

#[test]
fn test_noop_with_note_records_history_without_moving() {
    let (mut engine, _events) = create_test_engine();
    let job_id = job_at_assigned(&mut engine);
    let before = engine.history(job_id).expect("history").len();

    let job = engine
        .request_transition(
            job_id,
            JobStatus::Assigned,
            advisor(),
            Some(String::from("customer called to confirm")),
            t0(),
        )
        .expect("recorded no-op");
    assert_eq!(job.status, JobStatus::Assigned);

    let history = engine.history(job_id).expect("history");
    assert_eq!(history.len(), before + 1);
    let last = history.last().expect("entry");
    assert!(last.is_noop());
    assert_eq!(last.note.as_deref(), Some("customer called to confirm"));
}

#[test]
fn test_noop_without_note_is_rejected_under_policy() {
    let persistence = Persistence::new_in_memory().expect("in-memory database");
    let mut engine = WorkflowEngine::new(persistence).with_policy(WorkflowPolicy {
        record_noop_with_note: false,
        token_ttl_hours: 72,
    });
    let job_id = job_at_assigned(&mut engine);

    let result = engine.request_transition(
        job_id,
        JobStatus::Assigned,
        advisor(),
        Some(String::from("nothing happened")),
        t0(),
    );
    assert!(matches!(result, Err(EngineError::InvalidTransition { .. })));
}

#[test]
fn test_execute_dispatches_commands() {
    let (mut engine, _events) = create_test_engine();
    let job_id = job_at_assigned(&mut engine);

    let job = engine
        .execute(
            job_id,
            Command::ClockIn {
                technician_id: super::TECH_ID,
            },
            technician(),
            t0(),
        )
        .expect("command");
    assert_eq!(job.status, JobStatus::InProgress);
}

#[test]
fn test_set_rag_counts_requires_staff() {
    let (mut engine, _events) = create_test_engine();
    let job_id = job_at_assigned(&mut engine);

    let counts = RagCounts {
        red: 2,
        amber: 3,
        green: 11,
    };
    let refused = engine.set_rag_counts(job_id, counts, super::customer(), t0());
    assert!(matches!(refused, Err(EngineError::Forbidden { .. })));

    engine
        .set_rag_counts(job_id, counts, technician(), t0())
        .expect("update counts");
    assert_eq!(engine.job(job_id).expect("job").rag_counts, counts);
}

#[test]
fn test_capability_projection_tracks_status() {
    let (mut engine, _events) = create_test_engine();
    let job_id = job_at_assigned(&mut engine);

    let tech_caps = engine
        .capabilities(job_id, ActorRole::Technician, Some(super::TECH_ID))
        .expect("capabilities");
    assert!(tech_caps.can_clock_in.is_allowed());
    assert!(!tech_caps.can_close.is_allowed());

    let advisor_caps = engine
        .capabilities(job_id, ActorRole::Advisor, Some(super::ADVISOR_ID))
        .expect("capabilities");
    assert!(!advisor_caps.can_clock_in.is_allowed());
    assert!(advisor_caps.can_cancel.is_allowed());
}
