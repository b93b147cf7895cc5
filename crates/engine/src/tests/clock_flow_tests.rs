// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Time tracking flows: the clock-driven transitions and crash recovery.

use time::Duration;
use vhc_domain::JobStatus;

use super::{TECH_ID, advisor, create_test_engine, job_at_assigned, t0, technician};
use crate::error::EngineError;

#[test]
fn test_clock_in_starts_the_inspection() {
    let (mut engine, events) = create_test_engine();
    let job_id = job_at_assigned(&mut engine);

    let entry = engine
        .clock_in(job_id, TECH_ID, technician(), t0())
        .expect("clock in");
    assert!(entry.entry_id > 0);
    assert!(entry.is_open());

    let job = engine.job(job_id).expect("job");
    assert_eq!(job.status, JobStatus::InProgress);
    assert_eq!(job.technician_started_at, Some(t0()));
    assert!(
        events
            .borrow()
            .iter()
            .any(|e| e == &format!("clock_in:{job_id}:{TECH_ID}"))
    );
}

#[test]
fn test_clock_in_requires_the_assigned_technician() {
    let (mut engine, _events) = create_test_engine();
    let job_id = job_at_assigned(&mut engine);

    let other = vhc_audit::Actor::staff(99, vhc_domain::ActorRole::Technician);
    let result = engine.clock_in(job_id, 99, other, t0());
    assert!(matches!(result, Err(EngineError::Forbidden { .. })));
}

#[test]
fn test_clock_out_pause_and_resume() {
    let (mut engine, _events) = create_test_engine();
    let job_id = job_at_assigned(&mut engine);
    engine
        .clock_in(job_id, TECH_ID, technician(), t0())
        .expect("clock in");

    let entry = engine
        .clock_out(
            job_id,
            TECH_ID,
            false,
            technician(),
            t0() + Duration::minutes(30),
        )
        .expect("clock out");
    assert_eq!(entry.duration_minutes, Some(30));
    assert_eq!(engine.job(job_id).expect("job").status, JobStatus::Paused);

    engine
        .clock_in(job_id, TECH_ID, technician(), t0() + Duration::minutes(45))
        .expect("resume");
    assert_eq!(
        engine.job(job_id).expect("job").status,
        JobStatus::InProgress
    );
    // technician_started_at is first-arrival only.
    assert_eq!(
        engine.job(job_id).expect("job").technician_started_at,
        Some(t0())
    );
}

#[test]
fn test_clock_out_complete_finishes_the_inspection() {
    let (mut engine, events) = create_test_engine();
    let job_id = job_at_assigned(&mut engine);
    engine
        .clock_in(job_id, TECH_ID, technician(), t0())
        .expect("clock in");
    engine
        .clock_out(
            job_id,
            TECH_ID,
            true,
            technician(),
            t0() + Duration::minutes(50),
        )
        .expect("clock out");

    let job = engine.job(job_id).expect("job");
    assert_eq!(job.status, JobStatus::TechCompleted);
    assert_eq!(job.tech_completed_at, Some(t0() + Duration::minutes(50)));
    assert!(
        events
            .borrow()
            .iter()
            .any(|e| e == &format!("auto_generate:{job_id}"))
    );
}

#[test]
fn test_clock_out_without_open_entry() {
    let (mut engine, _events) = create_test_engine();
    let job_id = job_at_assigned(&mut engine);
    engine
        .clock_in(job_id, TECH_ID, technician(), t0())
        .expect("clock in");
    engine
        .clock_out(job_id, TECH_ID, false, technician(), t0())
        .expect("clock out");

    let again = engine.clock_out(job_id, TECH_ID, false, technician(), t0());
    assert!(matches!(
        again,
        Err(EngineError::PreconditionFailed { .. })
    ));
}

#[test]
fn test_clock_in_recovers_crashed_session() {
    let (mut engine, _events) = create_test_engine();
    let job_id = job_at_assigned(&mut engine);
    engine
        .clock_in(job_id, TECH_ID, technician(), t0())
        .expect("clock in");

    // The app crashed; the entry was never closed. The next clock-in
    // recovers it instead of erroring.
    let fresh = engine
        .clock_in(job_id, TECH_ID, technician(), t0() + Duration::minutes(42))
        .expect("recovering clock in");
    assert!(fresh.is_open());

    let entries = engine.time_entries(job_id).expect("entries");
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].duration_minutes, Some(42));
    assert!(entries[0].clock_out_at.is_some());
    assert_eq!(entries[1].entry_id, fresh.entry_id);
}

#[test]
fn test_duration_rounds_to_nearest_minute() {
    let (mut engine, _events) = create_test_engine();
    let job_id = job_at_assigned(&mut engine);
    engine
        .clock_in(job_id, TECH_ID, technician(), t0())
        .expect("clock in");

    let entry = engine
        .clock_out(
            job_id,
            TECH_ID,
            false,
            technician(),
            t0() + Duration::seconds(90),
        )
        .expect("clock out");
    assert_eq!(entry.duration_minutes, Some(2));
}

#[test]
fn test_advisor_cannot_drive_the_clock() {
    let (mut engine, _events) = create_test_engine();
    let job_id = job_at_assigned(&mut engine);

    let result = engine.clock_in(job_id, TECH_ID, advisor(), t0());
    assert!(matches!(result, Err(EngineError::Forbidden { .. })));
}
