// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use time::macros::datetime;
use vhc_domain::{DecisionTally, JobStatus};

use crate::tests::helpers::{customer, job_at, t0};
use crate::{Effect, apply_customer_decisions};

#[test]
fn test_no_decisions_is_a_pure_noop() {
    let job = job_at(JobStatus::Opened);
    let tally = DecisionTally::new(3, 0, 0, 0);

    let outcome = apply_customer_decisions(&job, &tally, customer(), t0())
        .expect("aggregation should succeed");

    assert!(!outcome.changed);
    assert_eq!(outcome.job.status, JobStatus::Opened);
    assert!(outcome.history.is_none());
    assert!(outcome.effects.is_empty());
    assert!(outcome.job.first_response_at.is_none());
}

#[test]
fn test_partial_response_sets_first_response_once() {
    let job = job_at(JobStatus::Opened);
    let tally = DecisionTally::new(3, 1, 1, 0);

    let first = apply_customer_decisions(&job, &tally, customer(), t0())
        .expect("aggregation should succeed");
    assert!(first.changed);
    assert_eq!(first.job.status, JobStatus::PartialResponse);
    assert_eq!(first.job.first_response_at, Some(t0()));

    // A later decision must not move the first-response marker.
    let later = datetime!(2026-03-02 12:00 UTC);
    let tally = DecisionTally::new(3, 2, 1, 1);
    let second = apply_customer_decisions(&first.job, &tally, customer(), later)
        .expect("aggregation should succeed");
    assert!(!second.changed);
    assert_eq!(second.job.status, JobStatus::PartialResponse);
    assert_eq!(second.job.first_response_at, Some(t0()));
}

#[test]
fn test_mixed_decisions_authorize() {
    let job = job_at(JobStatus::PartialResponse);
    let tally = DecisionTally::new(3, 3, 2, 1);

    let outcome = apply_customer_decisions(&job, &tally, customer(), t0())
        .expect("aggregation should succeed");

    assert_eq!(outcome.job.status, JobStatus::Authorized);
    assert_eq!(outcome.job.fully_responded_at, Some(t0()));
    assert!(outcome.effects.contains(&Effect::CancelReminders { job_id: 10 }));
}

#[test]
fn test_all_declined() {
    let job = job_at(JobStatus::Opened);
    let tally = DecisionTally::new(3, 3, 0, 3);

    let outcome = apply_customer_decisions(&job, &tally, customer(), t0())
        .expect("aggregation should succeed");

    assert_eq!(outcome.job.status, JobStatus::Declined);
    assert_eq!(outcome.job.fully_responded_at, Some(t0()));
}

#[test]
fn test_reaggregation_is_idempotent() {
    let job = job_at(JobStatus::Opened);
    let tally = DecisionTally::new(2, 2, 1, 1);

    let first = apply_customer_decisions(&job, &tally, customer(), t0())
        .expect("aggregation should succeed");
    assert!(first.changed);

    // Same stored facts, run again: nothing moves, nothing fires.
    let second = apply_customer_decisions(&first.job, &tally, customer(), t0())
        .expect("aggregation should succeed");
    assert!(!second.changed);
    assert!(second.history.is_none());
    assert!(second.effects.is_empty());
    assert_eq!(second.job.status, first.job.status);
}
