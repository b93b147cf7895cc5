// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Customer response flows: token access, decision recording, and the
//! response aggregation.

use time::Duration;
use vhc_domain::JobStatus;

use super::{advisor, create_test_engine, customer, job_at_sent, t0};
use crate::engine::DecisionRequest;
use crate::error::EngineError;

fn approve(item_id: i64) -> DecisionRequest {
    DecisionRequest {
        item_id,
        approved: true,
        selected_option_id: None,
        reason: None,
    }
}

fn decline(item_id: i64, reason: &str) -> DecisionRequest {
    DecisionRequest {
        item_id,
        approved: false,
        selected_option_id: None,
        reason: Some(reason.to_string()),
    }
}

#[test]
fn test_send_issues_token_and_schedules_reminders() {
    let (mut engine, events) = create_test_engine();
    let (job_id, _item_id) = job_at_sent(&mut engine);

    let job = engine.job(job_id).expect("job");
    assert_eq!(job.status, JobStatus::Sent);
    assert_eq!(job.sent_at, Some(t0()));
    let token = job.public_token.expect("token");
    assert_eq!(token.value.len(), crate::token::TOKEN_LENGTH);
    assert_eq!(token.expires_at, t0() + Duration::hours(72));
    assert!(
        events
            .borrow()
            .iter()
            .any(|e| e == &format!("schedule:{job_id}"))
    );
}

#[test]
fn test_portal_lookup_by_token() {
    let (mut engine, _events) = create_test_engine();
    let (job_id, _item_id) = job_at_sent(&mut engine);
    let token = engine
        .job(job_id)
        .expect("job")
        .public_token
        .expect("token");

    let found = engine.job_by_token(&token.value, t0()).expect("lookup");
    assert_eq!(found.job_id, job_id);

    // An expired token behaves like a missing one.
    let late = engine.job_by_token(&token.value, t0() + Duration::hours(73));
    assert!(matches!(late, Err(EngineError::NotFound { .. })));
}

#[test]
fn test_single_approval_fully_responds() {
    let (mut engine, events) = create_test_engine();
    let (job_id, item_id) = job_at_sent(&mut engine);
    engine
        .request_transition(job_id, JobStatus::Opened, customer(), None, t0())
        .expect("opened");

    let job = engine
        .record_decision(job_id, approve(item_id), customer(), t0())
        .expect("decision");
    assert_eq!(job.status, JobStatus::Authorized);
    assert_eq!(job.first_response_at, Some(t0()));
    assert_eq!(job.fully_responded_at, Some(t0()));
    assert!(
        events
            .borrow()
            .iter()
            .any(|e| e == &format!("customer:{job_id}:authorised:9000"))
    );
    assert!(
        events
            .borrow()
            .iter()
            .any(|e| e == &format!("cancel:{job_id}"))
    );
}

#[test]
fn test_partial_then_full_response() {
    let (mut engine, _events) = create_test_engine();
    let (job_id, first_item) = job_at_sent(&mut engine);
    let second_item = engine
        .create_item(job_id, None, "Rear wiper", advisor(), t0())
        .expect("item");
    engine
        .request_transition(job_id, JobStatus::Opened, customer(), None, t0())
        .expect("opened");

    let job = engine
        .record_decision(job_id, approve(first_item), customer(), t0())
        .expect("first decision");
    assert_eq!(job.status, JobStatus::PartialResponse);
    assert_eq!(job.fully_responded_at, None);

    let job = engine
        .record_decision(
            job_id,
            decline(second_item, "next visit"),
            customer(),
            t0() + Duration::minutes(5),
        )
        .expect("second decision");
    // Mixed approve/decline reports authorized.
    assert_eq!(job.status, JobStatus::Authorized);
    assert_eq!(job.first_response_at, Some(t0()));
    assert_eq!(job.fully_responded_at, Some(t0() + Duration::minutes(5)));
}

#[test]
fn test_all_declined_reports_declined() {
    let (mut engine, _events) = create_test_engine();
    let (job_id, item_id) = job_at_sent(&mut engine);
    engine
        .request_transition(job_id, JobStatus::Opened, customer(), None, t0())
        .expect("opened");

    let job = engine
        .record_decision(job_id, decline(item_id, "too expensive"), customer(), t0())
        .expect("decision");
    assert_eq!(job.status, JobStatus::Declined);
    assert_eq!(job.fully_responded_at, Some(t0()));
}

#[test]
fn test_bulk_decisions_fold_once() {
    let (mut engine, _events) = create_test_engine();
    let (job_id, first_item) = job_at_sent(&mut engine);
    let second_item = engine
        .create_item(job_id, None, "Rear wiper", advisor(), t0())
        .expect("item");
    engine
        .request_transition(job_id, JobStatus::Opened, customer(), None, t0())
        .expect("opened");
    let before = engine.history(job_id).expect("history").len();

    let job = engine
        .record_decisions(
            job_id,
            &[approve(first_item), approve(second_item)],
            customer(),
            t0(),
        )
        .expect("bulk decisions");
    assert_eq!(job.status, JobStatus::Authorized);
    // One aggregation pass, one history entry.
    assert_eq!(engine.history(job_id).expect("history").len(), before + 1);
}

#[test]
fn test_duplicate_decision_is_rejected() {
    let (mut engine, _events) = create_test_engine();
    let (job_id, item_id) = job_at_sent(&mut engine);
    engine
        .request_transition(job_id, JobStatus::Opened, customer(), None, t0())
        .expect("opened");
    engine
        .record_decision(job_id, approve(item_id), customer(), t0())
        .expect("decision");

    let repeat = engine.record_decision(job_id, decline(item_id, "changed mind"), customer(), t0());
    assert!(matches!(
        repeat,
        Err(EngineError::PreconditionFailed { .. })
    ));
    // The recorded decision stands.
    assert_eq!(
        engine.job(job_id).expect("job").status,
        JobStatus::Authorized
    );
}

#[test]
fn test_decisions_before_open_hold_the_status() {
    let (mut engine, _events) = create_test_engine();
    let (job_id, item_id) = job_at_sent(&mut engine);

    // The advisor records a phoned-in decision while the quote is still
    // only sent; the table has no sent -> authorized edge, so the status
    // holds until the customer opens the link.
    let job = engine
        .record_decision(job_id, approve(item_id), advisor(), t0())
        .expect("decision");
    assert_eq!(job.status, JobStatus::Sent);
    assert_eq!(job.first_response_at, Some(t0()));
    assert_eq!(job.fully_responded_at, Some(t0()));
}

#[test]
fn test_deleting_undecided_item_completes_response() {
    let (mut engine, _events) = create_test_engine();
    let (job_id, first_item) = job_at_sent(&mut engine);
    let second_item = engine
        .create_item(job_id, None, "Rear wiper", advisor(), t0())
        .expect("item");
    engine
        .request_transition(job_id, JobStatus::Opened, customer(), None, t0())
        .expect("opened");
    engine
        .record_decision(job_id, approve(first_item), customer(), t0())
        .expect("decision");
    assert_eq!(
        engine.job(job_id).expect("job").status,
        JobStatus::PartialResponse
    );

    engine
        .delete_item(second_item, advisor(), t0())
        .expect("delete item");
    assert_eq!(
        engine.job(job_id).expect("job").status,
        JobStatus::Authorized
    );
}
