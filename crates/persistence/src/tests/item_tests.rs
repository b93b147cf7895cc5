// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Repair item storage tests: flags, derived statuses, pricing lines,
//! and soft deletion.

use vhc_domain::{
    JobStatus, OutcomeStatus, ProgressStatus, QuoteStatus, aggregate_item_progress,
};

use super::{create_test_persistence, seed_job, t0};
use crate::{Persistence, PersistenceError};

#[test]
fn test_create_item_defaults() {
    let mut persistence: Persistence = create_test_persistence();
    let job = seed_job(&mut persistence, JobStatus::TechCompleted);

    let item_id = persistence
        .create_item(job.job_id, None, "Front brake pads")
        .expect("item insert");
    let item = persistence.get_item(item_id).expect("item load");

    assert_eq!(item.job_id, job.job_id);
    assert_eq!(item.name, "Front brake pads");
    assert_eq!(item.labour_status, ProgressStatus::Pending);
    assert_eq!(item.parts_status, ProgressStatus::Pending);
    assert_eq!(item.quote_status, QuoteStatus::Pending);
    assert_eq!(item.outcome_status, None);
    assert!(!item.deleted);
}

#[test]
fn test_get_item_not_found() {
    let mut persistence: Persistence = create_test_persistence();
    let result = persistence.get_item(999);
    assert!(matches!(result, Err(PersistenceError::ItemNotFound(999))));
}

#[test]
fn test_not_required_flag_round_trip() {
    let mut persistence: Persistence = create_test_persistence();
    let job = seed_job(&mut persistence, JobStatus::TechCompleted);
    let item_id = persistence
        .create_item(job.job_id, None, "Wiper blades")
        .expect("item insert");

    persistence
        .set_no_labour_required(item_id, true, 3, t0())
        .expect("flag set");
    let item = persistence.get_item(item_id).expect("item load");
    assert!(item.no_labour_required);
    assert_eq!(item.no_labour_required_by, Some(3));
    assert_eq!(item.no_labour_required_at, Some(t0()));

    persistence
        .set_no_labour_required(item_id, false, 3, t0())
        .expect("flag clear");
    let item = persistence.get_item(item_id).expect("item load");
    assert!(!item.no_labour_required);
    assert_eq!(item.no_labour_required_by, None);
    assert_eq!(item.no_labour_required_at, None);
}

#[test]
fn test_explicit_completion_marks() {
    let mut persistence: Persistence = create_test_persistence();
    let job = seed_job(&mut persistence, JobStatus::TechCompleted);
    let item_id = persistence
        .create_item(job.job_id, None, "Rear discs")
        .expect("item insert");

    persistence
        .mark_labour_complete(item_id, 3, t0())
        .expect("labour complete");
    persistence
        .mark_parts_complete(item_id, 4, t0())
        .expect("parts complete");

    let item = persistence.get_item(item_id).expect("item load");
    assert_eq!(item.labour_status, ProgressStatus::Complete);
    assert_eq!(item.labour_completed_by, Some(3));
    assert_eq!(item.parts_status, ProgressStatus::Complete);
    assert_eq!(item.parts_completed_by, Some(4));
}

#[test]
fn test_line_counts_include_selected_option_only() {
    let mut persistence: Persistence = create_test_persistence();
    let job = seed_job(&mut persistence, JobStatus::AwaitingPricing);
    let item_id = persistence
        .create_item(job.job_id, None, "Exhaust section")
        .expect("item insert");

    persistence
        .add_labour_line(Some(item_id), None, "Fit exhaust", 12000, t0())
        .expect("labour line");
    let option_id = persistence
        .create_option(item_id, "OEM part", t0())
        .expect("option insert");
    persistence
        .add_parts_line(None, Some(option_id), "OEM exhaust section", 28000, t0())
        .expect("parts line");

    // Option lines do not count until the option is selected.
    let item = persistence.get_item(item_id).expect("item load");
    let counts = persistence.line_counts(&item).expect("counts");
    assert_eq!(counts.labour, 1);
    assert_eq!(counts.parts, 0);

    persistence
        .record_decision(item_id, true, Some(option_id), None, t0())
        .expect("decision");
    let item = persistence.get_item(item_id).expect("item load");
    let counts = persistence.line_counts(&item).expect("counts");
    assert_eq!(counts.labour, 1);
    assert_eq!(counts.parts, 1);
}

#[test]
fn test_line_totals_follow_selection() {
    let mut persistence: Persistence = create_test_persistence();
    let job = seed_job(&mut persistence, JobStatus::AwaitingPricing);
    let item_id = persistence
        .create_item(job.job_id, None, "Exhaust section")
        .expect("item insert");

    persistence
        .add_labour_line(Some(item_id), None, "Fit exhaust", 12000, t0())
        .expect("labour line");
    let option_id = persistence
        .create_option(item_id, "OEM part", t0())
        .expect("option insert");
    persistence
        .add_parts_line(None, Some(option_id), "OEM exhaust section", 28000, t0())
        .expect("parts line");

    let item = persistence.get_item(item_id).expect("item load");
    assert_eq!(persistence.line_totals(&item).expect("totals"), (12000, 0));

    persistence
        .record_decision(item_id, true, Some(option_id), None, t0())
        .expect("decision");
    let item = persistence.get_item(item_id).expect("item load");
    assert_eq!(
        persistence.line_totals(&item).expect("totals"),
        (12000, 28000)
    );

    persistence
        .update_item_totals(item_id, 12000, 28000)
        .expect("totals update");
    let item = persistence.get_item(item_id).expect("item load");
    assert_eq!(item.labour_total, 12000);
    assert_eq!(item.parts_total, 28000);
}

#[test]
fn test_progress_update_round_trip_is_idempotent() {
    let mut persistence: Persistence = create_test_persistence();
    let job = seed_job(&mut persistence, JobStatus::AwaitingPricing);
    let item_id = persistence
        .create_item(job.job_id, None, "Battery")
        .expect("item insert");
    persistence
        .add_labour_line(Some(item_id), None, "Replace battery", 4500, t0())
        .expect("labour line");

    let item = persistence.get_item(item_id).expect("item load");
    let counts = persistence.line_counts(&item).expect("counts");
    let update = aggregate_item_progress(&item, &counts);
    assert!(update.changed);
    assert_eq!(update.labour_status, ProgressStatus::InProgress);
    persistence
        .apply_progress_update(&item, &update)
        .expect("update");

    // Recomputing from the stored row converges.
    let item = persistence.get_item(item_id).expect("item load");
    assert_eq!(item.labour_status, ProgressStatus::InProgress);
    let counts = persistence.line_counts(&item).expect("counts");
    let again = aggregate_item_progress(&item, &counts);
    assert!(!again.changed);
}

#[test]
fn test_stale_completion_cleared_when_lines_vanish() {
    let mut persistence: Persistence = create_test_persistence();
    let job = seed_job(&mut persistence, JobStatus::AwaitingPricing);
    let item_id = persistence
        .create_item(job.job_id, None, "Coolant flush")
        .expect("item insert");
    let line_id = persistence
        .add_labour_line(Some(item_id), None, "Flush coolant", 6000, t0())
        .expect("labour line");
    persistence
        .mark_labour_complete(item_id, 3, t0())
        .expect("labour complete");
    persistence.delete_labour_line(line_id).expect("line delete");

    let item = persistence.get_item(item_id).expect("item load");
    let counts = persistence.line_counts(&item).expect("counts");
    let update = aggregate_item_progress(&item, &counts);
    assert!(update.clear_labour_completion);
    persistence
        .apply_progress_update(&item, &update)
        .expect("update");

    let item = persistence.get_item(item_id).expect("item load");
    assert_eq!(item.labour_status, ProgressStatus::Pending);
    assert_eq!(item.labour_completed_by, None);
    assert_eq!(item.labour_completed_at, None);
}

#[test]
fn test_work_complete_timestamp() {
    let mut persistence: Persistence = create_test_persistence();
    let job = seed_job(&mut persistence, JobStatus::Authorized);
    let item_id = persistence
        .create_item(job.job_id, None, "Brake fluid")
        .expect("item insert");

    persistence
        .mark_work_complete(item_id, t0())
        .expect("work complete");
    let item = persistence.get_item(item_id).expect("item load");
    assert_eq!(item.work_completed_at, Some(t0()));
}

#[test]
fn test_soft_delete_marks_outcome() {
    let mut persistence: Persistence = create_test_persistence();
    let job = seed_job(&mut persistence, JobStatus::AwaitingPricing);
    let item_id = persistence
        .create_item(job.job_id, None, "Cabin filter")
        .expect("item insert");

    persistence.soft_delete_item(item_id).expect("delete");
    let item = persistence.get_item(item_id).expect("item load");
    assert!(item.deleted);
    assert_eq!(item.outcome_status, Some(OutcomeStatus::Deleted));

    // Still visible to the unfiltered listing.
    let items = persistence.items_for_job(job.job_id).expect("items");
    assert_eq!(items.len(), 1);
}
