// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod item_tests;

use time::OffsetDateTime;
use time::macros::datetime;
use vhc_audit::{Actor, Source, StatusHistoryEntry};
use vhc_domain::{ActorRole, InspectionJob, JobStatus};

use crate::Persistence;

pub fn t0() -> OffsetDateTime {
    datetime!(2026-03-02 08:00 UTC)
}

pub fn create_test_persistence() -> Persistence {
    Persistence::new_in_memory().expect("in-memory database")
}

/// Inserts a job at the given status, returning it with its assigned id.
pub fn seed_job(persistence: &mut Persistence, status: JobStatus) -> InspectionJob {
    let mut job = InspectionJob::new(0, 1, "AB12 CDE", "Jane Driver", t0());
    job.status = status;
    let job_id = persistence.create_job(&job).expect("job insert");
    job.job_id = job_id;
    job
}

pub fn history_entry(
    job_id: i64,
    from: JobStatus,
    to: JobStatus,
    at: OffsetDateTime,
) -> StatusHistoryEntry {
    StatusHistoryEntry::new(
        job_id,
        Some(from),
        to,
        Actor::staff(3, ActorRole::Advisor),
        Source::User,
        None,
        at,
    )
}
