// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use time::OffsetDateTime;
use time::macros::datetime;
use vhc_audit::Actor;
use vhc_domain::{ActorRole, InspectionJob, JobStatus, PublicToken};

pub const TECH_ID: i64 = 7;
pub const ADVISOR_ID: i64 = 3;

pub fn t0() -> OffsetDateTime {
    datetime!(2026-03-02 08:00 UTC)
}

/// A job at the given status with a technician assigned.
pub fn job_at(status: JobStatus) -> InspectionJob {
    let mut job = InspectionJob::new(10, 1, "AB12 CDE", "J. Smith", t0());
    job.status = status;
    job.technician_id = Some(TECH_ID);
    job
}

/// A job at the given status carrying a live public token.
pub fn job_with_token(status: JobStatus) -> InspectionJob {
    let mut job = job_at(status);
    job.public_token = Some(PublicToken {
        value: "ab".repeat(24),
        expires_at: datetime!(2026-03-05 08:00 UTC),
    });
    job
}

pub fn technician() -> Actor {
    Actor::staff(TECH_ID, ActorRole::Technician)
}

pub fn advisor() -> Actor {
    Actor::staff(ADVISOR_ID, ActorRole::Advisor)
}

pub fn customer() -> Actor {
    Actor::new(None, ActorRole::Customer)
}
