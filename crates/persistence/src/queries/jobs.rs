// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Job query operations.

use diesel::prelude::*;
use diesel::SqliteConnection;
use time::OffsetDateTime;
use vhc_domain::{InspectionJob, JobStatus};

use crate::data_models::{JobRow, format_ts};
use crate::diesel_schema::inspection_jobs;
use crate::error::PersistenceError;

/// Fetch a job by id.
///
/// # Errors
///
/// Returns `JobNotFound` if no row exists.
pub fn get_job(conn: &mut SqliteConnection, job_id: i64) -> Result<InspectionJob, PersistenceError> {
    let row: JobRow = inspection_jobs::table
        .filter(inspection_jobs::job_id.eq(job_id))
        .first(conn)
        .optional()?
        .ok_or(PersistenceError::JobNotFound(job_id))?;
    row.into_domain()
}

/// Fetch a job by its public token.
///
/// # Errors
///
/// Returns `NotFound` if no job carries the token.
pub fn get_job_by_token(
    conn: &mut SqliteConnection,
    token: &str,
) -> Result<InspectionJob, PersistenceError> {
    let row: JobRow = inspection_jobs::table
        .filter(inspection_jobs::public_token.eq(Some(token)))
        .first(conn)
        .optional()?
        .ok_or_else(|| PersistenceError::NotFound("no job for token".to_string()))?;
    row.into_domain()
}

/// Jobs whose public token has expired but which still sit in a
/// non-terminal status. These are the expiry sweep's candidates.
///
/// # Errors
///
/// Returns an error if the query or row conversion fails.
pub fn jobs_with_expired_tokens(
    conn: &mut SqliteConnection,
    now: OffsetDateTime,
) -> Result<Vec<InspectionJob>, PersistenceError> {
    let cutoff = format_ts(now)?;
    let terminal: Vec<&str> = JobStatus::all()
        .iter()
        .filter(|s| s.is_terminal())
        .map(JobStatus::as_str)
        .collect();

    // ISO 8601 text compares chronologically for a fixed offset.
    let rows: Vec<JobRow> = inspection_jobs::table
        .filter(inspection_jobs::token_expires_at.le(Some(cutoff)))
        .filter(inspection_jobs::status.ne_all(terminal))
        .load(conn)?;
    rows.into_iter().map(JobRow::into_domain).collect()
}
