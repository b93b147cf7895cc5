// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Job mutation operations.
//!
//! The status commit is the concurrency-critical write: it is a single
//! conditional update keyed on the previously-observed status, so a
//! losing concurrent writer updates zero rows and surfaces as
//! `StaleStatus` instead of silently overwriting.

use diesel::prelude::*;
use diesel::{Connection, SqliteConnection};
use vhc_audit::StatusHistoryEntry;
use vhc_domain::{InspectionJob, JobStatus};

use crate::backend::sqlite::get_last_insert_rowid;
use crate::data_models::{JobRecord, NewHistory};
use crate::diesel_schema::{inspection_jobs, status_history};
use crate::error::PersistenceError;

/// Insert a new job row.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_job(
    conn: &mut SqliteConnection,
    job: &InspectionJob,
) -> Result<i64, PersistenceError> {
    let record = JobRecord::from_domain(job)?;
    diesel::insert_into(inspection_jobs::table)
        .values(&record)
        .execute(conn)?;
    get_last_insert_rowid(conn)
}

/// Commit a status transition: write the updated job row conditionally on
/// its prior status and append the history entry, atomically.
///
/// # Errors
///
/// Returns `StaleStatus` when the job is no longer at `expected` (a
/// concurrent writer won the race), or a database error.
pub fn commit_transition(
    conn: &mut SqliteConnection,
    job: &InspectionJob,
    expected: JobStatus,
    history: Option<&StatusHistoryEntry>,
) -> Result<(), PersistenceError> {
    let record = JobRecord::from_domain(job)?;
    let history_record = history.map(NewHistory::from_domain).transpose()?;

    conn.transaction::<(), PersistenceError, _>(|conn| {
        let updated = diesel::update(
            inspection_jobs::table
                .filter(inspection_jobs::job_id.eq(job.job_id))
                .filter(inspection_jobs::status.eq(expected.as_str())),
        )
        .set(&record)
        .execute(conn)?;

        if updated == 0 {
            return Err(PersistenceError::StaleStatus {
                job_id: job.job_id,
                expected: expected.as_str().to_string(),
            });
        }

        if let Some(entry) = &history_record {
            diesel::insert_into(status_history::table)
                .values(entry)
                .execute(conn)?;
        }
        Ok(())
    })
}

/// Write a job row unconditionally (non-status fields such as RAG counts
/// or assignment).
///
/// # Errors
///
/// Returns `JobNotFound` if the row does not exist.
pub fn update_job(
    conn: &mut SqliteConnection,
    job: &InspectionJob,
) -> Result<(), PersistenceError> {
    let record = JobRecord::from_domain(job)?;
    let updated = diesel::update(
        inspection_jobs::table.filter(inspection_jobs::job_id.eq(job.job_id)),
    )
    .set(&record)
    .execute(conn)?;
    if updated == 0 {
        return Err(PersistenceError::JobNotFound(job.job_id));
    }
    Ok(())
}

/// Append a history entry outside a status commit (creation entries,
/// recorded no-ops).
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn append_history(
    conn: &mut SqliteConnection,
    entry: &StatusHistoryEntry,
) -> Result<i64, PersistenceError> {
    let record = NewHistory::from_domain(entry)?;
    diesel::insert_into(status_history::table)
        .values(&record)
        .execute(conn)?;
    get_last_insert_rowid(conn)
}
