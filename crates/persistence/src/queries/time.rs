// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Time entry query operations.

use diesel::prelude::*;
use diesel::SqliteConnection;
use vhc_domain::TimeEntry;

use crate::data_models::TimeEntryRow;
use crate::diesel_schema::time_entries;
use crate::error::PersistenceError;

/// The open entry for a (job, technician) pair, if one exists.
///
/// The partial unique index guarantees at most one.
///
/// # Errors
///
/// Returns an error if the query or row conversion fails.
pub fn find_open_entry(
    conn: &mut SqliteConnection,
    job_id: i64,
    technician_id: i64,
) -> Result<Option<TimeEntry>, PersistenceError> {
    let row: Option<TimeEntryRow> = time_entries::table
        .filter(time_entries::job_id.eq(job_id))
        .filter(time_entries::technician_id.eq(technician_id))
        .filter(time_entries::clock_out_at.is_null())
        .first(conn)
        .optional()?;
    row.map(TimeEntryRow::into_domain).transpose()
}

/// All entries for a job, oldest first.
///
/// # Errors
///
/// Returns an error if the query or row conversion fails.
pub fn entries_for_job(
    conn: &mut SqliteConnection,
    job_id: i64,
) -> Result<Vec<TimeEntry>, PersistenceError> {
    let rows: Vec<TimeEntryRow> = time_entries::table
        .filter(time_entries::job_id.eq(job_id))
        .order(time_entries::entry_id.asc())
        .load(conn)?;
    rows.into_iter().map(TimeEntryRow::into_domain).collect()
}
