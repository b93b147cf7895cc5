// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Time entry mutation operations.
//!
//! The partial unique index on open entries backs up the application
//! logic: even racing clock-ins cannot leave two open entries for the
//! same (job, technician) pair.

use diesel::prelude::*;
use diesel::{Connection, SqliteConnection};
use vhc_domain::TimeEntry;

use crate::backend::sqlite::get_last_insert_rowid;
use crate::data_models::{NewTimeEntry, format_ts};
use crate::diesel_schema::time_entries;
use crate::error::PersistenceError;

/// Close an existing entry, recording its clock-out and duration.
///
/// # Errors
///
/// Returns `NotFound` if the entry does not exist.
pub fn close_entry(
    conn: &mut SqliteConnection,
    entry: &TimeEntry,
) -> Result<(), PersistenceError> {
    let clock_out = format_ts_required(entry)?;
    let updated = diesel::update(
        time_entries::table.filter(time_entries::entry_id.eq(entry.entry_id)),
    )
    .set((
        time_entries::clock_out_at.eq(Some(clock_out)),
        time_entries::duration_minutes.eq(entry.duration_minutes),
    ))
    .execute(conn)?;
    if updated == 0 {
        return Err(PersistenceError::NotFound(format!(
            "time entry {}",
            entry.entry_id
        )));
    }
    Ok(())
}

/// Record a clock-in: close the recovered stale entry (if any) and insert
/// the fresh open entry, atomically.
///
/// Returns the new entry's id.
///
/// # Errors
///
/// Returns an error if either write fails; a unique-index violation here
/// means a concurrent clock-in won.
pub fn record_clock_in(
    conn: &mut SqliteConnection,
    recovered: Option<&TimeEntry>,
    entry: &TimeEntry,
) -> Result<i64, PersistenceError> {
    let record = NewTimeEntry::from_domain(entry)?;
    let recovered_write = recovered
        .map(|stale| Ok::<_, PersistenceError>((stale.entry_id, format_ts_required(stale)?, stale.duration_minutes)))
        .transpose()?;

    conn.transaction::<i64, PersistenceError, _>(|conn| {
        if let Some((stale_id, clock_out, duration)) = recovered_write {
            diesel::update(time_entries::table.filter(time_entries::entry_id.eq(stale_id)))
                .set((
                    time_entries::clock_out_at.eq(Some(clock_out)),
                    time_entries::duration_minutes.eq(duration),
                ))
                .execute(conn)?;
        }
        diesel::insert_into(time_entries::table)
            .values(&record)
            .execute(conn)?;
        get_last_insert_rowid(conn)
    })
}

fn format_ts_required(entry: &TimeEntry) -> Result<String, PersistenceError> {
    let Some(clock_out) = entry.clock_out_at else {
        return Err(PersistenceError::Other(format!(
            "time entry {} has no clock-out to record",
            entry.entry_id
        )));
    };
    format_ts(clock_out)
}
