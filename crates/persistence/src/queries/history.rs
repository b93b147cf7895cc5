// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Status history query operations.

use diesel::prelude::*;
use diesel::SqliteConnection;
use vhc_audit::StatusHistoryEntry;

use crate::data_models::HistoryRow;
use crate::diesel_schema::status_history;
use crate::error::PersistenceError;

/// All history entries for a job, oldest first.
///
/// # Errors
///
/// Returns an error if the query or row conversion fails.
pub fn history_for_job(
    conn: &mut SqliteConnection,
    job_id: i64,
) -> Result<Vec<StatusHistoryEntry>, PersistenceError> {
    let rows: Vec<HistoryRow> = status_history::table
        .filter(status_history::job_id.eq(job_id))
        .order(status_history::history_id.asc())
        .load(conn)?;
    rows.into_iter().map(HistoryRow::into_domain).collect()
}
