// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Customer decision tallies.

use diesel::prelude::*;
use diesel::SqliteConnection;
use vhc_domain::DecisionTally;

use crate::diesel_schema::repair_items;
use crate::error::PersistenceError;

/// Tally the decisions across a job's eligible items.
///
/// Eligible items are top-level and not soft-deleted. The tally reads the
/// denormalized decision columns on the item rows, so re-running it with
/// no intervening decision yields the same counts.
///
/// # Errors
///
/// Returns an error if a count query fails.
pub fn decision_tally(
    conn: &mut SqliteConnection,
    job_id: i64,
) -> Result<DecisionTally, PersistenceError> {
    let eligible: i64 = repair_items::table
        .filter(repair_items::job_id.eq(job_id))
        .filter(repair_items::parent_id.is_null())
        .filter(repair_items::deleted.eq(0))
        .count()
        .get_result(conn)?;
    let decided: i64 = repair_items::table
        .filter(repair_items::job_id.eq(job_id))
        .filter(repair_items::parent_id.is_null())
        .filter(repair_items::deleted.eq(0))
        .filter(repair_items::customer_approved.is_not_null())
        .count()
        .get_result(conn)?;
    let approved: i64 = repair_items::table
        .filter(repair_items::job_id.eq(job_id))
        .filter(repair_items::parent_id.is_null())
        .filter(repair_items::deleted.eq(0))
        .filter(repair_items::customer_approved.eq(Some(1)))
        .count()
        .get_result(conn)?;

    let eligible = usize::try_from(eligible).unwrap_or(0);
    let decided = usize::try_from(decided).unwrap_or(0);
    let approved = usize::try_from(approved).unwrap_or(0);
    Ok(DecisionTally::new(
        eligible,
        decided,
        approved,
        decided.saturating_sub(approved),
    ))
}
