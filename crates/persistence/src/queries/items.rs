// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Repair item query operations.

use diesel::prelude::*;
use diesel::SqliteConnection;
use vhc_domain::{LineCounts, RepairItem};

use crate::data_models::ItemRow;
use crate::diesel_schema::{repair_items, repair_labour, repair_parts};
use crate::error::PersistenceError;

/// Fetch an item by id.
///
/// # Errors
///
/// Returns `ItemNotFound` if no row exists.
pub fn get_item(conn: &mut SqliteConnection, item_id: i64) -> Result<RepairItem, PersistenceError> {
    let row: ItemRow = repair_items::table
        .filter(repair_items::item_id.eq(item_id))
        .first(conn)
        .optional()?
        .ok_or(PersistenceError::ItemNotFound(item_id))?;
    row.into_domain()
}

/// All items for a job, including soft-deleted ones; callers filter.
///
/// # Errors
///
/// Returns an error if the query or row conversion fails.
pub fn items_for_job(
    conn: &mut SqliteConnection,
    job_id: i64,
) -> Result<Vec<RepairItem>, PersistenceError> {
    let rows: Vec<ItemRow> = repair_items::table
        .filter(repair_items::job_id.eq(job_id))
        .order(repair_items::item_id.asc())
        .load(conn)?;
    rows.into_iter().map(ItemRow::into_domain).collect()
}

/// Current labour/parts line counts for an item, including lines attached
/// through its selected pricing option.
///
/// # Errors
///
/// Returns an error if a count query fails.
pub fn line_counts(
    conn: &mut SqliteConnection,
    item: &RepairItem,
) -> Result<LineCounts, PersistenceError> {
    let mut labour: i64 = repair_labour::table
        .filter(repair_labour::item_id.eq(Some(item.item_id)))
        .count()
        .get_result(conn)?;
    let mut parts: i64 = repair_parts::table
        .filter(repair_parts::item_id.eq(Some(item.item_id)))
        .count()
        .get_result(conn)?;

    if let Some(option_id) = item.selected_option_id {
        labour += repair_labour::table
            .filter(repair_labour::option_id.eq(Some(option_id)))
            .count()
            .get_result::<i64>(conn)?;
        parts += repair_parts::table
            .filter(repair_parts::option_id.eq(Some(option_id)))
            .count()
            .get_result::<i64>(conn)?;
    }

    Ok(LineCounts::new(
        usize::try_from(labour).unwrap_or(0),
        usize::try_from(parts).unwrap_or(0),
    ))
}

/// Current labour/parts totals for an item in minor units, including
/// lines attached through its selected pricing option.
///
/// Amounts are summed in Rust; SQLite's `SUM` widens to its numeric
/// affinity, which does not map back onto `BigInt`.
///
/// # Errors
///
/// Returns an error if a line query fails.
pub fn line_totals(
    conn: &mut SqliteConnection,
    item: &RepairItem,
) -> Result<(i64, i64), PersistenceError> {
    let mut labour: i64 = repair_labour::table
        .filter(repair_labour::item_id.eq(Some(item.item_id)))
        .select(repair_labour::amount)
        .load::<i64>(conn)?
        .into_iter()
        .sum();
    let mut parts: i64 = repair_parts::table
        .filter(repair_parts::item_id.eq(Some(item.item_id)))
        .select(repair_parts::amount)
        .load::<i64>(conn)?
        .into_iter()
        .sum();

    if let Some(option_id) = item.selected_option_id {
        labour += repair_labour::table
            .filter(repair_labour::option_id.eq(Some(option_id)))
            .select(repair_labour::amount)
            .load::<i64>(conn)?
            .into_iter()
            .sum::<i64>();
        parts += repair_parts::table
            .filter(repair_parts::option_id.eq(Some(option_id)))
            .select(repair_parts::amount)
            .load::<i64>(conn)?
            .into_iter()
            .sum::<i64>();
    }

    Ok((labour, parts))
}
