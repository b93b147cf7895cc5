// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Repair item mutation operations: explicit flags, derived statuses,
//! and pricing lines.

use diesel::prelude::*;
use diesel::SqliteConnection;
use time::OffsetDateTime;
use vhc_domain::{ItemProgressUpdate, OutcomeStatus, RepairItem};

use crate::backend::sqlite::get_last_insert_rowid;
use crate::data_models::{NewItem, NewLabourLine, NewOption, NewPartsLine, format_ts};
use crate::diesel_schema::{repair_items, repair_labour, repair_options, repair_parts};
use crate::error::PersistenceError;

/// Insert a fresh repair item, returning its id.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_item(conn: &mut SqliteConnection, item: &NewItem) -> Result<i64, PersistenceError> {
    diesel::insert_into(repair_items::table)
        .values(item)
        .execute(conn)?;
    get_last_insert_rowid(conn)
}

/// Insert a pricing option under an item, returning its id.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_option(
    conn: &mut SqliteConnection,
    option: &NewOption,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(repair_options::table)
        .values(option)
        .execute(conn)?;
    get_last_insert_rowid(conn)
}

/// Persist an aggregation verdict for one item.
///
/// Writes the three derived statuses and clears completion actor/
/// timestamp columns the verdict asked to clear. Idempotent: writing the
/// same verdict twice leaves the row identical.
///
/// # Errors
///
/// Returns `ItemNotFound` if the row does not exist.
pub fn apply_progress_update(
    conn: &mut SqliteConnection,
    item: &RepairItem,
    update: &ItemProgressUpdate,
) -> Result<(), PersistenceError> {
    let (labour_by, labour_at) = if update.clear_labour_completion {
        (None, None)
    } else {
        (
            item.labour_completed_by,
            item.labour_completed_at.map(format_ts).transpose()?,
        )
    };
    let (parts_by, parts_at) = if update.clear_parts_completion {
        (None, None)
    } else {
        (
            item.parts_completed_by,
            item.parts_completed_at.map(format_ts).transpose()?,
        )
    };

    let updated = diesel::update(
        repair_items::table.filter(repair_items::item_id.eq(item.item_id)),
    )
    .set((
        repair_items::labour_status.eq(update.labour_status.as_str()),
        repair_items::parts_status.eq(update.parts_status.as_str()),
        repair_items::quote_status.eq(update.quote_status.as_str()),
        repair_items::labour_completed_by.eq(labour_by),
        repair_items::labour_completed_at.eq(labour_at),
        repair_items::parts_completed_by.eq(parts_by),
        repair_items::parts_completed_at.eq(parts_at),
    ))
    .execute(conn)?;
    if updated == 0 {
        return Err(PersistenceError::ItemNotFound(item.item_id));
    }
    Ok(())
}

/// Persist recomputed monetary totals for an item.
///
/// # Errors
///
/// Returns `ItemNotFound` if the row does not exist.
pub fn update_item_totals(
    conn: &mut SqliteConnection,
    item_id: i64,
    labour_total: i64,
    parts_total: i64,
) -> Result<(), PersistenceError> {
    let updated = diesel::update(repair_items::table.filter(repair_items::item_id.eq(item_id)))
        .set((
            repair_items::labour_total.eq(labour_total),
            repair_items::parts_total.eq(parts_total),
        ))
        .execute(conn)?;
    if updated == 0 {
        return Err(PersistenceError::ItemNotFound(item_id));
    }
    Ok(())
}

/// Explicitly mark the labour side complete, recording who and when.
///
/// # Errors
///
/// Returns `ItemNotFound` if the row does not exist.
pub fn mark_labour_complete(
    conn: &mut SqliteConnection,
    item_id: i64,
    completed_by: i64,
    completed_at: OffsetDateTime,
) -> Result<(), PersistenceError> {
    let at = format_ts(completed_at)?;
    let updated = diesel::update(repair_items::table.filter(repair_items::item_id.eq(item_id)))
        .set((
            repair_items::labour_status.eq("complete"),
            repair_items::labour_completed_by.eq(Some(completed_by)),
            repair_items::labour_completed_at.eq(Some(at)),
        ))
        .execute(conn)?;
    if updated == 0 {
        return Err(PersistenceError::ItemNotFound(item_id));
    }
    Ok(())
}

/// Explicitly mark the parts side complete, recording who and when.
///
/// # Errors
///
/// Returns `ItemNotFound` if the row does not exist.
pub fn mark_parts_complete(
    conn: &mut SqliteConnection,
    item_id: i64,
    completed_by: i64,
    completed_at: OffsetDateTime,
) -> Result<(), PersistenceError> {
    let at = format_ts(completed_at)?;
    let updated = diesel::update(repair_items::table.filter(repair_items::item_id.eq(item_id)))
        .set((
            repair_items::parts_status.eq("complete"),
            repair_items::parts_completed_by.eq(Some(completed_by)),
            repair_items::parts_completed_at.eq(Some(at)),
        ))
        .execute(conn)?;
    if updated == 0 {
        return Err(PersistenceError::ItemNotFound(item_id));
    }
    Ok(())
}

/// Set or clear the "no labour needed" flag.
///
/// # Errors
///
/// Returns `ItemNotFound` if the row does not exist.
pub fn set_no_labour_required(
    conn: &mut SqliteConnection,
    item_id: i64,
    flag: bool,
    set_by: i64,
    set_at: OffsetDateTime,
) -> Result<(), PersistenceError> {
    let (by, at) = if flag {
        (Some(set_by), Some(format_ts(set_at)?))
    } else {
        (None, None)
    };
    let updated = diesel::update(repair_items::table.filter(repair_items::item_id.eq(item_id)))
        .set((
            repair_items::no_labour_required.eq(i32::from(flag)),
            repair_items::no_labour_required_by.eq(by),
            repair_items::no_labour_required_at.eq(at),
        ))
        .execute(conn)?;
    if updated == 0 {
        return Err(PersistenceError::ItemNotFound(item_id));
    }
    Ok(())
}

/// Set or clear the "no parts needed" flag.
///
/// # Errors
///
/// Returns `ItemNotFound` if the row does not exist.
pub fn set_no_parts_required(
    conn: &mut SqliteConnection,
    item_id: i64,
    flag: bool,
    set_by: i64,
    set_at: OffsetDateTime,
) -> Result<(), PersistenceError> {
    let (by, at) = if flag {
        (Some(set_by), Some(format_ts(set_at)?))
    } else {
        (None, None)
    };
    let updated = diesel::update(repair_items::table.filter(repair_items::item_id.eq(item_id)))
        .set((
            repair_items::no_parts_required.eq(i32::from(flag)),
            repair_items::no_parts_required_by.eq(by),
            repair_items::no_parts_required_at.eq(at),
        ))
        .execute(conn)?;
    if updated == 0 {
        return Err(PersistenceError::ItemNotFound(item_id));
    }
    Ok(())
}

/// Record that an authorised item's work has been carried out.
///
/// # Errors
///
/// Returns `ItemNotFound` if the row does not exist.
pub fn mark_work_complete(
    conn: &mut SqliteConnection,
    item_id: i64,
    completed_at: OffsetDateTime,
) -> Result<(), PersistenceError> {
    let at = format_ts(completed_at)?;
    let updated = diesel::update(repair_items::table.filter(repair_items::item_id.eq(item_id)))
        .set(repair_items::work_completed_at.eq(Some(at)))
        .execute(conn)?;
    if updated == 0 {
        return Err(PersistenceError::ItemNotFound(item_id));
    }
    Ok(())
}

/// Write a customer decision onto the item row itself.
///
/// The `customer_decisions` table keeps the authoritative record; this
/// denormalization is what the aggregators read.
///
/// # Errors
///
/// Returns `ItemNotFound` if the row does not exist.
pub fn record_item_decision(
    conn: &mut SqliteConnection,
    item_id: i64,
    approved: bool,
    selected_option_id: Option<i64>,
) -> Result<(), PersistenceError> {
    let outcome = if approved {
        OutcomeStatus::Authorised
    } else {
        OutcomeStatus::Declined
    };
    let updated = diesel::update(repair_items::table.filter(repair_items::item_id.eq(item_id)))
        .set((
            repair_items::customer_approved.eq(Some(i32::from(approved))),
            repair_items::selected_option_id.eq(selected_option_id),
            repair_items::outcome_status.eq(Some(outcome.as_str())),
        ))
        .execute(conn)?;
    if updated == 0 {
        return Err(PersistenceError::ItemNotFound(item_id));
    }
    Ok(())
}

/// Soft-delete an item, hiding it from aggregation and closure.
///
/// # Errors
///
/// Returns `ItemNotFound` if the row does not exist.
pub fn soft_delete_item(conn: &mut SqliteConnection, item_id: i64) -> Result<(), PersistenceError> {
    let updated = diesel::update(repair_items::table.filter(repair_items::item_id.eq(item_id)))
        .set((
            repair_items::deleted.eq(1),
            repair_items::outcome_status.eq(Some("deleted")),
        ))
        .execute(conn)?;
    if updated == 0 {
        return Err(PersistenceError::ItemNotFound(item_id));
    }
    Ok(())
}

/// Insert a labour line, returning its id.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn add_labour_line(
    conn: &mut SqliteConnection,
    line: &NewLabourLine,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(repair_labour::table)
        .values(line)
        .execute(conn)?;
    get_last_insert_rowid(conn)
}

/// Insert a parts line, returning its id.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn add_parts_line(
    conn: &mut SqliteConnection,
    line: &NewPartsLine,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(repair_parts::table)
        .values(line)
        .execute(conn)?;
    get_last_insert_rowid(conn)
}

/// Delete a labour line.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub fn delete_labour_line(
    conn: &mut SqliteConnection,
    labour_id: i64,
) -> Result<(), PersistenceError> {
    diesel::delete(repair_labour::table.filter(repair_labour::labour_id.eq(labour_id)))
        .execute(conn)?;
    Ok(())
}

/// Delete a parts line.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub fn delete_parts_line(
    conn: &mut SqliteConnection,
    part_id: i64,
) -> Result<(), PersistenceError> {
    diesel::delete(repair_parts::table.filter(repair_parts::part_id.eq(part_id)))
        .execute(conn)?;
    Ok(())
}
