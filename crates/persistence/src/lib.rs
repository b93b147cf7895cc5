// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for the VHC inspection workflow.
//!
//! This crate stores jobs, their append-only status history, technician
//! time entries, repair items with their pricing lines, customer
//! decisions, and the audit log. It is built on Diesel over `SQLite`.
//!
//! ## Concurrency guarantees
//!
//! Two invariants are enforced here rather than in application code:
//!
//! - **Per-job serialization of status transitions** — the status commit
//!   is a single conditional update keyed on the previously-observed
//!   status, wrapped in one transaction with its history append. A losing
//!   concurrent writer gets `StaleStatus`.
//! - **Per-(job, technician) open-entry uniqueness** — a partial unique
//!   index over open time entries makes a double clock-in impossible even
//!   under racing requests.
//!
//! ## Testing Philosophy
//!
//! Standard tests run against unique shared in-memory `SQLite` databases,
//! named via an atomic counter for deterministic isolation.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

use diesel::SqliteConnection;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use time::OffsetDateTime;
use vhc_audit::{AuditRecord, StatusHistoryEntry};
use vhc_domain::{
    DecisionTally, InspectionJob, ItemProgressUpdate, JobStatus, LineCounts, RepairItem, TimeEntry,
};

/// Atomic counter for generating unique in-memory database names.
///
/// This ensures deterministic test isolation by eliminating time-based collisions.
/// Each call to `new_in_memory()` receives a unique sequential ID.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;

#[cfg(test)]
mod tests;

pub use data_models::{NewDecision, NewItem, NewLabourLine, NewPartsLine};
pub use error::PersistenceError;

use data_models::{NewAudit, format_ts};

/// Persistence adapter over a single `SQLite` connection.
pub struct Persistence {
    conn: SqliteConnection,
}

impl Persistence {
    /// Creates a new persistence adapter with an in-memory `SQLite` database.
    ///
    /// Each call receives a unique database instance via atomic counter,
    /// ensuring deterministic test isolation without time-based collisions.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        // Unique shared in-memory database name per call so tests are isolated.
        let db_id = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let db_name = format!("memdb_test_{db_id}");
        let shared_memory_url = format!("file:{db_name}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(&shared_memory_url)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Creates a new persistence adapter with a file-based `SQLite` database.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the `SQLite` database file
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(path_str)?;
        backend::sqlite::enable_wal_mode(&mut conn)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    pub fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        backend::sqlite::verify_foreign_key_enforcement(&mut self.conn)
    }

    // ========================================================================
    // Jobs & status history
    // ========================================================================

    /// Inserts a new job, returning its assigned id.
    ///
    /// # Errors
    ///
    /// Returns an error if persistence fails.
    pub fn create_job(&mut self, job: &InspectionJob) -> Result<i64, PersistenceError> {
        mutations::jobs::insert_job(&mut self.conn, job)
    }

    /// Fetches a job by id.
    ///
    /// # Errors
    ///
    /// Returns `JobNotFound` if no row exists.
    pub fn get_job(&mut self, job_id: i64) -> Result<InspectionJob, PersistenceError> {
        queries::jobs::get_job(&mut self.conn, job_id)
    }

    /// Fetches a job by its public token.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no job carries the token.
    pub fn get_job_by_token(&mut self, token: &str) -> Result<InspectionJob, PersistenceError> {
        queries::jobs::get_job_by_token(&mut self.conn, token)
    }

    /// Jobs whose public token has expired but which are not yet terminal.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn jobs_with_expired_tokens(
        &mut self,
        now: OffsetDateTime,
    ) -> Result<Vec<InspectionJob>, PersistenceError> {
        queries::jobs::jobs_with_expired_tokens(&mut self.conn, now)
    }

    /// Commits a status transition atomically: conditional job write plus
    /// history append.
    ///
    /// # Errors
    ///
    /// Returns `StaleStatus` when the job is no longer at `expected`.
    pub fn commit_transition(
        &mut self,
        job: &InspectionJob,
        expected: JobStatus,
        history: Option<&StatusHistoryEntry>,
    ) -> Result<(), PersistenceError> {
        mutations::jobs::commit_transition(&mut self.conn, job, expected, history)
    }

    /// Writes a job row unconditionally (non-status fields).
    ///
    /// # Errors
    ///
    /// Returns `JobNotFound` if the row does not exist.
    pub fn update_job(&mut self, job: &InspectionJob) -> Result<(), PersistenceError> {
        mutations::jobs::update_job(&mut self.conn, job)
    }

    /// Appends a history entry outside a status commit.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn append_history(
        &mut self,
        entry: &StatusHistoryEntry,
    ) -> Result<i64, PersistenceError> {
        mutations::jobs::append_history(&mut self.conn, entry)
    }

    /// All history entries for a job, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn history_for_job(
        &mut self,
        job_id: i64,
    ) -> Result<Vec<StatusHistoryEntry>, PersistenceError> {
        queries::history::history_for_job(&mut self.conn, job_id)
    }

    // ========================================================================
    // Time entries
    // ========================================================================

    /// Records a clock-in: closes the recovered stale entry (if any) and
    /// inserts the fresh open entry, atomically. Returns the new entry id.
    ///
    /// # Errors
    ///
    /// Returns an error if either write fails.
    pub fn record_clock_in(
        &mut self,
        recovered: Option<&TimeEntry>,
        entry: &TimeEntry,
    ) -> Result<i64, PersistenceError> {
        mutations::time::record_clock_in(&mut self.conn, recovered, entry)
    }

    /// Closes an open entry, recording clock-out and duration.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the entry does not exist.
    pub fn close_time_entry(&mut self, entry: &TimeEntry) -> Result<(), PersistenceError> {
        mutations::time::close_entry(&mut self.conn, entry)
    }

    /// The open entry for a (job, technician) pair, if one exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_open_entry(
        &mut self,
        job_id: i64,
        technician_id: i64,
    ) -> Result<Option<TimeEntry>, PersistenceError> {
        queries::time::find_open_entry(&mut self.conn, job_id, technician_id)
    }

    /// All time entries for a job, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn entries_for_job(&mut self, job_id: i64) -> Result<Vec<TimeEntry>, PersistenceError> {
        queries::time::entries_for_job(&mut self.conn, job_id)
    }

    // ========================================================================
    // Repair items & pricing lines
    // ========================================================================

    /// Inserts a fresh repair item, returning its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_item(
        &mut self,
        job_id: i64,
        parent_id: Option<i64>,
        name: &str,
    ) -> Result<i64, PersistenceError> {
        mutations::items::insert_item(&mut self.conn, &NewItem::new(job_id, parent_id, name))
    }

    /// Inserts a pricing option under an item, returning its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_option(
        &mut self,
        item_id: i64,
        name: &str,
        created_at: OffsetDateTime,
    ) -> Result<i64, PersistenceError> {
        let option = data_models::NewOption {
            item_id,
            name: name.to_string(),
            created_at: format_ts(created_at)?,
        };
        mutations::items::insert_option(&mut self.conn, &option)
    }

    /// Fetches an item by id.
    ///
    /// # Errors
    ///
    /// Returns `ItemNotFound` if no row exists.
    pub fn get_item(&mut self, item_id: i64) -> Result<RepairItem, PersistenceError> {
        queries::items::get_item(&mut self.conn, item_id)
    }

    /// All items for a job, including soft-deleted ones.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn items_for_job(&mut self, job_id: i64) -> Result<Vec<RepairItem>, PersistenceError> {
        queries::items::items_for_job(&mut self.conn, job_id)
    }

    /// Current line counts for an item, including its selected option.
    ///
    /// # Errors
    ///
    /// Returns an error if a count query fails.
    pub fn line_counts(&mut self, item: &RepairItem) -> Result<LineCounts, PersistenceError> {
        queries::items::line_counts(&mut self.conn, item)
    }

    /// Current labour/parts totals for an item in minor units.
    ///
    /// # Errors
    ///
    /// Returns an error if a sum query fails.
    pub fn line_totals(&mut self, item: &RepairItem) -> Result<(i64, i64), PersistenceError> {
        queries::items::line_totals(&mut self.conn, item)
    }

    /// Persists recomputed monetary totals for an item.
    ///
    /// # Errors
    ///
    /// Returns `ItemNotFound` if the row does not exist.
    pub fn update_item_totals(
        &mut self,
        item_id: i64,
        labour_total: i64,
        parts_total: i64,
    ) -> Result<(), PersistenceError> {
        mutations::items::update_item_totals(&mut self.conn, item_id, labour_total, parts_total)
    }

    /// Persists an aggregation verdict for one item.
    ///
    /// # Errors
    ///
    /// Returns `ItemNotFound` if the row does not exist.
    pub fn apply_progress_update(
        &mut self,
        item: &RepairItem,
        update: &ItemProgressUpdate,
    ) -> Result<(), PersistenceError> {
        mutations::items::apply_progress_update(&mut self.conn, item, update)
    }

    /// Explicitly marks the labour side complete.
    ///
    /// # Errors
    ///
    /// Returns `ItemNotFound` if the row does not exist.
    pub fn mark_labour_complete(
        &mut self,
        item_id: i64,
        completed_by: i64,
        completed_at: OffsetDateTime,
    ) -> Result<(), PersistenceError> {
        mutations::items::mark_labour_complete(&mut self.conn, item_id, completed_by, completed_at)
    }

    /// Explicitly marks the parts side complete.
    ///
    /// # Errors
    ///
    /// Returns `ItemNotFound` if the row does not exist.
    pub fn mark_parts_complete(
        &mut self,
        item_id: i64,
        completed_by: i64,
        completed_at: OffsetDateTime,
    ) -> Result<(), PersistenceError> {
        mutations::items::mark_parts_complete(&mut self.conn, item_id, completed_by, completed_at)
    }

    /// Sets or clears the "no labour needed" flag.
    ///
    /// # Errors
    ///
    /// Returns `ItemNotFound` if the row does not exist.
    pub fn set_no_labour_required(
        &mut self,
        item_id: i64,
        flag: bool,
        set_by: i64,
        set_at: OffsetDateTime,
    ) -> Result<(), PersistenceError> {
        mutations::items::set_no_labour_required(&mut self.conn, item_id, flag, set_by, set_at)
    }

    /// Sets or clears the "no parts needed" flag.
    ///
    /// # Errors
    ///
    /// Returns `ItemNotFound` if the row does not exist.
    pub fn set_no_parts_required(
        &mut self,
        item_id: i64,
        flag: bool,
        set_by: i64,
        set_at: OffsetDateTime,
    ) -> Result<(), PersistenceError> {
        mutations::items::set_no_parts_required(&mut self.conn, item_id, flag, set_by, set_at)
    }

    /// Records that an authorised item's work has been carried out.
    ///
    /// # Errors
    ///
    /// Returns `ItemNotFound` if the row does not exist.
    pub fn mark_work_complete(
        &mut self,
        item_id: i64,
        completed_at: OffsetDateTime,
    ) -> Result<(), PersistenceError> {
        mutations::items::mark_work_complete(&mut self.conn, item_id, completed_at)
    }

    /// Soft-deletes an item.
    ///
    /// # Errors
    ///
    /// Returns `ItemNotFound` if the row does not exist.
    pub fn soft_delete_item(&mut self, item_id: i64) -> Result<(), PersistenceError> {
        mutations::items::soft_delete_item(&mut self.conn, item_id)
    }

    /// Inserts a labour line against an item or a pricing option.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn add_labour_line(
        &mut self,
        item_id: Option<i64>,
        option_id: Option<i64>,
        description: &str,
        amount: i64,
        created_at: OffsetDateTime,
    ) -> Result<i64, PersistenceError> {
        let line = NewLabourLine {
            item_id,
            option_id,
            description: description.to_string(),
            amount,
            created_at: format_ts(created_at)?,
        };
        mutations::items::add_labour_line(&mut self.conn, &line)
    }

    /// Inserts a parts line against an item or a pricing option.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn add_parts_line(
        &mut self,
        item_id: Option<i64>,
        option_id: Option<i64>,
        description: &str,
        amount: i64,
        created_at: OffsetDateTime,
    ) -> Result<i64, PersistenceError> {
        let line = NewPartsLine {
            item_id,
            option_id,
            description: description.to_string(),
            amount,
            created_at: format_ts(created_at)?,
        };
        mutations::items::add_parts_line(&mut self.conn, &line)
    }

    /// Deletes a labour line.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn delete_labour_line(&mut self, labour_id: i64) -> Result<(), PersistenceError> {
        mutations::items::delete_labour_line(&mut self.conn, labour_id)
    }

    /// Deletes a parts line.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn delete_parts_line(&mut self, part_id: i64) -> Result<(), PersistenceError> {
        mutations::items::delete_parts_line(&mut self.conn, part_id)
    }

    // ========================================================================
    // Customer decisions
    // ========================================================================

    /// Records a customer decision: authoritative row plus the
    /// denormalized columns the aggregators read, atomically.
    ///
    /// # Errors
    ///
    /// Returns `DecisionExists` when the item already carries a decision.
    pub fn record_decision(
        &mut self,
        item_id: i64,
        approved: bool,
        selected_option_id: Option<i64>,
        reason: Option<&str>,
        decided_at: OffsetDateTime,
    ) -> Result<i64, PersistenceError> {
        use diesel::Connection;

        let decision = NewDecision {
            item_id,
            approved: i32::from(approved),
            selected_option_id,
            reason: reason.map(ToString::to_string),
            created_at: format_ts(decided_at)?,
        };
        self.conn.transaction::<i64, PersistenceError, _>(|conn| {
            let decision_id = mutations::decisions::insert_decision(conn, &decision)?;
            mutations::items::record_item_decision(conn, item_id, approved, selected_option_id)?;
            Ok(decision_id)
        })
    }

    /// Tallies decisions across a job's eligible items.
    ///
    /// # Errors
    ///
    /// Returns an error if a count query fails.
    pub fn decision_tally(&mut self, job_id: i64) -> Result<DecisionTally, PersistenceError> {
        queries::decisions::decision_tally(&mut self.conn, job_id)
    }

    // ========================================================================
    // Audit log
    // ========================================================================

    /// Appends a non-status audit record, returning its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn log_audit(&mut self, record: &AuditRecord) -> Result<i64, PersistenceError> {
        mutations::audit::insert_audit(&mut self.conn, &NewAudit::from_domain(record)?)
    }
}
