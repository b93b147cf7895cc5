// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Row structs and conversions between stored rows and domain types.
//!
//! Timestamps are stored as ISO 8601 text; enums are stored as their
//! canonical string forms and re-parsed on read, so a corrupted row
//! surfaces as a `SerializationError` instead of a silent default.

use diesel::prelude::*;
use time::OffsetDateTime;
use time::format_description::well_known::Iso8601;
use vhc_audit::{Actor, AuditRecord, Source, StatusHistoryEntry};
use vhc_domain::{
    ActorRole, InspectionJob, JobStatus, OutcomeStatus, ProgressStatus, PublicToken, QuoteStatus,
    RagCounts, RepairItem, TimeEntry,
};

use crate::diesel_schema::{
    audit_log, customer_decisions, inspection_jobs, repair_items, repair_labour, repair_options,
    repair_parts, status_history, time_entries,
};
use crate::error::PersistenceError;

pub(crate) fn format_ts(ts: OffsetDateTime) -> Result<String, PersistenceError> {
    Ok(ts.format(&Iso8601::DEFAULT)?)
}

pub(crate) fn format_ts_opt(ts: Option<OffsetDateTime>) -> Result<Option<String>, PersistenceError> {
    ts.map(format_ts).transpose()
}

pub(crate) fn parse_ts(s: &str) -> Result<OffsetDateTime, PersistenceError> {
    Ok(OffsetDateTime::parse(s, &Iso8601::DEFAULT)?)
}

pub(crate) fn parse_ts_opt(s: Option<&str>) -> Result<Option<OffsetDateTime>, PersistenceError> {
    s.map(parse_ts).transpose()
}

fn parse_status(s: &str) -> Result<JobStatus, PersistenceError> {
    s.parse()
        .map_err(|e: vhc_domain::DomainError| PersistenceError::SerializationError(e.to_string()))
}

fn parse_role(s: &str) -> Result<ActorRole, PersistenceError> {
    s.parse()
        .map_err(|e: vhc_domain::DomainError| PersistenceError::SerializationError(e.to_string()))
}

fn parse_progress(s: &str) -> Result<ProgressStatus, PersistenceError> {
    s.parse()
        .map_err(|e: vhc_domain::DomainError| PersistenceError::SerializationError(e.to_string()))
}

/// A stored inspection job.
#[derive(Debug, Clone, Queryable)]
#[diesel(table_name = inspection_jobs)]
pub struct JobRow {
    pub job_id: i64,
    pub site_id: i64,
    pub vehicle_registration: String,
    pub customer_name: String,
    pub status: String,
    pub technician_id: Option<i64>,
    pub advisor_id: Option<i64>,
    pub red_count: i64,
    pub amber_count: i64,
    pub green_count: i64,
    pub public_token: Option<String>,
    pub token_expires_at: Option<String>,
    pub booked_for: Option<String>,
    pub arrived_at: Option<String>,
    pub checked_in_at: Option<String>,
    pub assigned_at: Option<String>,
    pub technician_started_at: Option<String>,
    pub tech_completed_at: Option<String>,
    pub sent_at: Option<String>,
    pub opened_at: Option<String>,
    pub first_response_at: Option<String>,
    pub fully_responded_at: Option<String>,
    pub completed_at: Option<String>,
    pub cancelled_at: Option<String>,
    pub expired_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl JobRow {
    /// Converts the stored row into the domain aggregate.
    ///
    /// # Errors
    ///
    /// Returns a `SerializationError` if a stored status or timestamp
    /// cannot be parsed.
    pub fn into_domain(self) -> Result<InspectionJob, PersistenceError> {
        let public_token = match (self.public_token, self.token_expires_at.as_deref()) {
            (Some(value), Some(expires)) => Some(PublicToken {
                value,
                expires_at: parse_ts(expires)?,
            }),
            _ => None,
        };
        Ok(InspectionJob {
            job_id: self.job_id,
            site_id: self.site_id,
            vehicle_registration: self.vehicle_registration,
            customer_name: self.customer_name,
            status: parse_status(&self.status)?,
            technician_id: self.technician_id,
            advisor_id: self.advisor_id,
            rag_counts: RagCounts {
                red: self.red_count,
                amber: self.amber_count,
                green: self.green_count,
            },
            public_token,
            booked_for: parse_ts_opt(self.booked_for.as_deref())?,
            arrived_at: parse_ts_opt(self.arrived_at.as_deref())?,
            checked_in_at: parse_ts_opt(self.checked_in_at.as_deref())?,
            assigned_at: parse_ts_opt(self.assigned_at.as_deref())?,
            technician_started_at: parse_ts_opt(self.technician_started_at.as_deref())?,
            tech_completed_at: parse_ts_opt(self.tech_completed_at.as_deref())?,
            sent_at: parse_ts_opt(self.sent_at.as_deref())?,
            opened_at: parse_ts_opt(self.opened_at.as_deref())?,
            first_response_at: parse_ts_opt(self.first_response_at.as_deref())?,
            fully_responded_at: parse_ts_opt(self.fully_responded_at.as_deref())?,
            completed_at: parse_ts_opt(self.completed_at.as_deref())?,
            cancelled_at: parse_ts_opt(self.cancelled_at.as_deref())?,
            expired_at: parse_ts_opt(self.expired_at.as_deref())?,
            created_at: parse_ts(&self.created_at)?,
            updated_at: parse_ts(&self.updated_at)?,
        })
    }
}

/// Insertable form of an inspection job.
///
/// Also used as a full-row changeset for the conditional status commit;
/// `treat_none_as_null` keeps the write faithful to the domain value.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = inspection_jobs, treat_none_as_null = true)]
pub struct JobRecord {
    pub site_id: i64,
    pub vehicle_registration: String,
    pub customer_name: String,
    pub status: String,
    pub technician_id: Option<i64>,
    pub advisor_id: Option<i64>,
    pub red_count: i64,
    pub amber_count: i64,
    pub green_count: i64,
    pub public_token: Option<String>,
    pub token_expires_at: Option<String>,
    pub booked_for: Option<String>,
    pub arrived_at: Option<String>,
    pub checked_in_at: Option<String>,
    pub assigned_at: Option<String>,
    pub technician_started_at: Option<String>,
    pub tech_completed_at: Option<String>,
    pub sent_at: Option<String>,
    pub opened_at: Option<String>,
    pub first_response_at: Option<String>,
    pub fully_responded_at: Option<String>,
    pub completed_at: Option<String>,
    pub cancelled_at: Option<String>,
    pub expired_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl JobRecord {
    /// Builds the storable form of a domain job.
    ///
    /// # Errors
    ///
    /// Returns a `SerializationError` if a timestamp cannot be formatted.
    pub fn from_domain(job: &InspectionJob) -> Result<Self, PersistenceError> {
        let (public_token, token_expires_at) = match &job.public_token {
            Some(token) => (Some(token.value.clone()), Some(format_ts(token.expires_at)?)),
            None => (None, None),
        };
        Ok(Self {
            site_id: job.site_id,
            vehicle_registration: job.vehicle_registration.clone(),
            customer_name: job.customer_name.clone(),
            status: job.status.as_str().to_string(),
            technician_id: job.technician_id,
            advisor_id: job.advisor_id,
            red_count: job.rag_counts.red,
            amber_count: job.rag_counts.amber,
            green_count: job.rag_counts.green,
            public_token,
            token_expires_at,
            booked_for: format_ts_opt(job.booked_for)?,
            arrived_at: format_ts_opt(job.arrived_at)?,
            checked_in_at: format_ts_opt(job.checked_in_at)?,
            assigned_at: format_ts_opt(job.assigned_at)?,
            technician_started_at: format_ts_opt(job.technician_started_at)?,
            tech_completed_at: format_ts_opt(job.tech_completed_at)?,
            sent_at: format_ts_opt(job.sent_at)?,
            opened_at: format_ts_opt(job.opened_at)?,
            first_response_at: format_ts_opt(job.first_response_at)?,
            fully_responded_at: format_ts_opt(job.fully_responded_at)?,
            completed_at: format_ts_opt(job.completed_at)?,
            cancelled_at: format_ts_opt(job.cancelled_at)?,
            expired_at: format_ts_opt(job.expired_at)?,
            created_at: format_ts(job.created_at)?,
            updated_at: format_ts(job.updated_at)?,
        })
    }
}

/// A stored status history entry.
#[derive(Debug, Clone, Queryable)]
#[diesel(table_name = status_history)]
pub struct HistoryRow {
    pub history_id: i64,
    pub job_id: i64,
    pub from_status: Option<String>,
    pub to_status: String,
    pub actor_id: Option<i64>,
    pub actor_role: String,
    pub source: String,
    pub note: Option<String>,
    pub created_at: String,
}

impl HistoryRow {
    /// Converts the stored row into the audit type.
    ///
    /// # Errors
    ///
    /// Returns a `SerializationError` on unparseable stored data.
    pub fn into_domain(self) -> Result<StatusHistoryEntry, PersistenceError> {
        let source = match self.source.as_str() {
            "user" => Source::User,
            "system" => Source::System,
            other => {
                return Err(PersistenceError::SerializationError(format!(
                    "unknown history source: {other}"
                )));
            }
        };
        Ok(StatusHistoryEntry {
            job_id: self.job_id,
            from_status: self.from_status.as_deref().map(parse_status).transpose()?,
            to_status: parse_status(&self.to_status)?,
            actor: Actor::new(self.actor_id, parse_role(&self.actor_role)?),
            source,
            note: self.note,
            created_at: parse_ts(&self.created_at)?,
        })
    }
}

/// Insertable form of a status history entry.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = status_history)]
pub struct NewHistory {
    pub job_id: i64,
    pub from_status: Option<String>,
    pub to_status: String,
    pub actor_id: Option<i64>,
    pub actor_role: String,
    pub source: String,
    pub note: Option<String>,
    pub created_at: String,
}

impl NewHistory {
    /// Builds the storable form of a history entry.
    ///
    /// # Errors
    ///
    /// Returns a `SerializationError` if the timestamp cannot be formatted.
    pub fn from_domain(entry: &StatusHistoryEntry) -> Result<Self, PersistenceError> {
        Ok(Self {
            job_id: entry.job_id,
            from_status: entry.from_status.map(|s| s.as_str().to_string()),
            to_status: entry.to_status.as_str().to_string(),
            actor_id: entry.actor.id,
            actor_role: entry.actor.role.as_str().to_string(),
            source: entry.source.as_str().to_string(),
            note: entry.note.clone(),
            created_at: format_ts(entry.created_at)?,
        })
    }
}

/// A stored time entry.
#[derive(Debug, Clone, Queryable)]
#[diesel(table_name = time_entries)]
pub struct TimeEntryRow {
    pub entry_id: i64,
    pub job_id: i64,
    pub technician_id: i64,
    pub clock_in_at: String,
    pub clock_out_at: Option<String>,
    pub duration_minutes: Option<i64>,
}

impl TimeEntryRow {
    /// Converts the stored row into the domain type.
    ///
    /// # Errors
    ///
    /// Returns a `SerializationError` on unparseable stored timestamps.
    pub fn into_domain(self) -> Result<TimeEntry, PersistenceError> {
        Ok(TimeEntry {
            entry_id: self.entry_id,
            job_id: self.job_id,
            technician_id: self.technician_id,
            clock_in_at: parse_ts(&self.clock_in_at)?,
            clock_out_at: parse_ts_opt(self.clock_out_at.as_deref())?,
            duration_minutes: self.duration_minutes,
        })
    }
}

/// Insertable form of a time entry.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = time_entries)]
pub struct NewTimeEntry {
    pub job_id: i64,
    pub technician_id: i64,
    pub clock_in_at: String,
    pub clock_out_at: Option<String>,
    pub duration_minutes: Option<i64>,
}

impl NewTimeEntry {
    /// Builds the storable form of a time entry.
    ///
    /// # Errors
    ///
    /// Returns a `SerializationError` if a timestamp cannot be formatted.
    pub fn from_domain(entry: &TimeEntry) -> Result<Self, PersistenceError> {
        Ok(Self {
            job_id: entry.job_id,
            technician_id: entry.technician_id,
            clock_in_at: format_ts(entry.clock_in_at)?,
            clock_out_at: format_ts_opt(entry.clock_out_at)?,
            duration_minutes: entry.duration_minutes,
        })
    }
}

/// A stored repair item.
#[derive(Debug, Clone, Queryable)]
#[diesel(table_name = repair_items)]
pub struct ItemRow {
    pub item_id: i64,
    pub job_id: i64,
    pub parent_id: Option<i64>,
    pub name: String,
    pub labour_status: String,
    pub parts_status: String,
    pub quote_status: String,
    pub outcome_status: Option<String>,
    pub no_labour_required: i32,
    pub no_labour_required_by: Option<i64>,
    pub no_labour_required_at: Option<String>,
    pub no_parts_required: i32,
    pub no_parts_required_by: Option<i64>,
    pub no_parts_required_at: Option<String>,
    pub labour_completed_by: Option<i64>,
    pub labour_completed_at: Option<String>,
    pub parts_completed_by: Option<i64>,
    pub parts_completed_at: Option<String>,
    pub work_completed_at: Option<String>,
    pub customer_approved: Option<i32>,
    pub selected_option_id: Option<i64>,
    pub labour_total: i64,
    pub parts_total: i64,
    pub deleted: i32,
}

impl ItemRow {
    /// Converts the stored row into the domain type.
    ///
    /// # Errors
    ///
    /// Returns a `SerializationError` on unparseable stored data.
    pub fn into_domain(self) -> Result<RepairItem, PersistenceError> {
        let quote_status: QuoteStatus = self.quote_status.parse().map_err(
            |e: vhc_domain::DomainError| PersistenceError::SerializationError(e.to_string()),
        )?;
        let outcome_status: Option<OutcomeStatus> = self
            .outcome_status
            .as_deref()
            .map(str::parse)
            .transpose()
            .map_err(|e: vhc_domain::DomainError| {
                PersistenceError::SerializationError(e.to_string())
            })?;
        Ok(RepairItem {
            item_id: self.item_id,
            job_id: self.job_id,
            parent_id: self.parent_id,
            name: self.name,
            labour_status: parse_progress(&self.labour_status)?,
            parts_status: parse_progress(&self.parts_status)?,
            quote_status,
            outcome_status,
            no_labour_required: self.no_labour_required != 0,
            no_labour_required_by: self.no_labour_required_by,
            no_labour_required_at: parse_ts_opt(self.no_labour_required_at.as_deref())?,
            no_parts_required: self.no_parts_required != 0,
            no_parts_required_by: self.no_parts_required_by,
            no_parts_required_at: parse_ts_opt(self.no_parts_required_at.as_deref())?,
            labour_completed_by: self.labour_completed_by,
            labour_completed_at: parse_ts_opt(self.labour_completed_at.as_deref())?,
            parts_completed_by: self.parts_completed_by,
            parts_completed_at: parse_ts_opt(self.parts_completed_at.as_deref())?,
            work_completed_at: parse_ts_opt(self.work_completed_at.as_deref())?,
            customer_approved: self.customer_approved.map(|v| v != 0),
            selected_option_id: self.selected_option_id,
            labour_total: self.labour_total,
            parts_total: self.parts_total,
            deleted: self.deleted != 0,
        })
    }
}

/// Insertable form of a fresh repair item.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = repair_items)]
pub struct NewItem {
    pub job_id: i64,
    pub parent_id: Option<i64>,
    pub name: String,
    pub labour_status: String,
    pub parts_status: String,
    pub quote_status: String,
}

impl NewItem {
    /// A fresh, unpriced item.
    #[must_use]
    pub fn new(job_id: i64, parent_id: Option<i64>, name: &str) -> Self {
        Self {
            job_id,
            parent_id,
            name: name.to_string(),
            labour_status: ProgressStatus::Pending.as_str().to_string(),
            parts_status: ProgressStatus::Pending.as_str().to_string(),
            quote_status: QuoteStatus::Pending.as_str().to_string(),
        }
    }
}

/// Insertable pricing option.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = repair_options)]
pub struct NewOption {
    pub item_id: i64,
    pub name: String,
    pub created_at: String,
}

/// Insertable customer decision.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = customer_decisions)]
pub struct NewDecision {
    pub item_id: i64,
    pub approved: i32,
    pub selected_option_id: Option<i64>,
    pub reason: Option<String>,
    pub created_at: String,
}

/// Insertable labour line.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = repair_labour)]
pub struct NewLabourLine {
    pub item_id: Option<i64>,
    pub option_id: Option<i64>,
    pub description: String,
    pub amount: i64,
    pub created_at: String,
}

/// Insertable parts line.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = repair_parts)]
pub struct NewPartsLine {
    pub item_id: Option<i64>,
    pub option_id: Option<i64>,
    pub description: String,
    pub amount: i64,
    pub created_at: String,
}

/// Insertable audit record.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = audit_log)]
pub struct NewAudit {
    pub action: String,
    pub actor_id: Option<i64>,
    pub actor_role: String,
    pub resource_type: String,
    pub resource_id: i64,
    pub details: Option<String>,
    pub created_at: String,
}

impl NewAudit {
    /// Builds the storable form of an audit record.
    ///
    /// # Errors
    ///
    /// Returns a `SerializationError` if the timestamp cannot be formatted.
    pub fn from_domain(record: &AuditRecord) -> Result<Self, PersistenceError> {
        Ok(Self {
            action: record.action.clone(),
            actor_id: record.actor.id,
            actor_role: record.actor.role.as_str().to_string(),
            resource_type: record.resource_type.clone(),
            resource_id: record.resource_id,
            details: record.details.clone(),
            created_at: format_ts(record.created_at)?,
        })
    }
}
