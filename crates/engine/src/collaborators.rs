// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! External collaborator traits.
//!
//! Message delivery, reminder scheduling, repair-item generation, and
//! external audit shipping live outside this workspace. The engine talks
//! to them through these traits, after the state write commits. Dispatch
//! is at-least-once and fire-and-forget: a returned error is logged and
//! swallowed, never surfaced to the caller.

use time::OffsetDateTime;
use vhc_audit::AuditRecord;
use vhc_domain::JobStatus;

/// Outbound notifications about job activity.
pub trait NotificationSink {
    /// The job moved from one status to another.
    ///
    /// # Errors
    ///
    /// Delivery failures; the engine logs and continues.
    fn status_changed(&mut self, job_id: i64, from: JobStatus, to: JobStatus)
    -> Result<(), String>;

    /// A technician started working on the job.
    ///
    /// # Errors
    ///
    /// Delivery failures; the engine logs and continues.
    fn technician_clocked_in(&mut self, job_id: i64, technician_id: i64) -> Result<(), String>;

    /// A technician stopped working on the job.
    ///
    /// # Errors
    ///
    /// Delivery failures; the engine logs and continues.
    fn technician_clocked_out(
        &mut self,
        job_id: i64,
        technician_id: i64,
        duration_minutes: i64,
    ) -> Result<(), String>;

    /// The customer acted on the quote.
    ///
    /// # Errors
    ///
    /// Delivery failures; the engine logs and continues.
    fn customer_action(&mut self, job_id: i64, action: &str, amount: i64) -> Result<(), String>;
}

/// The customer follow-up reminder schedule.
pub trait ReminderScheduler {
    /// Start the reminder schedule for a sent quote.
    ///
    /// # Errors
    ///
    /// Scheduling failures; the engine logs and continues.
    fn schedule(
        &mut self,
        job_id: i64,
        sent_at: OffsetDateTime,
        expires_at: OffsetDateTime,
    ) -> Result<(), String>;

    /// Stop any pending reminders for the job.
    ///
    /// # Errors
    ///
    /// Cancellation failures; the engine logs and continues.
    fn cancel(&mut self, job_id: i64) -> Result<(), String>;
}

/// Builds repair items from inspection findings.
pub trait RepairItemGenerator {
    /// Generate repair items from flagged findings when the inspection
    /// finishes.
    ///
    /// # Errors
    ///
    /// Generation failures; the engine logs and continues.
    fn auto_generate(&mut self, job_id: i64) -> Result<(), String>;

    /// Seed checklist items from flagged findings at check-in completion.
    ///
    /// # Errors
    ///
    /// Generation failures; the engine logs and continues.
    fn from_flagged_findings(&mut self, job_id: i64, site_id: i64) -> Result<(), String>;
}

/// Ships audit records to an external sink.
pub trait AuditSink {
    /// Record a non-status audit event.
    ///
    /// # Errors
    ///
    /// Shipping failures; the engine logs and continues.
    fn record(&mut self, record: &AuditRecord) -> Result<(), String>;
}

/// Production default: every notification is dropped silently.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotificationSink;

impl NotificationSink for NoopNotificationSink {
    fn status_changed(
        &mut self,
        _job_id: i64,
        _from: JobStatus,
        _to: JobStatus,
    ) -> Result<(), String> {
        Ok(())
    }

    fn technician_clocked_in(&mut self, _job_id: i64, _technician_id: i64) -> Result<(), String> {
        Ok(())
    }

    fn technician_clocked_out(
        &mut self,
        _job_id: i64,
        _technician_id: i64,
        _duration_minutes: i64,
    ) -> Result<(), String> {
        Ok(())
    }

    fn customer_action(&mut self, _job_id: i64, _action: &str, _amount: i64) -> Result<(), String> {
        Ok(())
    }
}

/// Production default: no reminders are scheduled.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReminderScheduler;

impl ReminderScheduler for NoopReminderScheduler {
    fn schedule(
        &mut self,
        _job_id: i64,
        _sent_at: OffsetDateTime,
        _expires_at: OffsetDateTime,
    ) -> Result<(), String> {
        Ok(())
    }

    fn cancel(&mut self, _job_id: i64) -> Result<(), String> {
        Ok(())
    }
}

/// Production default: no items are generated.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRepairItemGenerator;

impl RepairItemGenerator for NoopRepairItemGenerator {
    fn auto_generate(&mut self, _job_id: i64) -> Result<(), String> {
        Ok(())
    }

    fn from_flagged_findings(&mut self, _job_id: i64, _site_id: i64) -> Result<(), String> {
        Ok(())
    }
}

/// Production default: audit records stay in the local database only.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn record(&mut self, _record: &AuditRecord) -> Result<(), String> {
        Ok(())
    }
}
