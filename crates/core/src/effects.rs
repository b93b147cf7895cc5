// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use time::OffsetDateTime;
use vhc_audit::AuditRecord;
use vhc_domain::JobStatus;

/// A side effect requested by a successful state change.
///
/// Effects are data: the core emits them, the orchestration layer
/// dispatches them after the state write commits. Dispatch is
/// at-least-once and fire-and-forget; a failed effect never rolls back
/// the transition that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Tell interested parties the job moved.
    NotifyStatusChanged {
        job_id: i64,
        from: JobStatus,
        to: JobStatus,
    },
    /// Tell interested parties a technician started working.
    NotifyTechnicianClockedIn { job_id: i64, technician_id: i64 },
    /// Tell interested parties a technician stopped working.
    NotifyTechnicianClockedOut {
        job_id: i64,
        technician_id: i64,
        duration_minutes: i64,
    },
    /// Tell staff the customer acted on the quote.
    NotifyCustomerAction {
        job_id: i64,
        action: String,
        /// Authorised value in minor units, where applicable.
        amount: i64,
    },
    /// Start the customer follow-up reminder schedule.
    ScheduleReminders {
        job_id: i64,
        sent_at: OffsetDateTime,
        expires_at: OffsetDateTime,
    },
    /// Stop any pending reminders for the job.
    CancelReminders { job_id: i64 },
    /// Ask the generator to build repair items from flagged findings.
    AutoGenerateRepairItems { job_id: i64 },
    /// Ask the generator to build checklist items at check-in.
    AutoCreateItemsFromFindings { job_id: i64 },
    /// Append a non-status audit record.
    LogAudit(AuditRecord),
}
