// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The inspection job aggregate and its lifecycle record.

use crate::job_status::JobStatus;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Red/amber/green finding counts captured during an inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RagCounts {
    pub red: i64,
    pub amber: i64,
    pub green: i64,
}

impl RagCounts {
    /// Total findings across all severities.
    #[must_use]
    pub const fn total(&self) -> i64 {
        self.red + self.amber + self.green
    }
}

/// The customer-portal access token issued when a job is sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicToken {
    /// 48 random characters, unguessable.
    pub value: String,
    pub expires_at: OffsetDateTime,
}

impl PublicToken {
    /// Returns true once the token can no longer be redeemed.
    #[must_use]
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        now >= self.expires_at
    }
}

/// One vehicle inspection visit.
///
/// A job owns its status, its assignment, its lifecycle timestamps (each
/// set once, the first time the matching status is reached), and the
/// public token governing customer access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectionJob {
    pub job_id: i64,
    pub site_id: i64,
    pub vehicle_registration: String,
    pub customer_name: String,
    pub status: JobStatus,
    /// The technician currently assigned, if any.
    pub technician_id: Option<i64>,
    pub advisor_id: Option<i64>,
    pub rag_counts: RagCounts,
    pub public_token: Option<PublicToken>,
    pub booked_for: Option<OffsetDateTime>,
    pub arrived_at: Option<OffsetDateTime>,
    pub checked_in_at: Option<OffsetDateTime>,
    pub assigned_at: Option<OffsetDateTime>,
    /// First clock-in; never moved by later clock-ins.
    pub technician_started_at: Option<OffsetDateTime>,
    pub tech_completed_at: Option<OffsetDateTime>,
    pub sent_at: Option<OffsetDateTime>,
    pub opened_at: Option<OffsetDateTime>,
    /// First customer decision on any item.
    pub first_response_at: Option<OffsetDateTime>,
    /// Every eligible item decided.
    pub fully_responded_at: Option<OffsetDateTime>,
    pub completed_at: Option<OffsetDateTime>,
    pub cancelled_at: Option<OffsetDateTime>,
    pub expired_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl InspectionJob {
    /// Creates a booked job awaiting vehicle arrival.
    #[must_use]
    pub fn new(
        job_id: i64,
        site_id: i64,
        vehicle_registration: &str,
        customer_name: &str,
        now: OffsetDateTime,
    ) -> Self {
        Self {
            job_id,
            site_id,
            vehicle_registration: vehicle_registration.to_string(),
            customer_name: customer_name.to_string(),
            status: JobStatus::AwaitingArrival,
            technician_id: None,
            advisor_id: None,
            rag_counts: RagCounts::default(),
            public_token: None,
            booked_for: None,
            arrived_at: None,
            checked_in_at: None,
            assigned_at: None,
            technician_started_at: None,
            tech_completed_at: None,
            sent_at: None,
            opened_at: None,
            first_response_at: None,
            fully_responded_at: None,
            completed_at: None,
            cancelled_at: None,
            expired_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns true when `technician_id` matches the assigned technician.
    #[must_use]
    pub fn is_assigned_to(&self, technician_id: i64) -> bool {
        self.technician_id == Some(technician_id)
    }

    /// Returns true when the job still has a live, unexpired token.
    #[must_use]
    pub fn has_live_token(&self, now: OffsetDateTime) -> bool {
        self.public_token
            .as_ref()
            .is_some_and(|token| !token.is_expired(now))
    }

    /// Stamps the lifecycle timestamp for `status`, first arrival only.
    ///
    /// Statuses without a dedicated timestamp (and repeat visits to the
    /// same status) leave the record untouched.
    pub fn stamp_status_timestamp(&mut self, status: JobStatus, now: OffsetDateTime) {
        let slot = match status {
            JobStatus::AwaitingCheckin => &mut self.arrived_at,
            JobStatus::Created => &mut self.checked_in_at,
            JobStatus::Assigned => &mut self.assigned_at,
            JobStatus::InProgress => &mut self.technician_started_at,
            JobStatus::TechCompleted => &mut self.tech_completed_at,
            JobStatus::Sent => &mut self.sent_at,
            JobStatus::Opened => &mut self.opened_at,
            JobStatus::Completed => &mut self.completed_at,
            JobStatus::Cancelled => &mut self.cancelled_at,
            JobStatus::Expired => &mut self.expired_at,
            _ => return,
        };
        if slot.is_none() {
            *slot = Some(now);
        }
    }
}
