// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Inspection job status tracking and transition logic.
//!
//! This module defines the closed set of job statuses and the
//! allowed-transition table. The table is expressed as data
//! (`reachable()`), with two global rules layered on top: any
//! non-terminal job may be cancelled (privileged) or expired
//! (system sweep), and `completed` is reachable only through the
//! close gate, never via a plain transition request.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Status states tracking an inspection job through its lifecycle.
///
/// Status is tracked per job; one vehicle visit owns exactly one job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Vehicle is booked but has not arrived.
    AwaitingArrival,
    /// Vehicle arrived; check-in walkaround not yet complete.
    AwaitingCheckin,
    /// Vehicle never arrived.
    NoShow,
    /// Job created and ready for technician assignment.
    Created,
    /// A technician has been assigned but has not started.
    Assigned,
    /// The assigned technician is clocked in and inspecting.
    InProgress,
    /// Inspection paused (technician clocked out without completing).
    Paused,
    /// Technician finished the inspection.
    TechCompleted,
    /// Pricing has begun (first labour or parts line added).
    AwaitingPricing,
    /// Pricing complete; awaiting advisor review before sending.
    ReadyToSend,
    /// Sent to the customer.
    Sent,
    /// Customer opened the inspection results.
    Opened,
    /// Customer has decided on some, but not all, repair items.
    PartialResponse,
    /// Every item decided with at least one approval.
    Authorized,
    /// Every item decided, all declined.
    Declined,
    /// Public token expired before the customer fully responded.
    Expired,
    /// Job closed out by an advisor.
    Completed,
    /// Job cancelled by an advisor or admin.
    Cancelled,
}

impl JobStatus {
    /// Returns the string representation of the status.
    ///
    /// This is used for persistence and API serialization.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AwaitingArrival => "awaiting_arrival",
            Self::AwaitingCheckin => "awaiting_checkin",
            Self::NoShow => "no_show",
            Self::Created => "created",
            Self::Assigned => "assigned",
            Self::InProgress => "in_progress",
            Self::Paused => "paused",
            Self::TechCompleted => "tech_completed",
            Self::AwaitingPricing => "awaiting_pricing",
            Self::ReadyToSend => "ready_to_send",
            Self::Sent => "sent",
            Self::Opened => "opened",
            Self::PartialResponse => "partial_response",
            Self::Authorized => "authorized",
            Self::Declined => "declined",
            Self::Expired => "expired",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parses a status from its string representation.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidStatus` if the string is not a valid status.
    fn parse_str(s: &str) -> Result<Self, DomainError> {
        match s {
            "awaiting_arrival" => Ok(Self::AwaitingArrival),
            "awaiting_checkin" => Ok(Self::AwaitingCheckin),
            "no_show" => Ok(Self::NoShow),
            "created" => Ok(Self::Created),
            "assigned" => Ok(Self::Assigned),
            "in_progress" => Ok(Self::InProgress),
            "paused" => Ok(Self::Paused),
            "tech_completed" => Ok(Self::TechCompleted),
            "awaiting_pricing" => Ok(Self::AwaitingPricing),
            "ready_to_send" => Ok(Self::ReadyToSend),
            "sent" => Ok(Self::Sent),
            "opened" => Ok(Self::Opened),
            "partial_response" => Ok(Self::PartialResponse),
            "authorized" => Ok(Self::Authorized),
            "declined" => Ok(Self::Declined),
            "expired" => Ok(Self::Expired),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(DomainError::InvalidStatus(s.to_string())),
        }
    }

    /// Returns true if this status is terminal (no further transitions).
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::NoShow | Self::Expired | Self::Completed | Self::Cancelled
        )
    }

    /// Returns true if every eligible item has a recorded customer decision.
    ///
    /// Both statuses end the customer-facing phase and cancel pending
    /// reminders.
    #[must_use]
    pub const fn is_fully_responded(&self) -> bool {
        matches!(self, Self::Authorized | Self::Declined)
    }

    /// The statuses directly reachable from this one via the transition table.
    ///
    /// `cancelled` and `expired` are global rules (reachable from any
    /// non-terminal status) and are intentionally absent here; `completed`
    /// appears only for the fully-responded statuses because only the close
    /// gate produces it.
    #[must_use]
    pub const fn reachable(&self) -> &'static [Self] {
        match self {
            Self::AwaitingArrival => &[Self::AwaitingCheckin, Self::Created, Self::NoShow],
            Self::AwaitingCheckin => &[Self::Created],
            Self::Created => &[Self::Assigned],
            Self::Assigned => &[Self::InProgress, Self::TechCompleted, Self::Paused],
            Self::Paused => &[Self::InProgress, Self::TechCompleted],
            Self::InProgress => &[Self::TechCompleted, Self::Paused],
            Self::TechCompleted => &[Self::AwaitingPricing],
            Self::AwaitingPricing => &[Self::ReadyToSend],
            Self::ReadyToSend => &[Self::Sent],
            Self::Sent => &[Self::Opened],
            Self::Opened => &[Self::PartialResponse, Self::Authorized, Self::Declined],
            Self::PartialResponse => &[Self::Authorized, Self::Declined],
            Self::Authorized | Self::Declined => &[Self::Completed],
            Self::NoShow | Self::Expired | Self::Completed | Self::Cancelled => &[],
        }
    }

    /// Checks whether the transition table permits moving to `target`.
    ///
    /// Includes the global cancel/expire rules but not the close-gate
    /// restriction on `completed`; use [`Self::validate_transition`] for the
    /// full check.
    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        if self.is_terminal() {
            return false;
        }
        if matches!(target, Self::Cancelled | Self::Expired) {
            return true;
        }
        self.reachable().contains(&target)
    }

    /// Validates a requested transition against the allowed-transition table.
    ///
    /// This checks reachability only; capability checks against the acting
    /// role live in [`crate::actor::validate_capability`].
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTransition` if the transition is not
    /// permitted, including re-requesting the current status (callers decide
    /// whether a note-bearing no-op should still record history).
    pub fn validate_transition(&self, new_status: Self) -> Result<(), DomainError> {
        if *self == new_status {
            return Err(DomainError::InvalidTransition {
                from: self.as_str().to_string(),
                to: new_status.as_str().to_string(),
                reason: "already in requested status".to_string(),
            });
        }

        if self.is_terminal() {
            return Err(DomainError::InvalidTransition {
                from: self.as_str().to_string(),
                to: new_status.as_str().to_string(),
                reason: "cannot transition from terminal state".to_string(),
            });
        }

        if new_status == Self::Completed {
            // Only the close gate may complete a job; it performs its own
            // reachability check via can_transition_to.
            return Err(DomainError::InvalidTransition {
                from: self.as_str().to_string(),
                to: new_status.as_str().to_string(),
                reason: "jobs are completed through close-out, not a direct transition"
                    .to_string(),
            });
        }

        if self.can_transition_to(new_status) {
            Ok(())
        } else {
            Err(DomainError::InvalidTransition {
                from: self.as_str().to_string(),
                to: new_status.as_str().to_string(),
                reason: "transition not permitted by job lifecycle rules".to_string(),
            })
        }
    }

    /// All statuses, in lifecycle order. Used by exhaustiveness tests.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::AwaitingArrival,
            Self::AwaitingCheckin,
            Self::NoShow,
            Self::Created,
            Self::Assigned,
            Self::InProgress,
            Self::Paused,
            Self::TechCompleted,
            Self::AwaitingPricing,
            Self::ReadyToSend,
            Self::Sent,
            Self::Opened,
            Self::PartialResponse,
            Self::Authorized,
            Self::Declined,
            Self::Expired,
            Self::Completed,
            Self::Cancelled,
        ]
    }
}

impl FromStr for JobStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
