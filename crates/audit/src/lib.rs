// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use vhc_domain::{ActorRole, JobStatus};

/// Represents the entity performing an action.
///
/// An actor is any identifiable entity that initiates a state change:
/// a staff member, the customer channel, or an internal system process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// The staff/user identifier; `None` for system and anonymous
    /// customer-channel actors.
    pub id: Option<i64>,
    /// The actor's role at the time of the action.
    pub role: ActorRole,
}

impl Actor {
    /// Creates a new Actor.
    ///
    /// # Arguments
    ///
    /// * `id` - The user identifier, if any
    /// * `role` - The actor's role
    #[must_use]
    pub const fn new(id: Option<i64>, role: ActorRole) -> Self {
        Self { id, role }
    }

    /// The system actor used by sweeps and cascades.
    #[must_use]
    pub const fn system() -> Self {
        Self {
            id: None,
            role: ActorRole::System,
        }
    }

    /// A staff actor with a known user id.
    #[must_use]
    pub const fn staff(id: i64, role: ActorRole) -> Self {
        Self {
            id: Some(id),
            role,
        }
    }
}

/// How a state change was initiated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// A person asked for it (staff UI or customer portal).
    User,
    /// The system did it on its own (sweep, cascade, auto-transition).
    System,
}

impl Source {
    /// Returns the string representation of the source.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::System => "system",
        }
    }
}

/// One row of a job's immutable status history.
///
/// Every successful status change must produce exactly one entry. Entries
/// are append-only and capture who moved the job, from where to where,
/// why (optional note), and when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusHistoryEntry {
    /// The job whose status changed.
    pub job_id: i64,
    /// The status before the change; `None` for the creation entry.
    pub from_status: Option<JobStatus>,
    /// The status after the change. For recorded no-ops this equals
    /// `from_status`.
    pub to_status: JobStatus,
    /// Who initiated the change.
    pub actor: Actor,
    /// Whether a person or the system initiated it.
    pub source: Source,
    /// Free-text context (skip reason, no-op note, sweep marker).
    pub note: Option<String>,
    /// When the change happened.
    pub created_at: OffsetDateTime,
}

impl StatusHistoryEntry {
    /// Creates a new history entry.
    ///
    /// Once created, an entry is immutable.
    #[must_use]
    pub const fn new(
        job_id: i64,
        from_status: Option<JobStatus>,
        to_status: JobStatus,
        actor: Actor,
        source: Source,
        note: Option<String>,
        created_at: OffsetDateTime,
    ) -> Self {
        Self {
            job_id,
            from_status,
            to_status,
            actor,
            source,
            note,
            created_at,
        }
    }

    /// Returns true for entries recording a rejected/no-op request rather
    /// than an actual move.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.from_status == Some(self.to_status)
    }
}

/// A non-status audit record (decision recorded, item flagged, token
/// issued, time entry recovered).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// The name of the action (e.g., "`RecordDecision`", "`IssueToken`").
    pub action: String,
    /// Who performed it.
    pub actor: Actor,
    /// The kind of resource acted on (e.g., "job", "repair_item").
    pub resource_type: String,
    /// The acted-on resource's identifier.
    pub resource_id: i64,
    /// Optional structured detail, serialized as JSON at the edge.
    pub details: Option<String>,
    /// When the action happened.
    pub created_at: OffsetDateTime,
}

impl AuditRecord {
    /// Creates a new audit record.
    #[must_use]
    pub const fn new(
        action: String,
        actor: Actor,
        resource_type: String,
        resource_id: i64,
        details: Option<String>,
        created_at: OffsetDateTime,
    ) -> Self {
        Self {
            action,
            actor,
            resource_type,
            resource_id,
            details,
            created_at,
        }
    }
}
