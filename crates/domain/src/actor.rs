// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Actor roles and capability guards for status transitions.
//!
//! Capability checks answer "may this role request this transition",
//! independent of whether the transition itself is reachable. They are
//! enforced by the core engine; any advisory projection for callers is
//! derived from the same rules.

use crate::error::DomainError;
use crate::job_status::JobStatus;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The role of an entity requesting a state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    /// Workshop technician performing the inspection.
    Technician,
    /// Service advisor managing the customer relationship.
    Advisor,
    /// Site or organization administrator.
    Admin,
    /// The customer-facing channel (portal access via public token).
    Customer,
    /// Internal system processes (sweeps, cascades).
    System,
}

impl ActorRole {
    /// Returns the string representation of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Technician => "technician",
            Self::Advisor => "advisor",
            Self::Admin => "admin",
            Self::Customer => "customer",
            Self::System => "system",
        }
    }

    /// Returns true for staff roles that may operate on jobs directly.
    #[must_use]
    pub const fn is_staff(&self) -> bool {
        matches!(self, Self::Technician | Self::Advisor | Self::Admin)
    }

    /// Returns true for roles permitted privileged overrides
    /// (cancel, skip check-in, close, mark no-show).
    #[must_use]
    pub const fn is_privileged(&self) -> bool {
        matches!(self, Self::Advisor | Self::Admin)
    }
}

impl FromStr for ActorRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "technician" => Ok(Self::Technician),
            "advisor" => Ok(Self::Advisor),
            "admin" => Ok(Self::Admin),
            "customer" => Ok(Self::Customer),
            "system" => Ok(Self::System),
            _ => Err(DomainError::InvalidStatus(format!("unknown role: {s}"))),
        }
    }
}

impl std::fmt::Display for ActorRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Validates that `role` may request the transition `from -> to`.
///
/// `is_assigned_technician` is true when the actor is the technician
/// currently assigned to the job; clock-driven transitions are restricted
/// to that technician (or an admin).
///
/// The `system` role passes every check: system transitions originate from
/// this crate's own cascades and the expiry sweep, never from an external
/// caller.
///
/// # Errors
///
/// Returns `DomainError::Forbidden` naming the attempted action and the
/// required role(s).
pub fn validate_capability(
    role: ActorRole,
    from: JobStatus,
    to: JobStatus,
    is_assigned_technician: bool,
) -> Result<(), DomainError> {
    if role == ActorRole::System {
        return Ok(());
    }

    let action = || format!("transition {from} -> {to}");

    match to {
        JobStatus::Expired => Err(DomainError::Forbidden {
            action: action(),
            required_role: "system".to_string(),
        }),
        JobStatus::InProgress | JobStatus::Paused | JobStatus::TechCompleted => {
            if role == ActorRole::Admin || (role == ActorRole::Technician && is_assigned_technician)
            {
                Ok(())
            } else {
                Err(DomainError::Forbidden {
                    action: action(),
                    required_role: "assigned technician or admin".to_string(),
                })
            }
        }
        JobStatus::Cancelled | JobStatus::NoShow | JobStatus::Completed => {
            if role.is_privileged() {
                Ok(())
            } else {
                Err(DomainError::Forbidden {
                    action: action(),
                    required_role: "advisor or admin".to_string(),
                })
            }
        }
        // Skipping check-in directly to created is privileged; check-in
        // completion arrives as a system transition.
        JobStatus::Created if from == JobStatus::AwaitingCheckin => {
            if role.is_privileged() {
                Ok(())
            } else {
                Err(DomainError::Forbidden {
                    action: action(),
                    required_role: "advisor or admin".to_string(),
                })
            }
        }
        JobStatus::Opened
        | JobStatus::PartialResponse
        | JobStatus::Authorized
        | JobStatus::Declined => {
            if role == ActorRole::Customer {
                Ok(())
            } else {
                Err(DomainError::Forbidden {
                    action: action(),
                    required_role: "customer channel or system".to_string(),
                })
            }
        }
        JobStatus::ReadyToSend | JobStatus::Sent => {
            if role.is_privileged() {
                Ok(())
            } else {
                Err(DomainError::Forbidden {
                    action: action(),
                    required_role: "advisor or admin".to_string(),
                })
            }
        }
        _ => {
            if role.is_staff() {
                Ok(())
            } else {
                Err(DomainError::Forbidden {
                    action: action(),
                    required_role: "staff".to_string(),
                })
            }
        }
    }
}
