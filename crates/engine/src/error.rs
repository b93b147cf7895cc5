// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Caller-facing error type for the workflow engine.
//!
//! Domain and persistence errors are translated here so callers see one
//! taxonomy. A lost conditional update surfaces as a precondition
//! failure, not a database error: from the caller's point of view the
//! job simply moved underneath them.

use vhc_core::CoreError;
use vhc_domain::DomainError;
use vhc_persistence::PersistenceError;

/// Errors surfaced by engine operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The actor lacks the capability for this operation.
    Forbidden {
        /// The action that was attempted.
        action: String,
        /// The role(s) required for this action.
        required_role: String,
    },
    /// The requested status is not reachable from the current status.
    InvalidTransition {
        /// The current status.
        from: String,
        /// The requested status.
        to: String,
        /// Why the transition was rejected.
        reason: String,
    },
    /// A state-specific guard failed, or a concurrent writer won the race.
    PreconditionFailed {
        /// Why the precondition failed.
        reason: String,
    },
    /// A requested resource does not exist.
    NotFound {
        /// The kind of resource ("job", "repair item", "time entry").
        resource_type: String,
        /// A human-readable description of what was missing.
        message: String,
    },
    /// An internal persistence or serialization failure.
    Internal {
        /// A description of the failure.
        message: String,
    },
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Forbidden {
                action,
                required_role,
            } => write!(f, "Forbidden: '{action}' requires {required_role}"),
            Self::InvalidTransition { from, to, reason } => {
                write!(f, "Cannot transition from '{from}' to '{to}': {reason}")
            }
            Self::PreconditionFailed { reason } => write!(f, "Precondition failed: {reason}"),
            Self::NotFound {
                resource_type,
                message,
            } => write!(f, "{resource_type} not found: {message}"),
            Self::Internal { message } => write!(f, "Internal error: {message}"),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<DomainError> for EngineError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Forbidden {
                action,
                required_role,
            } => Self::Forbidden {
                action,
                required_role,
            },
            DomainError::InvalidTransition { from, to, reason } => {
                Self::InvalidTransition { from, to, reason }
            }
            DomainError::JobNotFound(job_id) => Self::NotFound {
                resource_type: String::from("job"),
                message: format!("inspection job {job_id}"),
            },
            DomainError::ItemNotFound(item_id) => Self::NotFound {
                resource_type: String::from("repair item"),
                message: format!("repair item {item_id}"),
            },
            // Everything else is a guard failure; the domain message
            // already names the offenders.
            other => Self::PreconditionFailed {
                reason: other.to_string(),
            },
        }
    }
}

impl From<CoreError> for EngineError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::DomainViolation(domain) => domain.into(),
        }
    }
}

impl From<PersistenceError> for EngineError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::StaleStatus { job_id, expected } => Self::PreconditionFailed {
                reason: format!(
                    "job {job_id} is no longer at '{expected}'; reload and retry"
                ),
            },
            PersistenceError::DecisionExists(item_id) => Self::PreconditionFailed {
                reason: format!("item {item_id} already has a customer decision recorded"),
            },
            PersistenceError::JobNotFound(job_id) => Self::NotFound {
                resource_type: String::from("job"),
                message: format!("inspection job {job_id}"),
            },
            PersistenceError::ItemNotFound(item_id) => Self::NotFound {
                resource_type: String::from("repair item"),
                message: format!("repair item {item_id}"),
            },
            PersistenceError::NotFound(what) => Self::NotFound {
                resource_type: String::from("resource"),
                message: what,
            },
            other => Self::Internal {
                message: other.to_string(),
            },
        }
    }
}
