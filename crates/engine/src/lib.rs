// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Workflow orchestration surface for the VHC inspection system.
//!
//! This crate ties the pure core to the persistence layer and to the
//! external collaborators: each operation loads state, runs the pure
//! apply function, persists the outcome through the conditional status
//! commit, and dispatches side effects strictly after the write. It also
//! owns public-token generation, the expiry sweep, and the advisory
//! capability projection for callers.

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

mod capabilities;
mod collaborators;
mod engine;
mod error;
mod token;

#[cfg(test)]
mod tests;

pub use capabilities::{Capability, JobCapabilities, compute_job_capabilities};
pub use collaborators::{
    AuditSink, NoopAuditSink, NoopNotificationSink, NoopReminderScheduler,
    NoopRepairItemGenerator, NotificationSink, ReminderScheduler, RepairItemGenerator,
};
pub use engine::{DecisionRequest, WorkflowEngine};
pub use error::EngineError;
pub use token::{TOKEN_LENGTH, issue_token};
