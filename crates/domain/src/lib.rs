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
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod actor;
mod close_gate;
mod customer_response;
mod error;
mod item_progress;
mod job;
mod job_status;
mod repair_item;
mod time_entry;

pub use actor::{ActorRole, validate_capability};
pub use close_gate::evaluate_close_gate;
pub use customer_response::{DecisionTally, aggregate_customer_response};
pub use job_status::JobStatus;

// Re-export public types
pub use error::DomainError;
pub use item_progress::{ItemProgressUpdate, LineCounts, aggregate_item_progress};
pub use job::{InspectionJob, PublicToken, RagCounts};
pub use repair_item::{BlockedItem, OutcomeStatus, ProgressStatus, QuoteStatus, RepairItem};
pub use time_entry::{TimeEntry, duration_minutes};
