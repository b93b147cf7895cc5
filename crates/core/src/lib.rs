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

mod apply;
mod command;
mod effects;
mod error;
mod state;

#[cfg(test)]
mod tests;

// Re-export public types and functions
pub use apply::{
    apply_clock_in, apply_clock_out, apply_close, apply_customer_decisions, apply_line_change,
    apply_transition,
};
pub use command::Command;
pub use effects::Effect;
pub use error::CoreError;
pub use state::{
    ClockInOutcome, ClockOutOutcome, LineChangeOutcome, TransitionOutcome, WorkflowPolicy,
};
