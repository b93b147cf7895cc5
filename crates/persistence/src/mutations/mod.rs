// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Backend-agnostic mutation modules.
//!
//! This module contains all state-changing operations for the
//! persistence layer. Everything uses Diesel DSL, with the single
//! `SQLite`-specific helper `get_last_insert_rowid()` imported from the
//! `backend` module.
//!
//! ## Module Organization
//!
//! - `jobs` — Job rows, the conditional status commit, history appends
//! - `items` — Repair item flags, derived statuses, pricing lines
//! - `time` — Time entry open/close, including stale-session recovery
//! - `decisions` — Customer decision inserts
//! - `audit` — Audit log appends

pub mod audit;
pub mod decisions;
pub mod items;
pub mod jobs;
pub mod time;
