// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Backend-agnostic query modules.
//!
//! ## Module Organization
//!
//! - `jobs` — Job reads, token lookup, the expiry sweep candidates
//! - `history` — Status history reads
//! - `items` — Repair item reads and line counting
//! - `time` — Time entry reads
//! - `decisions` — Decision tallies

pub mod decisions;
pub mod history;
pub mod items;
pub mod jobs;
pub mod time;
