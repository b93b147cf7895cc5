// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Technician time tracking against jobs.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// One technician clock-in/clock-out pair on a job.
///
/// At most one open entry (no clock-out) may exist per technician per job;
/// the persistence layer enforces this with a partial unique index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeEntry {
    pub entry_id: i64,
    pub job_id: i64,
    pub technician_id: i64,
    pub clock_in_at: OffsetDateTime,
    pub clock_out_at: Option<OffsetDateTime>,
    /// Rounded minutes between clock-in and clock-out; set on close.
    pub duration_minutes: Option<i64>,
}

impl TimeEntry {
    /// Creates an open entry starting now.
    #[must_use]
    pub const fn open(entry_id: i64, job_id: i64, technician_id: i64, now: OffsetDateTime) -> Self {
        Self {
            entry_id,
            job_id,
            technician_id,
            clock_in_at: now,
            clock_out_at: None,
            duration_minutes: None,
        }
    }

    /// Returns true while the technician is still clocked in.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.clock_out_at.is_none()
    }

    /// Closes the entry at `now`, computing the rounded duration.
    #[must_use]
    pub fn closed_at(mut self, now: OffsetDateTime) -> Self {
        self.duration_minutes = Some(duration_minutes(self.clock_in_at, now));
        self.clock_out_at = Some(now);
        self
    }
}

/// Elapsed whole minutes between two instants, rounded to nearest.
///
/// Thirty seconds rounds up; a negative span (clock skew) clamps to zero.
#[must_use]
pub fn duration_minutes(clock_in_at: OffsetDateTime, clock_out_at: OffsetDateTime) -> i64 {
    let ms = (clock_out_at - clock_in_at).whole_milliseconds();
    let Ok(ms) = i64::try_from(ms) else {
        return 0;
    };
    if ms <= 0 {
        return 0;
    }
    (ms + 30_000) / 60_000
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_duration_rounds_to_nearest_minute() {
        let start = datetime!(2026-03-02 09:00:00 UTC);

        assert_eq!(duration_minutes(start, datetime!(2026-03-02 09:00:29 UTC)), 0);
        assert_eq!(duration_minutes(start, datetime!(2026-03-02 09:00:30 UTC)), 1);
        assert_eq!(duration_minutes(start, datetime!(2026-03-02 09:10:29 UTC)), 10);
        assert_eq!(duration_minutes(start, datetime!(2026-03-02 09:10:30 UTC)), 11);
        assert_eq!(duration_minutes(start, datetime!(2026-03-02 10:00:00 UTC)), 60);
    }

    #[test]
    fn test_negative_span_clamps_to_zero() {
        let start = datetime!(2026-03-02 09:00:00 UTC);
        assert_eq!(duration_minutes(start, datetime!(2026-03-02 08:59:00 UTC)), 0);
    }

    #[test]
    fn test_close_sets_duration_and_clock_out() {
        let entry = TimeEntry::open(1, 10, 5, datetime!(2026-03-02 09:00:00 UTC));
        assert!(entry.is_open());

        let closed = entry.closed_at(datetime!(2026-03-02 09:45:10 UTC));
        assert!(!closed.is_open());
        assert_eq!(closed.duration_minutes, Some(45));
        assert_eq!(closed.clock_out_at, Some(datetime!(2026-03-02 09:45:10 UTC)));
    }
}
