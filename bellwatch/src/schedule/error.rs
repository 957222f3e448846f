/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Structured error types for period-time configuration.
//!
//! Two failure layers exist and they are handled very differently:
//!
//! * **Parse failures** ([`ScheduleError::Parse`]) are per-row.  The row is
//!   discarded, the previous window for that period number stays in effect,
//!   and the rest of the batch is still applied.  They are returned inside a
//!   [`LoadReport`](super::LoadReport), never as `Err`.
//! * **Validation failures** (every other variant) reject the whole batch.
//!   The schedule in effect before the call is left untouched.
//!
//! Every variant names the period number that failed so the edit dialog can
//! point at the offending row.

use chrono::NaiveTime;
use thiserror::Error;

/// Which side of a period window a time string belonged to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeField {
    Start,
    End,
}

impl std::fmt::Display for TimeField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeField::Start => write!(f, "start"),
            TimeField::End => write!(f, "end"),
        }
    }
}

/// Error returned while loading or editing a [`PeriodSchedule`].
///
/// | Variant | Scope | Effect |
/// |---|---|---|
/// | `Parse` | one row | row discarded, previous value retained |
/// | `StartNotBeforeEnd` | batch | whole batch rejected |
/// | `DuplicatePeriod` | batch | whole batch rejected |
/// | `OverlappingWindows` | batch | whole batch rejected |
///
/// [`PeriodSchedule`]: super::PeriodSchedule
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    /// The time text of one row is not a valid `HH:MM` time of day.
    #[error("period {period}: invalid {field} time '{text}' (expected HH:MM, 24-hour)")]
    Parse {
        period: u32,
        field: TimeField,
        text: String,
    },

    /// A window would be empty or inverted.
    #[error("period {period}: start {start} must be before end {end}")]
    StartNotBeforeEnd {
        period: u32,
        start: NaiveTime,
        end: NaiveTime,
    },

    /// The same period number appears more than once in one batch.
    #[error("period {period} is listed more than once")]
    DuplicatePeriod { period: u32 },

    /// Ordered by period number, this window starts before the previous one
    /// ends.
    #[error(
        "period {period} starts at {start} but period {previous} only ends at {previous_end}"
    )]
    OverlappingWindows {
        period: u32,
        start: NaiveTime,
        previous: u32,
        previous_end: NaiveTime,
    },
}

impl ScheduleError {
    /// Period number the error refers to.
    pub fn period(&self) -> u32 {
        match self {
            ScheduleError::Parse { period, .. }
            | ScheduleError::StartNotBeforeEnd { period, .. }
            | ScheduleError::DuplicatePeriod { period }
            | ScheduleError::OverlappingWindows { period, .. } => *period,
        }
    }

    /// `true` for the batch-level variants that reject a whole edit.
    pub fn is_validation(&self) -> bool {
        !matches!(self, ScheduleError::Parse { .. })
    }
}
