/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Period time windows and their validation.
//!
//! A [`PeriodSchedule`] is the school's bell timetable: one half-open window
//! `[start, end)` per period number.  It is configuration: built once at
//! startup and afterwards only changed through
//! [`PeriodSchedule::load`].
//!
//! # Invariants held by every `PeriodSchedule`
//!
//! * `start < end` for every window.
//! * Period numbers are unique (the map key).
//! * Ordered by period number, windows are also ordered by time and never
//!   overlap (`prev.end <= next.start`).  Gaps are allowed; they are the
//!   "between periods" breaks.
//!
//! The persisted form of a window is a [`PeriodRow`] with `"HH:MM"` strings.
//! [`parse_time_of_day`] / [`format_time_of_day`] round-trip that form
//! exactly.

pub mod error;

pub use error::{ScheduleError, TimeField};

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Duration, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

// ── Time-of-day text form ─────────────────────────────────────────────────────

/// Format used when a time of day is written back out.
pub const TIME_OF_DAY_FORMAT: &str = "%H:%M";

/// Parse `"HH:MM"` (or `"HH:MM:SS"`) into a time of day.
///
/// Surrounding whitespace is ignored, matching what the edit dialog receives
/// from a text field.
pub fn parse_time_of_day(text: &str) -> Option<NaiveTime> {
    let text = text.trim();
    NaiveTime::parse_from_str(text, TIME_OF_DAY_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M:%S"))
        .ok()
}

/// Format a time of day as `"HH:MM"`.
pub fn format_time_of_day(time: NaiveTime) -> String {
    time.format(TIME_OF_DAY_FORMAT).to_string()
}

// ── PeriodRow (persisted form) ────────────────────────────────────────────────

/// One period as stored by the collaborator: number plus `"HH:MM"` strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodRow {
    #[serde(alias = "period_number")]
    pub period: u32,
    pub start: String,
    pub end: String,
}

impl PeriodRow {
    pub fn new(period: u32, start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            period,
            start: start.into(),
            end: end.into(),
        }
    }

    /// Parse both times.  Ordering of start/end is not checked here.
    fn parse(&self) -> Result<(NaiveTime, NaiveTime), ScheduleError> {
        let start = parse_time_of_day(&self.start).ok_or_else(|| ScheduleError::Parse {
            period: self.period,
            field: TimeField::Start,
            text: self.start.clone(),
        })?;
        let end = parse_time_of_day(&self.end).ok_or_else(|| ScheduleError::Parse {
            period: self.period,
            field: TimeField::End,
            text: self.end.clone(),
        })?;
        Ok((start, end))
    }
}

// ── PeriodWindow ──────────────────────────────────────────────────────────────

/// Half-open time window `[start, end)` of one period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodWindow {
    pub number: u32,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl PeriodWindow {
    /// `true` when `start <= now < end`.
    pub fn contains(&self, now: NaiveTime) -> bool {
        self.start <= now && now < self.end
    }

    /// Time left until the window closes; negative once it has closed.
    pub fn remaining(&self, now: NaiveTime) -> Duration {
        self.end.signed_duration_since(now)
    }

    pub fn length(&self) -> Duration {
        self.end.signed_duration_since(self.start)
    }

    pub fn to_row(&self) -> PeriodRow {
        PeriodRow::new(
            self.number,
            format_time_of_day(self.start),
            format_time_of_day(self.end),
        )
    }
}

// ── LoadReport ────────────────────────────────────────────────────────────────

/// Outcome of a successful [`PeriodSchedule::load`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Periods whose rows parsed and were applied.
    pub applied: Vec<u32>,
    /// Periods whose rows failed to parse but kept their previous window.
    pub retained: Vec<u32>,
    /// Periods whose rows failed to parse and had no previous window.
    pub dropped: Vec<u32>,
    /// One entry per unparseable row.
    pub parse_errors: Vec<ScheduleError>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.parse_errors.is_empty()
    }
}

// ── PeriodSchedule ────────────────────────────────────────────────────────────

/// Validated, ordered collection of period windows.
///
/// `BTreeMap` keeps the windows sorted by period number so [`ordered`] needs
/// no extra sort and iteration is deterministic.
///
/// [`ordered`]: PeriodSchedule::ordered
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PeriodSchedule {
    windows: BTreeMap<u32, PeriodWindow>,
}

impl PeriodSchedule {
    /// An empty schedule (no school day at all).
    pub fn new() -> Self {
        Self::default()
    }

    /// Eight back-to-back 45-minute periods from 08:30 to 14:30.
    ///
    /// Used when no period configuration has been saved yet.
    pub fn school_default() -> Self {
        let first = NaiveTime::from_hms_opt(8, 30, 0).unwrap_or_default();
        let length = Duration::minutes(45);
        let windows = (1..=8u32)
            .map(|n| {
                let start = first + length * (n as i32 - 1);
                (
                    n,
                    PeriodWindow {
                        number: n,
                        start,
                        end: start + length,
                    },
                )
            })
            .collect();
        Self { windows }
    }

    /// Build a schedule from rows with no prior values to fall back on.
    ///
    /// Unparseable rows are dropped and reported; see [`load`](Self::load).
    pub fn from_rows(rows: &[PeriodRow]) -> Result<(Self, LoadReport), ScheduleError> {
        let mut schedule = Self::new();
        let report = schedule.load(rows)?;
        Ok((schedule, report))
    }

    /// Apply `rows` on top of the current windows, all-or-nothing.
    ///
    /// * Each row overwrites the window of its period number.  Periods not
    ///   mentioned in `rows` keep their current window.
    /// * A row whose time text cannot be parsed is skipped; the window this
    ///   schedule currently holds for that period number stays in place.
    ///   The parse error is returned in the [`LoadReport`].
    /// * Any validation failure (start ≥ end, repeated period number,
    ///   overlapping windows in the merged table) rejects the whole batch
    ///   and leaves `self` unchanged.
    ///
    /// # Errors
    /// Returns the first batch-level [`ScheduleError`] encountered.
    pub fn load(&mut self, rows: &[PeriodRow]) -> Result<LoadReport, ScheduleError> {
        let mut seen = BTreeSet::new();
        let mut next = self.windows.clone();
        let mut report = LoadReport::default();

        for row in rows {
            if !seen.insert(row.period) {
                return Err(ScheduleError::DuplicatePeriod { period: row.period });
            }

            match row.parse() {
                Ok((start, end)) => {
                    if start >= end {
                        return Err(ScheduleError::StartNotBeforeEnd {
                            period: row.period,
                            start,
                            end,
                        });
                    }
                    next.insert(
                        row.period,
                        PeriodWindow {
                            number: row.period,
                            start,
                            end,
                        },
                    );
                    report.applied.push(row.period);
                }
                Err(e) => {
                    warn!(period = row.period, error = %e, "Discarding unparseable period row");
                    if self.windows.contains_key(&row.period) {
                        report.retained.push(row.period);
                    } else {
                        report.dropped.push(row.period);
                    }
                    report.parse_errors.push(e);
                }
            }
        }

        check_monotonic(&next)?;

        self.windows = next;

        info!(
            periods = self.windows.len(),
            applied = report.applied.len(),
            retained = report.retained.len(),
            dropped = report.dropped.len(),
            "Period schedule loaded"
        );
        for w in self.windows.values() {
            debug!(
                period = w.number,
                start = %format_time_of_day(w.start),
                end = %format_time_of_day(w.end),
                "  window"
            );
        }

        Ok(report)
    }

    /// Windows sorted by period number.
    pub fn ordered(&self) -> impl Iterator<Item = &PeriodWindow> + '_ {
        self.windows.values()
    }

    /// Period numbers in ascending order.
    pub fn period_numbers(&self) -> impl Iterator<Item = u32> + '_ {
        self.windows.keys().copied()
    }

    pub fn lookup(&self, period: u32) -> Option<&PeriodWindow> {
        self.windows.get(&period)
    }

    /// `(earliest start, latest end)`, or `None` for an empty schedule.
    pub fn boundaries(&self) -> Option<(NaiveTime, NaiveTime)> {
        let first = self.windows.values().map(|w| w.start).min()?;
        let last = self.windows.values().map(|w| w.end).max()?;
        Some((first, last))
    }

    /// Persisted representation, ordered by period number.
    pub fn to_rows(&self) -> Vec<PeriodRow> {
        self.windows.values().map(PeriodWindow::to_row).collect()
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}

/// Ordered by period number, each window must start at or after the end of
/// the one before it.
fn check_monotonic(windows: &BTreeMap<u32, PeriodWindow>) -> Result<(), ScheduleError> {
    let mut prev: Option<&PeriodWindow> = None;
    for w in windows.values() {
        if let Some(p) = prev {
            if w.start < p.end {
                return Err(ScheduleError::OverlappingWindows {
                    period: w.number,
                    start: w.start,
                    previous: p.number,
                    previous_end: p.end,
                });
            }
        }
        prev = Some(w);
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
