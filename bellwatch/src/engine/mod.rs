/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Schedule-state engine: where in the school day is "now"?
//!
//! [`compute`] is a pure function of its four inputs.  It holds no state,
//! reads no clock and performs no I/O, so the refresh loop can call it as
//! often as it likes and tests can pin every boundary exactly.
//!
//! ```text
//!            first                                         last
//!   BEFORE     │ P1 [start,end) │ BETWEEN │ P2 [start,end) │   AFTER
//! ─────────────┼────────────────┼─────────┼────────────────┼──────────►
//!              └──── DURING ────┘         └──── DURING ────┘
//! ```
//!
//! Windows are half-open: a `now` equal to a window's `start` is inside that
//! window, a `now` equal to its `end` is not.
//!
//! # Lookup misses are not errors
//! * DURING with `active_entry == None` means the teacher is free this
//!   period.  That is different from "no schedule coverage", which is
//!   expressed by the BEFORE / BETWEEN / AFTER phases.
//! * `next_entry == None` means "no more classes today".  The search never
//!   rolls over into the next day.

pub mod status_text;

pub use status_text::StatusText;

use chrono::{NaiveTime, Weekday};

use crate::schedule::PeriodSchedule;
use crate::timetable::{CellKey, TimetableEntry};

// ── Phase ─────────────────────────────────────────────────────────────────────

/// Coarse state of the school day relative to `now`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Earlier than the first period's start.
    Before,
    /// Inside exactly one period window.
    During,
    /// Inside the school day but in a gap between two windows.
    Between,
    /// At or after the last period's end (or no periods configured).
    After,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Phase::Before => "before",
            Phase::During => "during",
            Phase::Between => "between",
            Phase::After => "after",
        };
        f.write_str(s)
    }
}

// ── StatusSnapshot ────────────────────────────────────────────────────────────

/// Result of one [`compute`] call.  Immutable; the next tick builds a new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub phase: Phase,

    /// Day the snapshot was computed for.
    pub weekday: Weekday,

    /// Period whose window contains `now`.  Set only when DURING.
    pub active_period: Option<u32>,

    /// Next period to start after `now`.  For BEFORE this is the first
    /// period; for BETWEEN the period the teacher is waiting for; for DURING
    /// the period after the active one (if any).
    pub upcoming_period: Option<u32>,

    /// Whole minutes left in the active period, `floor(seconds / 60)`.  Set
    /// only when DURING.
    pub minutes_remaining: Option<u32>,

    /// Entry for (weekday, active_period).  `None` while DURING means free.
    pub active_entry: Option<TimetableEntry>,

    /// First entry later today, if any.
    pub next_entry: Option<TimetableEntry>,
}

impl StatusSnapshot {
    fn empty(phase: Phase, weekday: Weekday) -> Self {
        Self {
            phase,
            weekday,
            active_period: None,
            upcoming_period: None,
            minutes_remaining: None,
            active_entry: None,
            next_entry: None,
        }
    }

    /// `true` while DURING and the teacher has no class (no entry, or an
    /// entry carrying the free sentinel).
    pub fn is_free_period(&self) -> bool {
        self.phase == Phase::During && self.active_entry.as_ref().map_or(true, |e| e.is_free())
    }

    /// Grid cell of the active entry, if there is one.
    pub fn active_cell(&self) -> Option<CellKey> {
        match self.phase {
            Phase::During => self.active_entry.as_ref().map(TimetableEntry::cell),
            _ => None,
        }
    }
}

// ── compute ───────────────────────────────────────────────────────────────────

/// Map `now` onto the school day.
///
/// `entries` may contain entries for any day; only those whose `day` equals
/// `weekday` are considered.
pub fn compute(
    now: NaiveTime,
    schedule: &PeriodSchedule,
    weekday: Weekday,
    entries: &[TimetableEntry],
) -> StatusSnapshot {
    let Some((first, last)) = schedule.boundaries() else {
        return StatusSnapshot::empty(Phase::After, weekday);
    };

    if now < first {
        let upcoming = schedule.period_numbers().next();
        return StatusSnapshot {
            upcoming_period: upcoming,
            next_entry: first_entry_today(schedule, weekday, entries, |_| true),
            ..StatusSnapshot::empty(Phase::Before, weekday)
        };
    }

    if now >= last {
        return StatusSnapshot::empty(Phase::After, weekday);
    }

    if let Some(window) = schedule.ordered().find(|w| w.contains(now)) {
        let active = window.number;
        let seconds = window.remaining(now).num_seconds().max(0);
        return StatusSnapshot {
            active_period: Some(active),
            upcoming_period: schedule.period_numbers().find(|n| *n > active),
            minutes_remaining: Some(u32::try_from(seconds / 60).unwrap_or(u32::MAX)),
            active_entry: entry_at(entries, weekday, active).cloned(),
            next_entry: first_entry_today(schedule, weekday, entries, |n| n > active),
            ..StatusSnapshot::empty(Phase::During, weekday)
        };
    }

    // Inside [first, last) but in no window: a break.  Windows are
    // non-overlapping and ordered, so the first window starting after `now`
    // is the one being waited for.
    let upcoming = schedule
        .ordered()
        .find(|w| w.start > now)
        .map(|w| w.number);
    let next_entry = match upcoming {
        Some(up) => first_entry_today(schedule, weekday, entries, |n| n >= up),
        None => None,
    };
    StatusSnapshot {
        upcoming_period: upcoming,
        next_entry,
        ..StatusSnapshot::empty(Phase::Between, weekday)
    }
}

/// Entry for one (day, period) slot.
fn entry_at(entries: &[TimetableEntry], day: Weekday, period: u32) -> Option<&TimetableEntry> {
    entries
        .iter()
        .find(|e| e.day == day && e.period_number == period)
}

/// Walk configured periods in ascending order, keeping those accepted by
/// `include`, and return the first one with an entry on `day`.
fn first_entry_today(
    schedule: &PeriodSchedule,
    day: Weekday,
    entries: &[TimetableEntry],
    include: impl Fn(u32) -> bool,
) -> Option<TimetableEntry> {
    schedule
        .period_numbers()
        .filter(|n| include(*n))
        .find_map(|n| entry_at(entries, day, n))
        .cloned()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
