/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Human-readable status lines rendered from a [`StatusSnapshot`].

use chrono::NaiveDateTime;

use super::{Phase, StatusSnapshot};
use crate::timetable::TimetableEntry;

const NO_MORE_CLASSES: &str = "No more classes today.";

/// The four lines of the status panel.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusText {
    /// `"08:30 AM (Monday)"`
    pub clock: String,
    pub status: String,
    pub next: String,
    pub remaining: String,
}

impl StatusText {
    /// Panel contents when no teacher is selected.
    pub fn no_teacher(now: NaiveDateTime) -> Self {
        Self {
            clock: clock_line(now),
            status: "No teacher selected".to_string(),
            next: String::new(),
            remaining: String::new(),
        }
    }

    pub fn render(now: NaiveDateTime, snapshot: &StatusSnapshot) -> Self {
        let clock = clock_line(now);
        let next = next_line(snapshot.next_entry.as_ref());

        match snapshot.phase {
            Phase::Before => Self {
                clock,
                status: "School has not started yet.".to_string(),
                next,
                remaining: String::new(),
            },
            Phase::After => Self {
                clock,
                status: "School is over for today.".to_string(),
                next: NO_MORE_CLASSES.to_string(),
                remaining: String::new(),
            },
            Phase::During => {
                let period = snapshot.active_period.unwrap_or_default();
                let status = match &snapshot.active_entry {
                    Some(e) if !e.is_free() => {
                        format!("Currently teaching: {} (Period {})", e.class_name, period)
                    }
                    _ => format!("Teacher is FREE right now (Period {period})"),
                };
                let remaining = snapshot
                    .minutes_remaining
                    .map(|m| format!("{m} min remaining in this period"))
                    .unwrap_or_default();
                Self {
                    clock,
                    status,
                    next,
                    remaining,
                }
            }
            Phase::Between => {
                let status = match snapshot.upcoming_period {
                    Some(p) => format!("Teacher is FREE right now (Before Period {p})"),
                    None => "Teacher is FREE right now".to_string(),
                };
                Self {
                    clock,
                    status,
                    next,
                    remaining: String::new(),
                }
            }
        }
    }

    /// Non-empty lines, top to bottom.
    pub fn lines(&self) -> impl Iterator<Item = &str> + '_ {
        [&self.clock, &self.status, &self.next, &self.remaining]
            .into_iter()
            .map(String::as_str)
            .filter(|l| !l.is_empty())
    }
}

fn clock_line(now: NaiveDateTime) -> String {
    now.format("%I:%M %p (%A)").to_string()
}

fn next_line(next: Option<&TimetableEntry>) -> String {
    match next {
        Some(e) => format!("Next: {} (Period {})", e.class_name, e.period_number),
        None => NO_MORE_CLASSES.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::compute;
    use crate::schedule::PeriodSchedule;
    use crate::timetable::{EntryId, TimetableEntry};
    use chrono::{NaiveDate, Weekday};

    /// 2026-10-19 is a Monday.
    fn monday_at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 19)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn render_at(h: u32, m: u32, entries: &[TimetableEntry]) -> StatusText {
        let now = monday_at(h, m);
        let snap = compute(
            now.time(),
            &PeriodSchedule::school_default(),
            Weekday::Mon,
            entries,
        );
        StatusText::render(now, &snap)
    }

    fn entries() -> Vec<TimetableEntry> {
        vec![
            TimetableEntry::new(EntryId(1), Weekday::Mon, 1, "7A", "Maths"),
            TimetableEntry::new(EntryId(2), Weekday::Mon, 3, "FREE", ""),
            TimetableEntry::new(EntryId(3), Weekday::Mon, 4, "9C", "Physics"),
        ]
    }

    #[test]
    fn clock_line_uses_twelve_hour_time_and_day_name() {
        let text = StatusText::no_teacher(monday_at(13, 5));
        assert_eq!(text.clock, "01:05 PM (Monday)");
        assert_eq!(text.status, "No teacher selected");
    }

    #[test]
    fn before_school() {
        let text = render_at(7, 45, &entries());
        assert_eq!(text.status, "School has not started yet.");
        assert_eq!(text.next, "Next: 7A (Period 1)");
        assert_eq!(text.remaining, "");
    }

    #[test]
    fn teaching() {
        let text = render_at(8, 40, &entries());
        assert_eq!(text.status, "Currently teaching: 7A (Period 1)");
        assert_eq!(text.next, "Next: FREE (Period 3)");
        assert_eq!(text.remaining, "35 min remaining in this period");
    }

    #[test]
    fn free_without_entry_and_with_sentinel_read_the_same() {
        assert_eq!(
            render_at(9, 30, &entries()).status,
            "Teacher is FREE right now (Period 2)"
        );
        assert_eq!(
            render_at(10, 10, &entries()).status,
            "Teacher is FREE right now (Period 3)"
        );
    }

    #[test]
    fn last_class_says_no_more_classes() {
        let text = render_at(11, 0, &entries());
        assert_eq!(text.next, NO_MORE_CLASSES);
    }

    #[test]
    fn after_school() {
        let text = render_at(15, 0, &entries());
        assert_eq!(text.status, "School is over for today.");
        assert_eq!(text.next, NO_MORE_CLASSES);
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn between_periods_names_the_upcoming_period() {
        let rows = vec![
            crate::schedule::PeriodRow::new(1, "08:30", "09:15"),
            crate::schedule::PeriodRow::new(2, "09:30", "10:15"),
        ];
        let (s, _) = PeriodSchedule::from_rows(&rows).unwrap();
        let now = monday_at(9, 20);
        let snap = compute(now.time(), &s, Weekday::Mon, &[]);
        let text = StatusText::render(now, &snap);
        assert_eq!(text.status, "Teacher is FREE right now (Before Period 2)");
        assert_eq!(text.next, NO_MORE_CLASSES);
    }
}
