/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Drives a ScheduleView through a Monday with a manual clock and paused
//! tokio time.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime, Weekday};

use bellwatch::config::timetable::parse_timetable;
use bellwatch::engine::Phase;
use bellwatch::highlight::{BlinkState, CellPainter, Color};
use bellwatch::refresh::{
    ManualClock, ScheduleView, StatusSink, StatusUpdate, ViewSettings,
    DEFAULT_HIGHLIGHT_INTERVAL, DEFAULT_STATUS_INTERVAL,
};
use bellwatch::schedule::PeriodSchedule;
use bellwatch::timetable::{CellKey, TeacherId};

const TIMETABLE: &str = r#"
teachers:
  - id: 7
    name: "Ms. Byrne"
    entries:
      - { day: Monday, period: 1, class: "7A", subject: "Maths" }
      - { day: Monday, period: 3, class: "9C", subject: "Physics" }
      - { day: Tuesday, period: 2, class: "8B", subject: "Maths" }
"#;

const TEACHER: TeacherId = TeacherId(7);

#[derive(Default)]
struct Recorder {
    updates: Mutex<Vec<StatusUpdate>>,
    paints: Mutex<Vec<(CellKey, Color)>>,
}

impl Recorder {
    fn last_status(&self) -> String {
        self.updates
            .lock()
            .unwrap()
            .last()
            .map(|u| u.text.status.clone())
            .unwrap_or_default()
    }

    fn last_paint(&self) -> Option<(CellKey, Color)> {
        self.paints.lock().unwrap().last().cloned()
    }
}

impl StatusSink for Recorder {
    fn publish(&self, update: &StatusUpdate) {
        self.updates.lock().unwrap().push(update.clone());
    }
}

impl CellPainter for Recorder {
    fn paint_cell(&self, cell: CellKey, color: &Color) {
        self.paints.lock().unwrap().push((cell, color.clone()));
    }
}

fn monday_at(h: u32, m: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, 19)
        .unwrap()
        .and_hms_opt(h, m, 0)
        .unwrap()
}

fn build() -> (ScheduleView, Arc<Recorder>, Arc<ManualClock>) {
    let timetable = parse_timetable(TIMETABLE).unwrap();
    let recorder = Arc::new(Recorder::default());
    let clock = Arc::new(ManualClock::new(monday_at(8, 25)));
    let view = ScheduleView::new(
        PeriodSchedule::school_default(),
        ViewSettings::default(),
        Arc::new(timetable),
        clock.clone(),
        recorder.clone(),
        recorder.clone(),
    );
    (view, recorder, clock)
}

/// Let one status tick (and many highlight ticks) elapse.
async fn next_minute() {
    tokio::time::sleep(DEFAULT_STATUS_INTERVAL).await;
}

#[tokio::test(start_paused = true)]
async fn monday_from_before_school_to_after() {
    let (view, rec, clock) = build();
    view.select_teacher(Some(TEACHER));
    tokio::time::sleep(Duration::from_millis(1)).await;
    assert_eq!(rec.last_status(), "School has not started yet.");
    assert_eq!(view.animator().state(), BlinkState::Idle);

    // 08:30 sharp is inside period 1.
    clock.set(monday_at(8, 30));
    next_minute().await;
    assert_eq!(rec.last_status(), "Currently teaching: 7A (Period 1)");
    let p1 = CellKey {
        day: Weekday::Mon,
        period: 1,
    };
    assert_eq!(view.animator().target(), Some(p1));
    let maths = view.animator().subject_color("Maths");

    // 09:15 belongs to period 2, which has no entry.
    clock.set(monday_at(9, 15));
    next_minute().await;
    assert_eq!(rec.last_status(), "Teacher is FREE right now (Period 2)");
    assert_eq!(view.animator().state(), BlinkState::Idle);
    assert_eq!(rec.last_paint(), Some((p1, maths)));

    clock.set(monday_at(10, 0));
    next_minute().await;
    assert_eq!(rec.last_status(), "Currently teaching: 9C (Period 3)");
    assert_eq!(
        view.animator().target().map(|c| c.period),
        Some(3),
        "blink target follows the active class"
    );

    clock.set(monday_at(14, 30));
    next_minute().await;
    assert_eq!(rec.last_status(), "School is over for today.");
    assert_eq!(view.animator().state(), BlinkState::Idle);

    view.teardown();
    assert_eq!(view.timers_armed(), (false, false, false));
}

#[tokio::test(start_paused = true)]
async fn every_minute_of_the_day_has_a_consistent_phase() {
    let (view, _, clock) = build();
    view.select_teacher(Some(TEACHER));
    let schedule = view.schedule();

    for minute in 7 * 60..16 * 60 {
        let now = monday_at(minute / 60, minute % 60);
        clock.set(now);
        let snap = view.snapshot_now().unwrap().unwrap();
        let inside = schedule.ordered().find(|w| w.contains(now.time()));
        match inside {
            Some(w) => {
                assert_eq!(snap.phase, Phase::During, "{now}");
                assert_eq!(snap.active_period, Some(w.number));
                let left = snap.minutes_remaining.unwrap();
                assert!(left <= 45, "{now}: {left}");
            }
            None => assert_ne!(snap.phase, Phase::During, "{now}"),
        }
    }
}

#[tokio::test(start_paused = true)]
async fn period_edit_during_the_day_takes_effect_immediately() {
    let (view, rec, clock) = build();
    view.select_teacher(Some(TEACHER));
    clock.set(monday_at(9, 20));
    next_minute().await;
    assert_eq!(rec.last_status(), "Teacher is FREE right now (Period 2)");

    // Stretch period 1 to 09:30: 09:20 is now back in 7A's class.
    let mut rows = view.schedule().to_rows();
    rows[0].end = "09:30".into();
    rows[1].start = "09:30".into();
    view.apply_period_edit(&rows).unwrap();
    assert_eq!(rec.last_status(), "Currently teaching: 7A (Period 1)");

    tokio::time::sleep(DEFAULT_HIGHLIGHT_INTERVAL).await;
    assert_eq!(view.animator().target().map(|c| c.period), Some(1));
}
