/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! The live schedule view: two refresh triggers plus the highlight animator.
//!
//! # Timers
//!
//! | Timer       | Default | First tick  | Action                                        |
//! |-------------|---------|-------------|-----------------------------------------------|
//! | `status`    | 60 s    | immediately | compute snapshot, render text, publish        |
//! | `highlight` | 5 s     | immediately | compute snapshot, feed the animator           |
//! | `blink`     | 500 ms  | one period  | owned by [`HighlightAnimator`], toggles color |
//!
//! Both refresh ticks read the clock, query the timetable for the selected
//! teacher and call [`engine::compute`](crate::engine::compute).  A tick that
//! fails re-publishes the last good status so the display never goes blank,
//! and the timer keeps running.
//!
//! Selecting another teacher or tearing the view down cancels all three
//! timers before anything is re-armed.

pub mod clock;
pub mod timer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use timer::{FirstTick, PeriodicTimer};

use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

use anyhow::Context;
use chrono::{Datelike, NaiveDateTime};
use tracing::{debug, info, warn};

use crate::engine::{compute, StatusSnapshot, StatusText};
use crate::highlight::{
    BlinkState, CellPainter, Color, HighlightAnimator, SubjectPalette, DEFAULT_BLINK_INTERVAL,
};
use crate::schedule::{LoadReport, PeriodRow, PeriodSchedule, ScheduleError};
use crate::timetable::{weekday_name, CellIndex, TeacherId, TimetableSource};

pub const DEFAULT_STATUS_INTERVAL: Duration = Duration::from_secs(60);
pub const DEFAULT_HIGHLIGHT_INTERVAL: Duration = Duration::from_secs(5);

// ── Settings ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshIntervals {
    pub status: Duration,
    pub highlight: Duration,
    pub blink: Duration,
}

impl Default for RefreshIntervals {
    fn default() -> Self {
        Self {
            status: DEFAULT_STATUS_INTERVAL,
            highlight: DEFAULT_HIGHLIGHT_INTERVAL,
            blink: DEFAULT_BLINK_INTERVAL,
        }
    }
}

/// Presentation settings of a [`ScheduleView`].
#[derive(Debug, Clone)]
pub struct ViewSettings {
    pub intervals: RefreshIntervals,
    pub palette: SubjectPalette,
    /// Color the blink target toggles to.
    pub accent: Color,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            intervals: RefreshIntervals::default(),
            palette: SubjectPalette::default(),
            accent: Color::default_highlight(),
        }
    }
}

// ── Status output ─────────────────────────────────────────────────────────────

/// One publication to the status display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub now: NaiveDateTime,
    pub teacher: Option<TeacherId>,
    /// `None` when no teacher is selected.
    pub snapshot: Option<StatusSnapshot>,
    pub text: StatusText,
}

/// Receives every status publication.
pub trait StatusSink: Send + Sync {
    fn publish(&self, update: &StatusUpdate);
}

// ── Shared state ──────────────────────────────────────────────────────────────

/// State reachable from the timer callbacks.
struct Shared {
    schedule: RwLock<PeriodSchedule>,
    timetable: Arc<dyn TimetableSource>,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn StatusSink>,
    animator: HighlightAnimator,
    selected: Mutex<Option<TeacherId>>,
    last_status: Mutex<Option<StatusUpdate>>,
}

impl Shared {
    fn selected(&self) -> Option<TeacherId> {
        *self.selected.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn last_status(&self) -> Option<StatusUpdate> {
        self.last_status
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn snapshot_at(
        &self,
        now: NaiveDateTime,
        teacher: TeacherId,
    ) -> anyhow::Result<StatusSnapshot> {
        let weekday = now.weekday();
        let entries = self
            .timetable
            .entries_for(teacher, weekday)
            .with_context(|| {
                format!(
                    "failed to query timetable for teacher {teacher} on {}",
                    weekday_name(weekday)
                )
            })?;
        let schedule = self.schedule.read().unwrap_or_else(PoisonError::into_inner);
        Ok(compute(now.time(), &schedule, weekday, &entries))
    }

    fn build_status(&self) -> anyhow::Result<StatusUpdate> {
        let now = self.clock.now();
        let Some(teacher) = self.selected() else {
            return Ok(StatusUpdate {
                now,
                teacher: None,
                snapshot: None,
                text: StatusText::no_teacher(now),
            });
        };
        let snapshot = self.snapshot_at(now, teacher)?;
        let text = StatusText::render(now, &snapshot);
        Ok(StatusUpdate {
            now,
            teacher: Some(teacher),
            snapshot: Some(snapshot),
            text,
        })
    }

    fn refresh_status(&self) -> anyhow::Result<StatusUpdate> {
        match self.build_status() {
            Ok(update) => {
                match &update.snapshot {
                    Some(snap) => debug!(
                        teacher = ?update.teacher,
                        phase = %snap.phase,
                        status = %update.text.status,
                        "Status refreshed"
                    ),
                    None => debug!(status = %update.text.status, "Status refreshed"),
                }
                self.sink.publish(&update);
                *self.last_status.lock().unwrap_or_else(PoisonError::into_inner) =
                    Some(update.clone());
                Ok(update)
            }
            Err(e) => {
                if let Some(previous) = self.last_status() {
                    self.sink.publish(&previous);
                }
                Err(e.context("status refresh failed; previous status kept"))
            }
        }
    }

    fn refresh_highlight(&self) -> anyhow::Result<BlinkState> {
        let Some(teacher) = self.selected() else {
            self.animator.stop_blink();
            return Ok(BlinkState::Idle);
        };
        let snapshot = self
            .snapshot_at(self.clock.now(), teacher)
            .context("highlight refresh failed; blink state kept")?;
        Ok(self.animator.observe(Some(teacher), &snapshot))
    }
}

// ── ScheduleView ──────────────────────────────────────────────────────────────

/// Owns the live schedule, the selected teacher and all three timers.
///
/// Timer methods must be called from within a tokio runtime.  Dropping the
/// view tears it down.
pub struct ScheduleView {
    shared: Arc<Shared>,
    status_timer: PeriodicTimer,
    highlight_timer: PeriodicTimer,
}

impl ScheduleView {
    pub fn new(
        schedule: PeriodSchedule,
        settings: ViewSettings,
        timetable: Arc<dyn TimetableSource>,
        clock: Arc<dyn Clock>,
        sink: Arc<dyn StatusSink>,
        painter: Arc<dyn CellPainter>,
    ) -> Self {
        let animator = HighlightAnimator::new(
            painter,
            settings.palette,
            settings.accent,
            settings.intervals.blink,
        );
        Self {
            shared: Arc::new(Shared {
                schedule: RwLock::new(schedule),
                timetable,
                clock,
                sink,
                animator,
                selected: Mutex::new(None),
                last_status: Mutex::new(None),
            }),
            status_timer: PeriodicTimer::new("status", settings.intervals.status),
            highlight_timer: PeriodicTimer::new("highlight", settings.intervals.highlight),
        }
    }

    /// Arm both refresh triggers.  Each fires once right away.
    pub fn start(&self) {
        self.start_status();
        self.start_highlight();
    }

    pub fn start_status(&self) {
        let shared = Arc::clone(&self.shared);
        self.status_timer
            .start(FirstTick::Immediately, move || shared.refresh_status().map(|_| ()));
    }

    pub fn stop_status(&self) -> bool {
        self.status_timer.stop()
    }

    pub fn start_highlight(&self) {
        let shared = Arc::clone(&self.shared);
        self.highlight_timer
            .start(FirstTick::Immediately, move || shared.refresh_highlight().map(|_| ()));
    }

    /// Cancel the highlight trigger and any running blink.
    pub fn stop_highlight(&self) -> bool {
        let was_armed = self.highlight_timer.stop();
        self.shared.animator.stop_blink();
        was_armed
    }

    /// Compute, render and publish the status now.
    ///
    /// # Errors
    /// The timetable query failed.  The last good update has been
    /// re-published in that case.
    pub fn refresh_status(&self) -> anyhow::Result<StatusUpdate> {
        self.shared.refresh_status()
    }

    /// Compute a snapshot now and feed it to the animator.
    pub fn refresh_highlight(&self) -> anyhow::Result<BlinkState> {
        self.shared.refresh_highlight()
    }

    /// Switch the view to `teacher`, or to nobody.
    ///
    /// All timers are cancelled and the blink target cleared before the two
    /// refresh triggers are re-armed, so nothing computed for the previous
    /// teacher can reach the display afterwards.
    pub fn select_teacher(&self, teacher: Option<TeacherId>) {
        self.teardown();
        *self
            .shared
            .selected
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = teacher;
        info!(teacher = ?teacher, "Teacher selected");
        self.start();
    }

    pub fn selected_teacher(&self) -> Option<TeacherId> {
        self.shared.selected()
    }

    /// Apply an edited period table to the live schedule and refresh the
    /// status display immediately.
    ///
    /// # Errors
    /// A validation failure rejects the batch; the schedule is unchanged and
    /// nothing is published.
    pub fn apply_period_edit(&self, rows: &[PeriodRow]) -> Result<LoadReport, ScheduleError> {
        let report = {
            let mut schedule = self
                .shared
                .schedule
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            schedule.load(rows).inspect_err(|e| {
                warn!(error = %e, "Period edit rejected; schedule unchanged");
            })?
        };

        if let Err(e) = self.shared.refresh_status() {
            warn!(error = %format!("{e:#}"), "Status refresh after period edit failed");
        }
        Ok(report)
    }

    /// Copy of the live schedule.
    pub fn schedule(&self) -> PeriodSchedule {
        self.shared
            .schedule
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Most recent successful status publication.
    pub fn last_status(&self) -> Option<StatusUpdate> {
        self.shared.last_status()
    }

    /// Snapshot for the selected teacher at the clock's current time.
    pub fn snapshot_now(&self) -> anyhow::Result<Option<StatusSnapshot>> {
        match self.shared.selected() {
            Some(teacher) => self
                .shared
                .snapshot_at(self.shared.clock.now(), teacher)
                .map(Some),
            None => Ok(None),
        }
    }

    /// (day, period) → entry id for the selected teacher.  Empty when no
    /// teacher is selected.
    pub fn cell_index(&self) -> anyhow::Result<CellIndex> {
        match self.shared.selected() {
            Some(teacher) => self.shared.timetable.cell_index(teacher),
            None => Ok(CellIndex::default()),
        }
    }

    pub fn animator(&self) -> &HighlightAnimator {
        &self.shared.animator
    }

    /// `(status, highlight, blink)` armed flags.
    pub fn timers_armed(&self) -> (bool, bool, bool) {
        (
            self.status_timer.is_armed(),
            self.highlight_timer.is_armed(),
            self.shared.animator.is_timer_armed(),
        )
    }

    /// Cancel every timer and clear the blink target.  Idempotent.
    pub fn teardown(&self) {
        let status = self.stop_status();
        let highlight = self.stop_highlight();
        if status || highlight {
            info!("Schedule view timers cancelled");
        }
    }
}

impl Drop for ScheduleView {
    fn drop(&mut self) {
        self.teardown();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
