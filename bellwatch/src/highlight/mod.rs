/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Blinking highlight on the timetable cell of the class being taught now.
//!
//! # State machine
//!
//! ```text
//!            DURING + active entry for selected teacher
//!   ┌──────┐ ───────────────────────────────────────────► ┌──────────┐
//!   │ IDLE │                                              │ BLINKING │──┐ 500 ms toggle
//!   └──────┘ ◄─────────────────────────────────────────── └──────────┘◄─┘ resting ⇄ accent
//!            other phase / no entry / other entry / teacher change
//! ```
//!
//! At most one cell blinks.  Arming a new target always goes through
//! [`HighlightAnimator::stop_blink`] first, which cancels the toggle timer and
//! repaints the old cell with the resting color captured when it was armed.
//!
//! The toggle callback carries the generation number it was armed with and
//! does nothing once the animator has moved to a newer generation, so a
//! toggle that was already in flight when the target changed cannot leave
//! the accent color on a cell.

pub mod palette;

pub use palette::{Color, SubjectPalette};

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::{debug, info};

use crate::engine::{Phase, StatusSnapshot};
use crate::refresh::timer::{FirstTick, PeriodicTimer};
use crate::timetable::{CellKey, EntryId, TeacherId};

/// Interval between two color toggles of the blink target.
pub const DEFAULT_BLINK_INTERVAL: Duration = Duration::from_millis(500);

// ── Presentation interface ────────────────────────────────────────────────────

/// Highlight commands sent to the presentation layer.
///
/// Implementations are called with the animator's internal lock held and
/// must not call back into the animator.
pub trait CellPainter: Send + Sync {
    /// Set the background of one grid cell.
    fn paint_cell(&self, cell: CellKey, color: &Color);

    /// `cell` has become the blink target.
    fn blink_target_set(&self, _cell: CellKey) {}

    /// `cell` is no longer the blink target and has its resting color back.
    fn blink_target_cleared(&self, _cell: CellKey) {}
}

// ── Types ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlinkState {
    Idle,
    Blinking,
}

/// Everything that identifies one blink target.  Two equal requests describe
/// the same highlight; a changed subject counts as a new target because its
/// resting color may differ.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlinkRequest {
    pub teacher: TeacherId,
    pub cell: CellKey,
    pub entry: EntryId,
    pub subject: String,
}

impl BlinkRequest {
    /// The request a snapshot calls for, if any: DURING with an active entry.
    pub fn from_snapshot(teacher: TeacherId, snapshot: &StatusSnapshot) -> Option<Self> {
        if snapshot.phase != Phase::During {
            return None;
        }
        let entry = snapshot.active_entry.as_ref()?;
        Some(Self {
            teacher,
            cell: entry.cell(),
            entry: entry.id,
            subject: entry.subject.clone(),
        })
    }
}

struct Target {
    request: BlinkRequest,
    resting: Color,
    lit: bool,
}

struct Inner {
    target: Option<Target>,
    palette: SubjectPalette,
    generation: u64,
}

// ── HighlightAnimator ─────────────────────────────────────────────────────────

pub struct HighlightAnimator {
    inner: Arc<Mutex<Inner>>,
    painter: Arc<dyn CellPainter>,
    accent: Color,
    blink_timer: PeriodicTimer,
}

impl HighlightAnimator {
    pub fn new(
        painter: Arc<dyn CellPainter>,
        palette: SubjectPalette,
        accent: Color,
        blink_interval: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                target: None,
                palette,
                generation: 0,
            })),
            painter,
            accent,
            blink_timer: PeriodicTimer::new("blink", blink_interval),
        }
    }

    /// Feed one highlight-refresh result into the state machine.
    ///
    /// `teacher` is the currently selected teacher; `None` always ends in
    /// IDLE.  An unchanged target keeps blinking without a restart.
    pub fn observe(&self, teacher: Option<TeacherId>, snapshot: &StatusSnapshot) -> BlinkState {
        let wanted = teacher.and_then(|t| BlinkRequest::from_snapshot(t, snapshot));
        match wanted {
            Some(request) => {
                if self.current_request().as_ref() != Some(&request) {
                    self.start_blink(request);
                }
            }
            None => self.stop_blink(),
        }
        self.state()
    }

    /// Make `request` the blink target.
    ///
    /// Any previous target is cleared first (timer cancelled, color
    /// restored), even when it is the same cell.
    ///
    /// # Panics
    /// Must be called from within a tokio runtime.
    pub fn start_blink(&self, request: BlinkRequest) {
        self.stop_blink();

        let generation = {
            let mut inner = self.lock();
            let resting = inner.palette.color_for(&request.subject);
            inner.generation += 1;
            info!(
                cell = %request.cell,
                teacher = %request.teacher,
                entry = %request.entry,
                resting = %resting,
                "Blink target armed"
            );
            self.painter.blink_target_set(request.cell);
            inner.target = Some(Target {
                request,
                resting,
                lit: false,
            });
            inner.generation
        };

        let inner = Arc::clone(&self.inner);
        let painter = Arc::clone(&self.painter);
        let accent = self.accent.clone();
        self.blink_timer.start(FirstTick::AfterPeriod, move || {
            toggle(&inner, painter.as_ref(), &accent, generation);
            Ok(())
        });
    }

    /// Cancel the toggle timer and give the target its resting color back.
    /// No-op when IDLE.
    pub fn stop_blink(&self) {
        self.blink_timer.stop();

        let mut inner = self.lock();
        inner.generation += 1;
        if let Some(target) = inner.target.take() {
            let cell = target.request.cell;
            self.painter.paint_cell(cell, &target.resting);
            self.painter.blink_target_cleared(cell);
            info!(cell = %cell, restored = %target.resting, "Blink target cleared");
        }
    }

    pub fn state(&self) -> BlinkState {
        if self.lock().target.is_some() {
            BlinkState::Blinking
        } else {
            BlinkState::Idle
        }
    }

    /// Cell currently blinking.
    pub fn target(&self) -> Option<CellKey> {
        self.lock().target.as_ref().map(|t| t.request.cell)
    }

    /// Color the target is restored to when blinking stops.
    pub fn resting_color(&self) -> Option<Color> {
        self.lock().target.as_ref().map(|t| t.resting.clone())
    }

    /// Palette color for `subject`, shared with the grid so resting colors
    /// match what the grid painted.
    pub fn subject_color(&self, subject: &str) -> Color {
        self.lock().palette.color_for(subject)
    }

    /// `true` while the toggle timer is live.
    pub fn is_timer_armed(&self) -> bool {
        self.blink_timer.is_armed()
    }

    fn current_request(&self) -> Option<BlinkRequest> {
        self.lock().target.as_ref().map(|t| t.request.clone())
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for HighlightAnimator {
    fn drop(&mut self) {
        self.stop_blink();
    }
}

/// One blink step.  Stale generations do nothing.
fn toggle(inner: &Mutex<Inner>, painter: &dyn CellPainter, accent: &Color, generation: u64) {
    let mut inner = inner.lock().unwrap_or_else(PoisonError::into_inner);
    if inner.generation != generation {
        debug!(generation, current = inner.generation, "Stale blink tick ignored");
        return;
    }
    if let Some(target) = inner.target.as_mut() {
        target.lit = !target.lit;
        let color = if target.lit { accent } else { &target.resting };
        painter.paint_cell(target.request.cell, color);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
