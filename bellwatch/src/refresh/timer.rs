/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! A named, restartable periodic timer with exactly one live handle.
//!
//! Each logical timer of the view (status refresh, highlight refresh, blink
//! toggle) is one [`PeriodicTimer`].  Arming it spawns a tokio task that owns
//! a fresh [`CancellationToken`]; the timer keeps that token and the task's
//! `JoinHandle` in a single slot.
//!
//! # Cancellation rules
//! * [`start`](PeriodicTimer::start) cancels whatever is in the slot before
//!   arming, so calling it twice leaves one live task.
//! * [`stop`](PeriodicTimer::stop) cancels the token and aborts the task.  The
//!   task checks the token immediately before every tick, so on a
//!   current-thread runtime no callback runs after `stop` returns.
//! * Dropping the timer stops it.
//!
//! # Failing ticks
//! A tick returning `Err` is logged at `warn`; a tick that panics is caught
//! and logged at `error`.  Neither affects the schedule of later ticks.

use std::panic::AssertUnwindSafe;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

/// When the first tick fires after [`PeriodicTimer::start`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FirstTick {
    /// Right away, then every period.
    Immediately,
    /// One full period after arming.
    AfterPeriod,
}

struct Armed {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl Armed {
    fn disarm(self) {
        self.cancel.cancel();
        self.task.abort();
    }
}

pub struct PeriodicTimer {
    name: &'static str,
    period: Duration,
    armed: Mutex<Option<Armed>>,
}

impl PeriodicTimer {
    /// A zero `period` is raised to one millisecond.
    pub fn new(name: &'static str, period: Duration) -> Self {
        Self {
            name,
            period: period.max(Duration::from_millis(1)),
            armed: Mutex::new(None),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Arm the timer, replacing any previous arm.
    ///
    /// # Panics
    /// Must be called from within a tokio runtime.
    pub fn start<F>(&self, first: FirstTick, tick: F)
    where
        F: FnMut() -> anyhow::Result<()> + Send + 'static,
    {
        let mut slot = self.slot();
        if let Some(previous) = slot.take() {
            previous.disarm();
            debug!(timer = self.name, "Cancelled previous arm before restart");
        }

        let cancel = CancellationToken::new();
        let task = tokio::spawn(run_ticks(
            self.name,
            self.period,
            first,
            cancel.clone(),
            tick,
        ));
        *slot = Some(Armed { cancel, task });

        debug!(
            timer = self.name,
            period_ms = self.period.as_millis() as u64,
            first = ?first,
            "Timer armed"
        );
    }

    /// Cancel the pending tick.  Returns `false` if nothing was armed.
    pub fn stop(&self) -> bool {
        match self.slot().take() {
            Some(armed) => {
                armed.disarm();
                debug!(timer = self.name, "Timer stopped");
                true
            }
            None => false,
        }
    }

    /// `true` while an arm is live.
    pub fn is_armed(&self) -> bool {
        self.slot()
            .as_ref()
            .is_some_and(|a| !a.cancel.is_cancelled() && !a.task.is_finished())
    }

    fn slot(&self) -> MutexGuard<'_, Option<Armed>> {
        self.armed.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for PeriodicTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for PeriodicTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PeriodicTimer")
            .field("name", &self.name)
            .field("period", &self.period)
            .field("armed", &self.is_armed())
            .finish()
    }
}

async fn run_ticks<F>(
    name: &'static str,
    period: Duration,
    first: FirstTick,
    cancel: CancellationToken,
    mut tick: F,
) where
    F: FnMut() -> anyhow::Result<()> + Send + 'static,
{
    let start = match first {
        FirstTick::Immediately => Instant::now(),
        FirstTick::AfterPeriod => Instant::now() + period,
    };
    let mut interval = tokio::time::interval_at(start, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = interval.tick() => {}
        }
        if cancel.is_cancelled() {
            break;
        }

        match std::panic::catch_unwind(AssertUnwindSafe(|| tick())) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(timer = name, error = %format!("{e:#}"), "Tick failed"),
            Err(_) => error!(timer = name, "Tick panicked"),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const PERIOD: Duration = Duration::from_millis(100);

    fn counter() -> (Arc<AtomicUsize>, impl FnMut() -> anyhow::Result<()> + Send + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        (count, move || {
            c.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }

    /// Sleep long enough for ticks at 0, 1, 2 and 3 periods.
    async fn three_and_a_half_periods() {
        tokio::time::sleep(PERIOD * 3 + PERIOD / 2).await;
    }

    #[tokio::test(start_paused = true)]
    async fn immediate_first_tick_then_every_period() {
        let timer = PeriodicTimer::new("test", PERIOD);
        let (count, tick) = counter();
        timer.start(FirstTick::Immediately, tick);
        three_and_a_half_periods().await;
        assert_eq!(count.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn after_period_skips_the_immediate_tick() {
        let timer = PeriodicTimer::new("test", PERIOD);
        let (count, tick) = counter();
        timer.start(FirstTick::AfterPeriod, tick);
        three_and_a_half_periods().await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_leaves_a_single_live_task() {
        let timer = PeriodicTimer::new("test", PERIOD);
        let (count, _) = counter();
        for _ in 0..3 {
            let c = count.clone();
            timer.start(FirstTick::AfterPeriod, move || {
                c.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });
        }
        three_and_a_half_periods().await;
        // Three concurrent arms would have produced nine ticks.
        assert_eq!(count.load(Ordering::SeqCst), 3);
        assert!(timer.is_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn stop_prevents_further_ticks() {
        let timer = PeriodicTimer::new("test", PERIOD);
        let (count, tick) = counter();
        timer.start(FirstTick::Immediately, tick);
        tokio::time::sleep(PERIOD / 2).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        assert!(timer.stop());
        assert!(!timer.is_armed());
        three_and_a_half_periods().await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_is_idempotent() {
        let timer = PeriodicTimer::new("test", PERIOD);
        assert!(!timer.stop());
        let (_, tick) = counter();
        timer.start(FirstTick::Immediately, tick);
        assert!(timer.stop());
        assert!(!timer.stop());
    }

    #[tokio::test(start_paused = true)]
    async fn failing_tick_does_not_cancel_the_timer() {
        let timer = PeriodicTimer::new("test", PERIOD);
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        timer.start(FirstTick::Immediately, move || {
            c.fetch_add(1, Ordering::SeqCst);
            anyhow::bail!("storage unavailable")
        });
        three_and_a_half_periods().await;
        assert_eq!(count.load(Ordering::SeqCst), 4);
        assert!(timer.is_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn panicking_tick_does_not_cancel_the_timer() {
        let timer = PeriodicTimer::new("test", PERIOD);
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        timer.start(FirstTick::Immediately, move || {
            if c.fetch_add(1, Ordering::SeqCst) == 0 {
                panic!("first tick blows up");
            }
            Ok(())
        });
        three_and_a_half_periods().await;
        assert_eq!(count.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_stops_the_timer() {
        let (count, tick) = counter();
        {
            let timer = PeriodicTimer::new("test", PERIOD);
            timer.start(FirstTick::AfterPeriod, tick);
        }
        three_and_a_half_periods().await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
