/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use chrono::{Datelike, Local, NaiveDateTime, NaiveTime, Weekday};
use clap::Parser;
use tracing::{debug, error, info, warn};

use bellwatch::config::timetable::load_timetable;
use bellwatch::config::ConfigManager;
use bellwatch::highlight::{CellPainter, Color};
use bellwatch::refresh::{
    Clock, ManualClock, ScheduleView, StatusSink, StatusUpdate, SystemClock,
};
use bellwatch::schedule::parse_time_of_day;
use bellwatch::timetable::{CellKey, InMemoryTimetable, TeacherId};

// ── CLI argument definition ───────────────────────────────────────────────────

/// Live school-day status for one teacher.
///
/// Example:
///   bellwatch -c bellwatch.yaml -t timetable.yaml --teacher 1
///   bellwatch -t timetable.yaml --teacher 1 --once --at 10:05 --day tue
#[derive(Debug, Parser)]
#[command(
    name = "bellwatch",
    about = "Live school-day status: current period, next class, highlighted cell",
    long_about = None,
)]
struct Cli {
    /// Path to the YAML application configuration (intervals, colors, periods).
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Path to the YAML timetable file.
    #[arg(short = 't', long = "timetable")]
    timetable: Option<PathBuf>,

    /// Id of the teacher to follow.
    #[arg(long = "teacher")]
    teacher: Option<u64>,

    /// Print the status once and exit.
    #[arg(long = "once", default_value_t = false)]
    once: bool,

    /// Time of day to evaluate in one-shot mode (HH:MM).
    #[arg(long = "at", value_parser = parse_at, requires = "once")]
    at: Option<NaiveTime>,

    /// Day of the current week to evaluate in one-shot mode.
    #[arg(long = "day", value_parser = parse_day, requires = "once")]
    day: Option<Weekday>,
}

fn parse_at(text: &str) -> std::result::Result<NaiveTime, String> {
    parse_time_of_day(text).ok_or_else(|| format!("expected HH:MM, got '{text}'"))
}

fn parse_day(text: &str) -> std::result::Result<Weekday, String> {
    text.trim()
        .parse()
        .map_err(|_| format!("expected a day name, got '{text}'"))
}

/// `base` moved to `day` of the same Monday-started week and to `at`.
fn evaluation_time(
    base: NaiveDateTime,
    at: Option<NaiveTime>,
    day: Option<Weekday>,
) -> NaiveDateTime {
    let mut date = base.date();
    if let Some(day) = day {
        let offset = i64::from(day.num_days_from_monday())
            - i64::from(date.weekday().num_days_from_monday());
        date = date
            .checked_add_signed(chrono::Duration::days(offset))
            .unwrap_or(date);
    }
    date.and_time(at.unwrap_or_else(|| base.time()))
}

// ── Console presentation ──────────────────────────────────────────────────────

struct ConsoleStatus;

impl StatusSink for ConsoleStatus {
    fn publish(&self, update: &StatusUpdate) {
        let line: Vec<&str> = update.text.lines().collect();
        println!("{}", line.join(" | "));
    }
}

struct LoggingPainter;

impl CellPainter for LoggingPainter {
    fn paint_cell(&self, cell: CellKey, color: &Color) {
        debug!(cell = %cell, color = %color, "paint");
    }

    fn blink_target_set(&self, cell: CellKey) {
        info!(cell = %cell, "Highlighting current class");
    }

    fn blink_target_cleared(&self, cell: CellKey) {
        info!(cell = %cell, "Highlight cleared");
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Level is controlled by the RUST_LOG env-var (e.g. RUST_LOG=debug).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    info!(
        config    = ?cli.config,
        timetable = ?cli.timetable,
        teacher   = ?cli.teacher,
        once      = cli.once,
        "Bellwatch starting up..."
    );

    if let Err(e) = run(cli).await {
        error!("{:#}", e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    // ── Load configuration ────────────────────────────────────────────────────
    let mut config_manager = ConfigManager::new();
    match &cli.config {
        Some(path) => config_manager.load_from_file(path)?,
        None => warn!("No configuration file provided, using default settings"),
    }
    let config = config_manager.config();

    let (schedule, report) = config
        .build_schedule()
        .context("Configured period table is invalid")?;
    for e in &report.parse_errors {
        warn!("Ignoring period row: {e}");
    }

    // ── Load timetable ────────────────────────────────────────────────────────
    let timetable = match &cli.timetable {
        Some(path) => load_timetable(path)?,
        None => {
            warn!("No timetable file provided, every period will read as free");
            InMemoryTimetable::new()
        }
    };

    let teacher = cli.teacher.map(TeacherId);
    if let Some(id) = teacher {
        match timetable.teacher(id) {
            Some(t) => info!(teacher = %id, name = %t.name, "Following teacher"),
            None => warn!(teacher = %id, "Teacher not found in timetable"),
        }
    }

    // ── Build the view ────────────────────────────────────────────────────────
    let clock: Arc<dyn Clock> = if cli.once {
        let now = evaluation_time(Local::now().naive_local(), cli.at, cli.day);
        Arc::new(ManualClock::new(now))
    } else {
        Arc::new(SystemClock)
    };

    let view = ScheduleView::new(
        schedule,
        config.view_settings(),
        Arc::new(timetable),
        clock,
        Arc::new(ConsoleStatus),
        Arc::new(LoggingPainter),
    );

    if cli.once {
        view.select_teacher(teacher);
        view.teardown();
        view.refresh_status()?;
        return Ok(());
    }

    view.select_teacher(teacher);
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow!("Failed to wait for Ctrl-C: {e}"))?;

    info!("Shutting down");
    view.teardown();
    Ok(())
}
