/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Application configuration loading.
//!
//! The expected YAML structure is (every section optional):
//! ```yaml
//! refresh:
//!   status_interval_secs: 60
//!   highlight_interval_secs: 5
//!   blink_interval_ms: 500
//! colors:
//!   highlight: "#00FF84"
//!   idle: "#F0F0F0"
//!   palette: ["#4CC562", "#AED6F1"]
//! periods:
//!   - { period: 1, start: "08:30", end: "09:15" }
//!   - { period: 2, start: "09:15", end: "10:00" }
//! ```
//!
//! The timetable itself lives in a separate file, see [`timetable`].

pub mod timetable;

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::highlight::{palette::default_palette, Color, SubjectPalette};
use crate::refresh::{RefreshIntervals, ViewSettings};
use crate::schedule::{LoadReport, PeriodRow, PeriodSchedule, ScheduleError};

// ── Private YAML deserialization types ────────────────────────────────────────

/// Top-level wrapper that maps directly onto the YAML file layout.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    refresh: RefreshSection,
    #[serde(default)]
    colors: ColorSection,
    periods: Option<Vec<PeriodRow>>,
}

/// Zero or absent values fall back to the built-in intervals.
#[derive(Debug, Default, Deserialize)]
struct RefreshSection {
    status_interval_secs: Option<u64>,
    highlight_interval_secs: Option<u64>,
    blink_interval_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ColorSection {
    highlight: Option<Color>,
    idle: Option<Color>,
    #[serde(default)]
    palette: Vec<Color>,
}

fn interval_or(
    name: &str,
    value: Option<u64>,
    unit: fn(u64) -> Duration,
    fallback: Duration,
) -> Duration {
    match value {
        Some(0) => {
            warn!("{name} is zero, using default of {fallback:?}");
            fallback
        }
        Some(v) => unit(v),
        None => fallback,
    }
}

// ── Public data structures ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub intervals: RefreshIntervals,
    /// Blink accent.
    pub highlight: Color,
    /// Resting color of cells without a subject.
    pub idle: Color,
    pub palette: Vec<Color>,
    /// `None` means the built-in school day.
    pub periods: Option<Vec<PeriodRow>>,
}

impl AppConfig {
    /// Settings used when no configuration file is supplied.
    pub fn default_config() -> Self {
        Self {
            intervals: RefreshIntervals::default(),
            highlight: Color::default_highlight(),
            idle: Color::default_idle(),
            palette: default_palette(),
            periods: None,
        }
    }

    fn from_file(file: ConfigFile) -> Self {
        let defaults = RefreshIntervals::default();
        let intervals = RefreshIntervals {
            status: interval_or(
                "status_interval_secs",
                file.refresh.status_interval_secs,
                Duration::from_secs,
                defaults.status,
            ),
            highlight: interval_or(
                "highlight_interval_secs",
                file.refresh.highlight_interval_secs,
                Duration::from_secs,
                defaults.highlight,
            ),
            blink: interval_or(
                "blink_interval_ms",
                file.refresh.blink_interval_ms,
                Duration::from_millis,
                defaults.blink,
            ),
        };
        let palette = if file.colors.palette.is_empty() {
            default_palette()
        } else {
            file.colors.palette
        };
        Self {
            intervals,
            highlight: file.colors.highlight.unwrap_or_else(Color::default_highlight),
            idle: file.colors.idle.unwrap_or_else(Color::default_idle),
            palette,
            periods: file.periods,
        }
    }

    /// The period schedule this configuration describes.
    ///
    /// Configured rows are the complete school day.  A row whose times fail
    /// to parse has no window to fall back on and is dropped; the report
    /// lists it.
    ///
    /// # Errors
    /// The rows fail validation.
    pub fn build_schedule(&self) -> Result<(PeriodSchedule, LoadReport), ScheduleError> {
        match &self.periods {
            Some(rows) => PeriodSchedule::from_rows(rows),
            None => {
                let schedule = PeriodSchedule::school_default();
                let applied = schedule.period_numbers().collect();
                Ok((
                    schedule,
                    LoadReport {
                        applied,
                        ..LoadReport::default()
                    },
                ))
            }
        }
    }

    pub fn view_settings(&self) -> ViewSettings {
        ViewSettings {
            intervals: self.intervals,
            palette: SubjectPalette::new(self.palette.clone(), self.idle.clone()),
            accent: self.highlight.clone(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::default_config()
    }
}

// ── ConfigManager ─────────────────────────────────────────────────────────────

/// Loads and holds the application configuration.
#[derive(Debug, Default)]
pub struct ConfigManager {
    config: AppConfig,

    /// Set to `true` after a successful [`load_from_file`](Self::load_from_file).
    loaded: bool,
}

impl ConfigManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `path` and replaces the current configuration.
    ///
    /// On failure the built-in defaults are in effect and
    /// [`is_loaded`](Self::is_loaded) is `false`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or if the YAML is
    /// structurally invalid (including a malformed color).
    pub fn load_from_file(&mut self, path: &Path) -> Result<()> {
        info!("Loading configuration from: {}", path.display());

        self.config = AppConfig::default_config();
        self.loaded = false;

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot open configuration file: {}", path.display()))?;

        let file: ConfigFile = if content.trim().is_empty() {
            ConfigFile::default()
        } else {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML file: {}", path.display()))?
        };

        self.config = AppConfig::from_file(file);
        self.loaded = true;

        let c = &self.config;
        info!(
            status_secs = c.intervals.status.as_secs(),
            highlight_secs = c.intervals.highlight.as_secs(),
            blink_ms = c.intervals.blink.as_millis() as u64,
            palette = c.palette.len(),
            periods = c.periods.as_ref().map_or(0, Vec::len),
            "Configuration loaded"
        );
        if c.periods.is_none() {
            debug!("No periods configured, using the built-in school day");
        }

        Ok(())
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Helper: write a YAML string to a temp file and return it.
    fn yaml_tempfile(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    fn load(yaml: &str) -> ConfigManager {
        let f = yaml_tempfile(yaml);
        let mut mgr = ConfigManager::new();
        mgr.load_from_file(f.path()).unwrap();
        mgr
    }

    #[test]
    fn default_config_has_expected_values() {
        let cfg = AppConfig::default_config();
        assert_eq!(cfg.intervals.status, Duration::from_secs(60));
        assert_eq!(cfg.intervals.highlight, Duration::from_secs(5));
        assert_eq!(cfg.intervals.blink, Duration::from_millis(500));
        assert_eq!(cfg.highlight.as_str(), "#00FF84");
        assert_eq!(cfg.palette.len(), 10);
        assert!(cfg.periods.is_none());
    }

    #[test]
    fn load_full_yaml() {
        let mgr = load(
            r##"
refresh:
  status_interval_secs: 30
  highlight_interval_secs: 2
  blink_interval_ms: 250
colors:
  highlight: "#ff0000"
  idle: "#ffffff"
  palette: ["#111111", "#222222"]
periods:
  - { period: 1, start: "08:00", end: "08:50" }
  - { period: 2, start: "09:00", end: "09:50" }
"##,
        );
        assert!(mgr.is_loaded());
        let cfg = mgr.config();
        assert_eq!(cfg.intervals.status, Duration::from_secs(30));
        assert_eq!(cfg.intervals.highlight, Duration::from_secs(2));
        assert_eq!(cfg.intervals.blink, Duration::from_millis(250));
        assert_eq!(cfg.highlight.as_str(), "#FF0000");
        assert_eq!(cfg.idle.as_str(), "#FFFFFF");
        assert_eq!(cfg.palette.len(), 2);

        let (schedule, report) = cfg.build_schedule().unwrap();
        assert!(report.is_clean());
        assert_eq!(schedule.len(), 2);
        assert_eq!(
            schedule.boundaries().map(|(s, e)| (s.to_string(), e.to_string())),
            Some(("08:00:00".to_string(), "09:50:00".to_string()))
        );
    }

    #[test]
    fn empty_file_uses_defaults() {
        let mgr = load("");
        assert!(mgr.is_loaded());
        assert_eq!(mgr.config(), &AppConfig::default_config());

        let (schedule, report) = mgr.config().build_schedule().unwrap();
        assert_eq!(schedule, PeriodSchedule::school_default());
        assert_eq!(report.applied.len(), 8);
    }

    #[test]
    fn zero_interval_falls_back_to_default() {
        let mgr = load("refresh:\n  status_interval_secs: 0\n");
        assert_eq!(mgr.config().intervals.status, Duration::from_secs(60));
    }

    #[test]
    fn unparseable_period_is_dropped_and_reported() {
        let mgr = load(
            r#"
periods:
  - { period: 1, start: "8.30", end: "09:15" }
  - { period: 2, start: "09:15", end: "10:00" }
"#,
        );
        let (schedule, report) = mgr.config().build_schedule().unwrap();
        assert_eq!(report.dropped, vec![1]);
        assert_eq!(report.parse_errors.len(), 1);
        assert!(schedule.lookup(1).is_none());
        assert_eq!(schedule.len(), 1);
    }

    #[test]
    fn invalid_periods_fail_schedule_build() {
        let mgr = load(
            r#"
periods:
  - { period: 1, start: "09:00", end: "08:00" }
"#,
        );
        let err = mgr.config().build_schedule().unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.period(), 1);
    }

    #[test]
    fn bad_color_is_rejected() {
        let f = yaml_tempfile("colors:\n  highlight: green\n");
        let mut mgr = ConfigManager::new();
        assert!(mgr.load_from_file(f.path()).is_err());
        assert!(!mgr.is_loaded());
    }

    #[test]
    fn missing_file_returns_error() {
        let mut mgr = ConfigManager::new();
        let result = mgr.load_from_file(Path::new("/nonexistent/path/bellwatch.yaml"));
        assert!(result.is_err());
        assert!(!mgr.is_loaded());
    }

    #[test]
    fn unknown_section_is_rejected() {
        let f = yaml_tempfile("nodes: {}\n");
        let mut mgr = ConfigManager::new();
        assert!(mgr.load_from_file(f.path()).is_err());
    }

    #[test]
    fn view_settings_carry_colors_and_intervals() {
        let mgr = load("colors:\n  idle: \"#eeeeee\"\n");
        let mut settings = mgr.config().view_settings();
        assert_eq!(settings.accent, Color::default_highlight());
        assert_eq!(settings.palette.color_for("").as_str(), "#EEEEEE");
        assert_eq!(settings.intervals, RefreshIntervals::default());
    }
}
