/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Timetable file loading.
//!
//! ```yaml
//! teachers:
//!   - id: 1
//!     name: "Ms. Byrne"
//!     entries:
//!       - { day: Monday, period: 1, class: "7A", subject: "Maths" }
//!       - { day: Monday, period: 3, class: "FREE" }
//! ```
//!
//! `day` accepts full or three-letter English names, any case.  Sunday is
//! not a school day and is rejected.

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::Weekday;
use serde::Deserialize;
use tracing::{debug, info};

use crate::timetable::{weekday_name, InMemoryTimetable, TeacherId, SCHOOL_DAYS};

// ── Private YAML deserialization types ────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct TimetableFile {
    #[serde(default)]
    teachers: Vec<TeacherSection>,
}

#[derive(Debug, Deserialize)]
struct TeacherSection {
    id: u64,
    name: String,
    #[serde(default)]
    entries: Vec<EntrySection>,
}

#[derive(Debug, Deserialize)]
struct EntrySection {
    day: String,
    period: u32,
    #[serde(rename = "class", alias = "class_name")]
    class_name: String,
    #[serde(default)]
    subject: String,
}

fn parse_school_day(text: &str) -> Result<Weekday> {
    let day: Weekday = text
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("unknown day '{text}'"))?;
    if !SCHOOL_DAYS.contains(&day) {
        bail!("{} is not a school day", weekday_name(day));
    }
    Ok(day)
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Parse a timetable document into an [`InMemoryTimetable`].
///
/// # Errors
/// Malformed YAML, an unknown or non-school day, a repeated teacher id or a
/// second entry for the same (teacher, day, period) slot.
pub fn parse_timetable(content: &str) -> Result<InMemoryTimetable> {
    let file: TimetableFile =
        serde_yaml::from_str(content).context("Failed to parse timetable YAML")?;

    let mut timetable = InMemoryTimetable::new();
    let mut ids = BTreeSet::new();

    for teacher in file.teachers {
        let id = TeacherId(teacher.id);
        if !ids.insert(id) {
            bail!("teacher id {id} is listed twice");
        }
        timetable.add_teacher(id, teacher.name.trim());

        for entry in &teacher.entries {
            let day = parse_school_day(&entry.day)
                .with_context(|| format!("teacher {id}, period {}", entry.period))?;
            timetable.insert(id, day, entry.period, &entry.class_name, &entry.subject)?;
        }
        debug!(
            teacher = %id,
            name = %teacher.name,
            entries = teacher.entries.len(),
            "  teacher"
        );
    }

    Ok(timetable)
}

/// Read and parse the timetable file at `path`.
pub fn load_timetable(path: &Path) -> Result<InMemoryTimetable> {
    info!("Loading timetable from: {}", path.display());

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot open timetable file: {}", path.display()))?;
    let timetable = parse_timetable(&content)
        .with_context(|| format!("Invalid timetable: {}", path.display()))?;

    info!(
        teachers = timetable.teachers().count(),
        entries = timetable.entry_count(),
        "Timetable loaded"
    );
    Ok(timetable)
}
