/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Timetable entries and the read-only query interface the engine uses.
//!
//! The timetable itself belongs to the CRUD layer.  The engine only ever asks
//! one question, "what does teacher T have on day D?", through
//! [`TimetableSource`].  [`InMemoryTimetable`] is the implementation used by
//! the binary and the tests; a database-backed store implements the same
//! trait.
//!
//! ```text
//! (teacher, day, period) ──► TimetableEntry { id, class_name, subject }
//! (day, period)          ──► EntryId          (CellIndex, per teacher)
//! ```

use std::collections::{BTreeMap, HashMap};

use chrono::Weekday;
use thiserror::Error;

// ── Identity ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TeacherId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(pub u64);

impl std::fmt::Display for TeacherId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── School days ───────────────────────────────────────────────────────────────

/// Days shown in the timetable grid.  Sunday has no column.
pub const SCHOOL_DAYS: [Weekday; 6] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

/// Full English day name (`"Monday"`), as stored in the timetable.
///
/// `chrono::Weekday`'s own `Display` prints the short form.
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

// ── TimetableEntry ────────────────────────────────────────────────────────────

/// Class name that marks a period the teacher has deliberately left free.
pub const FREE_CLASS: &str = "FREE";

/// One (day, period) → (class, subject) assignment for a teacher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimetableEntry {
    pub id: EntryId,
    pub day: Weekday,
    pub period_number: u32,
    pub class_name: String,
    pub subject: String,
}

impl TimetableEntry {
    /// Build an entry, clearing `subject` when the class is the free
    /// sentinel.
    pub fn new(
        id: EntryId,
        day: Weekday,
        period_number: u32,
        class_name: impl Into<String>,
        subject: impl Into<String>,
    ) -> Self {
        let class_name = class_name.into().trim().to_string();
        let mut subject = subject.into().trim().to_string();
        if is_free_class(&class_name) {
            subject.clear();
        }
        Self {
            id,
            day,
            period_number,
            class_name,
            subject,
        }
    }

    pub fn is_free(&self) -> bool {
        is_free_class(&self.class_name)
    }

    pub fn cell(&self) -> CellKey {
        CellKey {
            day: self.day,
            period: self.period_number,
        }
    }
}

fn day_name(day: &Weekday) -> &'static str {
    weekday_name(*day)
}

fn is_free_class(class_name: &str) -> bool {
    class_name.trim().eq_ignore_ascii_case(FREE_CLASS)
}

// ── Grid cells ────────────────────────────────────────────────────────────────

/// Position of one cell in the timetable grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellKey {
    pub day: Weekday,
    pub period: u32,
}

impl std::fmt::Display for CellKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} P{}", weekday_name(self.day), self.period)
    }
}

/// (day, period) → entry id for one teacher.
///
/// The presentation layer asks this map which entry a clicked cell refers to
/// instead of storing the id on the widget.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellIndex {
    cells: HashMap<CellKey, EntryId>,
}

impl CellIndex {
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a TimetableEntry>) -> Self {
        Self {
            cells: entries.into_iter().map(|e| (e.cell(), e.id)).collect(),
        }
    }

    pub fn entry_at(&self, day: Weekday, period: u32) -> Option<EntryId> {
        self.cells.get(&CellKey { day, period }).copied()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

// ── TimetableSource ───────────────────────────────────────────────────────────

/// Read-only query interface onto the collaborator's timetable store.
///
/// Implementations must not expose half-applied writes: a call returns either
/// the state before or after a concurrent edit.
pub trait TimetableSource: Send + Sync {
    /// All entries of `teacher` on `day`, in any order.
    fn entries_for(&self, teacher: TeacherId, day: Weekday) -> anyhow::Result<Vec<TimetableEntry>>;

    /// Cell index across the whole school week.
    fn cell_index(&self, teacher: TeacherId) -> anyhow::Result<CellIndex> {
        let mut entries = Vec::new();
        for day in SCHOOL_DAYS {
            entries.extend(self.entries_for(teacher, day)?);
        }
        Ok(CellIndex::from_entries(&entries))
    }
}

// ── InMemoryTimetable ─────────────────────────────────────────────────────────

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimetableError {
    /// A second entry for a (teacher, day, period) slot.
    #[error("teacher {teacher} already has an entry on {} period {period}", day_name(.day))]
    SlotTaken {
        teacher: TeacherId,
        day: Weekday,
        period: u32,
    },
}

/// A teacher as listed in the timetable file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Teacher {
    pub id: TeacherId,
    pub name: String,
}

/// Timetable held entirely in memory, keyed by (teacher, day, period).
#[derive(Debug, Default)]
pub struct InMemoryTimetable {
    teachers: BTreeMap<TeacherId, Teacher>,
    slots: HashMap<(TeacherId, Weekday, u32), TimetableEntry>,
    next_id: u64,
}

impl InMemoryTimetable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_teacher(&mut self, id: TeacherId, name: impl Into<String>) {
        self.teachers.insert(
            id,
            Teacher {
                id,
                name: name.into(),
            },
        );
    }

    pub fn teacher(&self, id: TeacherId) -> Option<&Teacher> {
        self.teachers.get(&id)
    }

    pub fn teachers(&self) -> impl Iterator<Item = &Teacher> + '_ {
        self.teachers.values()
    }

    /// Add an entry and return its newly assigned id.
    ///
    /// # Errors
    /// [`TimetableError::SlotTaken`] if the slot is already filled.
    pub fn insert(
        &mut self,
        teacher: TeacherId,
        day: Weekday,
        period: u32,
        class_name: &str,
        subject: &str,
    ) -> Result<EntryId, TimetableError> {
        let key = (teacher, day, period);
        if self.slots.contains_key(&key) {
            return Err(TimetableError::SlotTaken {
                teacher,
                day,
                period,
            });
        }
        self.next_id += 1;
        let id = EntryId(self.next_id);
        self.slots
            .insert(key, TimetableEntry::new(id, day, period, class_name, subject));
        Ok(id)
    }

    pub fn entry_count(&self) -> usize {
        self.slots.len()
    }
}

impl TimetableSource for InMemoryTimetable {
    fn entries_for(&self, teacher: TeacherId, day: Weekday) -> anyhow::Result<Vec<TimetableEntry>> {
        let mut entries: Vec<TimetableEntry> = self
            .slots
            .iter()
            .filter(|((t, d, _), _)| *t == teacher && *d == day)
            .map(|(_, e)| e.clone())
            .collect();
        entries.sort_by_key(|e| e.period_number);
        Ok(entries)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
