/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Bellwatch – live school-day status for a teacher's timetable
//!
//! Module layout:
//!
//! ```text
//! lib.rs
//! ├── schedule/       – period windows, validation, all-or-nothing load
//! ├── timetable       – entries, cell index, TimetableSource + in-memory store
//! ├── engine/         – pure snapshot computation and status text
//! ├── highlight/      – blink state machine and subject palette
//! ├── refresh/        – periodic timers, clock, ScheduleView
//! └── config/         – bellwatch.yaml and timetable file loading
//! ```

pub mod config;
pub mod engine;
pub mod highlight;
pub mod refresh;
pub mod schedule;
pub mod timetable;
