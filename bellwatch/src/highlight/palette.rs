/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Cell colors: the `#RRGGBB` type and the per-subject palette.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer};
use thiserror::Error;

// ── Color ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid color '{0}' (expected #RRGGBB)")]
pub struct InvalidColor(pub String);

/// A `#RRGGBB` color, stored upper-case.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Color(String);

impl Color {
    pub fn parse(text: &str) -> Result<Self, InvalidColor> {
        let text = text.trim();
        let hex = text
            .strip_prefix('#')
            .ok_or_else(|| InvalidColor(text.to_string()))?;
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(InvalidColor(text.to_string()));
        }
        Ok(Self(format!("#{}", hex.to_ascii_uppercase())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// For literals that are already upper-case `#RRGGBB`.
    fn known(hex: &'static str) -> Self {
        Self(hex.to_string())
    }

    /// Accent the blink toggles to.
    pub fn default_highlight() -> Self {
        Self::known("#00FF84")
    }

    /// Resting color of a cell with no subject.
    pub fn default_idle() -> Self {
        Self::known("#F0F0F0")
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Color::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Ten soft pastel colors, cycled through as new subjects appear.
pub fn default_palette() -> Vec<Color> {
    [
        "#4CC562", "#AED6F1", "#F5B7B1", "#D2B4DE", "#ABEBC6", "#FADBD8", "#D6EAF8", "#F9EBEA",
        "#E8DAEF", "#FDEBD0",
    ]
    .into_iter()
    .map(Color::known)
    .collect()
}

// ── SubjectPalette ────────────────────────────────────────────────────────────

/// Stable subject → color assignment.
///
/// A subject gets the next palette color the first time it is seen and keeps
/// it for the life of the palette.  Keys are trimmed and case-folded, so
/// `"Maths"` and `" maths "` share a color.
#[derive(Debug, Clone)]
pub struct SubjectPalette {
    colors: Vec<Color>,
    idle: Color,
    assigned: HashMap<String, Color>,
    next: usize,
}

impl SubjectPalette {
    /// An empty `colors` list falls back to [`default_palette`].
    pub fn new(colors: Vec<Color>, idle: Color) -> Self {
        let colors = if colors.is_empty() {
            default_palette()
        } else {
            colors
        };
        Self {
            colors,
            idle,
            assigned: HashMap::new(),
            next: 0,
        }
    }

    pub fn idle(&self) -> &Color {
        &self.idle
    }

    /// Color for `subject`; the idle color for an empty subject.
    pub fn color_for(&mut self, subject: &str) -> Color {
        let key = subject.trim().to_lowercase();
        if key.is_empty() {
            return self.idle.clone();
        }
        if let Some(c) = self.assigned.get(&key) {
            return c.clone();
        }
        let color = self.colors[self.next % self.colors.len()].clone();
        self.next += 1;
        self.assigned.insert(key, color.clone());
        color
    }
}

impl Default for SubjectPalette {
    fn default() -> Self {
        Self::new(default_palette(), Color::default_idle())
    }
}
