//! Time sections and areas
//!
//! A [`TimeSection`] marks a time-of-day range on the dial. The clock keeps
//! two lists of them, sections (drawn on the tick ring) and areas (drawn as
//! filled wedges); both behave the same and are always kept ordered by start
//! time.

use chime_core::Color;
use chrono::NaiveTime;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Stable identity of a section
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SectionId(u64);

impl SectionId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "section#{}", self.0)
    }
}

/// Which list a section lives in
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SectionKind {
    Section,
    Area,
}

/// Change of a section's active state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SectionTransition {
    Entered,
    Left,
}

/// Notification sent to section listeners
#[derive(Clone, Debug, PartialEq)]
pub struct SectionEvent {
    pub kind: SectionKind,
    pub section: TimeSection,
    pub transition: SectionTransition,
}

/// A time-of-day interval with display metadata
#[derive(Clone, Debug)]
pub struct TimeSection {
    id: SectionId,
    start: NaiveTime,
    stop: NaiveTime,
    text: String,
    color: Color,
    highlight_color: Color,
    text_color: Color,
    active: bool,
}

impl TimeSection {
    pub fn new(start: NaiveTime, stop: NaiveTime) -> Self {
        Self {
            id: SectionId::next(),
            start,
            stop,
            text: String::new(),
            color: Color::TRANSPARENT,
            highlight_color: Color::TRANSPARENT,
            text_color: Color::TRANSPARENT,
            active: false,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_highlight_color(mut self, color: Color) -> Self {
        self.highlight_color = color;
        self
    }

    pub fn with_text_color(mut self, color: Color) -> Self {
        self.text_color = color;
        self
    }

    pub fn id(&self) -> SectionId {
        self.id
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn stop(&self) -> NaiveTime {
        self.stop
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn highlight_color(&self) -> Color {
        self.highlight_color
    }

    pub fn text_color(&self) -> Color {
        self.text_color
    }

    /// Whether the last checked value was inside the section
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Check whether `time` lies in `[start, stop]`.
    ///
    /// A section whose start is after its stop wraps past midnight, so
    /// 22:00..=02:00 contains 23:30 and 01:00.
    pub fn contains(&self, time: NaiveTime) -> bool {
        if self.start <= self.stop {
            self.start <= time && time <= self.stop
        } else {
            time >= self.start || time <= self.stop
        }
    }

    /// Update the active flag for `time`, reporting a transition if the flag
    /// changed
    pub fn check_for_value(&mut self, time: NaiveTime) -> Option<SectionTransition> {
        let inside = self.contains(time);
        if inside == self.active {
            return None;
        }
        self.active = inside;
        Some(if inside {
            SectionTransition::Entered
        } else {
            SectionTransition::Left
        })
    }
}

impl PartialEq for TimeSection {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TimeSection {}

/// Stable sort by start time
pub(crate) fn sort_sections(sections: &mut [TimeSection]) {
    sections.sort_by_key(|section| section.start);
}
