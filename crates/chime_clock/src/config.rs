//! TOML clock configuration
//!
//! Every field is optional; a config only overrides what it names. The skin
//! is applied first so explicit colors and flags win over its preset.
//!
//! ```toml
//! skin = "plain"
//! title = "Kitchen"
//! auto_night_mode = true
//! alarms_enabled = true
//!
//! [visibility]
//! date = true
//!
//! [colors]
//! second_needle = "#ff0000"
//!
//! [[alarms]]
//! time = "2024-01-01T07:30:00"
//! repetition = "daily"
//! text = "Wake up"
//!
//! [[sections]]
//! start = "09:00:00"
//! stop = "17:00:00"
//! text = "Office hours"
//! color = "#3366ff80"
//! ```

use crate::alarm::{Alarm, Repetition};
use crate::clock::{Clock, ClockBuilder};
use crate::error::{ClockError, Result};
use crate::section::TimeSection;
use crate::style::{LcdDesign, LcdFont, SkinType, TickLabelLocation};
use chime_core::{Brush, Color};
use chrono::{NaiveDateTime, NaiveTime};
use serde::Deserialize;
use std::path::Path;

/// Top-level clock config document
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClockConfig {
    pub skin: Option<SkinType>,
    pub time: Option<NaiveDateTime>,
    pub title: Option<String>,
    pub text: Option<String>,
    pub locale: Option<String>,
    pub running: Option<bool>,
    pub discrete_seconds: Option<bool>,
    pub discrete_minutes: Option<bool>,
    pub night_mode: Option<bool>,
    pub auto_night_mode: Option<bool>,
    pub alarms_enabled: Option<bool>,
    pub check_sections_for_value: Option<bool>,
    pub check_areas_for_value: Option<bool>,
    pub lcd_design: Option<LcdDesign>,
    pub lcd_font: Option<LcdFont>,
    pub tick_label_location: Option<TickLabelLocation>,
    pub visibility: VisibilityConfig,
    pub colors: ColorConfig,
    pub paints: PaintConfig,
    /// Replaces the alarm list when present
    pub alarms: Option<Vec<AlarmConfig>>,
    /// Replaces the section list when present
    pub sections: Option<Vec<SectionConfig>>,
    /// Replaces the area list when present
    pub areas: Option<Vec<SectionConfig>>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VisibilityConfig {
    pub title: Option<bool>,
    pub text: Option<bool>,
    pub date: Option<bool>,
    pub seconds: Option<bool>,
    pub sections: Option<bool>,
    pub areas: Option<bool>,
    pub lcd_crystal: Option<bool>,
    pub shadows: Option<bool>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    pub title: Option<Color>,
    pub text: Option<Color>,
    pub date: Option<Color>,
    pub hour_tick_mark: Option<Color>,
    pub minute_tick_mark: Option<Color>,
    pub hour_needle: Option<Color>,
    pub minute_needle: Option<Color>,
    pub second_needle: Option<Color>,
    pub knob: Option<Color>,
}

/// Background, border and foreground paints: a color string or a gradient
/// table
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PaintConfig {
    pub background: Option<Brush>,
    pub border: Option<Brush>,
    pub foreground: Option<Brush>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AlarmConfig {
    pub time: NaiveDateTime,
    #[serde(default)]
    pub repetition: Repetition,
    #[serde(default = "default_true")]
    pub armed: bool,
    #[serde(default)]
    pub text: String,
}

fn default_true() -> bool {
    true
}

impl AlarmConfig {
    pub fn to_alarm(&self) -> Alarm {
        Alarm::new(self.time, self.repetition)
            .with_armed(self.armed)
            .with_text(self.text.clone())
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SectionConfig {
    pub start: NaiveTime,
    pub stop: NaiveTime,
    #[serde(default)]
    pub text: String,
    pub color: Option<Color>,
    pub highlight_color: Option<Color>,
    pub text_color: Option<Color>,
}

impl SectionConfig {
    pub fn to_section(&self) -> TimeSection {
        let mut section = TimeSection::new(self.start, self.stop).with_text(self.text.clone());
        if let Some(color) = self.color {
            section = section.with_color(color);
        }
        if let Some(color) = self.highlight_color {
            section = section.with_highlight_color(color);
        }
        if let Some(color) = self.text_color {
            section = section.with_text_color(color);
        }
        section
    }
}

impl ClockConfig {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ClockError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loading clock config");
        Self::from_toml_str(&source)
    }
}

impl Clock {
    /// Build a clock from a config. The clock starts if `running = true`.
    pub fn from_config(config: &ClockConfig) -> Result<Clock> {
        let mut builder = ClockBuilder::new();
        if let Some(time) = config.time {
            builder = builder.time(time);
        }
        if let Some(skin) = config.skin {
            builder = builder.skin(skin);
        }
        let clock = builder.build();
        clock.apply_config(config)?;
        Ok(clock)
    }

    /// Apply every attribute the config names, through the normal setters
    pub fn apply_config(&self, config: &ClockConfig) -> Result<()> {
        if let Some(skin) = config.skin {
            self.set_skin_type(skin)?;
        }
        if let Some(time) = config.time {
            self.set_time(time);
        }
        if let Some(title) = &config.title {
            self.set_title(title.as_str());
        }
        if let Some(text) = &config.text {
            self.set_text(text.as_str());
        }
        if let Some(locale) = &config.locale {
            self.set_locale(locale.as_str());
        }
        if let Some(discrete) = config.discrete_seconds {
            self.set_discrete_seconds(discrete)?;
        }
        if let Some(discrete) = config.discrete_minutes {
            self.set_discrete_minutes(discrete)?;
        }
        apply(config.night_mode, |v| self.set_night_mode(v));
        apply(config.auto_night_mode, |v| self.set_auto_night_mode(v));
        apply(config.alarms_enabled, |v| self.set_alarms_enabled(v));
        apply(config.check_sections_for_value, |v| {
            self.set_check_sections_for_value(v)
        });
        apply(config.check_areas_for_value, |v| {
            self.set_check_areas_for_value(v)
        });
        apply(config.lcd_design, |v| self.set_lcd_design(v));
        apply(config.lcd_font, |v| self.set_lcd_font(v));
        apply(config.tick_label_location, |v| {
            self.set_tick_label_location(v)
        });

        let visibility = &config.visibility;
        apply(visibility.title, |v| self.set_title_visible(v));
        apply(visibility.text, |v| self.set_text_visible(v));
        apply(visibility.date, |v| self.set_date_visible(v));
        apply(visibility.seconds, |v| self.set_seconds_visible(v));
        apply(visibility.sections, |v| self.set_sections_visible(v));
        apply(visibility.areas, |v| self.set_areas_visible(v));
        apply(visibility.lcd_crystal, |v| self.set_lcd_crystal_enabled(v));
        apply(visibility.shadows, |v| self.set_shadows_enabled(v));

        let colors = &config.colors;
        apply(colors.title, |v| self.set_title_color(v));
        apply(colors.text, |v| self.set_text_color(v));
        apply(colors.date, |v| self.set_date_color(v));
        apply(colors.hour_tick_mark, |v| self.set_hour_tick_mark_color(v));
        apply(colors.minute_tick_mark, |v| {
            self.set_minute_tick_mark_color(v)
        });
        apply(colors.hour_needle, |v| self.set_hour_needle_color(v));
        apply(colors.minute_needle, |v| self.set_minute_needle_color(v));
        apply(colors.second_needle, |v| self.set_second_needle_color(v));
        apply(colors.knob, |v| self.set_knob_color(v));

        let paints = &config.paints;
        apply(paints.background.clone(), |v| self.set_background_paint(v));
        apply(paints.border.clone(), |v| self.set_border_paint(v));
        apply(paints.foreground.clone(), |v| self.set_foreground_paint(v));

        if let Some(alarms) = &config.alarms {
            self.set_alarms(alarms.iter().map(AlarmConfig::to_alarm));
        }
        if let Some(sections) = &config.sections {
            self.set_sections(sections.iter().map(SectionConfig::to_section));
        }
        if let Some(areas) = &config.areas {
            self.set_areas(areas.iter().map(SectionConfig::to_section));
        }

        if let Some(running) = config.running {
            self.set_running(running)?;
        }
        Ok(())
    }
}

fn apply<T>(value: Option<T>, set: impl FnOnce(T) -> bool) {
    if let Some(value) = value {
        set(value);
    }
}
