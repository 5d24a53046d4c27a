//! Skins, LCD styles and the skin preset table

use chime_core::Color;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Default color of text, ticks and needles
pub const DARK_COLOR: Color = Color::rgb(36.0 / 255.0, 36.0 / 255.0, 36.0 / 255.0);

/// LCD panel color scheme
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LcdDesign {
    Beige,
    Black,
    Blue,
    BlueBlack,
    BlueDarkBlue,
    BlueGray,
    BlueLightBlue,
    Gray,
    Green,
    GreenDarkGreen,
    Orange,
    Red,
    #[default]
    Standard,
    StandardGreen,
    White,
    Yellow,
    YellowBlack,
}

/// Digit font on LCD skins
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LcdFont {
    Standard,
    Lcd,
    Digital,
    #[default]
    DigitalBold,
    Elektra,
}

/// Where hour labels sit relative to the tick ring
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TickLabelLocation {
    #[default]
    Inside,
    Outside,
}

/// Built-in clock skins
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkinType {
    /// Plain analog face
    #[default]
    Clock,
    /// Dark face with white hands
    Yota2,
    /// Digital LCD panel
    Lcd,
    /// Black face with an orange second hand and date
    Pear,
    /// Flat dark face with a green second hand
    Plain,
    /// Station clock with a sweeping second hand
    Db,
}

impl SkinType {
    /// Stable skin id for config/serialization
    pub fn id(self) -> &'static str {
        match self {
            Self::Clock => "clock",
            Self::Yota2 => "yota2",
            Self::Lcd => "lcd",
            Self::Pear => "pear",
            Self::Plain => "plain",
            Self::Db => "db",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Clock => "Clock",
            Self::Yota2 => "Yota 2",
            Self::Lcd => "LCD",
            Self::Pear => "Pear",
            Self::Plain => "Plain",
            Self::Db => "DB",
        }
    }

    pub fn all() -> &'static [SkinType] {
        const SKINS: [SkinType; 6] = [
            SkinType::Clock,
            SkinType::Yota2,
            SkinType::Lcd,
            SkinType::Pear,
            SkinType::Plain,
            SkinType::Db,
        ];
        &SKINS
    }

    /// Attributes applied when switching to this skin
    pub fn preset(self) -> SkinPreset {
        match self {
            Self::Clock | Self::Lcd => SkinPreset::default(),
            Self::Yota2 => SkinPreset {
                background_paint: Some(Color::rgb8(40, 42, 48)),
                hour_tick_mark_color: Some(Color::WHITE),
                minute_tick_mark_color: Some(Color::rgba8(255, 255, 255, 0.5)),
                hour_needle_color: Some(Color::WHITE),
                minute_needle_color: Some(Color::WHITE),
                knob_color: Some(Color::WHITE),
                ..SkinPreset::default()
            },
            Self::Pear => SkinPreset {
                background_paint: Some(Color::BLACK),
                hour_needle_color: Some(Color::WHITE),
                minute_needle_color: Some(Color::WHITE),
                second_needle_color: Some(Color::rgb8(255, 165, 24)),
                hour_tick_mark_color: Some(Color::WHITE),
                minute_tick_mark_color: Some(Color::rgb8(115, 115, 115)),
                date_color: Some(Color::WHITE),
                date_visible: Some(true),
                seconds_visible: Some(true),
                text_visible: Some(false),
                title_visible: Some(false),
                ..SkinPreset::default()
            },
            Self::Plain => SkinPreset {
                background_paint: Some(Color::rgb8(29, 29, 29)),
                hour_needle_color: Some(Color::rgb8(190, 190, 190)),
                minute_needle_color: Some(Color::rgb8(190, 190, 190)),
                second_needle_color: Some(Color::rgb8(0, 244, 0)),
                date_color: Some(Color::rgb8(190, 190, 190)),
                seconds_visible: Some(true),
                hour_tick_mark_color: Some(Color::rgb8(240, 240, 240)),
                minute_tick_mark_color: Some(Color::rgb8(240, 240, 240)),
                ..SkinPreset::default()
            },
            Self::Db => SkinPreset {
                discrete_seconds: Some(false),
                discrete_minutes: Some(true),
                second_needle_color: Some(Color::rgb8(167, 0, 0)),
                seconds_visible: Some(true),
                ..SkinPreset::default()
            },
        }
    }
}

impl Display for SkinType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Attribute overrides a skin applies. `None` leaves the attribute as is.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SkinPreset {
    pub background_paint: Option<Color>,
    pub hour_tick_mark_color: Option<Color>,
    pub minute_tick_mark_color: Option<Color>,
    pub hour_needle_color: Option<Color>,
    pub minute_needle_color: Option<Color>,
    pub second_needle_color: Option<Color>,
    pub knob_color: Option<Color>,
    pub date_color: Option<Color>,
    pub date_visible: Option<bool>,
    pub seconds_visible: Option<bool>,
    pub text_visible: Option<bool>,
    pub title_visible: Option<bool>,
    pub discrete_seconds: Option<bool>,
    pub discrete_minutes: Option<bool>,
}
