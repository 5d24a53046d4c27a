//! Clock attributes and the notifications they raise

use crate::alarm::{Alarm, AlarmEvaluator};
use crate::section::TimeSection;
use crate::style::{LcdDesign, LcdFont, SkinPreset, SkinType, TickLabelLocation, DARK_COLOR};
use chime_core::{Brush, Color, UpdateKind};
use chime_scheduler::UpdateInterval;
use chrono::NaiveDateTime;
use smallvec::SmallVec;

/// Attributes written by one batch update, each flagged with whether its
/// value changed
pub(crate) type Written = SmallVec<[(Property, bool); 16]>;

/// Default locale tag
pub const DEFAULT_LOCALE: &str = "en-US";

/// Every observable clock attribute
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Property {
    Time,
    Title,
    Text,
    CheckSectionsForValue,
    CheckAreasForValue,
    Sections,
    Areas,
    SectionsVisible,
    AreasVisible,
    DiscreteSeconds,
    DiscreteMinutes,
    SecondsVisible,
    TitleVisible,
    TextVisible,
    DateVisible,
    NightMode,
    Running,
    AutoNightMode,
    BackgroundPaint,
    BorderPaint,
    ForegroundPaint,
    TitleColor,
    TextColor,
    DateColor,
    HourTickMarkColor,
    MinuteTickMarkColor,
    HourNeedleColor,
    MinuteNeedleColor,
    SecondNeedleColor,
    KnobColor,
    LcdDesign,
    AlarmsEnabled,
    Alarms,
    LcdCrystalEnabled,
    ShadowsEnabled,
    LcdFont,
    Locale,
    TickLabelLocation,
    SkinType,
}

impl Property {
    /// The update a renderer has to perform when this attribute changes.
    ///
    /// `None` for attributes that only affect the clock's own behaviour.
    pub fn update_kind(self) -> Option<UpdateKind> {
        match self {
            Self::Title
            | Self::Text
            | Self::SectionsVisible
            | Self::AreasVisible
            | Self::SecondsVisible
            | Self::NightMode
            | Self::BackgroundPaint
            | Self::BorderPaint
            | Self::ForegroundPaint
            | Self::TitleColor
            | Self::TextColor
            | Self::DateColor
            | Self::HourTickMarkColor
            | Self::MinuteTickMarkColor
            | Self::HourNeedleColor
            | Self::MinuteNeedleColor
            | Self::SecondNeedleColor
            | Self::KnobColor
            | Self::ShadowsEnabled
            | Self::LcdFont
            | Self::TickLabelLocation => Some(UpdateKind::Redraw),

            Self::TitleVisible
            | Self::TextVisible
            | Self::DateVisible
            | Self::AlarmsEnabled
            | Self::LcdCrystalEnabled => Some(UpdateKind::Visibility),

            Self::LcdDesign => Some(UpdateKind::Lcd),
            Self::Locale => Some(UpdateKind::Recalc),
            Self::Sections | Self::Areas => Some(UpdateKind::Section),

            Self::Time
            | Self::CheckSectionsForValue
            | Self::CheckAreasForValue
            | Self::DiscreteSeconds
            | Self::DiscreteMinutes
            | Self::Running
            | Self::AutoNightMode
            | Self::Alarms
            | Self::SkinType => None,
        }
    }
}

/// Renderer notification
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UpdateEvent {
    pub kind: UpdateKind,
    /// The attribute that caused the update, `None` for updates requested
    /// with [`Clock::fire_update`](crate::Clock::fire_update)
    pub property: Option<Property>,
}

/// Fired on the property bus whenever an attribute's value changes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PropertyChange {
    pub property: Property,
}

pub(crate) struct ClockState {
    pub time: NaiveDateTime,
    pub interval: UpdateInterval,
    pub title: String,
    pub text: String,
    pub check_sections_for_value: bool,
    pub check_areas_for_value: bool,
    pub sections: Vec<TimeSection>,
    pub areas: Vec<TimeSection>,
    pub sections_visible: bool,
    pub areas_visible: bool,
    pub discrete_seconds: bool,
    pub discrete_minutes: bool,
    pub seconds_visible: bool,
    pub title_visible: bool,
    pub text_visible: bool,
    pub date_visible: bool,
    pub night_mode: bool,
    pub running: bool,
    pub auto_night_mode: bool,
    pub background_paint: Brush,
    pub border_paint: Brush,
    pub foreground_paint: Brush,
    pub title_color: Color,
    pub text_color: Color,
    pub date_color: Color,
    pub hour_tick_mark_color: Color,
    pub minute_tick_mark_color: Color,
    pub hour_needle_color: Color,
    pub minute_needle_color: Color,
    pub second_needle_color: Color,
    pub knob_color: Color,
    pub lcd_design: LcdDesign,
    pub alarms_enabled: bool,
    pub alarms: Vec<Alarm>,
    pub lcd_crystal_enabled: bool,
    pub shadows_enabled: bool,
    pub lcd_font: LcdFont,
    pub locale: String,
    pub tick_label_location: TickLabelLocation,
    pub skin_type: SkinType,
    pub evaluator: AlarmEvaluator,
}

impl ClockState {
    pub fn new(time: NaiveDateTime) -> Self {
        Self {
            time,
            interval: UpdateInterval::for_discrete(true, true),
            title: String::new(),
            text: String::new(),
            check_sections_for_value: false,
            check_areas_for_value: false,
            sections: Vec::new(),
            areas: Vec::new(),
            sections_visible: false,
            areas_visible: false,
            discrete_seconds: true,
            discrete_minutes: true,
            seconds_visible: false,
            title_visible: false,
            text_visible: false,
            date_visible: false,
            night_mode: false,
            running: false,
            auto_night_mode: false,
            background_paint: Brush::TRANSPARENT,
            border_paint: Brush::TRANSPARENT,
            foreground_paint: Brush::TRANSPARENT,
            title_color: DARK_COLOR,
            text_color: DARK_COLOR,
            date_color: DARK_COLOR,
            hour_tick_mark_color: DARK_COLOR,
            minute_tick_mark_color: DARK_COLOR,
            hour_needle_color: DARK_COLOR,
            minute_needle_color: DARK_COLOR,
            second_needle_color: DARK_COLOR,
            knob_color: DARK_COLOR,
            lcd_design: LcdDesign::default(),
            alarms_enabled: false,
            alarms: Vec::new(),
            lcd_crystal_enabled: false,
            shadows_enabled: false,
            lcd_font: LcdFont::default(),
            locale: DEFAULT_LOCALE.to_string(),
            tick_label_location: TickLabelLocation::default(),
            skin_type: SkinType::default(),
            evaluator: AlarmEvaluator::new(),
        }
    }

    pub fn recompute_interval(&mut self) -> UpdateInterval {
        self.interval = UpdateInterval::for_discrete(self.discrete_seconds, self.discrete_minutes);
        self.interval
    }

    /// Write the preset's overrides, returning every attribute the preset
    /// names
    pub fn apply_preset(&mut self, preset: &SkinPreset) -> Written {
        let mut written = Written::new();
        let background = preset.background_paint.map(Brush::from);
        let mut assign = |property, changed: Option<bool>| {
            if let Some(changed) = changed {
                written.push((property, changed));
            }
        };

        assign(
            Property::BackgroundPaint,
            write(&mut self.background_paint, background),
        );
        assign(
            Property::HourTickMarkColor,
            write(&mut self.hour_tick_mark_color, preset.hour_tick_mark_color),
        );
        assign(
            Property::MinuteTickMarkColor,
            write(
                &mut self.minute_tick_mark_color,
                preset.minute_tick_mark_color,
            ),
        );
        assign(
            Property::HourNeedleColor,
            write(&mut self.hour_needle_color, preset.hour_needle_color),
        );
        assign(
            Property::MinuteNeedleColor,
            write(&mut self.minute_needle_color, preset.minute_needle_color),
        );
        assign(
            Property::SecondNeedleColor,
            write(&mut self.second_needle_color, preset.second_needle_color),
        );
        assign(
            Property::KnobColor,
            write(&mut self.knob_color, preset.knob_color),
        );
        assign(
            Property::DateColor,
            write(&mut self.date_color, preset.date_color),
        );
        assign(
            Property::DateVisible,
            write(&mut self.date_visible, preset.date_visible),
        );
        assign(
            Property::SecondsVisible,
            write(&mut self.seconds_visible, preset.seconds_visible),
        );
        assign(
            Property::TextVisible,
            write(&mut self.text_visible, preset.text_visible),
        );
        assign(
            Property::TitleVisible,
            write(&mut self.title_visible, preset.title_visible),
        );
        assign(
            Property::DiscreteSeconds,
            write(&mut self.discrete_seconds, preset.discrete_seconds),
        );
        assign(
            Property::DiscreteMinutes,
            write(&mut self.discrete_minutes, preset.discrete_minutes),
        );

        self.recompute_interval();
        written
    }
}

/// Store `value` if there is one. `Some(changed)` when written.
fn write<T: PartialEq>(slot: &mut T, value: Option<T>) -> Option<bool> {
    let value = value?;
    let changed = *slot != value;
    *slot = value;
    Some(changed)
}
