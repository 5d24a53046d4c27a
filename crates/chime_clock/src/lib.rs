//! Chime Clock
//!
//! The state and behaviour of a themeable analog/LCD clock control. A
//! renderer draws the clock; this crate keeps the time, runs the tick timer,
//! evaluates alarms and tells the renderer what to redraw.
//!
//! # Features
//!
//! - **Tick-driven time**: the held time advances by the update interval on
//!   every tick (20 ms when both hands sweep, 1 s otherwise)
//! - **Alarms**: once, hourly, daily and weekly alarms with optional commands
//! - **Night mode**: optional automatic switch for dark dial colors at night
//! - **Sections and areas**: highlighted time ranges with enter/leave events
//! - **Skins**: built-in presets for the common clock faces
//! - **Config**: every attribute can be set from a TOML document
//!
//! # Example
//!
//! ```rust
//! use chime_clock::{Alarm, Clock, Repetition};
//! use chrono::NaiveDate;
//!
//! let start = NaiveDate::from_ymd_opt(2024, 1, 1)
//!     .unwrap()
//!     .and_hms_opt(7, 29, 58)
//!     .unwrap();
//! let clock = Clock::with_time(start);
//! clock.set_alarms_enabled(true);
//! clock.add_alarm(
//!     Alarm::new(start.date().and_hms_opt(7, 30, 0).unwrap(), Repetition::Daily)
//!         .with_text("Wake up"),
//! );
//! clock.on_alarm(|event| println!("{}", event.alarm.text()));
//!
//! // Step the clock by hand instead of starting the timer
//! clock.tick();
//! clock.tick();
//! assert_eq!(clock.time(), start.date().and_hms_opt(7, 30, 0).unwrap());
//! ```

pub mod alarm;
pub mod clock;
pub mod config;
pub mod error;
pub mod night;
pub mod section;
pub mod state;
pub mod style;

pub use alarm::{
    Alarm, AlarmCommand, AlarmEvaluator, AlarmEvent, AlarmId, Evaluation, Repetition,
};
pub use clock::{Clock, ClockBuilder};
pub use config::{
    AlarmConfig, ClockConfig, ColorConfig, PaintConfig, SectionConfig, VisibilityConfig,
};
pub use error::{ClockError, Result};
pub use night::is_night;
pub use section::{SectionEvent, SectionId, SectionKind, SectionTransition, TimeSection};
pub use state::{Property, PropertyChange, UpdateEvent, DEFAULT_LOCALE};
pub use style::{LcdDesign, LcdFont, SkinPreset, SkinType, TickLabelLocation, DARK_COLOR};

pub use chime_core::{Brush, Color, Gradient, GradientStop, ListenerId, UpdateKind};
pub use chime_scheduler::{TickPool, UpdateInterval};
