//! The clock control
//!
//! [`Clock`] is a cheap, cloneable handle to the shared control state. All
//! handles see the same time, attributes, alarms and listeners; the tick
//! timer is cancelled once the last handle is dropped.
//!
//! Ticks are produced on the shared tick thread and handed to the clock's
//! [`Dispatcher`], which decides on which thread they run. State is locked
//! only while it is read or written; listeners and alarm commands always run
//! with the lock released, so they are free to call back into the clock.

use crate::alarm::{Alarm, AlarmEvent, AlarmId};
use crate::error::Result;
use crate::night::is_night;
use crate::section::{sort_sections, SectionEvent, SectionId, SectionKind, TimeSection};
use crate::state::{ClockState, Property, PropertyChange, UpdateEvent};
use crate::style::{LcdDesign, LcdFont, SkinType, TickLabelLocation};
use chime_core::{
    Brush, Color, Dispatcher, ImmediateDispatcher, ListenerId, Listeners, SharedDispatcher,
    UpdateKind,
};
use chime_scheduler::{TickPool, TickTimer, UpdateInterval};
use chrono::{Local, NaiveDateTime};
use parking_lot::Mutex;
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

struct ClockInner {
    state: Mutex<ClockState>,
    /// Serializes start, stop and interval restarts
    lifecycle: Mutex<()>,
    timer: TickTimer,
    dispatcher: SharedDispatcher,
    update_listeners: Listeners<UpdateEvent>,
    alarm_listeners: Listeners<AlarmEvent>,
    property_listeners: Listeners<PropertyChange>,
    time_listeners: Listeners<NaiveDateTime>,
    section_listeners: Listeners<SectionEvent>,
}

/// Builder for [`Clock`]
pub struct ClockBuilder {
    time: Option<NaiveDateTime>,
    skin: SkinType,
    dispatcher: Option<SharedDispatcher>,
    pool: Option<Arc<TickPool>>,
}

impl ClockBuilder {
    pub fn new() -> Self {
        Self {
            time: None,
            skin: SkinType::default(),
            dispatcher: None,
            pool: None,
        }
    }

    /// Initial time. Defaults to the local wall-clock time at `build()`.
    pub fn time(mut self, time: NaiveDateTime) -> Self {
        self.time = Some(time);
        self
    }

    /// Skin whose preset is applied to the initial attributes
    pub fn skin(mut self, skin: SkinType) -> Self {
        self.skin = skin;
        self
    }

    /// Where ticks run. Defaults to [`ImmediateDispatcher`], i.e. on the
    /// tick thread itself.
    pub fn dispatcher<D: Dispatcher + 'static>(mut self, dispatcher: D) -> Self {
        self.dispatcher = Some(Arc::new(dispatcher) as SharedDispatcher);
        self
    }

    pub fn shared_dispatcher(mut self, dispatcher: SharedDispatcher) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    /// Tick on a private pool instead of the process-wide one
    pub fn pool(mut self, pool: Arc<TickPool>) -> Self {
        self.pool = Some(pool);
        self
    }

    pub fn build(self) -> Clock {
        let time = self.time.unwrap_or_else(|| Local::now().naive_local());
        let mut state = ClockState::new(time);
        state.skin_type = self.skin;
        state.apply_preset(&self.skin.preset());

        let timer = match self.pool {
            Some(pool) => TickTimer::with_pool(pool),
            None => TickTimer::new(),
        };

        tracing::debug!(skin = %self.skin, %time, "clock created");

        Clock {
            inner: Arc::new(ClockInner {
                state: Mutex::new(state),
                lifecycle: Mutex::new(()),
                timer,
                dispatcher: self
                    .dispatcher
                    .unwrap_or_else(|| Arc::new(ImmediateDispatcher) as SharedDispatcher),
                update_listeners: Listeners::new(),
                alarm_listeners: Listeners::new(),
                property_listeners: Listeners::new(),
                time_listeners: Listeners::new(),
                section_listeners: Listeners::new(),
            }),
        }
    }
}

impl Default for ClockBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Getter/setter pairs for `Copy` attributes. Setters return whether the
/// value changed and raise their update kind either way.
macro_rules! copy_attributes {
    ($($(#[$meta:meta])* $getter:ident / $setter:ident / $field:ident: $ty:ty => $property:ident;)*) => {
        $(
            $(#[$meta])*
            pub fn $getter(&self) -> $ty {
                self.inner.state.lock().$field
            }

            $(#[$meta])*
            pub fn $setter(&self, value: $ty) -> bool {
                self.set_field(Property::$property, value, |state| &mut state.$field)
            }
        )*
    };
}

/// A themeable clock control
#[derive(Clone)]
pub struct Clock {
    inner: Arc<ClockInner>,
}

impl Clock {
    /// A stopped clock showing the current local time
    pub fn new() -> Self {
        ClockBuilder::new().build()
    }

    /// A stopped clock showing `time`
    pub fn with_time(time: NaiveDateTime) -> Self {
        ClockBuilder::new().time(time).build()
    }

    pub fn builder() -> ClockBuilder {
        ClockBuilder::new()
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Start ticking. Restarts the timer if the clock is already running.
    pub fn start(&self) -> Result<()> {
        let (result, changed) = {
            let _lifecycle = self.inner.lifecycle.lock();
            let interval = self.inner.state.lock().recompute_interval();
            let result = self.schedule(interval);
            let changed = self.store_running(result.is_ok());
            (result, changed)
        };
        if changed {
            self.notify(Property::Running);
        }
        result
    }

    /// Stop ticking. Ticks posted to the dispatcher but not yet run are
    /// dropped.
    pub fn stop(&self) {
        let changed = {
            let _lifecycle = self.inner.lifecycle.lock();
            self.inner.timer.stop();
            self.store_running(false)
        };
        if changed {
            self.notify(Property::Running);
        }
    }

    pub fn set_running(&self, running: bool) -> Result<()> {
        if running {
            self.start()
        } else {
            self.stop();
            Ok(())
        }
    }

    /// Whether a timer is live. Reads false once the tick pool under the
    /// clock has been shut down.
    pub fn is_running(&self) -> bool {
        self.inner.timer.is_running()
    }

    /// Current tick interval, derived from the discrete flags
    pub fn update_interval(&self) -> UpdateInterval {
        self.inner.state.lock().interval
    }

    fn store_running(&self, running: bool) -> bool {
        let mut state = self.inner.state.lock();
        std::mem::replace(&mut state.running, running) != running
    }

    fn schedule(&self, interval: UpdateInterval) -> Result<()> {
        let weak = Arc::downgrade(&self.inner);
        self.inner
            .timer
            .start(interval.as_duration(), move |generation| {
                let Some(inner) = weak.upgrade() else {
                    return;
                };
                let dispatcher = Arc::clone(&inner.dispatcher);
                let weak = Arc::downgrade(&inner);
                drop(inner);

                dispatcher.dispatch(Box::new(move || {
                    let Some(inner) = weak.upgrade() else {
                        return;
                    };
                    if !inner.timer.is_current(generation) {
                        tracing::trace!(?generation, "dropping stale tick");
                        return;
                    }
                    Clock { inner }.tick();
                }));
            })?;
        Ok(())
    }

    /// Restart the timer with a recomputed interval if the clock is running
    fn refresh_interval(&self) -> Result<()> {
        let (result, changed) = {
            let _lifecycle = self.inner.lifecycle.lock();
            let (interval, running) = {
                let mut state = self.inner.state.lock();
                (state.recompute_interval(), state.running)
            };
            if !running {
                return Ok(());
            }
            tracing::debug!(interval_ms = interval.millis(), "restarting tick timer");
            let result = self.schedule(interval);
            let changed = result.is_err() && self.store_running(false);
            (result, changed)
        };
        if changed {
            self.notify(Property::Running);
        }
        result
    }

    // ------------------------------------------------------------------
    // Tick
    // ------------------------------------------------------------------

    /// Advance the time by one update interval and run alarm, night and
    /// section checks against the new time.
    ///
    /// The timer calls this on every firing; calling it by hand steps a
    /// stopped clock.
    pub fn tick(&self) {
        let now = {
            let mut state = self.inner.state.lock();
            let step = chrono::Duration::milliseconds(state.interval.millis() as i64);
            match state.time.checked_add_signed(step) {
                Some(next) => {
                    state.time = next;
                    next
                }
                None => {
                    tracing::warn!(time = %state.time, "clock time out of range, tick skipped");
                    return;
                }
            }
        };
        tracing::trace!(%now, "tick");

        self.time_changed(now);

        if self.is_alarms_enabled() {
            self.check_alarms(now);
        }
        if self.is_auto_night_mode() {
            let night = is_night(&now);
            if self.store_field(night, |state| &mut state.night_mode) {
                self.notify(Property::NightMode);
            }
        }
        if self.is_check_sections_for_value() {
            self.check_sections(SectionKind::Section, now);
        }
        if self.is_check_areas_for_value() {
            self.check_sections(SectionKind::Area, now);
        }
    }

    fn check_alarms(&self, now: NaiveDateTime) {
        let evaluation = {
            let mut guard = self.inner.state.lock();
            let state = &mut *guard;
            state.evaluator.evaluate(&state.alarms, now)
        };

        for alarm in &evaluation.fired {
            tracing::info!(alarm = %alarm.id(), text = alarm.text(), "alarm fired");
            alarm.execute_command();
            self.inner
                .alarm_listeners
                .emit(&AlarmEvent::new(alarm.clone()));
        }

        if evaluation.expired.is_empty() {
            return;
        }
        let removed = {
            let mut guard = self.inner.state.lock();
            let state = &mut *guard;
            let before = state.alarms.len();
            state
                .alarms
                .retain(|alarm| !evaluation.expired.contains(&alarm.id()));
            for id in &evaluation.expired {
                state.evaluator.forget(*id);
            }
            before != state.alarms.len()
        };
        if removed {
            self.notify(Property::Alarms);
        }
    }

    fn check_sections(&self, kind: SectionKind, now: NaiveDateTime) {
        let time = now.time();
        let events: SmallVec<[SectionEvent; 4]> = {
            let mut state = self.inner.state.lock();
            section_list(&mut *state, kind)
                .iter_mut()
                .filter_map(|section| {
                    let transition = section.check_for_value(time)?;
                    Some(SectionEvent {
                        kind,
                        section: section.clone(),
                        transition,
                    })
                })
                .collect()
        };
        for event in &events {
            tracing::debug!(
                section = %event.section.id(),
                transition = ?event.transition,
                "section changed"
            );
            self.inner.section_listeners.emit(event);
        }
    }

    // ------------------------------------------------------------------
    // Time
    // ------------------------------------------------------------------

    pub fn time(&self) -> NaiveDateTime {
        self.inner.state.lock().time
    }

    /// Set the time without running any checks
    pub fn set_time(&self, time: NaiveDateTime) -> bool {
        let changed = {
            let mut state = self.inner.state.lock();
            std::mem::replace(&mut state.time, time) != time
        };
        if changed {
            self.time_changed(time);
        }
        changed
    }

    fn time_changed(&self, time: NaiveDateTime) {
        self.inner.time_listeners.emit(&time);
        self.notify(Property::Time);
    }

    // ------------------------------------------------------------------
    // Attributes
    // ------------------------------------------------------------------

    pub fn title(&self) -> String {
        self.inner.state.lock().title.clone()
    }

    pub fn set_title(&self, title: impl Into<String>) -> bool {
        self.set_field(Property::Title, title.into(), |state| &mut state.title)
    }

    pub fn text(&self) -> String {
        self.inner.state.lock().text.clone()
    }

    pub fn set_text(&self, text: impl Into<String>) -> bool {
        self.set_field(Property::Text, text.into(), |state| &mut state.text)
    }

    pub fn locale(&self) -> String {
        self.inner.state.lock().locale.clone()
    }

    /// Set the locale tag used for date and text formatting (e.g. `"de-CH"`)
    pub fn set_locale(&self, locale: impl Into<String>) -> bool {
        self.set_field(Property::Locale, locale.into(), |state| &mut state.locale)
    }

    pub fn background_paint(&self) -> Brush {
        self.inner.state.lock().background_paint.clone()
    }

    pub fn set_background_paint(&self, paint: impl Into<Brush>) -> bool {
        self.set_field(Property::BackgroundPaint, paint.into(), |state| {
            &mut state.background_paint
        })
    }

    pub fn border_paint(&self) -> Brush {
        self.inner.state.lock().border_paint.clone()
    }

    pub fn set_border_paint(&self, paint: impl Into<Brush>) -> bool {
        self.set_field(Property::BorderPaint, paint.into(), |state| {
            &mut state.border_paint
        })
    }

    pub fn foreground_paint(&self) -> Brush {
        self.inner.state.lock().foreground_paint.clone()
    }

    pub fn set_foreground_paint(&self, paint: impl Into<Brush>) -> bool {
        self.set_field(Property::ForegroundPaint, paint.into(), |state| {
            &mut state.foreground_paint
        })
    }

    copy_attributes! {
        is_check_sections_for_value / set_check_sections_for_value / check_sections_for_value: bool => CheckSectionsForValue;
        is_check_areas_for_value / set_check_areas_for_value / check_areas_for_value: bool => CheckAreasForValue;
        is_sections_visible / set_sections_visible / sections_visible: bool => SectionsVisible;
        is_areas_visible / set_areas_visible / areas_visible: bool => AreasVisible;
        is_seconds_visible / set_seconds_visible / seconds_visible: bool => SecondsVisible;
        is_title_visible / set_title_visible / title_visible: bool => TitleVisible;
        is_text_visible / set_text_visible / text_visible: bool => TextVisible;
        is_date_visible / set_date_visible / date_visible: bool => DateVisible;
        is_night_mode / set_night_mode / night_mode: bool => NightMode;
        /// With auto night mode on, every tick sets night mode from the time
        is_auto_night_mode / set_auto_night_mode / auto_night_mode: bool => AutoNightMode;
        is_alarms_enabled / set_alarms_enabled / alarms_enabled: bool => AlarmsEnabled;
        is_lcd_crystal_enabled / set_lcd_crystal_enabled / lcd_crystal_enabled: bool => LcdCrystalEnabled;
        is_shadows_enabled / set_shadows_enabled / shadows_enabled: bool => ShadowsEnabled;
        title_color / set_title_color / title_color: Color => TitleColor;
        text_color / set_text_color / text_color: Color => TextColor;
        date_color / set_date_color / date_color: Color => DateColor;
        hour_tick_mark_color / set_hour_tick_mark_color / hour_tick_mark_color: Color => HourTickMarkColor;
        minute_tick_mark_color / set_minute_tick_mark_color / minute_tick_mark_color: Color => MinuteTickMarkColor;
        hour_needle_color / set_hour_needle_color / hour_needle_color: Color => HourNeedleColor;
        minute_needle_color / set_minute_needle_color / minute_needle_color: Color => MinuteNeedleColor;
        second_needle_color / set_second_needle_color / second_needle_color: Color => SecondNeedleColor;
        knob_color / set_knob_color / knob_color: Color => KnobColor;
        lcd_design / set_lcd_design / lcd_design: LcdDesign => LcdDesign;
        lcd_font / set_lcd_font / lcd_font: LcdFont => LcdFont;
        tick_label_location / set_tick_label_location / tick_label_location: TickLabelLocation => TickLabelLocation;
    }

    pub fn is_discrete_seconds(&self) -> bool {
        self.inner.state.lock().discrete_seconds
    }

    /// Jump the second hand once a second instead of sweeping it. Restarts
    /// the timer with the new interval if the clock is running.
    pub fn set_discrete_seconds(&self, discrete: bool) -> Result<bool> {
        let changed = self.set_field(Property::DiscreteSeconds, discrete, |state| {
            &mut state.discrete_seconds
        });
        if changed {
            self.refresh_interval()?;
        }
        Ok(changed)
    }

    pub fn is_discrete_minutes(&self) -> bool {
        self.inner.state.lock().discrete_minutes
    }

    /// Jump the minute hand once a minute instead of sweeping it. Restarts
    /// the timer with the new interval if the clock is running.
    pub fn set_discrete_minutes(&self, discrete: bool) -> Result<bool> {
        let changed = self.set_field(Property::DiscreteMinutes, discrete, |state| {
            &mut state.discrete_minutes
        });
        if changed {
            self.refresh_interval()?;
        }
        Ok(changed)
    }

    pub fn skin_type(&self) -> SkinType {
        self.inner.state.lock().skin_type
    }

    /// Switch skins and apply the skin's preset attributes. Every attribute
    /// the preset writes raises the notifications its own setter would.
    pub fn set_skin_type(&self, skin: SkinType) -> Result<()> {
        let (skin_changed, written) = {
            let mut state = self.inner.state.lock();
            let skin_changed = std::mem::replace(&mut state.skin_type, skin) != skin;
            (skin_changed, state.apply_preset(&skin.preset()))
        };
        tracing::debug!(%skin, written = written.len(), "skin applied");

        self.notify_set(Property::SkinType, skin_changed);
        for (property, changed) in &written {
            self.notify_set(*property, *changed);
        }
        let interval_changed = written.iter().any(|(property, changed)| match property {
            Property::DiscreteSeconds | Property::DiscreteMinutes => *changed,
            _ => false,
        });
        if interval_changed {
            self.refresh_interval()?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Alarms
    // ------------------------------------------------------------------

    pub fn alarms(&self) -> Vec<Alarm> {
        self.inner.state.lock().alarms.clone()
    }

    pub fn alarm(&self, id: AlarmId) -> Option<Alarm> {
        self.inner
            .state
            .lock()
            .alarms
            .iter()
            .find(|alarm| alarm.id() == id)
            .cloned()
    }

    /// Replace the alarm list. Later duplicates of an alarm are dropped.
    pub fn set_alarms(&self, alarms: impl IntoIterator<Item = Alarm>) {
        {
            let mut state = self.inner.state.lock();
            state.alarms.clear();
            for alarm in alarms {
                if !state.alarms.contains(&alarm) {
                    state.alarms.push(alarm);
                }
            }
        }
        self.notify(Property::Alarms);
    }

    /// Add an alarm. Returns false if it is already in the list.
    pub fn add_alarm(&self, alarm: Alarm) -> bool {
        let added = {
            let mut state = self.inner.state.lock();
            if state.alarms.contains(&alarm) {
                false
            } else {
                state.alarms.push(alarm);
                true
            }
        };
        if added {
            self.notify(Property::Alarms);
        }
        added
    }

    pub fn add_alarms(&self, alarms: impl IntoIterator<Item = Alarm>) {
        for alarm in alarms {
            self.add_alarm(alarm);
        }
    }

    /// Remove an alarm. Returns false if it wasn't in the list.
    pub fn remove_alarm(&self, id: AlarmId) -> bool {
        let removed = {
            let mut state = self.inner.state.lock();
            let before = state.alarms.len();
            state.alarms.retain(|alarm| alarm.id() != id);
            state.evaluator.forget(id);
            before != state.alarms.len()
        };
        if removed {
            self.notify(Property::Alarms);
        }
        removed
    }

    pub fn clear_alarms(&self) {
        let removed = {
            let mut state = self.inner.state.lock();
            let removed = !state.alarms.is_empty();
            state.alarms.clear();
            state.evaluator = Default::default();
            removed
        };
        if removed {
            self.notify(Property::Alarms);
        }
    }

    /// Modify an alarm in place. Returns false if no alarm has `id`.
    pub fn update_alarm<F>(&self, id: AlarmId, update: F) -> bool
    where
        F: FnOnce(&mut Alarm),
    {
        let updated = {
            let mut state = self.inner.state.lock();
            match state.alarms.iter_mut().find(|alarm| alarm.id() == id) {
                Some(alarm) => {
                    update(alarm);
                    true
                }
                None => false,
            }
        };
        if updated {
            self.notify(Property::Alarms);
        }
        updated
    }

    pub fn set_alarm_armed(&self, id: AlarmId, armed: bool) -> bool {
        self.update_alarm(id, |alarm| alarm.set_armed(armed))
    }

    // ------------------------------------------------------------------
    // Sections and areas
    // ------------------------------------------------------------------

    pub fn sections(&self) -> Vec<TimeSection> {
        self.inner.state.lock().sections.clone()
    }

    pub fn set_sections(&self, sections: impl IntoIterator<Item = TimeSection>) {
        self.replace_sections(SectionKind::Section, sections);
    }

    pub fn add_section(&self, section: TimeSection) -> bool {
        self.insert_section(SectionKind::Section, section)
    }

    pub fn remove_section(&self, id: SectionId) -> bool {
        self.delete_section(SectionKind::Section, id)
    }

    pub fn clear_sections(&self) {
        self.replace_sections(SectionKind::Section, []);
    }

    pub fn areas(&self) -> Vec<TimeSection> {
        self.inner.state.lock().areas.clone()
    }

    pub fn set_areas(&self, areas: impl IntoIterator<Item = TimeSection>) {
        self.replace_sections(SectionKind::Area, areas);
    }

    pub fn add_area(&self, area: TimeSection) -> bool {
        self.insert_section(SectionKind::Area, area)
    }

    pub fn remove_area(&self, id: SectionId) -> bool {
        self.delete_section(SectionKind::Area, id)
    }

    pub fn clear_areas(&self) {
        self.replace_sections(SectionKind::Area, []);
    }

    fn replace_sections(&self, kind: SectionKind, sections: impl IntoIterator<Item = TimeSection>) {
        {
            let mut state = self.inner.state.lock();
            let list = section_list(&mut *state, kind);
            list.clear();
            for section in sections {
                if !list.contains(&section) {
                    list.push(section);
                }
            }
            sort_sections(list);
        }
        self.notify(section_property(kind));
    }

    fn insert_section(&self, kind: SectionKind, section: TimeSection) -> bool {
        let added = {
            let mut state = self.inner.state.lock();
            let list = section_list(&mut *state, kind);
            if list.contains(&section) {
                false
            } else {
                list.push(section);
                sort_sections(list);
                true
            }
        };
        if added {
            self.notify(section_property(kind));
        }
        added
    }

    fn delete_section(&self, kind: SectionKind, id: SectionId) -> bool {
        let removed = {
            let mut state = self.inner.state.lock();
            let list = section_list(&mut *state, kind);
            let before = list.len();
            list.retain(|section| section.id() != id);
            before != list.len()
        };
        if removed {
            self.notify(section_property(kind));
        }
        removed
    }

    // ------------------------------------------------------------------
    // Listeners
    // ------------------------------------------------------------------

    /// Listen for renderer updates
    pub fn on_update<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&UpdateEvent) + Send + Sync + 'static,
    {
        self.inner.update_listeners.add(listener)
    }

    pub fn remove_update_listener(&self, id: ListenerId) -> bool {
        self.inner.update_listeners.remove(id)
    }

    /// Listen for fired alarms
    pub fn on_alarm<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&AlarmEvent) + Send + Sync + 'static,
    {
        self.inner.alarm_listeners.add(listener)
    }

    pub fn remove_alarm_listener(&self, id: ListenerId) -> bool {
        self.inner.alarm_listeners.remove(id)
    }

    /// Listen for any attribute change
    pub fn on_property_change<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&PropertyChange) + Send + Sync + 'static,
    {
        self.inner.property_listeners.add(listener)
    }

    pub fn remove_property_listener(&self, id: ListenerId) -> bool {
        self.inner.property_listeners.remove(id)
    }

    /// Listen for time changes, including every tick
    pub fn on_time<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&NaiveDateTime) + Send + Sync + 'static,
    {
        self.inner.time_listeners.add(listener)
    }

    pub fn remove_time_listener(&self, id: ListenerId) -> bool {
        self.inner.time_listeners.remove(id)
    }

    /// Listen for sections and areas being entered or left
    pub fn on_section<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&SectionEvent) + Send + Sync + 'static,
    {
        self.inner.section_listeners.add(listener)
    }

    pub fn remove_section_listener(&self, id: ListenerId) -> bool {
        self.inner.section_listeners.remove(id)
    }

    /// Ask the renderer for an update that no attribute change triggered
    pub fn fire_update(&self, kind: UpdateKind) {
        self.inner.update_listeners.emit(&UpdateEvent {
            kind,
            property: None,
        });
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// Store `value` into the field `field` selects, the way a public
    /// setter does
    fn set_field<T, F>(&self, property: Property, value: T, field: F) -> bool
    where
        T: PartialEq,
        F: FnOnce(&mut ClockState) -> &mut T,
    {
        let changed = self.store_field(value, field);
        self.notify_set(property, changed);
        changed
    }

    /// Returns whether the value changed
    fn store_field<T, F>(&self, value: T, field: F) -> bool
    where
        T: PartialEq,
        F: FnOnce(&mut ClockState) -> &mut T,
    {
        let mut state = self.inner.state.lock();
        let slot = field(&mut *state);
        if *slot == value {
            false
        } else {
            *slot = value;
            true
        }
    }

    /// Notifications for a setter call: the property bus only hears about
    /// real changes, renderers get the update kind on every call
    fn notify_set(&self, property: Property, changed: bool) {
        if changed {
            self.notify(property);
        } else {
            self.emit_update(property);
        }
    }

    fn notify(&self, property: Property) {
        self.inner
            .property_listeners
            .emit(&PropertyChange { property });
        self.emit_update(property);
    }

    fn emit_update(&self, property: Property) {
        if let Some(kind) = property.update_kind() {
            self.inner.update_listeners.emit(&UpdateEvent {
                kind,
                property: Some(property),
            });
        }
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Clock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("Clock")
            .field("time", &state.time)
            .field("running", &self.inner.timer.is_running())
            .field("interval", &state.interval)
            .field("skin_type", &state.skin_type)
            .field("alarms", &state.alarms.len())
            .finish_non_exhaustive()
    }
}

fn section_list(state: &mut ClockState, kind: SectionKind) -> &mut Vec<TimeSection> {
    match kind {
        SectionKind::Section => &mut state.sections,
        SectionKind::Area => &mut state.areas,
    }
}

fn section_property(kind: SectionKind) -> Property {
    match kind {
        SectionKind::Section => Property::Sections,
        SectionKind::Area => Property::Areas,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alarm::Repetition;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_setters_always_raise_update_kind() {
        let clock = Clock::with_time(at(12, 0, 0));
        let updates = Arc::new(Mutex::new(Vec::new()));
        let u = updates.clone();
        clock.on_update(move |event| u.lock().push(*event));

        assert!(clock.set_title("Kitchen"));
        assert!(!clock.set_title("Kitchen"));
        assert!(!clock.set_date_visible(false));
        assert!(clock.set_lcd_design(LcdDesign::Blue));

        let kinds: Vec<_> = updates.lock().iter().map(|event| event.kind).collect();
        assert_eq!(
            kinds,
            [
                UpdateKind::Redraw,
                UpdateKind::Redraw,
                UpdateKind::Visibility,
                UpdateKind::Lcd
            ]
        );
    }

    #[test]
    fn test_concurrent_start_stop_keeps_flag_and_timer_in_step() {
        let pool = TickPool::new().unwrap();
        let clock = Clock::builder()
            .time(at(12, 0, 0))
            .pool(pool.clone())
            .build();

        for _ in 0..200 {
            let barrier = Arc::new(std::sync::Barrier::new(3));
            let handles: Vec<_> = (0..3)
                .map(|i| {
                    let clock = clock.clone();
                    let barrier = barrier.clone();
                    std::thread::spawn(move || {
                        barrier.wait();
                        match i {
                            0 => clock.start().unwrap(),
                            1 => clock.stop(),
                            _ => {
                                let discrete = clock.is_discrete_seconds();
                                clock.set_discrete_seconds(!discrete).unwrap();
                            }
                        }
                    })
                })
                .collect();
            for handle in handles {
                handle.join().unwrap();
            }

            let flag = clock.inner.state.lock().running;
            assert_eq!(flag, clock.is_running());
            assert_eq!(pool.active_timers(), usize::from(flag));
        }
        clock.stop();
    }

    #[test]
    fn test_time_only_reaches_time_and_property_listeners() {
        let clock = Clock::with_time(at(12, 0, 0));
        let updates = Arc::new(AtomicUsize::new(0));
        let times = Arc::new(AtomicUsize::new(0));
        let properties = Arc::new(AtomicUsize::new(0));

        let (u, t, p) = (updates.clone(), times.clone(), properties.clone());
        clock.on_update(move |_| {
            u.fetch_add(1, Ordering::SeqCst);
        });
        clock.on_time(move |_| {
            t.fetch_add(1, Ordering::SeqCst);
        });
        clock.on_property_change(move |change| {
            assert_eq!(change.property, Property::Time);
            p.fetch_add(1, Ordering::SeqCst);
        });

        clock.tick();
        clock.set_time(at(8, 0, 0));

        assert_eq!(updates.load(Ordering::SeqCst), 0);
        assert_eq!(times.load(Ordering::SeqCst), 2);
        assert_eq!(properties.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_builder_applies_skin_preset() {
        let clock = Clock::builder()
            .time(at(12, 0, 0))
            .skin(SkinType::Pear)
            .build();

        assert_eq!(clock.skin_type(), SkinType::Pear);
        assert_eq!(clock.background_paint(), Brush::Solid(Color::BLACK));
        assert!(clock.is_date_visible());
        assert!(clock.is_seconds_visible());
    }

    #[test]
    fn test_listener_can_call_back_into_clock() {
        let clock = Clock::with_time(at(12, 0, 0));
        let handle = clock.clone();
        clock.on_update(move |_| {
            // Would deadlock if the state lock were held during emit
            let _ = handle.title();
        });
        clock.set_title("reentrant");
    }

    #[test]
    fn test_alarm_list_has_no_duplicates() {
        let clock = Clock::with_time(at(12, 0, 0));
        let alarm = Alarm::new(at(13, 0, 0), Repetition::Daily);

        assert!(clock.add_alarm(alarm.clone()));
        assert!(!clock.add_alarm(alarm.clone()));
        clock.set_alarms([alarm.clone(), alarm.clone()]);
        assert_eq!(clock.alarms().len(), 1);

        assert!(clock.set_alarm_armed(alarm.id(), false));
        assert_eq!(clock.alarm(alarm.id()).map(|a| a.is_armed()), Some(false));

        assert!(clock.remove_alarm(alarm.id()));
        assert!(!clock.remove_alarm(alarm.id()));
    }

    #[test]
    fn test_fire_update_has_no_property() {
        let clock = Clock::with_time(at(12, 0, 0));
        let seen = Arc::new(Mutex::new(None));
        let s = seen.clone();
        clock.on_update(move |event| *s.lock() = Some(*event));

        clock.fire_update(UpdateKind::Recalc);
        assert_eq!(
            *seen.lock(),
            Some(UpdateEvent {
                kind: UpdateKind::Recalc,
                property: None
            })
        );
    }
}
