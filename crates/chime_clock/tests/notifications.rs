use chime_clock::{
    Brush, Clock, Color, LcdDesign, LcdFont, Property, SkinType, TickLabelLocation, TickPool,
    UpdateEvent, UpdateKind,
};
use chrono::NaiveDate;
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn clock() -> Clock {
    Clock::with_time(
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap(),
    )
}

fn record_updates(clock: &Clock) -> Arc<Mutex<Vec<UpdateEvent>>> {
    let updates = Arc::new(Mutex::new(Vec::new()));
    let u = updates.clone();
    clock.on_update(move |event| u.lock().push(*event));
    updates
}

fn record_properties(clock: &Clock) -> Arc<Mutex<Vec<Property>>> {
    let properties = Arc::new(Mutex::new(Vec::new()));
    let p = properties.clone();
    clock.on_property_change(move |change| p.lock().push(change.property));
    properties
}

#[test]
fn setters_raise_their_update_kind() {
    let clock = clock();
    let updates = record_updates(&clock);

    clock.set_text("text");
    clock.set_seconds_visible(true);
    clock.set_background_paint(Color::WHITE);
    clock.set_knob_color(Color::rgb8(10, 20, 30));
    clock.set_lcd_font(LcdFont::Lcd);
    clock.set_tick_label_location(TickLabelLocation::Outside);
    clock.set_shadows_enabled(true);
    clock.set_night_mode(true);
    clock.set_title_visible(true);
    clock.set_alarms_enabled(true);
    clock.set_lcd_crystal_enabled(true);
    clock.set_lcd_design(LcdDesign::Orange);
    clock.set_locale("fr-FR");

    let kinds: Vec<_> = updates.lock().iter().map(|event| event.kind).collect();
    assert_eq!(
        kinds,
        [
            UpdateKind::Redraw,
            UpdateKind::Redraw,
            UpdateKind::Redraw,
            UpdateKind::Redraw,
            UpdateKind::Redraw,
            UpdateKind::Redraw,
            UpdateKind::Redraw,
            UpdateKind::Redraw,
            UpdateKind::Visibility,
            UpdateKind::Visibility,
            UpdateKind::Visibility,
            UpdateKind::Lcd,
            UpdateKind::Recalc,
        ]
    );
    assert_eq!(
        updates.lock().last().and_then(|event| event.property),
        Some(Property::Locale)
    );
}

#[test]
fn behaviour_flags_only_reach_the_property_bus() {
    let clock = clock();
    let updates = record_updates(&clock);
    let properties = record_properties(&clock);

    clock.set_auto_night_mode(true);
    clock.set_check_sections_for_value(true);
    clock.set_check_areas_for_value(true);
    clock.set_discrete_seconds(false).unwrap();
    clock.set_discrete_minutes(false).unwrap();

    assert!(updates.lock().is_empty());
    assert_eq!(
        *properties.lock(),
        [
            Property::AutoNightMode,
            Property::CheckSectionsForValue,
            Property::CheckAreasForValue,
            Property::DiscreteSeconds,
            Property::DiscreteMinutes,
        ]
    );
}

#[test]
fn unchanged_values_still_reach_renderers() {
    let clock = clock();
    let updates = record_updates(&clock);
    let properties = record_properties(&clock);

    clock.set_title("x");
    assert!(!clock.set_title("x"));
    assert!(!clock.set_date_visible(false));
    assert!(!clock.set_background_paint(Brush::TRANSPARENT));
    assert!(!clock.set_discrete_seconds(true).unwrap());

    let kinds: Vec<_> = updates.lock().iter().map(|event| event.kind).collect();
    assert_eq!(
        kinds,
        [
            UpdateKind::Redraw,
            UpdateKind::Redraw,
            UpdateKind::Visibility,
            UpdateKind::Redraw,
        ]
    );
    // The property bus only hears about the first title change
    assert_eq!(*properties.lock(), [Property::Title]);
}

#[test]
fn skin_switch_notifies_each_changed_attribute() {
    let clock = clock();
    let updates = record_updates(&clock);
    let properties = record_properties(&clock);

    clock.set_skin_type(SkinType::Yota2).unwrap();

    assert_eq!(
        *properties.lock(),
        [
            Property::SkinType,
            Property::BackgroundPaint,
            Property::HourTickMarkColor,
            Property::MinuteTickMarkColor,
            Property::HourNeedleColor,
            Property::MinuteNeedleColor,
            Property::KnobColor,
        ]
    );
    assert!(updates
        .lock()
        .iter()
        .all(|event| event.kind == UpdateKind::Redraw));
    assert_eq!(clock.knob_color(), Color::WHITE);

    // Re-applying the same skin changes nothing but still redraws
    properties.lock().clear();
    updates.lock().clear();
    clock.set_skin_type(SkinType::Yota2).unwrap();
    assert!(properties.lock().is_empty());
    assert_eq!(updates.lock().len(), 6);
}

#[test]
fn pool_shutdown_leaves_clock_stopped() {
    let pool = TickPool::new().unwrap();
    let clock = Clock::builder()
        .time(
            NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
        )
        .pool(pool.clone())
        .build();

    clock.start().unwrap();
    assert!(clock.is_running());

    pool.shutdown();
    assert!(!clock.is_running());

    // Stopping afterwards is harmless and clears the running attribute
    let properties = record_properties(&clock);
    clock.stop();
    assert_eq!(*properties.lock(), [Property::Running]);
}

#[test]
fn removed_listeners_stop_receiving() {
    let clock = clock();
    let updates = Arc::new(Mutex::new(0));
    let u = updates.clone();
    let id = clock.on_update(move |_| *u.lock() += 1);

    clock.set_title("one");
    assert!(clock.remove_update_listener(id));
    assert!(!clock.remove_update_listener(id));
    clock.set_title("two");

    assert_eq!(*updates.lock(), 1);
}

#[test]
fn running_flag_is_observable() {
    let clock = clock();
    let properties = record_properties(&clock);

    clock.set_running(true).unwrap();
    assert!(clock.is_running());
    clock.set_running(false).unwrap();
    assert!(!clock.is_running());

    let running: Vec<_> = properties
        .lock()
        .iter()
        .copied()
        .filter(|property| *property == Property::Running)
        .collect();
    assert_eq!(running.len(), 2);
}
