use chime_clock::{
    Brush, Clock, ClockConfig, Color, LcdDesign, LcdFont, Repetition, SkinType,
    TickLabelLocation, UpdateInterval,
};
use chrono::{NaiveDate, NaiveTime};
use pretty_assertions::assert_eq;
use std::io::Write;

const KITCHEN: &str = r##"
skin = "pear"
time = "2024-01-01T06:59:00"
title = "Kitchen"
locale = "de-CH"
auto_night_mode = true
alarms_enabled = true
check_sections_for_value = true
lcd_design = "blue_black"
lcd_font = "elektra"
tick_label_location = "outside"

[visibility]
title = true
date = false
shadows = true

[colors]
second_needle = "#ff0000"

[paints]
border = "#333333"

[[alarms]]
time = "2024-01-01T07:00:00"
repetition = "daily"
text = "Coffee"

[[alarms]]
time = "2024-01-01T12:00:00"
armed = false

[[sections]]
start = "18:00:00"
stop = "20:00:00"
text = "Dinner"
color = "#ff990080"

[[sections]]
start = "07:00:00"
stop = "08:00:00"
text = "Breakfast"
"##;

#[test]
fn config_applies_over_skin_preset() {
    let config = ClockConfig::from_toml_str(KITCHEN).unwrap();
    let clock = Clock::from_config(&config).unwrap();

    assert_eq!(
        clock.time(),
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(6, 59, 0)
            .unwrap()
    );
    assert_eq!(clock.skin_type(), SkinType::Pear);
    assert_eq!(clock.title(), "Kitchen");
    assert_eq!(clock.locale(), "de-CH");
    assert!(clock.is_auto_night_mode());
    assert!(clock.is_alarms_enabled());
    assert_eq!(clock.lcd_design(), LcdDesign::BlueBlack);
    assert_eq!(clock.lcd_font(), LcdFont::Elektra);
    assert_eq!(clock.tick_label_location(), TickLabelLocation::Outside);

    // Pear turns the title off and the date on; the config flips both back
    assert!(clock.is_title_visible());
    assert!(!clock.is_date_visible());
    assert!(clock.is_shadows_enabled());

    // Explicit colors win over the preset, untouched ones keep it
    assert_eq!(clock.second_needle_color(), Color::rgb8(255, 0, 0));
    assert_eq!(clock.hour_needle_color(), Color::WHITE);
    assert_eq!(clock.background_paint(), Brush::Solid(Color::BLACK));
    assert_eq!(clock.border_paint(), Brush::Solid(Color::rgb8(51, 51, 51)));

    let alarms = clock.alarms();
    assert_eq!(alarms.len(), 2);
    assert_eq!(alarms[0].repetition(), Repetition::Daily);
    assert_eq!(alarms[0].text(), "Coffee");
    assert!(!alarms[1].is_armed());

    let sections = clock.sections();
    assert_eq!(sections[0].text(), "Breakfast");
    assert_eq!(sections[1].text(), "Dinner");
    assert_eq!(
        sections[1].color(),
        Color::rgba8(255, 153, 0, 128.0 / 255.0)
    );
    assert_eq!(
        sections[1].stop(),
        NaiveTime::from_hms_opt(20, 0, 0).unwrap()
    );

    assert!(!clock.is_running());
}

#[test]
fn db_skin_from_config_sweeps_seconds() {
    let config = ClockConfig::from_toml_str("skin = \"db\"").unwrap();
    let clock = Clock::from_config(&config).unwrap();

    assert!(!clock.is_discrete_seconds());
    assert!(clock.is_discrete_minutes());
    assert_eq!(clock.update_interval(), UpdateInterval::Long);
}

#[test]
fn config_file_round_trip() {
    let dir = std::env::temp_dir().join(format!("chime-config-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("clock.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(KITCHEN.as_bytes()).unwrap();
    drop(file);

    let config = ClockConfig::from_file(&path).unwrap();
    assert_eq!(config, ClockConfig::from_toml_str(KITCHEN).unwrap());

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn applying_config_to_existing_clock_replaces_alarms() {
    let clock = Clock::new();
    clock.set_title("Hall");

    let first = ClockConfig::from_toml_str(KITCHEN).unwrap();
    clock.apply_config(&first).unwrap();
    assert_eq!(clock.alarms().len(), 2);

    let second = ClockConfig::from_toml_str(
        r#"
        alarms = []
        "#,
    )
    .unwrap();
    clock.apply_config(&second).unwrap();
    assert!(clock.alarms().is_empty());
    assert_eq!(clock.title(), "Kitchen");
    assert_eq!(clock.sections().len(), 2);
}
