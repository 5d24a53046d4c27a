//! Alarm clock demo
//!
//! Starts a clock a few seconds before a daily alarm and drains its ticks on
//! the main thread, the way a UI event loop would.
//!
//! Run with:
//! `RUST_LOG=chime_clock=debug cargo run -p chime_clock --example alarm_clock`

use chime_clock::{Alarm, Clock, Repetition, SkinType, TickPool, TimeSection, UpdateKind};
use chime_core::ChannelDispatcher;
use chrono::{NaiveDate, NaiveTime};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn main() -> chime_clock::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let start = NaiveDate::from_ymd_opt(2024, 1, 1)
        .and_then(|date| date.and_hms_opt(7, 29, 55))
        .expect("valid start time");

    let (dispatcher, queue) = ChannelDispatcher::new();
    let clock = Clock::builder()
        .time(start)
        .skin(SkinType::Plain)
        .dispatcher(dispatcher)
        .build();

    clock.set_title("Bedroom");
    clock.set_alarms_enabled(true);
    clock.set_auto_night_mode(true);
    clock.set_check_sections_for_value(true);
    clock.add_section(
        TimeSection::new(
            NaiveTime::from_hms_opt(7, 29, 58).expect("valid time"),
            NaiveTime::from_hms_opt(7, 30, 30).expect("valid time"),
        )
        .with_text("Wake-up window"),
    );
    let wake_up = NaiveTime::from_hms_opt(7, 30, 0).expect("valid time");
    clock.add_alarm(
        Alarm::new(start.date().and_time(wake_up), Repetition::Daily)
            .with_text("Good morning")
            .with_command(|| tracing::info!("ring ring")),
    );

    clock.on_update(|event| {
        if event.kind != UpdateKind::Redraw {
            tracing::debug!(kind = ?event.kind, property = ?event.property, "update");
        }
    });
    clock.on_section(|event| {
        tracing::info!(section = event.section.text(), transition = ?event.transition, "section");
    });

    let done = Arc::new(AtomicBool::new(false));
    let flag = done.clone();
    clock.on_alarm(move |event| {
        tracing::info!(alarm = event.alarm.text(), "alarm");
        flag.store(true, Ordering::SeqCst);
    });

    clock.start()?;
    while !done.load(Ordering::SeqCst) && queue.run_next() {
        tracing::trace!(time = %clock.time(), "tick drained");
    }
    clock.stop();
    TickPool::shutdown_global();

    tracing::info!(time = %clock.time(), night = clock.is_night_mode(), "stopped");
    Ok(())
}
