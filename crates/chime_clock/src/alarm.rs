//! Alarms and the per-tick alarm evaluator
//!
//! An [`Alarm`] pairs a target date-time with a [`Repetition`] that decides
//! how the target is compared with the clock's current time:
//!
//! | repetition | matches when                                            |
//! |------------|---------------------------------------------------------|
//! | `Once`     | `now` is strictly after the target                      |
//! | `Hourly`   | target hour == now minute, target minute == now second  |
//! | `Daily`    | hour, minute and second are equal                       |
//! | `Weekly`   | weekday, hour, minute and second are equal              |
//!
//! `Hourly` compares the target's hour/minute fields against the current
//! minute/second, so a target of `00:15` rings at `hh:00:15`.

use chrono::{Datelike, NaiveDateTime, Timelike};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Stable identity of an alarm
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AlarmId(u64);

impl AlarmId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for AlarmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "alarm#{}", self.0)
    }
}

/// How an alarm repeats
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Repetition {
    #[default]
    Once,
    Hourly,
    Daily,
    Weekly,
}

/// Side effect run when an alarm fires
pub type AlarmCommand = Arc<dyn Fn() + Send + Sync>;

/// A clock alarm
///
/// Cloning keeps the identity: two clones are the same alarm as far as the
/// clock's alarm list is concerned.
#[derive(Clone)]
pub struct Alarm {
    id: AlarmId,
    time: NaiveDateTime,
    repetition: Repetition,
    armed: bool,
    text: String,
    command: Option<AlarmCommand>,
}

impl Alarm {
    /// Create an armed alarm
    pub fn new(time: NaiveDateTime, repetition: Repetition) -> Self {
        Self {
            id: AlarmId::next(),
            time,
            repetition,
            armed: true,
            text: String::new(),
            command: None,
        }
    }

    /// Set the label shown when the alarm fires
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set whether the alarm is armed
    pub fn with_armed(mut self, armed: bool) -> Self {
        self.armed = armed;
        self
    }

    /// Set the command executed when the alarm fires
    pub fn with_command<F>(mut self, command: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.command = Some(Arc::new(command));
        self
    }

    pub fn id(&self) -> AlarmId {
        self.id
    }

    pub fn time(&self) -> NaiveDateTime {
        self.time
    }

    pub fn set_time(&mut self, time: NaiveDateTime) {
        self.time = time;
    }

    pub fn repetition(&self) -> Repetition {
        self.repetition
    }

    pub fn set_repetition(&mut self, repetition: Repetition) {
        self.repetition = repetition;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn set_armed(&mut self, armed: bool) {
        self.armed = armed;
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn set_command(&mut self, command: Option<AlarmCommand>) {
        self.command = command;
    }

    /// Check whether the alarm's time condition holds at `now`, ignoring
    /// the armed flag
    pub fn matches(&self, now: NaiveDateTime) -> bool {
        let target = self.time;
        match self.repetition {
            Repetition::Once => now > target,
            Repetition::Hourly => target.hour() == now.minute() && target.minute() == now.second(),
            Repetition::Daily => {
                target.hour() == now.hour()
                    && target.minute() == now.minute()
                    && target.second() == now.second()
            }
            Repetition::Weekly => {
                target.weekday() == now.weekday()
                    && target.hour() == now.hour()
                    && target.minute() == now.minute()
                    && target.second() == now.second()
            }
        }
    }

    /// Run the alarm's command, if any.
    ///
    /// A panicking command is logged and reported as `false`; it never
    /// unwinds into the caller.
    pub fn execute_command(&self) -> bool {
        let Some(command) = &self.command else {
            return true;
        };
        match catch_unwind(AssertUnwindSafe(|| command())) {
            Ok(()) => true,
            Err(_) => {
                tracing::error!(alarm = %self.id, text = %self.text, "alarm command panicked");
                false
            }
        }
    }
}

impl PartialEq for Alarm {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Alarm {}

impl fmt::Debug for Alarm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Alarm")
            .field("id", &self.id)
            .field("time", &self.time)
            .field("repetition", &self.repetition)
            .field("armed", &self.armed)
            .field("text", &self.text)
            .field("has_command", &self.command.is_some())
            .finish()
    }
}

/// Notification sent to alarm listeners when an alarm fires
#[derive(Clone, Debug)]
pub struct AlarmEvent {
    pub alarm: Alarm,
}

impl AlarmEvent {
    pub fn new(alarm: Alarm) -> Self {
        Self { alarm }
    }
}

/// Result of evaluating every alarm against one tick
#[derive(Debug, Default)]
pub struct Evaluation {
    /// Alarms to fire, in list order
    pub fired: SmallVec<[Alarm; 4]>,
    /// `Once` alarms whose time has passed, armed or not
    pub expired: SmallVec<[AlarmId; 4]>,
}

impl Evaluation {
    pub fn is_empty(&self) -> bool {
        self.fired.is_empty() && self.expired.is_empty()
    }
}

/// Decides which alarms fire on a tick.
///
/// Repeating alarms match for a whole second, which spans up to 50 ticks at
/// the short interval. The evaluator remembers the second each alarm last
/// fired in so it fires once per match.
#[derive(Debug, Default)]
pub struct AlarmEvaluator {
    last_fired: FxHashMap<AlarmId, NaiveDateTime>,
}

impl AlarmEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate `alarms` at `now`. Doesn't touch the list; the caller removes
    /// `expired` once it is done with `fired`.
    pub fn evaluate(&mut self, alarms: &[Alarm], now: NaiveDateTime) -> Evaluation {
        let mut evaluation = Evaluation::default();
        let second = now.with_nanosecond(0).unwrap_or(now);

        self.last_fired
            .retain(|id, _| alarms.iter().any(|alarm| alarm.id == *id));

        for alarm in alarms {
            if !alarm.matches(now) {
                continue;
            }

            if alarm.repetition == Repetition::Once {
                if alarm.armed {
                    evaluation.fired.push(alarm.clone());
                }
                evaluation.expired.push(alarm.id);
                continue;
            }

            if !alarm.armed {
                continue;
            }
            if self.last_fired.get(&alarm.id) == Some(&second) {
                continue;
            }
            self.last_fired.insert(alarm.id, second);
            evaluation.fired.push(alarm.clone());
        }

        evaluation
    }

    /// Drop the fire history of an alarm
    pub fn forget(&mut self, id: AlarmId) {
        self.last_fired.remove(&id);
    }
}
