//! Day/night heuristic

use chrono::Timelike;

/// Coarse night check: 00:00..=05:59 and 17:00..=23:59 count as night.
pub fn is_night<T: Timelike>(time: &T) -> bool {
    matches!(time.hour(), 0..=5 | 17..=23)
}
