//! Tick interval selection

use std::time::Duration;

/// How often a clock advances its time
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum UpdateInterval {
    /// 20 ms, for needles that sweep continuously
    Short,
    /// 1000 ms, for needles that jump once per unit
    #[default]
    Long,
}

impl UpdateInterval {
    pub const SHORT_MILLIS: u64 = 20;
    pub const LONG_MILLIS: u64 = 1000;

    /// Pick the interval for the given discrete display modes.
    ///
    /// Only a clock with both seconds and minutes sweeping continuously needs
    /// the short interval.
    pub fn for_discrete(discrete_seconds: bool, discrete_minutes: bool) -> Self {
        if !discrete_seconds && !discrete_minutes {
            Self::Short
        } else {
            Self::Long
        }
    }

    pub fn millis(self) -> u64 {
        match self {
            Self::Short => Self::SHORT_MILLIS,
            Self::Long => Self::LONG_MILLIS,
        }
    }

    pub fn as_duration(self) -> Duration {
        Duration::from_millis(self.millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_for_discrete_flags() {
        assert_eq!(
            UpdateInterval::for_discrete(true, true),
            UpdateInterval::Long
        );
        assert_eq!(
            UpdateInterval::for_discrete(false, true),
            UpdateInterval::Long
        );
        assert_eq!(
            UpdateInterval::for_discrete(true, false),
            UpdateInterval::Long
        );
        assert_eq!(
            UpdateInterval::for_discrete(false, false),
            UpdateInterval::Short
        );
    }

    #[test]
    fn test_durations() {
        assert_eq!(
            UpdateInterval::Short.as_duration(),
            Duration::from_millis(20)
        );
        assert_eq!(UpdateInterval::Long.as_duration(), Duration::from_secs(1));
    }
}
