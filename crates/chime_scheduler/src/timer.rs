//! Per-control repeating timer
//!
//! [`TickTimer`] is a two-state machine:
//!
//! ```text
//!            start()                 start()
//! Stopped ───────────▶ Running ─────────────┐
//!    ▲                   │   ▲   (cancel +  │
//!    └──── stop() ───────┘   └─ reschedule) ┘
//! ```
//!
//! Every transition bumps a [`TickGeneration`]. Ticks carry the generation
//! they were scheduled under, so work that was posted to the owning thread
//! before a `stop()` or restart can recognise itself as stale and bail out.

use crate::error::Result;
use crate::pool::{TickPool, TimerId};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Identifies one `start()` of a [`TickTimer`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TickGeneration(u64);

enum TimerState {
    Stopped,
    Running {
        pool: Arc<TickPool>,
        id: TimerId,
        interval: Duration,
    },
}

/// A control's repeating timer. Holds at most one live timer at a time.
pub struct TickTimer {
    state: Mutex<TimerState>,
    generation: AtomicU64,
    pool: Option<Arc<TickPool>>,
}

impl TickTimer {
    /// A timer that runs on the process-wide [`TickPool`]
    pub fn new() -> Self {
        Self::with(None)
    }

    /// A timer that runs on the given pool
    pub fn with_pool(pool: Arc<TickPool>) -> Self {
        Self::with(Some(pool))
    }

    fn with(pool: Option<Arc<TickPool>>) -> Self {
        Self {
            state: Mutex::new(TimerState::Stopped),
            generation: AtomicU64::new(0),
            pool,
        }
    }

    /// Start ticking every `interval`, first tick immediately.
    ///
    /// If the timer is already running, the old schedule is cancelled first.
    /// On error the timer is left stopped.
    pub fn start<F>(&self, interval: Duration, tick: F) -> Result<TickGeneration>
    where
        F: Fn(TickGeneration) + Send + Sync + 'static,
    {
        let mut state = self.state.lock();
        Self::cancel(&mut state);

        let generation = TickGeneration(self.generation.fetch_add(1, Ordering::AcqRel) + 1);
        let pool = match &self.pool {
            Some(pool) => Arc::clone(pool),
            None => TickPool::global()?,
        };
        let id = pool.schedule_at_fixed_rate(interval, move || tick(generation))?;

        tracing::debug!(
            interval_ms = interval.as_millis() as u64,
            ?generation,
            "tick timer started"
        );
        *state = TimerState::Running { pool, id, interval };
        Ok(generation)
    }

    /// Stop ticking. Returns false if the timer wasn't running.
    ///
    /// Doesn't wait for a tick that is currently executing.
    pub fn stop(&self) -> bool {
        let mut state = self.state.lock();
        let was_running = Self::cancel(&mut state);
        if was_running {
            self.generation.fetch_add(1, Ordering::AcqRel);
            tracing::debug!("tick timer stopped");
        }
        was_running
    }

    /// A timer whose pool was shut down under it reads as stopped
    pub fn is_running(&self) -> bool {
        match &*self.state.lock() {
            TimerState::Running { pool, id, .. } => pool.is_scheduled(*id),
            TimerState::Stopped => false,
        }
    }

    /// The interval of the running schedule
    pub fn interval(&self) -> Option<Duration> {
        match &*self.state.lock() {
            TimerState::Running { pool, id, interval } if pool.is_scheduled(*id) => {
                Some(*interval)
            }
            _ => None,
        }
    }

    /// Check whether a tick from `generation` still belongs to the live
    /// schedule
    pub fn is_current(&self, generation: TickGeneration) -> bool {
        self.generation.load(Ordering::Acquire) == generation.0 && self.is_running()
    }

    fn cancel(state: &mut TimerState) -> bool {
        match std::mem::replace(state, TimerState::Stopped) {
            TimerState::Running { pool, id, .. } => {
                pool.cancel(id);
                true
            }
            TimerState::Stopped => false,
        }
    }
}

impl Default for TickTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TickTimer {
    fn drop(&mut self) {
        Self::cancel(self.state.get_mut());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::thread;

    #[test]
    fn test_start_stop() {
        let pool = TickPool::new().unwrap();
        let timer = TickTimer::with_pool(pool.clone());
        assert!(!timer.is_running());
        assert!(!timer.stop());

        let generation = timer.start(Duration::from_millis(10), |_| {}).unwrap();
        assert!(timer.is_running());
        assert!(timer.is_current(generation));
        assert_eq!(timer.interval(), Some(Duration::from_millis(10)));
        assert_eq!(pool.active_timers(), 1);

        assert!(timer.stop());
        assert!(!timer.is_running());
        assert!(!timer.is_current(generation));
        assert_eq!(pool.active_timers(), 0);
    }

    #[test]
    fn test_restart_replaces_schedule() {
        let pool = TickPool::new().unwrap();
        let timer = TickTimer::with_pool(pool.clone());

        let first = timer.start(Duration::from_millis(1000), |_| {}).unwrap();
        let second = timer.start(Duration::from_millis(20), |_| {}).unwrap();

        assert_ne!(first, second);
        assert!(!timer.is_current(first));
        assert!(timer.is_current(second));
        assert_eq!(pool.active_timers(), 1);
        assert_eq!(timer.interval(), Some(Duration::from_millis(20)));
    }

    #[test]
    fn test_ticks_carry_generation() {
        let pool = TickPool::new().unwrap();
        let timer = Arc::new(TickTimer::with_pool(pool));
        let current = Arc::new(AtomicUsize::new(0));
        let stale = Arc::new(AtomicUsize::new(0));

        let weak = Arc::downgrade(&timer);
        let (c, s) = (current.clone(), stale.clone());
        timer
            .start(Duration::from_millis(5), move |generation| {
                let Some(timer) = weak.upgrade() else { return };
                if timer.is_current(generation) {
                    c.fetch_add(1, Ordering::SeqCst);
                } else {
                    s.fetch_add(1, Ordering::SeqCst);
                }
            })
            .unwrap();

        thread::sleep(Duration::from_millis(50));
        // Ticks of the live schedule are never stale
        assert_eq!(stale.load(Ordering::SeqCst), 0);
        timer.stop();

        assert!(current.load(Ordering::SeqCst) > 0);
    }

    #[test]
    fn test_pre_restart_generation_is_stale() {
        let pool = TickPool::new().unwrap();
        let timer = TickTimer::with_pool(pool);

        let first = timer.start(Duration::from_secs(60), |_| {}).unwrap();
        timer.stop();
        assert!(!timer.is_current(first));

        let second = timer.start(Duration::from_secs(60), |_| {}).unwrap();
        assert!(!timer.is_current(first));
        assert!(timer.is_current(second));
    }

    #[test]
    fn test_pool_shutdown_stops_timer() {
        let pool = TickPool::new().unwrap();
        let timer = TickTimer::with_pool(pool.clone());

        let generation = timer.start(Duration::from_millis(10), |_| {}).unwrap();
        pool.shutdown();

        assert!(!timer.is_running());
        assert!(!timer.is_current(generation));
        assert_eq!(timer.interval(), None);
    }

    #[test]
    fn test_drop_cancels() {
        let pool = TickPool::new().unwrap();
        {
            let timer = TickTimer::with_pool(pool.clone());
            timer.start(Duration::from_millis(10), |_| {}).unwrap();
            assert_eq!(pool.active_timers(), 1);
        }
        assert_eq!(pool.active_timers(), 0);
    }
}
