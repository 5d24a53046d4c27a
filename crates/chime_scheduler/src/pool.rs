//! Shared tick thread
//!
//! A [`TickPool`] owns one background thread that runs every repeating timer
//! registered with it. Tick work is light (it only posts to the owning
//! thread), so a single thread serves every clock in the process.
//!
//! The process-wide pool is created on first use by [`TickPool::global`] and
//! torn down by [`TickPool::shutdown_global`]. A later `global()` call starts
//! a fresh one.

use crate::error::{Result, SchedulerError};
use parking_lot::{const_mutex, Condvar, Mutex, MutexGuard};
use slotmap::{new_key_type, SlotMap};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle, ThreadId};
use std::time::{Duration, Instant};

new_key_type! {
    /// Handle to a timer scheduled on a [`TickPool`]
    pub struct TimerId;
}

/// Tick callback type
pub type TickFn = Arc<dyn Fn() + Send + Sync>;

/// The process-wide pool, created on first use
static GLOBAL_POOL: Mutex<Option<Arc<TickPool>>> = const_mutex(None);

struct Job {
    period: Duration,
    next_run: Instant,
    tick: TickFn,
}

#[derive(Default)]
struct PoolState {
    jobs: SlotMap<TimerId, Job>,
    shutdown: bool,
}

struct Shared {
    state: Mutex<PoolState>,
    wakeup: Condvar,
}

/// A background thread running fixed-rate timers
pub struct TickPool {
    shared: Arc<Shared>,
    worker: Mutex<Option<JoinHandle<()>>>,
    worker_id: ThreadId,
}

impl TickPool {
    /// Name of the tick thread
    pub const THREAD_NAME: &'static str = "ClockTick";

    /// Start a private pool with its own tick thread
    pub fn new() -> Result<Arc<Self>> {
        Self::with_thread_name(Self::THREAD_NAME)
    }

    /// Start a private pool whose thread carries the given name
    pub fn with_thread_name(name: impl Into<String>) -> Result<Arc<Self>> {
        let shared = Arc::new(Shared {
            state: Mutex::new(PoolState::default()),
            wakeup: Condvar::new(),
        });

        let worker_shared = Arc::clone(&shared);
        let handle = thread::Builder::new()
            .name(name.into())
            .spawn(move || run_worker(worker_shared))
            .map_err(SchedulerError::Spawn)?;

        tracing::debug!(thread = ?handle.thread().name(), "tick pool started");

        Ok(Arc::new(Self {
            shared,
            worker_id: handle.thread().id(),
            worker: Mutex::new(Some(handle)),
        }))
    }

    /// Get the process-wide pool, starting it on first use
    pub fn global() -> Result<Arc<Self>> {
        let mut global = GLOBAL_POOL.lock();
        if let Some(pool) = global.as_ref() {
            if !pool.is_shut_down() {
                return Ok(Arc::clone(pool));
            }
        }
        let pool = Self::new()?;
        *global = Some(Arc::clone(&pool));
        Ok(pool)
    }

    /// Shut down the process-wide pool, if one was started.
    ///
    /// Timers still registered on it are dropped. Controls that were running
    /// stay stopped until restarted.
    pub fn shutdown_global() {
        let pool = GLOBAL_POOL.lock().take();
        if let Some(pool) = pool {
            pool.shutdown();
        }
    }

    /// Schedule `tick` to run now and then every `period`.
    ///
    /// Deadlines advance from the previous deadline, not from when the tick
    /// finished. A tick that overruns is followed immediately by the next one;
    /// further missed deadlines are dropped, not queued.
    pub fn schedule_at_fixed_rate<F>(&self, period: Duration, tick: F) -> Result<TimerId>
    where
        F: Fn() + Send + Sync + 'static,
    {
        if period.is_zero() {
            return Err(SchedulerError::ZeroPeriod);
        }

        let mut state = self.shared.state.lock();
        if state.shutdown {
            return Err(SchedulerError::ShutDown);
        }

        let id = state.jobs.insert(Job {
            period,
            next_run: Instant::now(),
            tick: Arc::new(tick),
        });
        drop(state);

        self.shared.wakeup.notify_all();
        tracing::trace!(?id, period_ms = period.as_millis() as u64, "timer scheduled");
        Ok(id)
    }

    /// Cancel a timer. A tick that is already running finishes; no new tick
    /// of this timer starts after this returns.
    ///
    /// Returns false if the timer wasn't scheduled.
    pub fn cancel(&self, id: TimerId) -> bool {
        let removed = self.shared.state.lock().jobs.remove(id).is_some();
        if removed {
            self.shared.wakeup.notify_all();
            tracing::trace!(?id, "timer cancelled");
        }
        removed
    }

    /// Check whether a timer is still scheduled
    pub fn is_scheduled(&self, id: TimerId) -> bool {
        self.shared.state.lock().jobs.contains_key(id)
    }

    /// Number of timers currently scheduled
    pub fn active_timers(&self) -> usize {
        self.shared.state.lock().jobs.len()
    }

    pub fn is_shut_down(&self) -> bool {
        self.shared.state.lock().shutdown
    }

    /// Stop the tick thread and drop every timer.
    ///
    /// Waits for the thread to exit unless called from a tick callback.
    pub fn shutdown(&self) {
        {
            let mut state = self.shared.state.lock();
            if state.shutdown {
                return;
            }
            state.shutdown = true;
            state.jobs.clear();
        }
        self.shared.wakeup.notify_all();

        let handle = self.worker.lock().take();
        if let Some(handle) = handle {
            if thread::current().id() == self.worker_id {
                // Called from a tick; the loop exits once the callback returns
                return;
            }
            if handle.join().is_err() {
                tracing::error!("tick thread panicked during shutdown");
            }
        }
        tracing::debug!("tick pool shut down");
    }
}

impl Drop for TickPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_worker(shared: Arc<Shared>) {
    let mut state = shared.state.lock();
    loop {
        if state.shutdown {
            break;
        }

        let due = state
            .jobs
            .iter()
            .min_by_key(|(_, job)| job.next_run)
            .map(|(id, job)| (id, job.next_run));

        let Some((id, next_run)) = due else {
            shared.wakeup.wait(&mut state);
            continue;
        };

        let now = Instant::now();
        if next_run > now {
            shared.wakeup.wait_until(&mut state, next_run);
            continue;
        }

        let Some(job) = state.jobs.get_mut(id) else {
            continue;
        };
        job.next_run += job.period;
        if job.next_run < now {
            job.next_run = now;
        }
        let tick = Arc::clone(&job.tick);

        MutexGuard::unlocked(&mut state, || {
            if catch_unwind(AssertUnwindSafe(|| tick())).is_err() {
                tracing::error!(?id, "tick panicked; timer keeps running");
            }
        });
    }
}
