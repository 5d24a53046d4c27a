//! Owner-thread dispatch
//!
//! Timers fire on a background thread, but control state and observers belong
//! to the thread that owns the control (the UI thread). A [`Dispatcher`] hands
//! a task over to that thread without waiting for it to run.
//!
//! - [`ImmediateDispatcher`] runs the task inline on the calling thread. Use it
//!   in tests and headless hosts.
//! - [`ChannelDispatcher`] posts into a [`DispatchQueue`] that the owning
//!   thread drains from its event loop. An optional wake callback lets the
//!   dispatcher nudge a sleeping event loop.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;

/// A unit of work handed to the owning thread
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Hands tasks to the thread that owns a control
pub trait Dispatcher: Send + Sync {
    /// Queue `task` for execution on the owning thread. Must not block until
    /// the task has run.
    fn dispatch(&self, task: Task);
}

/// Shared dispatcher handle
pub type SharedDispatcher = Arc<dyn Dispatcher>;

/// Runs every task immediately on the calling thread
#[derive(Clone, Copy, Debug, Default)]
pub struct ImmediateDispatcher;

impl Dispatcher for ImmediateDispatcher {
    fn dispatch(&self, task: Task) {
        task();
    }
}

/// Wake callback invoked after a task is posted
pub type WakeCallback = Arc<dyn Fn() + Send + Sync>;

/// Posts tasks into a [`DispatchQueue`]
#[derive(Clone)]
pub struct ChannelDispatcher {
    sender: Sender<Task>,
    wake: Option<WakeCallback>,
}

impl ChannelDispatcher {
    /// Create a dispatcher and the queue the owning thread drains
    pub fn new() -> (Self, DispatchQueue) {
        let (sender, receiver) = mpsc::channel();
        (Self { sender, wake: None }, DispatchQueue { receiver })
    }

    /// Call `wake` every time a task is posted (e.g. an event loop proxy)
    pub fn with_wake_callback<F>(mut self, wake: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.wake = Some(Arc::new(wake));
        self
    }
}

impl Dispatcher for ChannelDispatcher {
    fn dispatch(&self, task: Task) {
        if self.sender.send(task).is_err() {
            tracing::trace!("dispatch queue dropped, discarding task");
            return;
        }
        if let Some(wake) = &self.wake {
            wake();
        }
    }
}

/// Receiving end of a [`ChannelDispatcher`], owned by the UI thread
pub struct DispatchQueue {
    receiver: Receiver<Task>,
}

impl DispatchQueue {
    /// Run every task queued so far. A panicking task is logged and skipped.
    ///
    /// Returns the number of tasks that ran.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        while let Ok(task) = self.receiver.try_recv() {
            Self::run(task);
            ran += 1;
        }
        ran
    }

    /// Block until one task arrives and run it. Returns false once every
    /// dispatcher has been dropped.
    pub fn run_next(&self) -> bool {
        match self.receiver.recv() {
            Ok(task) => {
                Self::run(task);
                true
            }
            Err(_) => false,
        }
    }

    fn run(task: Task) {
        if catch_unwind(AssertUnwindSafe(task)).is_err() {
            tracing::error!("dispatched task panicked");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[test]
    fn test_immediate_runs_inline() {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        ImmediateDispatcher.dispatch(Box::new(move || {
            c.fetch_add(1, Ordering::SeqCst);
        }));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_channel_defers_until_drained() {
        let (dispatcher, queue) = ChannelDispatcher::new();
        let owner = thread::current().id();
        let ran_on = Arc::new(parking_lot::Mutex::new(Vec::new()));

        let handle = {
            let ran_on = ran_on.clone();
            thread::spawn(move || {
                for _ in 0..3 {
                    let ran_on = ran_on.clone();
                    dispatcher.dispatch(Box::new(move || {
                        ran_on.lock().push(thread::current().id());
                    }));
                }
            })
        };
        handle.join().unwrap();

        assert!(ran_on.lock().is_empty());
        assert_eq!(queue.run_pending(), 3);
        assert!(ran_on.lock().iter().all(|id| *id == owner));
        assert_eq!(queue.run_pending(), 0);
    }

    #[test]
    fn test_wake_callback_and_panic_isolation() {
        let wakes = Arc::new(AtomicUsize::new(0));
        let (dispatcher, queue) = ChannelDispatcher::new();
        let dispatcher = {
            let wakes = wakes.clone();
            dispatcher.with_wake_callback(move || {
                wakes.fetch_add(1, Ordering::SeqCst);
            })
        };

        let after = Arc::new(AtomicUsize::new(0));
        dispatcher.dispatch(Box::new(|| panic!("boom")));
        {
            let after = after.clone();
            dispatcher.dispatch(Box::new(move || {
                after.fetch_add(1, Ordering::SeqCst);
            }));
        }

        assert_eq!(wakes.load(Ordering::SeqCst), 2);
        assert_eq!(queue.run_pending(), 2);
        assert_eq!(after.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_run_next_stops_when_dispatchers_dropped() {
        let (dispatcher, queue) = ChannelDispatcher::new();
        dispatcher.dispatch(Box::new(|| {}));
        drop(dispatcher);

        assert!(queue.run_next());
        assert!(!queue.run_next());
    }
}
