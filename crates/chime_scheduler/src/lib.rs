//! Chime Tick Scheduling
//!
//! Repeating timers for clock controls.
//!
//! # Features
//!
//! - **Shared tick thread**: every control in the process shares one
//!   background thread, created on first use and shut down explicitly
//! - **Fixed-rate timers**: first firing is immediate, later firings follow the
//!   previous deadline so ticks don't drift
//! - **Per-control lifecycle**: [`TickTimer`] is a `Stopped`/`Running` state
//!   machine that never holds more than one live timer
//! - **Isolation**: a panicking tick is logged and the schedule keeps going

pub mod error;
pub mod interval;
pub mod pool;
pub mod timer;

pub use error::{Result, SchedulerError};
pub use interval::UpdateInterval;
pub use pool::{TickPool, TimerId};
pub use timer::{TickGeneration, TickTimer};
