//! Scheduler error types

use thiserror::Error;

/// Errors raised when starting a timer
#[derive(Error, Debug)]
pub enum SchedulerError {
    /// The tick thread could not be created
    #[error("failed to spawn tick thread: {0}")]
    Spawn(#[source] std::io::Error),

    /// The pool was shut down and accepts no new timers
    #[error("tick pool has been shut down")]
    ShutDown,

    /// A repeating timer needs a non-zero period
    #[error("timer period must be greater than zero")]
    ZeroPeriod,
}

/// Result type for scheduler operations
pub type Result<T> = std::result::Result<T, SchedulerError>;
