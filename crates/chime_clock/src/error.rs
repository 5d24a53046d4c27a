//! Clock error types

use chime_scheduler::SchedulerError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by clock operations
#[derive(Error, Debug)]
pub enum ClockError {
    /// The tick timer could not be started
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),

    /// A config document could not be parsed
    #[error("invalid clock config: {0}")]
    Config(#[from] toml::de::Error),

    /// A config file could not be read
    #[error("failed to read clock config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for clock operations
pub type Result<T> = std::result::Result<T, ClockError>;
