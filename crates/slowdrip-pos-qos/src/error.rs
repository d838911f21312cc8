//! Error types for the QoS module.

use std::time::Duration;
use thiserror::Error;

/// Rejected configuration values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The recent-commitments ring must hold at least one entry.
    #[error("max_recent must be at least 1")]
    ZeroRecentCapacity,

    /// Flushing more often than the floor would flood the logs.
    #[error("flush_interval too small: {got:?} (minimum {min:?})")]
    FlushIntervalTooSmall { got: Duration, min: Duration },
}

/// Result type for QoS configuration.
pub type Result<T> = std::result::Result<T, ConfigError>;
