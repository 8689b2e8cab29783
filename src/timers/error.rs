//! Error types for the reminder timers

use thiserror::Error;

/// Errors returned by timer manager operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimerError {
    /// No timer definition is registered under this key
    #[error("unknown timer: {0}")]
    UnknownTimer(String),

    /// The timer's interval is fixed by its definition
    #[error("the {0} timer has a fixed interval")]
    IntervalFixed(String),

    /// Requested interval is outside the accepted range
    #[error("interval must be between {min} and {max} minutes, got {got}")]
    InvalidInterval { got: u32, min: u32, max: u32 },

    /// Arming was requested on a timer the user has switched off
    #[error("the {0} timer is disabled")]
    Disabled(String),

    /// The host cannot schedule deferred callbacks at all
    #[error("scheduling is unavailable: {0}")]
    SchedulerUnavailable(String),
}
