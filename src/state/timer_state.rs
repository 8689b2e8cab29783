//! Timer definitions and per-timer runtime state

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timers::HandleId;

/// Shortest interval a configurable timer accepts, in minutes
pub const MIN_INTERVAL_MINUTES: u32 = 1;
/// Longest interval a configurable timer accepts, in minutes
pub const MAX_INTERVAL_MINUTES: u32 = 24 * 60;

/// Message delivered when a timer fires
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub title: String,
    pub body: String,
}

/// Static description of one kind of recurring reminder
#[derive(Debug, Clone)]
pub struct TimerDefinition {
    /// Stable identifier used in storage keys and API paths
    pub key: String,
    /// Human-readable name used in notices
    pub label: String,
    pub default_interval_minutes: u32,
    /// Whether the interval may be changed at runtime
    pub configurable: bool,
    pub reminder: Reminder,
}

impl TimerDefinition {
    /// The 20-20-20 eye rest reminder
    pub fn eye_rest() -> Self {
        Self {
            key: "eye_rest".to_string(),
            label: "Eye Rest".to_string(),
            default_interval_minutes: 20,
            configurable: false,
            reminder: Reminder {
                title: "20-20-20 Rule".to_string(),
                body: "Look away from the screen at something 20 feet away for 20 seconds!"
                    .to_string(),
            },
        }
    }

    /// The hydration reminder with a user-adjustable interval
    pub fn hydration(default_interval_minutes: u32) -> Self {
        Self {
            key: "hydration".to_string(),
            label: "Hydration".to_string(),
            default_interval_minutes,
            configurable: true,
            reminder: Reminder {
                title: "Hydration Reminder".to_string(),
                body: "Time to drink some water! 💧".to_string(),
            },
        }
    }

    /// Built-in definitions
    pub fn defaults(hydration_minutes: u32) -> Vec<Self> {
        vec![Self::eye_rest(), Self::hydration(hydration_minutes)]
    }
}

/// Runtime state of one timer
#[derive(Debug, Clone)]
pub struct TimerState {
    /// User intent, persisted across restarts
    pub enabled: bool,
    /// Interval applied on the next (re)arm
    pub interval_minutes: u32,
    /// Epoch millis of the next fire, absent while disabled
    pub deadline: Option<i64>,
    pub(crate) handle: Option<HandleId>,
    pub(crate) generation: u64,
}

impl TimerState {
    /// Create a disabled timer state with the given interval
    pub fn new(interval_minutes: u32) -> Self {
        Self {
            enabled: false,
            interval_minutes,
            deadline: None,
            handle: None,
            generation: 0,
        }
    }

    /// Check if a scheduled callback is pending
    pub fn has_pending(&self) -> bool {
        self.handle.is_some()
    }

    /// Whole seconds left until the deadline, rounded up
    pub fn remaining_seconds(&self, now_millis: i64) -> Option<u64> {
        let deadline = self.deadline?;
        let remaining = deadline.saturating_sub(now_millis).max(0);
        Some((remaining.saturating_add(999) / 1000) as u64)
    }
}

/// Read-only view of a timer for status reporting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub key: String,
    pub label: String,
    pub enabled: bool,
    pub interval_minutes: u32,
    pub configurable: bool,
    pub deadline: Option<DateTime<Utc>>,
    pub remaining_seconds: Option<u64>,
    pub pending: bool,
}

impl TimerSnapshot {
    pub fn new(definition: &TimerDefinition, state: &TimerState, now_millis: i64) -> Self {
        Self {
            key: definition.key.clone(),
            label: definition.label.clone(),
            enabled: state.enabled,
            interval_minutes: state.interval_minutes,
            configurable: definition.configurable,
            deadline: state.deadline.and_then(DateTime::from_timestamp_millis),
            remaining_seconds: state.remaining_seconds(now_millis),
            pending: state.has_pending(),
        }
    }
}
