//! API request and response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    services::Toast,
    state::TimerSnapshot,
    timers::Permission,
};

/// API response structure for timer endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub timer: TimerSnapshot,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(status: String, message: String, timer: TimerSnapshot) -> Self {
        Self {
            status,
            message,
            timestamp: Utc::now(),
            timer,
        }
    }

    /// Create an active response
    pub fn active(message: String, timer: TimerSnapshot) -> Self {
        Self::new("active".to_string(), message, timer)
    }

    /// Create an inactive response
    pub fn inactive(message: String, timer: TimerSnapshot) -> Self {
        Self::new("inactive".to_string(), message, timer)
    }

    /// Create a response whose status follows the timer's enabled flag
    pub fn for_timer(message: String, timer: TimerSnapshot) -> Self {
        if timer.enabled {
            Self::active(message, timer)
        } else {
            Self::inactive(message, timer)
        }
    }
}

/// Body of PUT /timers/:key/interval
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntervalRequest {
    pub minutes: u32,
}

/// Status response with every timer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub timers: Vec<TimerSnapshot>,
    pub notifications: Permission,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Recent toasts, oldest first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToastsResponse {
    pub toasts: Vec<Toast>,
}

/// Resend cooldown state for one scope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CooldownResponse {
    pub scope: String,
    pub ready: bool,
    pub remaining_seconds: u64,
}

impl CooldownResponse {
    pub fn new(scope: String, remaining_seconds: u64) -> Self {
        Self {
            scope,
            ready: remaining_seconds == 0,
            remaining_seconds,
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
