//! Wall-clock source used for deadline arithmetic

use chrono::Utc;

/// Source of the current wall-clock time in epoch milliseconds
pub trait Clock: Send {
    fn now_millis(&self) -> i64;
}

/// Clock backed by the system's UTC time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}
