//! Background tasks module
//!
//! This module contains background tasks that run alongside the HTTP server.

pub mod timer_events;
pub mod wake_up_recovery;

// Re-export main functions
pub use timer_events::timer_event_task;
pub use wake_up_recovery::wake_up_recovery_task;
