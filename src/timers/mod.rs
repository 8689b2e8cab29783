//! Recurring reminder timers
//!
//! This module contains the timer manager and the host capabilities it is
//! built on: a clock, a deferred-callback scheduler and the notification,
//! toast and permission surfaces.

pub mod clock;
pub mod error;
pub mod manager;
pub mod scheduler;
pub mod surfaces;

#[cfg(test)]
pub mod testing;

// Re-export main types
pub use clock::{Clock, SystemClock};
pub use error::TimerError;
pub use manager::{Collaborators, FireOutcome, ReconcileReport, TimerManager};
pub use scheduler::{FireTicket, HandleId, Scheduler, TokioScheduler};
pub use surfaces::{NotificationSurface, Permission, PermissionSurface, ToastLevel, ToastSurface};
