//! Health Reminders - recurring eye-rest and hydration reminders that
//! survive restarts
//!
//! This library provides a timer manager that persists each reminder's next
//! deadline, reconciles those deadlines after a restart or host sleep, and a
//! small HTTP daemon to toggle the reminders.

pub mod config;
pub mod state;
pub mod api;
pub mod services;
pub mod tasks;
pub mod timers;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use state::AppState;
pub use api::create_router;
pub use timers::TimerManager;
pub use utils::signals::shutdown_signal;
