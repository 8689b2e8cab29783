//! State management module
//!
//! This module contains timer definitions and runtime state, the persistent
//! key-value stores, the resend cooldown gate and the shared application state.

pub mod app_state;
pub mod cooldown;
pub mod store;
pub mod timer_state;

// Re-export main types
pub use app_state::{AppError, AppState};
pub use cooldown::{CooldownGate, DEFAULT_COOLDOWN_SECS};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore, StoreError};
pub use timer_state::{
    Reminder, TimerDefinition, TimerSnapshot, TimerState, MAX_INTERVAL_MINUTES,
    MIN_INTERVAL_MINUTES,
};
