//! Host service integrations
//!
//! This module contains the surfaces reminders are delivered through:
//! desktop notifications and the in-app toast feed.

pub mod notifier;
pub mod toasts;

// Re-export main types
pub use notifier::DesktopNotifier;
pub use toasts::{Toast, ToastFeed};
