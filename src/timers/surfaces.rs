//! Capabilities the timer manager borrows from its host
//!
//! Each collaborator is a separate trait so a host can grant them
//! independently and tests can swap any of them for a recording double.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of asking the host for notification permission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Granted,
    Denied,
}

impl Permission {
    pub fn is_granted(self) -> bool {
        matches!(self, Permission::Granted)
    }
}

/// Emphasis of a transient in-app message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastLevel {
    Info,
    Success,
    Warning,
}

impl fmt::Display for ToastLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToastLevel::Info => write!(f, "info"),
            ToastLevel::Success => write!(f, "success"),
            ToastLevel::Warning => write!(f, "warning"),
        }
    }
}

/// Grants or refuses permission to show system notifications
pub trait PermissionSurface: Send {
    /// Permission as it stands, without prompting
    fn current(&self) -> Permission;

    /// Prompt for permission if that is still possible
    fn request(&mut self) -> Permission;
}

/// Displays system-level notifications
pub trait NotificationSurface: Send {
    fn notify(&self, title: &str, body: &str);
}

/// Displays transient in-app messages
pub trait ToastSurface: Send {
    fn toast(&self, message: &str, level: ToastLevel);
}
