//! In-app toast feed

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};
use tracing::info;

use crate::timers::{ToastLevel, ToastSurface};

/// Number of toasts kept for clients to read back
pub const TOAST_HISTORY: usize = 50;

/// A transient in-app message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Toast {
    pub message: String,
    pub level: ToastLevel,
    pub timestamp: DateTime<Utc>,
}

/// Bounded, shared list of recent toasts. Clones share the same feed.
#[derive(Debug, Clone, Default)]
pub struct ToastFeed {
    toasts: Arc<Mutex<VecDeque<Toast>>>,
}

impl ToastFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recent toasts, oldest first
    pub fn recent(&self) -> Result<Vec<Toast>, String> {
        self.toasts.lock()
            .map(|toasts| toasts.iter().cloned().collect())
            .map_err(|e| format!("Failed to lock toast feed: {}", e))
    }
}

impl ToastSurface for ToastFeed {
    fn toast(&self, message: &str, level: ToastLevel) {
        info!("Toast ({}): {}", level, message);

        if let Ok(mut toasts) = self.toasts.lock() {
            if toasts.len() == TOAST_HISTORY {
                toasts.pop_front();
            }
            toasts.push_back(Toast {
                message: message.to_string(),
                level,
                timestamp: Utc::now(),
            });
        }
    }
}
