//! Main application state management

use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::{Duration, Instant},
};
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::info;

use super::{CooldownGate, TimerSnapshot};
use crate::{
    services::ToastFeed,
    timers::{FireOutcome, FireTicket, Permission, ReconcileReport, TimerError, TimerManager},
};

/// Errors surfaced by application state operations
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Failed to lock {0}")]
    Lock(&'static str),

    #[error(transparent)]
    Timer(#[from] TimerError),
}

/// Main application state shared by the HTTP handlers and background tasks
pub struct AppState {
    /// Reminder timers; every mutation goes through this lock
    pub timers: Arc<Mutex<TimerManager>>,
    /// Toasts shown to clients
    pub toasts: ToastFeed,
    /// Resend cooldowns, session scoped
    pub cooldowns: Arc<Mutex<CooldownGate>>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
}

impl AppState {
    /// Create a new AppState around an already-constructed timer manager
    pub fn new(
        port: u16,
        host: String,
        timers: TimerManager,
        toasts: ToastFeed,
        cooldowns: CooldownGate,
    ) -> Self {
        Self {
            timers: Arc::new(Mutex::new(timers)),
            toasts,
            cooldowns: Arc::new(Mutex::new(cooldowns)),
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
        }
    }

    fn lock_timers(&self) -> Result<MutexGuard<'_, TimerManager>, AppError> {
        self.timers.lock().map_err(|_| AppError::Lock("timer manager"))
    }

    fn lock_cooldowns(&self) -> Result<MutexGuard<'_, CooldownGate>, AppError> {
        self.cooldowns.lock().map_err(|_| AppError::Lock("cooldown gate"))
    }

    fn record_action(&self, action: String) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action);
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// Switch a timer on
    pub fn enable_timer(&self, key: &str) -> Result<TimerSnapshot, AppError> {
        let mut timers = self.lock_timers()?;
        timers.enable(key)?;
        let snapshot = timers.snapshot(key)?;
        drop(timers);

        self.record_action(format!("enable {}", key));
        Ok(snapshot)
    }

    /// Switch a timer off
    pub fn disable_timer(&self, key: &str) -> Result<TimerSnapshot, AppError> {
        let mut timers = self.lock_timers()?;
        timers.disable(key)?;
        let snapshot = timers.snapshot(key)?;
        drop(timers);

        self.record_action(format!("disable {}", key));
        Ok(snapshot)
    }

    /// Change a configurable timer's interval
    pub fn set_timer_interval(&self, key: &str, minutes: u32) -> Result<TimerSnapshot, AppError> {
        let mut timers = self.lock_timers()?;
        timers.set_interval(key, minutes)?;
        let snapshot = timers.snapshot(key)?;
        drop(timers);

        self.record_action(format!("interval {} {}", key, minutes));
        Ok(snapshot)
    }

    /// Get snapshots of every timer
    pub fn timer_snapshots(&self) -> Result<Vec<TimerSnapshot>, AppError> {
        Ok(self.lock_timers()?.snapshots())
    }

    /// Get current notification permission
    pub fn notification_permission(&self) -> Result<Permission, AppError> {
        Ok(self.lock_timers()?.permission())
    }

    /// Restore timers from persisted state
    pub fn reconcile_timers(&self) -> Result<ReconcileReport, AppError> {
        let report = self.lock_timers()?.reconcile_on_startup();
        info!(
            "Timers reconciled: armed={:?}, resumed={:?}, restarted={:?}, failed={:?}",
            report.armed, report.resumed, report.restarted, report.failed
        );
        Ok(report)
    }

    /// Deliver a scheduler ticket to the timer manager
    pub fn fire_timer(&self, ticket: &FireTicket) -> Result<FireOutcome, AppError> {
        Ok(self.lock_timers()?.fire(ticket)?)
    }

    /// Restart timers that went overdue while the host was asleep
    pub fn recover_overdue_timers(&self, grace: Duration) -> Result<Vec<String>, AppError> {
        Ok(self.lock_timers()?.recover_overdue(grace))
    }

    /// Seconds left on a resend cooldown
    pub fn cooldown_remaining(&self, scope: &str) -> Result<u64, AppError> {
        Ok(self.lock_cooldowns()?.remaining_secs(scope))
    }

    /// Resume a running resend cooldown or start a new one
    pub fn cooldown_resume_or_start(&self, scope: &str) -> Result<u64, AppError> {
        let remaining = self.lock_cooldowns()?.resume_or_start(scope);
        self.record_action(format!("cooldown {}", scope));
        Ok(remaining)
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}
