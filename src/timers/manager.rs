//! Recurring timer manager
//!
//! Owns the state of every named reminder timer, keeps each timer's next
//! deadline in the persistent store and reconciles those deadlines with live
//! scheduled callbacks after a restart. Missed firings are never replayed:
//! a timer found past due is restarted from now with a single notice.

use std::{collections::BTreeMap, time::Duration};
use tracing::{debug, error, info, warn};

use super::{
    Clock, FireTicket, NotificationSurface, Permission, PermissionSurface, Scheduler,
    TimerError, ToastLevel, ToastSurface,
};
use crate::state::{
    store::{enabled_key, interval_key, target_key},
    KeyValueStore, Reminder, TimerDefinition, TimerSnapshot, TimerState,
    MAX_INTERVAL_MINUTES, MIN_INTERVAL_MINUTES,
};

const MILLIS_PER_MINUTE: i64 = 60_000;

/// Host capabilities the manager runs on
pub struct Collaborators {
    pub clock: Box<dyn Clock>,
    pub scheduler: Box<dyn Scheduler>,
    pub store: Box<dyn KeyValueStore>,
    pub permission: Box<dyn PermissionSurface>,
    pub notifications: Box<dyn NotificationSurface>,
    pub toasts: Box<dyn ToastSurface>,
}

/// What happened to a delivered ticket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireOutcome {
    /// Reminder delivered and the next cycle armed
    Fired,
    /// Ticket belonged to a cancelled or superseded callback
    Stale,
    /// Timer was switched off before the ticket arrived
    Disabled,
}

/// Per-timer result of startup reconciliation
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Enabled timers with no usable deadline, armed fresh
    pub armed: Vec<String>,
    /// Timers whose deadline was still ahead
    pub resumed: Vec<String>,
    /// Timers found past due and restarted from now
    pub restarted: Vec<String>,
    /// Timers that could not be scheduled
    pub failed: Vec<String>,
}

struct TimerEntry {
    definition: TimerDefinition,
    state: TimerState,
}

enum Recovery {
    Arm,
    Resume(i64),
    Restart,
}

/// Manager for a set of independently named recurring timers
pub struct TimerManager {
    timers: BTreeMap<String, TimerEntry>,
    clock: Box<dyn Clock>,
    scheduler: Box<dyn Scheduler>,
    store: Box<dyn KeyValueStore>,
    permission: Box<dyn PermissionSurface>,
    notifications: Box<dyn NotificationSurface>,
    toasts: Box<dyn ToastSurface>,
    scheduler_failure_reported: bool,
}

impl TimerManager {
    /// Create a manager with every timer disabled. Call
    /// [`reconcile_on_startup`](Self::reconcile_on_startup) to restore
    /// persisted state.
    pub fn new(definitions: Vec<TimerDefinition>, collaborators: Collaborators) -> Self {
        let timers = definitions
            .into_iter()
            .map(|definition| {
                let state = TimerState::new(definition.default_interval_minutes);
                (definition.key.clone(), TimerEntry { definition, state })
            })
            .collect();

        Self {
            timers,
            clock: collaborators.clock,
            scheduler: collaborators.scheduler,
            store: collaborators.store,
            permission: collaborators.permission,
            notifications: collaborators.notifications,
            toasts: collaborators.toasts,
            scheduler_failure_reported: false,
        }
    }

    pub fn state(&self, key: &str) -> Option<&TimerState> {
        self.timers.get(key).map(|entry| &entry.state)
    }

    pub fn snapshot(&self, key: &str) -> Result<TimerSnapshot, TimerError> {
        let entry = self.entry(key)?;
        Ok(TimerSnapshot::new(&entry.definition, &entry.state, self.clock.now_millis()))
    }

    pub fn snapshots(&self) -> Vec<TimerSnapshot> {
        let now = self.clock.now_millis();
        self.timers
            .values()
            .map(|entry| TimerSnapshot::new(&entry.definition, &entry.state, now))
            .collect()
    }

    /// Current notification permission, without prompting
    pub fn permission(&self) -> Permission {
        self.permission.current()
    }

    /// Switch a timer on and arm it for a full interval from now
    pub fn enable(&mut self, key: &str) -> Result<(), TimerError> {
        let interval = self.entry(key)?.state.interval_minutes;

        if !self.permission.request().is_granted() {
            self.toasts.toast(
                "Notifications disabled. Using visual alerts only.",
                ToastLevel::Warning,
            );
        }

        self.entry_mut(key)?.state.enabled = true;
        self.persist(&enabled_key(key), "true");
        info!("Enabling {} timer ({} min)", key, interval);

        if let Err(e) = self.rearm(key, interval) {
            // Never leave an enabled timer without a pending callback
            self.teardown(key)?;
            return Err(e);
        }
        Ok(())
    }

    /// Switch a timer off, cancelling its callback and erasing its deadline
    pub fn disable(&mut self, key: &str) -> Result<(), TimerError> {
        self.teardown(key)?;
        info!("Disabled {} timer", key);
        Ok(())
    }

    /// Replace the pending callback with one firing `interval_minutes` from now
    pub fn rearm(&mut self, key: &str, interval_minutes: u32) -> Result<(), TimerError> {
        if !self.entry(key)?.state.enabled {
            return Err(TimerError::Disabled(key.to_string()));
        }
        validate_interval(interval_minutes)?;

        self.cancel_pending(key);

        let delay = i64::from(interval_minutes) * MILLIS_PER_MINUTE;
        let deadline = self.clock.now_millis().saturating_add(delay);

        // The deadline is only recorded once a callback is waiting for it
        if let Err(e) = self.schedule(key, delay) {
            self.clear_deadline(key);
            return Err(e);
        }
        self.entry_mut(key)?.state.deadline = Some(deadline);
        self.persist(&target_key(key), &deadline.to_string());

        debug!("Armed {} timer for {} min (deadline {})", key, interval_minutes, deadline);
        Ok(())
    }

    /// Change a configurable timer's interval. The pending callback keeps its
    /// deadline; the new interval applies from the next cycle.
    pub fn set_interval(&mut self, key: &str, minutes: u32) -> Result<(), TimerError> {
        let entry = self.entry(key)?;
        if !entry.definition.configurable {
            return Err(TimerError::IntervalFixed(key.to_string()));
        }
        validate_interval(minutes)?;

        let entry = self.entry_mut(key)?;
        entry.state.interval_minutes = minutes;
        let running = entry.state.enabled;
        let label = entry.definition.label.clone();

        self.persist(&interval_key(key), &minutes.to_string());
        info!("{} interval set to {} min", key, minutes);

        if running {
            self.toasts.toast(
                &format!("{} timer set to {} minutes.", label, minutes),
                ToastLevel::Success,
            );
        }
        Ok(())
    }

    /// Restore persisted intervals and enabled flags, then give every enabled
    /// timer a live callback again
    pub fn reconcile_on_startup(&mut self) -> ReconcileReport {
        let now = self.clock.now_millis();
        let keys: Vec<String> = self.timers.keys().cloned().collect();
        let mut report = ReconcileReport::default();

        for key in keys {
            self.load_interval(&key);

            if self.store.get(&enabled_key(&key)).as_deref() != Some("true") {
                continue;
            }

            let Some(entry) = self.timers.get_mut(&key) else {
                continue;
            };
            entry.state.enabled = true;
            let interval = entry.state.interval_minutes;

            let recovery = match self.load_deadline(&key, now) {
                None => Recovery::Arm,
                Some(deadline) if deadline > now => Recovery::Resume(deadline),
                Some(_) => Recovery::Restart,
            };

            let (result, bucket) = match recovery {
                Recovery::Arm => {
                    info!("{} timer enabled without a deadline, arming fresh", key);
                    (self.rearm(&key, interval), &mut report.armed)
                }
                Recovery::Resume(deadline) => {
                    info!("Resuming {} timer, {} ms remaining", key, deadline - now);
                    (self.resume(&key, deadline, now), &mut report.resumed)
                }
                Recovery::Restart => {
                    info!("{} timer missed its deadline while stopped", key);
                    (self.restart_after_absence(&key), &mut report.restarted)
                }
            };

            match result {
                Ok(()) => bucket.push(key),
                Err(e) => {
                    warn!("Failed to reconcile {} timer: {}", key, e);
                    report.failed.push(key);
                }
            }
        }

        report
    }

    /// Handle a delivered ticket: show the reminder and arm the next cycle
    /// with the current interval
    pub fn fire(&mut self, ticket: &FireTicket) -> Result<FireOutcome, TimerError> {
        let entry = self.timers.get_mut(&ticket.key)
            .ok_or_else(|| TimerError::UnknownTimer(ticket.key.clone()))?;

        if entry.state.generation != ticket.generation {
            debug!("Ignoring stale ticket for {} (generation {})", ticket.key, ticket.generation);
            return Ok(FireOutcome::Stale);
        }

        let spent = entry.state.handle.take();
        if !entry.state.enabled {
            return Ok(FireOutcome::Disabled);
        }
        let reminder = entry.definition.reminder.clone();

        if let Some(handle) = spent {
            self.scheduler.cancel(handle);
        }

        info!("{} timer fired", ticket.key);
        self.deliver(&reminder);

        // Re-read the live flag rather than trusting the state seen above
        let entry = self.entry(&ticket.key)?;
        if !entry.state.enabled {
            return Ok(FireOutcome::Disabled);
        }
        let interval = entry.state.interval_minutes;

        self.rearm(&ticket.key, interval)?;
        Ok(FireOutcome::Fired)
    }

    /// Restart every enabled timer whose deadline passed more than `grace`
    /// ago without firing, as happens when the host sleeps
    pub fn recover_overdue(&mut self, grace: Duration) -> Vec<String> {
        let now = self.clock.now_millis();
        let grace = i64::try_from(grace.as_millis()).unwrap_or(i64::MAX);

        let overdue: Vec<String> = self
            .timers
            .iter()
            .filter(|(_, entry)| {
                entry.state.enabled
                    && entry.state.deadline.is_some_and(|d| now.saturating_sub(d) > grace)
            })
            .map(|(key, _)| key.clone())
            .collect();

        for key in &overdue {
            warn!("{} timer is overdue, host was probably asleep", key);
            if let Err(e) = self.restart_after_absence(key) {
                error!("Failed to restart overdue {} timer: {}", key, e);
            }
        }

        overdue
    }

    fn entry(&self, key: &str) -> Result<&TimerEntry, TimerError> {
        self.timers.get(key)
            .ok_or_else(|| TimerError::UnknownTimer(key.to_string()))
    }

    fn entry_mut(&mut self, key: &str) -> Result<&mut TimerEntry, TimerError> {
        self.timers.get_mut(key)
            .ok_or_else(|| TimerError::UnknownTimer(key.to_string()))
    }

    fn resume(&mut self, key: &str, deadline: i64, now: i64) -> Result<(), TimerError> {
        self.cancel_pending(key);
        if let Err(e) = self.schedule(key, deadline - now) {
            self.clear_deadline(key);
            return Err(e);
        }
        self.entry_mut(key)?.state.deadline = Some(deadline);
        Ok(())
    }

    /// Cancel the callback, erase the deadline and record the timer as off
    fn teardown(&mut self, key: &str) -> Result<(), TimerError> {
        self.entry(key)?;
        self.cancel_pending(key);
        self.clear_deadline(key);
        self.entry_mut(key)?.state.enabled = false;
        self.persist(&enabled_key(key), "false");
        Ok(())
    }

    /// Forget the deadline in memory and in the store. An enabled timer left
    /// this way is armed fresh by the next reconciliation.
    fn clear_deadline(&mut self, key: &str) {
        if let Some(entry) = self.timers.get_mut(key) {
            entry.state.deadline = None;
        }
        self.erase(&target_key(key));
    }

    fn restart_after_absence(&mut self, key: &str) -> Result<(), TimerError> {
        let entry = self.entry(key)?;
        let interval = entry.state.interval_minutes;
        let notice = format!("Welcome back. {} timer restarted.", entry.definition.label);

        self.toasts.toast(&notice, ToastLevel::Info);
        self.rearm(key, interval)
    }

    /// Invalidate the outstanding callback, if any
    fn cancel_pending(&mut self, key: &str) {
        if let Some(entry) = self.timers.get_mut(key) {
            entry.state.generation += 1;
            if let Some(handle) = entry.state.handle.take() {
                self.scheduler.cancel(handle);
            }
        }
    }

    fn schedule(&mut self, key: &str, delay_millis: i64) -> Result<(), TimerError> {
        let entry = self.timers.get_mut(key)
            .ok_or_else(|| TimerError::UnknownTimer(key.to_string()))?;

        entry.state.generation += 1;
        let ticket = FireTicket {
            key: key.to_string(),
            generation: entry.state.generation,
        };
        let delay = Duration::from_millis(u64::try_from(delay_millis).unwrap_or(0));

        match self.scheduler.after(delay, ticket) {
            Ok(handle) => {
                entry.state.handle = Some(handle);
                Ok(())
            }
            Err(e) => {
                error!("Failed to schedule {} timer: {}", key, e);
                if !self.scheduler_failure_reported {
                    self.scheduler_failure_reported = true;
                    self.toasts.toast(
                        &format!("Reminders are unavailable: {}", e),
                        ToastLevel::Warning,
                    );
                }
                Err(e)
            }
        }
    }

    fn deliver(&self, reminder: &Reminder) {
        if self.permission.current().is_granted() {
            self.notifications.notify(&reminder.title, &reminder.body);
        } else {
            self.toasts.toast(
                &format!("{}: {}", reminder.title, reminder.body),
                ToastLevel::Info,
            );
        }
    }

    fn load_interval(&mut self, key: &str) {
        let Some(entry) = self.timers.get_mut(key) else {
            return;
        };
        if !entry.definition.configurable {
            return;
        }
        let Some(raw) = self.store.get(&interval_key(key)) else {
            return;
        };

        match raw.trim().parse::<u32>() {
            Ok(minutes) if (MIN_INTERVAL_MINUTES..=MAX_INTERVAL_MINUTES).contains(&minutes) => {
                entry.state.interval_minutes = minutes;
            }
            _ => warn!("Ignoring invalid stored interval for {}: {:?}", key, raw),
        }
    }

    fn load_deadline(&self, key: &str, now: i64) -> Option<i64> {
        let raw = self.store.get(&target_key(key))?;
        // No interval can put a deadline further out than this
        let horizon = now.saturating_add(i64::from(MAX_INTERVAL_MINUTES) * MILLIS_PER_MINUTE);

        match raw.trim().parse::<i64>() {
            Ok(deadline) if deadline <= horizon => Some(deadline),
            Ok(deadline) => {
                warn!("Ignoring stored deadline for {} beyond any interval: {}", key, deadline);
                None
            }
            Err(_) => {
                warn!("Ignoring corrupt stored deadline for {}: {:?}", key, raw);
                None
            }
        }
    }

    fn persist(&mut self, key: &str, value: &str) {
        if let Err(e) = self.store.set(key, value) {
            warn!("Failed to persist {}: {}", key, e);
        }
    }

    fn erase(&mut self, key: &str) {
        if let Err(e) = self.store.remove(key) {
            warn!("Failed to erase {}: {}", key, e);
        }
    }
}

fn validate_interval(minutes: u32) -> Result<(), TimerError> {
    if (MIN_INTERVAL_MINUTES..=MAX_INTERVAL_MINUTES).contains(&minutes) {
        Ok(())
    } else {
        Err(TimerError::InvalidInterval {
            got: minutes,
            min: MIN_INTERVAL_MINUTES,
            max: MAX_INTERVAL_MINUTES,
        })
    }
}
