//! Deterministic doubles for driving timers in simulated time

use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicI64, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use super::{
    Clock, Collaborators, FireOutcome, FireTicket, HandleId, NotificationSurface, Permission,
    PermissionSurface, Scheduler, TimerError, TimerManager, ToastLevel, ToastSurface,
};
use crate::state::{MemoryStore, TimerDefinition};

pub const MINUTE: i64 = 60_000;

#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicI64>,
}

impl ManualClock {
    pub fn at(now: i64) -> Self {
        let clock = Self::default();
        clock.set(now);
        clock
    }

    pub fn set(&self, now: i64) {
        self.now.store(now, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Default)]
struct SchedulerInner {
    pending: BTreeMap<HandleId, (i64, FireTicket)>,
    next_id: HandleId,
    unavailable: bool,
}

/// Scheduler that only delivers tickets when the test pops them
#[derive(Debug, Clone)]
pub struct ManualScheduler {
    clock: ManualClock,
    inner: Arc<Mutex<SchedulerInner>>,
}

impl ManualScheduler {
    pub fn new(clock: ManualClock) -> Self {
        Self {
            clock,
            inner: Arc::default(),
        }
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.inner.lock().unwrap().unavailable = unavailable;
    }

    pub fn pending_count(&self) -> usize {
        self.inner.lock().unwrap().pending.len()
    }

    /// Pending `(due, ticket)` pairs ordered by due time
    pub fn pending(&self) -> Vec<(i64, FireTicket)> {
        let mut pending: Vec<_> = self.inner.lock().unwrap().pending.values().cloned().collect();
        pending.sort_by_key(|(due, _)| *due);
        pending
    }

    /// Remove and return the earliest ticket due at or before `until`
    pub fn pop_due(&self, until: i64) -> Option<(i64, FireTicket)> {
        let mut inner = self.inner.lock().unwrap();
        let id = inner
            .pending
            .iter()
            .filter(|(_, (due, _))| *due <= until)
            .min_by_key(|(id, (due, _))| (*due, **id))
            .map(|(id, _)| *id)?;
        inner.pending.remove(&id)
    }
}

impl Scheduler for ManualScheduler {
    fn after(&mut self, delay: Duration, ticket: FireTicket) -> Result<HandleId, TimerError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.unavailable {
            return Err(TimerError::SchedulerUnavailable("no timer facility".to_string()));
        }
        inner.next_id += 1;
        let id = inner.next_id;
        let due = self.clock.now_millis() + delay.as_millis() as i64;
        inner.pending.insert(id, (due, ticket));
        Ok(id)
    }

    fn cancel(&mut self, handle: HandleId) {
        self.inner.lock().unwrap().pending.remove(&handle);
    }
}

/// Permission, notification and toast surface that records everything shown
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    permission: Arc<Mutex<Permission>>,
    notifications: Arc<Mutex<Vec<(String, String)>>>,
    toasts: Arc<Mutex<Vec<(String, ToastLevel)>>>,
}

impl RecordingSurface {
    pub fn new(permission: Permission) -> Self {
        Self {
            permission: Arc::new(Mutex::new(permission)),
            notifications: Arc::default(),
            toasts: Arc::default(),
        }
    }

    pub fn notifications(&self) -> Vec<(String, String)> {
        self.notifications.lock().unwrap().clone()
    }

    pub fn toasts(&self) -> Vec<(String, ToastLevel)> {
        self.toasts.lock().unwrap().clone()
    }
}

impl PermissionSurface for RecordingSurface {
    fn current(&self) -> Permission {
        *self.permission.lock().unwrap()
    }

    fn request(&mut self) -> Permission {
        self.current()
    }
}

impl NotificationSurface for RecordingSurface {
    fn notify(&self, title: &str, body: &str) {
        self.notifications
            .lock()
            .unwrap()
            .push((title.to_string(), body.to_string()));
    }
}

impl ToastSurface for RecordingSurface {
    fn toast(&self, message: &str, level: ToastLevel) {
        self.toasts.lock().unwrap().push((message.to_string(), level));
    }
}

/// A manager wired to manual doubles, standing in for one page lifetime
pub struct Harness {
    pub manager: TimerManager,
    pub clock: ManualClock,
    pub scheduler: ManualScheduler,
    pub store: MemoryStore,
    pub surface: RecordingSurface,
}

impl Harness {
    pub fn new(now: i64) -> Self {
        Self::with_store(MemoryStore::new(), now, Permission::Granted)
    }

    pub fn with_store(store: MemoryStore, now: i64, permission: Permission) -> Self {
        let clock = ManualClock::at(now);
        let scheduler = ManualScheduler::new(clock.clone());
        let surface = RecordingSurface::new(permission);
        let manager = TimerManager::new(
            TimerDefinition::defaults(30),
            Collaborators {
                clock: Box::new(clock.clone()),
                scheduler: Box::new(scheduler.clone()),
                store: Box::new(store.clone()),
                permission: Box::new(surface.clone()),
                notifications: Box::new(surface.clone()),
                toasts: Box::new(surface.clone()),
            },
        );

        Self {
            manager,
            clock,
            scheduler,
            store,
            surface,
        }
    }

    /// Start a new lifetime at `now` that shares this one's persisted store
    pub fn reload_at(&self, now: i64) -> Self {
        let permission = self.surface.current();
        Self::with_store(self.store.clone(), now, permission)
    }

    /// Advance simulated time, delivering due tickets in order. Returns the
    /// number of reminders that fired.
    pub fn advance_to(&mut self, until: i64) -> usize {
        let mut fired = 0;
        while let Some((due, ticket)) = self.scheduler.pop_due(until) {
            self.clock.set(due);
            if self.manager.fire(&ticket) == Ok(FireOutcome::Fired) {
                fired += 1;
            }
        }
        self.clock.set(until);
        fired
    }

    pub fn stored(&self, key: &str) -> Option<String> {
        self.store.entries().get(key).cloned()
    }
}
