//! Resend cooldown gate
//!
//! Throttles "resend" style actions per scope. The expiry is kept in a
//! session-scoped store so a reload resumes the running cooldown instead of
//! resetting it.

use tracing::{debug, warn};

use super::KeyValueStore;
use crate::timers::Clock;

/// Default cooldown length in seconds
pub const DEFAULT_COOLDOWN_SECS: u64 = 30;

fn storage_key(scope: &str) -> String {
    format!("resend_cooldown_{}", scope)
}

/// Per-scope cooldown with persisted expiry
pub struct CooldownGate {
    store: Box<dyn KeyValueStore>,
    clock: Box<dyn Clock>,
    duration_secs: u64,
}

impl CooldownGate {
    pub fn new(store: Box<dyn KeyValueStore>, clock: Box<dyn Clock>, duration_secs: u64) -> Self {
        Self {
            store,
            clock,
            duration_secs,
        }
    }

    /// Seconds left before `scope` is ready again, rounded up. Expired
    /// entries are erased.
    pub fn remaining_secs(&mut self, scope: &str) -> u64 {
        let key = storage_key(scope);
        let Some(raw) = self.store.get(&key) else {
            return 0;
        };

        let now = self.clock.now_millis();
        let remaining = match raw.trim().parse::<i64>() {
            Ok(expiry) if expiry <= now.saturating_add(self.duration_millis()) => {
                expiry.saturating_sub(now)
            }
            _ => {
                warn!("Ignoring corrupt cooldown for {}: {:?}", scope, raw);
                0
            }
        };

        if remaining > 0 {
            (remaining.saturating_add(999) / 1000) as u64
        } else {
            if let Err(e) = self.store.remove(&key) {
                warn!("Failed to clear cooldown for {}: {}", scope, e);
            }
            0
        }
    }

    /// Begin a full cooldown for `scope`
    pub fn start(&mut self, scope: &str) -> u64 {
        let expiry = self.clock.now_millis().saturating_add(self.duration_millis());
        if let Err(e) = self.store.set(&storage_key(scope), &expiry.to_string()) {
            warn!("Failed to persist cooldown for {}: {}", scope, e);
        }
        debug!("Cooldown started for {} ({}s)", scope, self.duration_secs);
        self.duration_secs
    }

    fn duration_millis(&self) -> i64 {
        i64::try_from(self.duration_secs.saturating_mul(1000)).unwrap_or(i64::MAX)
    }

    /// Resume a running cooldown, or start a fresh one if none is running
    pub fn resume_or_start(&mut self, scope: &str) -> u64 {
        match self.remaining_secs(scope) {
            0 => self.start(scope),
            remaining => remaining,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::MemoryStore;
    use crate::timers::testing::ManualClock;

    fn gate(store: &MemoryStore, clock: &ManualClock) -> CooldownGate {
        CooldownGate::new(Box::new(store.clone()), Box::new(clock.clone()), DEFAULT_COOLDOWN_SECS)
    }

    #[test]
    fn fresh_scope_starts_full_cooldown() {
        let store = MemoryStore::new();
        let clock = ManualClock::at(1_000);
        let mut gate = gate(&store, &clock);

        assert_eq!(gate.remaining_secs("/verify"), 0);
        assert_eq!(gate.resume_or_start("/verify"), 30);
        assert_eq!(store.entries().get("resend_cooldown_/verify").map(String::as_str), Some("31000"));
    }

    #[test]
    fn reload_resumes_remaining_time() {
        let store = MemoryStore::new();
        let clock = ManualClock::at(0);
        gate(&store, &clock).start("/verify");

        clock.set(12_500);
        let mut reloaded = gate(&store, &clock);
        assert_eq!(reloaded.resume_or_start("/verify"), 18);
    }

    #[test]
    fn expired_cooldown_restarts_and_is_erased() {
        let store = MemoryStore::new();
        let clock = ManualClock::at(0);
        let mut gate = gate(&store, &clock);
        gate.start("/reset");

        clock.set(30_000);
        assert_eq!(gate.remaining_secs("/reset"), 0);
        assert!(store.entries().is_empty());

        assert_eq!(gate.resume_or_start("/reset"), 30);
    }

    #[test]
    fn scopes_are_independent() {
        let store = MemoryStore::new();
        let clock = ManualClock::at(0);
        let mut gate = gate(&store, &clock);
        gate.start("/a");

        assert_eq!(gate.remaining_secs("/b"), 0);
        assert_eq!(gate.remaining_secs("/a"), 30);
    }

    #[test]
    fn out_of_range_expiry_is_discarded() {
        let mut store = MemoryStore::new();
        store.set("resend_cooldown_/verify", &i64::MAX.to_string()).unwrap();
        let clock = ManualClock::at(1_000);
        let mut gate = gate(&store, &clock);

        assert_eq!(gate.remaining_secs("/verify"), 0);
        assert!(store.entries().is_empty());
        assert_eq!(gate.resume_or_start("/verify"), 30);
    }

    #[test]
    fn huge_duration_saturates() {
        let store = MemoryStore::new();
        let clock = ManualClock::at(1_000);
        let mut gate = CooldownGate::new(Box::new(store.clone()), Box::new(clock.clone()), u64::MAX);

        assert_eq!(gate.start("/verify"), u64::MAX);
        assert_eq!(
            store.entries().get("resend_cooldown_/verify").map(String::as_str),
            Some(i64::MAX.to_string().as_str())
        );
        assert_eq!(gate.remaining_secs("/verify"), ((i64::MAX - 1_000) / 1000 + 1) as u64);
    }
}
