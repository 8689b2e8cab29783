//! Deferred-callback scheduling for reminder timers
//!
//! A scheduled callback never touches the timer manager directly. When its
//! delay elapses it posts a [`FireTicket`] on a channel, and a single event
//! loop task hands the ticket back to the manager. This keeps every timer
//! mutation serialised behind one lock.

use std::{collections::HashMap, time::Duration};
use tokio::{
    runtime::Handle,
    sync::mpsc,
    task::AbortHandle,
    time::sleep,
};
use tracing::debug;

use super::TimerError;

/// Identifier of a pending scheduled callback
pub type HandleId = u64;

/// Delivered when a scheduled callback comes due
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FireTicket {
    pub key: String,
    pub generation: u64,
}

/// Host facility for registering and cancelling deferred callbacks
pub trait Scheduler: Send {
    /// Deliver `ticket` once `delay` has elapsed
    fn after(&mut self, delay: Duration, ticket: FireTicket) -> Result<HandleId, TimerError>;

    /// Cancel a pending callback. Unknown or already-fired handles are ignored.
    fn cancel(&mut self, handle: HandleId);
}

/// Scheduler that sleeps on the tokio runtime and posts tickets to a channel
#[derive(Debug)]
pub struct TokioScheduler {
    tx: mpsc::UnboundedSender<FireTicket>,
    pending: HashMap<HandleId, AbortHandle>,
    next_id: HandleId,
}

impl TokioScheduler {
    /// Create a scheduler together with the receiver its tickets arrive on
    pub fn new() -> (Self, mpsc::UnboundedReceiver<FireTicket>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let scheduler = Self {
            tx,
            pending: HashMap::new(),
            next_id: 1,
        };
        (scheduler, rx)
    }

    /// Number of callbacks that have not fired or been cancelled yet
    pub fn pending_count(&self) -> usize {
        self.pending.values().filter(|h| !h.is_finished()).count()
    }
}

impl Scheduler for TokioScheduler {
    fn after(&mut self, delay: Duration, ticket: FireTicket) -> Result<HandleId, TimerError> {
        let runtime = Handle::try_current()
            .map_err(|e| TimerError::SchedulerUnavailable(e.to_string()))?;

        if self.tx.is_closed() {
            return Err(TimerError::SchedulerUnavailable(
                "timer event loop has stopped".to_string(),
            ));
        }

        // Drop bookkeeping for callbacks that already delivered their ticket
        self.pending.retain(|_, handle| !handle.is_finished());

        let id = self.next_id;
        self.next_id += 1;

        debug!("Scheduling {} (generation {}) in {:?}", ticket.key, ticket.generation, delay);

        let tx = self.tx.clone();
        let task = runtime.spawn(async move {
            sleep(delay).await;
            let _ = tx.send(ticket);
        });
        self.pending.insert(id, task.abort_handle());

        Ok(id)
    }

    fn cancel(&mut self, handle: HandleId) {
        if let Some(task) = self.pending.remove(&handle) {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticket(key: &str) -> FireTicket {
        FireTicket {
            key: key.to_string(),
            generation: 1,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn delivers_ticket_after_delay() {
        let (mut scheduler, mut rx) = TokioScheduler::new();
        scheduler.after(Duration::from_secs(60), ticket("hydration")).unwrap();

        let received = rx.recv().await.unwrap();
        assert_eq!(received, ticket("hydration"));
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_callback_never_delivers() {
        let (mut scheduler, mut rx) = TokioScheduler::new();
        let first = scheduler.after(Duration::from_secs(60), ticket("eye_rest")).unwrap();
        scheduler.after(Duration::from_secs(120), ticket("hydration")).unwrap();
        scheduler.cancel(first);

        let received = rx.recv().await.unwrap();
        assert_eq!(received.key, "hydration");
    }

    #[test]
    fn fails_without_runtime() {
        let (mut scheduler, _rx) = TokioScheduler::new();
        let err = scheduler
            .after(Duration::from_secs(1), ticket("eye_rest"))
            .unwrap_err();
        assert!(matches!(err, TimerError::SchedulerUnavailable(_)));
    }

    #[tokio::test]
    async fn fails_when_event_loop_is_gone() {
        let (mut scheduler, rx) = TokioScheduler::new();
        drop(rx);
        let err = scheduler
            .after(Duration::from_secs(1), ticket("eye_rest"))
            .unwrap_err();
        assert!(matches!(err, TimerError::SchedulerUnavailable(_)));
    }
}
