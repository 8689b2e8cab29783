//! Timer event loop background task

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::{state::AppState, timers::{FireOutcome, FireTicket}};

/// Background task that hands scheduler tickets to the timer manager, one at
/// a time, so fires and user actions never interleave
pub async fn timer_event_task(state: Arc<AppState>, mut tickets: mpsc::UnboundedReceiver<FireTicket>) {
    info!("Starting timer event task");

    while let Some(ticket) = tickets.recv().await {
        match state.fire_timer(&ticket) {
            Ok(FireOutcome::Fired) => debug!("{} reminder delivered", ticket.key),
            Ok(outcome) => debug!("{} ticket dropped: {:?}", ticket.key, outcome),
            Err(e) => error!("Failed to fire {} timer: {}", ticket.key, e),
        }
    }

    info!("Timer event channel closed, stopping timer event task");
}
