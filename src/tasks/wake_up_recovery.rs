//! Wake-up recovery background task

use std::{sync::Arc, time::Duration};
use tokio::time::interval;
use tracing::{info, warn};

use crate::state::AppState;

/// How often deadlines are compared against the wall clock
pub const RECOVERY_CHECK_INTERVAL: Duration = Duration::from_secs(15);
/// How late a timer may be before it counts as missed
pub const OVERDUE_GRACE: Duration = Duration::from_secs(5);

/// Background task that detects a host wake-up and restarts missed timers.
///
/// Sleeps on the runtime do not advance while the machine is suspended, so
/// after a wake-up pending callbacks lag behind their wall-clock deadlines.
pub async fn wake_up_recovery_task(state: Arc<AppState>) {
    info!("Starting wake-up recovery task");

    let mut interval = interval(RECOVERY_CHECK_INTERVAL);

    loop {
        interval.tick().await;

        match state.recover_overdue_timers(OVERDUE_GRACE) {
            Ok(restarted) if !restarted.is_empty() => {
                info!("System wake-up detected, restarted timers: {:?}", restarted);
            }
            Ok(_) => {
                // Nothing overdue, continue monitoring
            }
            Err(e) => {
                warn!("Failed to check for overdue timers: {}", e);
            }
        }
    }
}
