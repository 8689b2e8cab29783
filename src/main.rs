//! Health Reminders - recurring eye-rest and hydration reminders
//!
//! This is the main entry point for the health-reminders daemon.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use health_reminders::{
    api::create_router,
    config::Config,
    services::{DesktopNotifier, ToastFeed},
    state::{AppState, CooldownGate, JsonFileStore, MemoryStore, TimerDefinition, DEFAULT_COOLDOWN_SECS},
    tasks::{timer_event_task, wake_up_recovery_task},
    timers::{Collaborators, SystemClock, TimerManager, TokioScheduler},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("health_reminders={},tower_http=info", config.log_level()))
        .init();

    info!("Starting health-reminders v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, state_file={}, hydration={}min",
          config.host, config.port, config.state_file.display(), config.hydration_minutes);

    let store = JsonFileStore::open(&config.state_file);
    let notifier = DesktopNotifier::probe(!config.no_desktop_notifications).await;
    let toasts = ToastFeed::new();
    let (scheduler, tickets) = TokioScheduler::new();

    let manager = TimerManager::new(
        TimerDefinition::defaults(config.hydration_minutes),
        Collaborators {
            clock: Box::new(SystemClock),
            scheduler: Box::new(scheduler),
            store: Box::new(store),
            permission: Box::new(notifier.clone()),
            notifications: Box::new(notifier),
            toasts: Box::new(toasts.clone()),
        },
    );

    // Cooldowns only live as long as this process, like session storage
    let cooldowns = CooldownGate::new(
        Box::new(MemoryStore::new()),
        Box::new(SystemClock),
        DEFAULT_COOLDOWN_SECS,
    );

    // Create application state
    let state = Arc::new(AppState::new(
        config.port,
        config.host.clone(),
        manager,
        toasts,
        cooldowns,
    ));

    // Start the timer event loop before any timer can come due
    let event_state = Arc::clone(&state);
    tokio::spawn(async move {
        timer_event_task(event_state, tickets).await;
    });

    state.reconcile_timers()
        .map_err(|e| anyhow::anyhow!("Failed to restore timers: {}", e))?;

    let recovery_state = Arc::clone(&state);
    tokio::spawn(async move {
        wake_up_recovery_task(recovery_state).await;
    });

    // Create HTTP router with all endpoints
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /timers/:key/enable   - Enable a reminder (eye_rest, hydration)");
    info!("  POST /timers/:key/disable  - Disable a reminder");
    info!("  PUT  /timers/:key/interval - Change a reminder's interval");
    info!("  GET  /toasts               - Recent in-app messages");
    info!("  GET  /cooldown/:scope      - Check a resend cooldown");
    info!("  POST /cooldown/:scope      - Resume or start a resend cooldown");
    info!("  GET  /status               - Check all reminders");
    info!("  GET  /health               - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        signal = shutdown_signal() => {
            match signal {
                Ok(signal) => info!("Shutdown signal {} received", signal),
                Err(e) => tracing::error!("Failed to install signal handler: {}", e),
            }
        }
    }

    info!("Server shutdown complete, deadlines kept in {}", config.state_file.display());
    Ok(())
}
