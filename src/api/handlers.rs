//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use tracing::{error, info, warn};

use crate::{
    state::{AppError, AppState},
    timers::TimerError,
};
use super::responses::{
    ApiResponse, CooldownResponse, HealthResponse, IntervalRequest, StatusResponse,
    ToastsResponse,
};

/// Map an application error to the HTTP status returned to the client
fn error_status(action: &str, e: &AppError) -> StatusCode {
    match e {
        AppError::Timer(TimerError::UnknownTimer(_)) => {
            warn!("{} rejected: {}", action, e);
            StatusCode::NOT_FOUND
        }
        AppError::Timer(
            TimerError::IntervalFixed(_)
            | TimerError::InvalidInterval { .. }
            | TimerError::Disabled(_),
        ) => {
            warn!("{} rejected: {}", action, e);
            StatusCode::BAD_REQUEST
        }
        AppError::Timer(TimerError::SchedulerUnavailable(_)) | AppError::Lock(_) => {
            error!("{} failed: {}", action, e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Handle POST /timers/:key/enable - Switch a reminder on
pub async fn enable_handler(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Json<ApiResponse>, StatusCode> {
    match state.enable_timer(&key) {
        Ok(timer) => {
            info!("Enable endpoint called - {} timer enabled", key);
            Ok(Json(ApiResponse::active(
                format!("{} timer enabled", timer.label),
                timer,
            )))
        }
        Err(e) => Err(error_status("enable", &e)),
    }
}

/// Handle POST /timers/:key/disable - Switch a reminder off
pub async fn disable_handler(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Json<ApiResponse>, StatusCode> {
    match state.disable_timer(&key) {
        Ok(timer) => {
            info!("Disable endpoint called - {} timer disabled", key);
            Ok(Json(ApiResponse::inactive(
                format!("{} timer disabled", timer.label),
                timer,
            )))
        }
        Err(e) => Err(error_status("disable", &e)),
    }
}

/// Handle PUT /timers/:key/interval - Change a reminder's interval
pub async fn interval_handler(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    Json(request): Json<IntervalRequest>,
) -> Result<Json<ApiResponse>, StatusCode> {
    match state.set_timer_interval(&key, request.minutes) {
        Ok(timer) => {
            info!("Interval endpoint called - {} set to {} min", key, request.minutes);
            Ok(Json(ApiResponse::for_timer(
                format!("{} interval set to {} minutes", timer.label, request.minutes),
                timer,
            )))
        }
        Err(e) => Err(error_status("set interval", &e)),
    }
}

/// Handle GET /status - Return every timer and server metadata
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, StatusCode> {
    let timers = state.timer_snapshots().map_err(|e| error_status("status", &e))?;
    let notifications = state.notification_permission().map_err(|e| error_status("status", &e))?;
    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        timers,
        notifications,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /toasts - Return recent in-app messages
pub async fn toasts_handler(State(state): State<Arc<AppState>>) -> Result<Json<ToastsResponse>, StatusCode> {
    match state.toasts.recent() {
        Ok(toasts) => Ok(Json(ToastsResponse { toasts })),
        Err(e) => {
            error!("Failed to read toasts: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle GET /cooldown/:scope - Report a resend cooldown
pub async fn cooldown_status_handler(
    State(state): State<Arc<AppState>>,
    Path(scope): Path<String>,
) -> Result<Json<CooldownResponse>, StatusCode> {
    let remaining = state.cooldown_remaining(&scope)
        .map_err(|e| error_status("cooldown status", &e))?;
    Ok(Json(CooldownResponse::new(scope, remaining)))
}

/// Handle POST /cooldown/:scope - Resume or start a resend cooldown
pub async fn cooldown_start_handler(
    State(state): State<Arc<AppState>>,
    Path(scope): Path<String>,
) -> Result<Json<CooldownResponse>, StatusCode> {
    let remaining = state.cooldown_resume_or_start(&scope)
        .map_err(|e| error_status("cooldown start", &e))?;
    info!("Cooldown endpoint called - {} has {}s remaining", scope, remaining);
    Ok(Json(CooldownResponse::new(scope, remaining)))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
