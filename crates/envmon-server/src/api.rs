//! HTTP handlers
//!
//! Readings and state endpoints for the device and the control panel,
//! plus the derived dashboard data for the front end.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use envmon_core::dashboard::{Dashboard, DashboardData, DashboardError};
use envmon_core::poller::DashboardView;
use envmon_core::reading::{NewReading, Reading};
use envmon_core::state::{StateUpdate, SystemState};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::error::ApiError;

/// Upper bound on `limit` for reading lists
pub const MAX_LIST_LIMIT: usize = 1000;

/// Shared handler state
pub struct AppState {
    dashboard: Dashboard,
    view: watch::Receiver<DashboardView>,
    startup_time: Instant,
}

impl AppState {
    /// Create handler state from the dashboard and the poller's view feed
    pub fn new(dashboard: Dashboard, view: watch::Receiver<DashboardView>) -> Self {
        Self {
            dashboard,
            view,
            startup_time: Instant::now(),
        }
    }
}

/// Run a dashboard call on the blocking pool
///
/// Store calls may touch the filesystem, so they stay off the async workers.
async fn blocking<T, F>(state: &AppState, call: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&Dashboard) -> Result<T, DashboardError> + Send + 'static,
{
    let dashboard = state.dashboard.clone();
    Ok(tokio::task::spawn_blocking(move || call(&dashboard)).await??)
}

/// Build the API router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/readings", get(list_readings).post(create_reading))
        .route("/api/state", get(get_state).post(update_state))
        .route("/api/dashboard", get(dashboard_handler))
        .route("/api/dashboard/view", get(view_handler))
        .with_state(Arc::new(state))
}

/// Query string of `GET /api/readings`
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Number of readings, defaults to the dashboard fetch limit
    pub limit: Option<usize>,
}

/// Body of a successful `POST /api/readings`
#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedResponse {
    /// Always true
    pub ok: bool,
    /// Id assigned to the reading
    pub id: String,
    /// Human-readable confirmation
    pub message: String,
}

/// Body of `GET /health`
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// "ok" when the reading store answers, "degraded" otherwise
    pub status: String,
    /// Server version
    pub version: String,
    /// Seconds since startup
    pub uptime_seconds: u64,
    /// Number of stored readings, when known
    pub readings: Option<usize>,
}

/// Liveness plus a store check
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let readings = blocking(&state, Dashboard::reading_count).await.ok();
    Json(HealthResponse {
        status: if readings.is_some() { "ok" } else { "degraded" }.to_string(),
        version: envmon_core::VERSION.to_string(),
        uptime_seconds: state.startup_time.elapsed().as_secs(),
        readings,
    })
}

/// Most recent readings, newest first
pub async fn list_readings(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Vec<Reading>>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let limit = query
        .limit
        .unwrap_or(state.dashboard.settings().fetch_limit)
        .min(MAX_LIST_LIMIT);
    Ok(Json(blocking(&state, move |d| d.recent(limit)).await?))
}

/// Store a reading sent by the device
pub async fn create_reading(
    State(state): State<Arc<AppState>>,
    body: Result<Json<NewReading>, JsonRejection>,
) -> Result<Json<CreatedResponse>, ApiError> {
    let Json(reading) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let stored = blocking(&state, move |d| d.record(reading)).await?;
    Ok(Json(CreatedResponse {
        ok: true,
        message: format!("Reading stored at {}", stored.timestamp.to_rfc3339()),
        id: stored.id,
    }))
}

/// Current control state
pub async fn get_state(State(state): State<Arc<AppState>>) -> Result<Json<SystemState>, ApiError> {
    Ok(Json(blocking(&state, Dashboard::state).await?))
}

/// Apply a control-panel command
pub async fn update_state(
    State(state): State<Arc<AppState>>,
    body: Result<Json<StateUpdate>, JsonRejection>,
) -> Result<Json<SystemState>, ApiError> {
    let Json(update) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    Ok(Json(blocking(&state, move |d| d.update_state(update)).await?))
}

/// Dashboard data computed on request
///
/// `null` when no readings are stored yet.
pub async fn dashboard_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Option<DashboardData>>, ApiError> {
    Ok(Json(blocking(&state, Dashboard::refresh).await?))
}

/// Latest view published by the background poller
pub async fn view_handler(State(state): State<Arc<AppState>>) -> Json<DashboardView> {
    Json(state.view.borrow().clone())
}
