//! aura-gen library interface
//!
//! AI radio generation service: turns a user prompt into a persisted radio
//! station through an asynchronous job pipeline (prompt construction →
//! model call → catalog matching → station persistence). Exposed as a
//! library for integration testing.

pub mod api;
pub mod catalog;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::services::GenerationOrchestrator;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Generation job orchestrator
    pub orchestrator: Arc<GenerationOrchestrator>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(db: SqlitePool, orchestrator: Arc<GenerationOrchestrator>) -> Self {
        Self {
            db,
            orchestrator,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::generation_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
