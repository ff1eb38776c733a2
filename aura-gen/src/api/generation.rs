//! Generation API handlers
//!
//! POST /api/generate, POST /api/generate/weekly, GET /api/jobs/{id},
//! POST /api/jobs/process
//!
//! Submission handlers create the pending job synchronously and spawn the
//! actual generation as a detached task; the caller polls job status for
//! the outcome.

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::JobStatus;
use crate::AppState;

/// POST /api/generate request
#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub user_id: Uuid,
    pub prompt: String,
}

/// POST /api/generate/weekly request
#[derive(Debug, Deserialize)]
pub struct WeeklyRequest {
    pub user_id: Uuid,
    pub theme: String,
}

/// Submission response: the job id to poll
#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub job_id: Uuid,
    pub status: JobStatus,
}

/// GET /api/jobs/{id} response
#[derive(Debug, Serialize)]
pub struct JobStatusResponse {
    pub job_id: Uuid,
    pub status: JobStatus,
    pub prompt: String,
    pub radio_station_id: Option<Uuid>,
    pub error_message: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// POST /api/jobs/process response
#[derive(Debug, Serialize)]
pub struct SweepResponse {
    pub started: bool,
}

/// POST /api/generate
///
/// Create a generation job and trigger processing as a detached task.
pub async fn submit_generation(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> ApiResult<Json<GenerateResponse>> {
    let job_id = state
        .orchestrator
        .submit(request.user_id, &request.prompt)
        .await?;

    spawn_processing(&state, job_id);

    Ok(Json(GenerateResponse {
        job_id,
        status: JobStatus::Pending,
    }))
}

/// POST /api/generate/weekly
///
/// Themed convenience wrapper around submission.
pub async fn submit_weekly(
    State(state): State<AppState>,
    Json(request): Json<WeeklyRequest>,
) -> ApiResult<Json<GenerateResponse>> {
    let job_id = state
        .orchestrator
        .generate_weekly(request.user_id, &request.theme)
        .await?;

    spawn_processing(&state, job_id);

    Ok(Json(GenerateResponse {
        job_id,
        status: JobStatus::Pending,
    }))
}

/// GET /api/jobs/{id}
///
/// Poll job progress. Status plus error message are the only feedback
/// channel for a submitted job.
pub async fn get_job_status(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> ApiResult<Json<JobStatusResponse>> {
    let job = crate::db::jobs::load_job(&state.db, job_id)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .ok_or_else(|| ApiError::NotFound(format!("Generation job not found: {}", job_id)))?;

    Ok(Json(JobStatusResponse {
        job_id: job.id,
        status: job.status,
        prompt: job.prompt,
        radio_station_id: job.radio_station_id,
        error_message: job.error_message,
        created_at: job.created_at,
        updated_at: job.updated_at,
    }))
}

/// POST /api/jobs/process
///
/// Trigger one background sweep of pending jobs. Responds immediately;
/// the sweep isolates and records per-job failures itself.
pub async fn process_pending_jobs(State(state): State<AppState>) -> Json<SweepResponse> {
    let orchestrator = state.orchestrator.clone();
    tokio::spawn(async move {
        match orchestrator.process_pending().await {
            Ok(count) => {
                tracing::info!(jobs = count, "Pending-job sweep finished");
            }
            Err(e) => {
                tracing::error!(error = %e, "Pending-job sweep aborted");
            }
        }
    });

    Json(SweepResponse { started: true })
}

/// Detached processing task for one job; failures are recorded on the job
/// itself, so this only logs infrastructure-level errors.
fn spawn_processing(state: &AppState, job_id: Uuid) {
    let orchestrator = state.orchestrator.clone();
    tokio::spawn(async move {
        if let Err(e) = orchestrator.process_job(job_id).await {
            tracing::error!(job_id = %job_id, error = %e, "Detached processing task failed");
        }
    });
}

/// Build generation routes
pub fn generation_routes() -> Router<AppState> {
    Router::new()
        .route("/api/generate", post(submit_generation))
        .route("/api/generate/weekly", post(submit_weekly))
        .route("/api/jobs/:job_id", get(get_job_status))
        .route("/api/jobs/process", post(process_pending_jobs))
}
