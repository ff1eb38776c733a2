//! Generation job persistence
//!
//! Status updates are guarded in SQL: every UPDATE carries the expected
//! current status in its WHERE clause, so the monotonic state machine holds
//! even if two tasks race on the same job.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::models::{GenerationJob, JobStatus};

/// Insert a new job record
pub async fn create_job(pool: &SqlitePool, job: &GenerationJob) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO generation_jobs (
            id, user_id, prompt, status, radio_station_id, error_message,
            metadata, created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(job.id.to_string())
    .bind(job.user_id.to_string())
    .bind(&job.prompt)
    .bind(job.status.as_str())
    .bind(job.radio_station_id.map(|id| id.to_string()))
    .bind(&job.error_message)
    .bind(serde_json::to_string(&job.metadata)?)
    .bind(job.created_at.to_rfc3339())
    .bind(job.updated_at.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

/// Load a job by id
pub async fn load_job(pool: &SqlitePool, job_id: Uuid) -> Result<Option<GenerationJob>> {
    let row = sqlx::query(
        r#"
        SELECT id, user_id, prompt, status, radio_station_id, error_message,
               metadata, created_at, updated_at
        FROM generation_jobs
        WHERE id = ?
        "#,
    )
    .bind(job_id.to_string())
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => {
            let id_str: String = row.get("id");
            let user_id_str: String = row.get("user_id");
            let status_str: String = row.get("status");
            let station_str: Option<String> = row.get("radio_station_id");
            let metadata_str: String = row.get("metadata");
            let created_str: String = row.get("created_at");
            let updated_str: String = row.get("updated_at");

            let status = JobStatus::parse(&status_str)
                .ok_or_else(|| anyhow::anyhow!("Invalid job status in database: {}", status_str))?;
            let metadata: Map<String, Value> = serde_json::from_str(&metadata_str)?;

            Ok(Some(GenerationJob {
                id: Uuid::parse_str(&id_str)?,
                user_id: Uuid::parse_str(&user_id_str)?,
                prompt: row.get("prompt"),
                status,
                radio_station_id: station_str.and_then(|s| Uuid::parse_str(&s).ok()),
                error_message: row.get("error_message"),
                metadata,
                created_at: DateTime::parse_from_rfc3339(&created_str)?.with_timezone(&Utc),
                updated_at: DateTime::parse_from_rfc3339(&updated_str)?.with_timezone(&Utc),
            }))
        }
        None => Ok(None),
    }
}

/// List ids of all pending jobs, oldest first
pub async fn list_pending_job_ids(pool: &SqlitePool) -> Result<Vec<Uuid>> {
    let rows: Vec<(String,)> = sqlx::query_as(
        "SELECT id FROM generation_jobs WHERE status = 'pending' ORDER BY created_at, id",
    )
    .fetch_all(pool)
    .await?;

    let mut ids = Vec::with_capacity(rows.len());
    for (id_str,) in rows {
        ids.push(Uuid::parse_str(&id_str)?);
    }
    Ok(ids)
}

/// Transition pending → processing
///
/// Returns false when the job is missing or not pending anymore.
pub async fn try_mark_processing(pool: &SqlitePool, job_id: Uuid) -> Result<bool> {
    let result = sqlx::query(
        "UPDATE generation_jobs SET status = 'processing', updated_at = ? \
         WHERE id = ? AND status = 'pending'",
    )
    .bind(Utc::now().to_rfc3339())
    .bind(job_id.to_string())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Transition processing → completed, attaching the created station
pub async fn mark_completed(pool: &SqlitePool, job_id: Uuid, station_id: Uuid) -> Result<bool> {
    let result = sqlx::query(
        "UPDATE generation_jobs \
         SET status = 'completed', radio_station_id = ?, error_message = NULL, updated_at = ? \
         WHERE id = ? AND status = 'processing'",
    )
    .bind(station_id.to_string())
    .bind(Utc::now().to_rfc3339())
    .bind(job_id.to_string())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Transition processing → failed with a captured message
pub async fn mark_failed(pool: &SqlitePool, job_id: Uuid, message: &str) -> Result<bool> {
    let result = sqlx::query(
        "UPDATE generation_jobs SET status = 'failed', error_message = ?, updated_at = ? \
         WHERE id = ? AND status = 'processing'",
    )
    .bind(message)
    .bind(Utc::now().to_rfc3339())
    .bind(job_id.to_string())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
