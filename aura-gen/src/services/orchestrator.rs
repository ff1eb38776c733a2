//! Generation job orchestrator
//!
//! The only component that mutates job status. Drives a request from
//! intake to a terminal state:
//!
//! pending → processing → completed
//!                      → failed
//!
//! Every fault inside a job is caught at the job boundary and recorded on
//! that job; nothing is ever thrown back to an unattended caller.

use std::sync::Arc;

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use aura_common::{Error, Result};

use crate::catalog::CatalogStore;
use crate::db;
use crate::db::stations::RadioStation;
use crate::models::GenerationJob;
use crate::services::catalog_matcher;
use crate::services::request_builder::{self, GenerationRequest};
use crate::services::suggestion_parser;
use crate::services::text_client::{TextGeneration, MAX_PROMPT_LEN};

/// Upper bound on the catalog sample fed into the generation prompt;
/// keeps the prompt within model limits.
const CATALOG_SAMPLE_LIMIT: u32 = 100;

/// Pause between jobs during a sweep, to respect external rate limits
const INTER_JOB_DELAY_MS: u64 = 1000;

/// Orchestrates the asynchronous generation job lifecycle
pub struct GenerationOrchestrator {
    db: SqlitePool,
    catalog: Arc<dyn CatalogStore>,
    text_client: Arc<dyn TextGeneration>,
}

impl GenerationOrchestrator {
    /// Create an orchestrator with injected catalog and text-generation
    /// capabilities.
    pub fn new(
        db: SqlitePool,
        catalog: Arc<dyn CatalogStore>,
        text_client: Arc<dyn TextGeneration>,
    ) -> Self {
        Self {
            db,
            catalog,
            text_client,
        }
    }

    /// Create a pending job for the given prompt and return its id.
    ///
    /// Validation failures are rejected here, before any job exists.
    /// Processing is triggered separately (a detached task spawned by the
    /// API layer, or the next `process_pending` sweep), so this returns
    /// immediately.
    pub async fn submit(&self, user_id: Uuid, prompt: &str) -> Result<Uuid> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(Error::InvalidInput("Prompt must not be empty".to_string()));
        }
        if prompt.chars().count() > MAX_PROMPT_LEN {
            return Err(Error::InvalidInput(format!(
                "Prompt exceeds {} characters",
                MAX_PROMPT_LEN
            )));
        }

        let job = GenerationJob::new(user_id, prompt.to_string());
        db::jobs::create_job(&self.db, &job)
            .await
            .map_err(|e| Error::Internal(e.to_string()))?;

        tracing::info!(job_id = %job.id, user_id = %user_id, "Generation job created");

        Ok(job.id)
    }

    /// Convenience wrapper: synthesize a themed prompt for the current ISO
    /// week and submit it as a normal job.
    pub async fn generate_weekly(&self, user_id: Uuid, theme: &str) -> Result<Uuid> {
        let prompt = request_builder::weekly_prompt(theme, Utc::now());
        self.submit(user_id, &prompt).await
    }

    /// Drive one job from `pending` to a terminal state.
    ///
    /// A missing job, or one no longer pending, is logged and skipped.
    /// Returns Err only for infrastructure faults outside any job
    /// (the job store itself being unreachable).
    pub async fn process_job(&self, job_id: Uuid) -> Result<()> {
        let job = match db::jobs::load_job(&self.db, job_id)
            .await
            .map_err(|e| Error::Internal(e.to_string()))?
        {
            Some(job) => job,
            None => {
                tracing::warn!(job_id = %job_id, "Job not found, nothing to process");
                return Ok(());
            }
        };

        let claimed = db::jobs::try_mark_processing(&self.db, job_id)
            .await
            .map_err(|e| Error::Internal(e.to_string()))?;
        if !claimed {
            tracing::warn!(
                job_id = %job_id,
                status = %job.status.as_str(),
                "Job is not pending, skipping"
            );
            return Ok(());
        }

        tracing::info!(job_id = %job_id, "Processing generation job");

        match self.run_generation(&job).await {
            Ok(station_id) => {
                let recorded = db::jobs::mark_completed(&self.db, job_id, station_id)
                    .await
                    .map_err(|e| Error::Internal(e.to_string()))?;
                if recorded {
                    tracing::info!(
                        job_id = %job_id,
                        station_id = %station_id,
                        "Generation job completed"
                    );
                } else {
                    tracing::warn!(
                        job_id = %job_id,
                        station_id = %station_id,
                        "Job left processing concurrently, completion not recorded"
                    );
                }
            }
            Err(e) => {
                let message = e.to_string();
                let recorded = db::jobs::mark_failed(&self.db, job_id, &message)
                    .await
                    .map_err(|e| Error::Internal(e.to_string()))?;
                if recorded {
                    tracing::warn!(job_id = %job_id, error = %message, "Generation job failed");
                } else {
                    tracing::warn!(
                        job_id = %job_id,
                        error = %message,
                        "Job left processing concurrently, failure not recorded"
                    );
                }
            }
        }

        Ok(())
    }

    /// Sweep all currently pending jobs, one at a time with an inter-job
    /// pause. One job's failure never aborts the sweep of the rest.
    /// Returns the number of jobs swept.
    pub async fn process_pending(&self) -> Result<usize> {
        let ids = db::jobs::list_pending_job_ids(&self.db)
            .await
            .map_err(|e| Error::Internal(e.to_string()))?;

        tracing::info!(pending = ids.len(), "Sweeping pending generation jobs");

        for (i, job_id) in ids.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(std::time::Duration::from_millis(INTER_JOB_DELAY_MS)).await;
            }
            if let Err(e) = self.process_job(*job_id).await {
                tracing::error!(job_id = %job_id, error = %e, "Sweep failed to process job");
            }
        }

        Ok(ids.len())
    }

    /// The middle of the pipeline: catalog sample → prompt → model →
    /// suggestion → matching → persisted station and links.
    ///
    /// Any Err here fails the job with the error's message. A generation
    /// call fault is deliberately NOT an error: it degrades to the fallback
    /// suggestion.
    async fn run_generation(&self, job: &GenerationJob) -> anyhow::Result<Uuid> {
        let sample = self.catalog.sample(CATALOG_SAMPLE_LIMIT).await?;
        if sample.is_empty() {
            anyhow::bail!("Catalog is empty; nothing to recommend from");
        }

        let request = GenerationRequest::FreeForm(job.prompt.clone());
        let prompt = request_builder::build_prompt(&request, &sample);

        let suggestion = match self.text_client.complete(&prompt).await {
            Ok(raw) => match suggestion_parser::parse_suggestion(&raw) {
                Some(suggestion) => suggestion,
                None => {
                    tracing::warn!(
                        job_id = %job.id,
                        "Model output unusable, substituting fallback suggestion"
                    );
                    suggestion_parser::fallback_suggestion(&sample)
                }
            },
            Err(e) => {
                tracing::warn!(
                    job_id = %job.id,
                    error = %e,
                    "Generation call failed, substituting fallback suggestion"
                );
                suggestion_parser::fallback_suggestion(&sample)
            }
        };

        let matched = catalog_matcher::match_all(&suggestion.songs, &sample);
        if matched.len() < suggestion.songs.len() {
            tracing::debug!(
                job_id = %job.id,
                suggested = suggestion.songs.len(),
                matched = matched.len(),
                "Some suggested songs had no catalog match and were dropped"
            );
        }

        let station = RadioStation::new_generated(
            suggestion.name,
            suggestion.description,
            suggestion.genre,
            job.prompt.clone(),
        );
        db::stations::save_station(&self.db, &station).await?;

        // Positions are gap-free over matched songs only
        for (position, entry) in matched.iter().enumerate() {
            db::stations::link_station_song(&self.db, station.id, entry.id, position as i64)
                .await?;
        }

        Ok(station.id)
    }
}
