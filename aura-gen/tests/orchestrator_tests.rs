//! End-to-end generation pipeline tests
//!
//! Drive the orchestrator against an in-memory database with mock catalog
//! and text-generation capabilities.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use aura_gen::catalog::{CatalogEntry, CatalogStore};
use aura_gen::db;
use aura_gen::models::JobStatus;
use aura_gen::services::{GenerationOrchestrator, TextGenError, TextGeneration};

/// Catalog double backed by a fixed entry list. Optionally fails the n-th
/// `sample` call (1-based) to simulate a mid-sweep store fault.
struct MockCatalog {
    entries: Vec<CatalogEntry>,
    sample_calls: AtomicUsize,
    fail_on_call: Option<usize>,
}

impl MockCatalog {
    fn new(entries: Vec<CatalogEntry>) -> Self {
        Self {
            entries,
            sample_calls: AtomicUsize::new(0),
            fail_on_call: None,
        }
    }

    fn failing_on_call(entries: Vec<CatalogEntry>, call: usize) -> Self {
        Self {
            entries,
            sample_calls: AtomicUsize::new(0),
            fail_on_call: Some(call),
        }
    }
}

#[async_trait]
impl CatalogStore for MockCatalog {
    async fn sample(&self, limit: u32) -> aura_common::Result<Vec<CatalogEntry>> {
        let call = self.sample_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on_call == Some(call) {
            return Err(aura_common::Error::Internal(
                "catalog store unavailable".to_string(),
            ));
        }
        Ok(self.entries.iter().take(limit as usize).cloned().collect())
    }

    async fn get(&self, id: Uuid) -> aura_common::Result<Option<CatalogEntry>> {
        Ok(self.entries.iter().find(|e| e.id == id).cloned())
    }
}

/// Catalog double that fails the in-flight job through the shared pool
/// while generation is running, simulating an outside actor racing the
/// orchestrator to a terminal state.
struct AbortingCatalog {
    entries: Vec<CatalogEntry>,
    pool: SqlitePool,
}

#[async_trait]
impl CatalogStore for AbortingCatalog {
    async fn sample(&self, limit: u32) -> aura_common::Result<Vec<CatalogEntry>> {
        sqlx::query(
            "UPDATE generation_jobs SET status = 'failed', error_message = 'aborted externally' \
             WHERE status = 'processing'",
        )
        .execute(&self.pool)
        .await?;
        Ok(self.entries.iter().take(limit as usize).cloned().collect())
    }

    async fn get(&self, id: Uuid) -> aura_common::Result<Option<CatalogEntry>> {
        Ok(self.entries.iter().find(|e| e.id == id).cloned())
    }
}

/// Text-generation double returning a fixed response or a transport error
struct MockModel {
    response: Result<String, ()>,
}

impl MockModel {
    fn returning(text: &str) -> Self {
        Self {
            response: Ok(text.to_string()),
        }
    }

    fn unreachable() -> Self {
        Self { response: Err(()) }
    }
}

#[async_trait]
impl TextGeneration for MockModel {
    async fn complete(&self, _prompt: &str) -> Result<String, TextGenError> {
        match &self.response {
            Ok(text) => Ok(text.clone()),
            Err(()) => Err(TextGenError::NetworkError("connection refused".to_string())),
        }
    }
}

fn entry(title: &str, artist: &str, genre: &str) -> CatalogEntry {
    CatalogEntry {
        id: Uuid::new_v4(),
        title: title.to_string(),
        artist: artist.to_string(),
        genre: genre.to_string(),
    }
}

/// Twelve-entry catalog with pairwise-distinct titles and artists, so
/// substring matching stays unambiguous where a test needs it to be.
fn twelve_entry_catalog() -> Vec<CatalogEntry> {
    vec![
        entry("Intro", "The xx", "Indie"),
        entry("Weird Fishes", "Radiohead", "Alternative"),
        entry("Holocene", "Bon Iver", "Folk"),
        entry("Nightcall", "Kavinsky", "Synthwave"),
        entry("Teardrop", "Massive Attack", "Trip-hop"),
        entry("Breathe", "Telepopmusik", "Downtempo"),
        entry("Porcelain", "Moby", "Electronic"),
        entry("Cirrus", "Bonobo", "Chillout"),
        entry("Avril 14th", "Aphex Twin", "Ambient"),
        entry("Saturday", "Sparklehorse", "Lo-fi"),
        entry("Myth", "Beach House", "Dream pop"),
        entry("Sunblind", "Fleet Foxes", "Folk rock"),
    ]
}

async fn setup_pool() -> SqlitePool {
    let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
    db::init_tables(&pool).await.unwrap();
    pool
}

fn orchestrator(
    pool: &SqlitePool,
    catalog: MockCatalog,
    model: MockModel,
) -> GenerationOrchestrator {
    GenerationOrchestrator::new(pool.clone(), Arc::new(catalog), Arc::new(model))
}

async fn submit_and_process(
    orch: &GenerationOrchestrator,
    pool: &SqlitePool,
    prompt: &str,
) -> aura_gen::models::GenerationJob {
    let job_id = orch.submit(Uuid::new_v4(), prompt).await.unwrap();
    orch.process_job(job_id).await.unwrap();
    db::jobs::load_job(pool, job_id).await.unwrap().unwrap()
}

async fn station_count(pool: &SqlitePool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM radio_stations")
        .fetch_one(pool)
        .await
        .unwrap()
}

#[tokio::test]
async fn chill_study_scenario_completes_with_matched_songs() {
    let pool = setup_pool().await;
    let response = r#"{
        "name": "Chill Study Session",
        "description": "Focus without distraction",
        "genre": "Downtempo",
        "songs": [
            {"title": "Intro", "artist": "The xx", "reasoning": "soft opener"},
            {"title": "Cirrus", "artist": "Bonobo", "reasoning": "steady pulse"},
            {"title": "Unknown Tune", "artist": "Nobody Here", "reasoning": "wishful"}
        ]
    }"#;
    let orch = orchestrator(
        &pool,
        MockCatalog::new(twelve_entry_catalog()),
        MockModel::returning(response),
    );

    let job = submit_and_process(&orch, &pool, "chill study music").await;

    assert_eq!(job.status, JobStatus::Completed);
    assert!(job.error_message.is_none());

    let station_id = job.radio_station_id.unwrap();
    let station = db::stations::load_station(&pool, station_id)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(station.name, "Chill Study Session");
    assert_eq!(station.ai_prompt.as_deref(), Some("chill study music"));
    assert!(station.is_ai_generated);
    assert!(station.is_active);

    let songs = db::stations::load_station_song_ids(&pool, station_id)
        .await
        .unwrap();
    // Third suggestion has no catalog match and is dropped
    assert_eq!(songs.len(), 2);
}

#[tokio::test]
async fn malformed_model_output_falls_back_to_first_ten() {
    let pool = setup_pool().await;
    let catalog = twelve_entry_catalog();
    let expected: Vec<Uuid> = catalog.iter().take(10).map(|e| e.id).collect();
    let orch = orchestrator(
        &pool,
        MockCatalog::new(catalog),
        MockModel::returning("Sorry, I don't feel like JSON today."),
    );

    let job = submit_and_process(&orch, &pool, "anything at all").await;

    assert_eq!(job.status, JobStatus::Completed);
    let station_id = job.radio_station_id.unwrap();
    let station = db::stations::load_station(&pool, station_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(station.name, "AI Generated Radio");
    assert_eq!(station.genre, "Mixed");

    let songs = db::stations::load_station_song_ids(&pool, station_id)
        .await
        .unwrap();
    assert_eq!(songs, expected);
}

#[tokio::test]
async fn unreachable_model_also_falls_back_and_completes() {
    let pool = setup_pool().await;
    let orch = orchestrator(
        &pool,
        MockCatalog::new(twelve_entry_catalog()),
        MockModel::unreachable(),
    );

    let job = submit_and_process(&orch, &pool, "rainy evening").await;

    assert_eq!(job.status, JobStatus::Completed);
    assert!(job.radio_station_id.is_some());
    assert!(job.error_message.is_none());
}

#[tokio::test]
async fn empty_catalog_fails_job_and_creates_no_station() {
    let pool = setup_pool().await;
    let orch = orchestrator(
        &pool,
        MockCatalog::new(Vec::new()),
        MockModel::returning("irrelevant"),
    );

    let job = submit_and_process(&orch, &pool, "music for an empty library").await;

    assert_eq!(job.status, JobStatus::Failed);
    assert!(job.radio_station_id.is_none());
    let message = job.error_message.unwrap();
    assert!(message.contains("empty"), "unexpected message: {}", message);
    assert_eq!(station_count(&pool).await, 0);
}

#[tokio::test]
async fn full_match_preserves_suggestion_order_with_gap_free_positions() {
    let pool = setup_pool().await;
    let catalog = twelve_entry_catalog();
    // Suggest entries 4, 0, 7 of the sample, in that order
    let response = r#"{
        "name": "Reordered",
        "genre": "Mixed",
        "songs": [
            {"title": "Teardrop", "artist": "Massive Attack"},
            {"title": "Intro", "artist": "The xx"},
            {"title": "Cirrus", "artist": "Bonobo"}
        ]
    }"#;
    let expected = vec![catalog[4].id, catalog[0].id, catalog[7].id];
    let orch = orchestrator(
        &pool,
        MockCatalog::new(catalog),
        MockModel::returning(response),
    );

    let job = submit_and_process(&orch, &pool, "ordered mix").await;

    let station_id = job.radio_station_id.unwrap();
    let songs = db::stations::load_station_song_ids(&pool, station_id)
        .await
        .unwrap();
    assert_eq!(songs, expected);

    // Positions are 0-based and gap-free
    let positions: Vec<i64> = sqlx::query_scalar(
        "SELECT position FROM radio_station_songs WHERE radio_station_id = ? ORDER BY position",
    )
    .bind(station_id.to_string())
    .fetch_all(&pool)
    .await
    .unwrap();
    assert_eq!(positions, vec![0, 1, 2]);
}

#[tokio::test]
async fn unmatched_middle_suggestion_is_dropped_without_gaps() {
    let pool = setup_pool().await;
    let catalog = twelve_entry_catalog();
    // Suggestion index 2 of 5 has no catalog match
    let response = r#"{
        "name": "Mostly Matched",
        "genre": "Mixed",
        "songs": [
            {"title": "Intro", "artist": "The xx"},
            {"title": "Holocene", "artist": "Bon Iver"},
            {"title": "Ghost Track", "artist": "Unsigned Band"},
            {"title": "Myth", "artist": "Beach House"},
            {"title": "Sunblind", "artist": "Fleet Foxes"}
        ]
    }"#;
    let expected = vec![catalog[0].id, catalog[2].id, catalog[10].id, catalog[11].id];
    let orch = orchestrator(
        &pool,
        MockCatalog::new(catalog),
        MockModel::returning(response),
    );

    let job = submit_and_process(&orch, &pool, "mostly matchable").await;

    let station_id = job.radio_station_id.unwrap();
    let songs = db::stations::load_station_song_ids(&pool, station_id)
        .await
        .unwrap();
    assert_eq!(songs.len(), 4);
    assert_eq!(songs, expected);
}

#[tokio::test]
async fn completed_job_reads_identically_on_reread() {
    let pool = setup_pool().await;
    let orch = orchestrator(
        &pool,
        MockCatalog::new(twelve_entry_catalog()),
        MockModel::returning(r#"{"name":"Stable","genre":"Mixed","songs":[{"title":"Intro","artist":"The xx"}]}"#),
    );

    let job = submit_and_process(&orch, &pool, "stable job").await;
    assert_eq!(job.status, JobStatus::Completed);

    let first = db::jobs::load_job(&pool, job.id).await.unwrap().unwrap();
    let second = db::jobs::load_job(&pool, job.id).await.unwrap().unwrap();

    assert_eq!(first.status, second.status);
    assert_eq!(first.radio_station_id, second.radio_station_id);
    assert_eq!(first.error_message, second.error_message);
    assert_eq!(first.updated_at, second.updated_at);
}

#[tokio::test]
async fn terminal_job_is_not_reprocessed() {
    let pool = setup_pool().await;
    let orch = orchestrator(
        &pool,
        MockCatalog::new(twelve_entry_catalog()),
        MockModel::returning(r#"{"name":"Once","genre":"Mixed","songs":[{"title":"Intro","artist":"The xx"}]}"#),
    );

    let job = submit_and_process(&orch, &pool, "process me once").await;
    let station_id = job.radio_station_id;

    // A second processing attempt finds the job no longer pending
    orch.process_job(job.id).await.unwrap();

    let reloaded = db::jobs::load_job(&pool, job.id).await.unwrap().unwrap();
    assert_eq!(reloaded.status, JobStatus::Completed);
    assert_eq!(reloaded.radio_station_id, station_id);
    assert_eq!(station_count(&pool).await, 1);
}

#[tokio::test]
async fn sweep_isolates_per_job_failures() {
    let pool = setup_pool().await;
    // Second sample() call fails: job 2 records the fault, jobs 1 and 3
    // complete normally.
    let orch = orchestrator(
        &pool,
        MockCatalog::failing_on_call(twelve_entry_catalog(), 2),
        MockModel::returning(r#"{"name":"Sweep","genre":"Mixed","songs":[{"title":"Intro","artist":"The xx"}]}"#),
    );

    let user = Uuid::new_v4();
    let mut job_ids = Vec::new();
    for prompt in ["first", "second", "third"] {
        job_ids.push(orch.submit(user, prompt).await.unwrap());
        // Distinct created_at values keep the sweep order deterministic
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }

    let swept = orch.process_pending().await.unwrap();
    assert_eq!(swept, 3);

    let statuses: Vec<JobStatus> = {
        let mut out = Vec::new();
        for id in &job_ids {
            out.push(db::jobs::load_job(&pool, *id).await.unwrap().unwrap().status);
        }
        out
    };
    assert_eq!(
        statuses,
        vec![JobStatus::Completed, JobStatus::Failed, JobStatus::Completed]
    );

    let failed = db::jobs::load_job(&pool, job_ids[1]).await.unwrap().unwrap();
    assert!(failed.error_message.unwrap().contains("catalog store unavailable"));

    // Two stations from the two successful jobs
    assert_eq!(station_count(&pool).await, 2);
}

#[tokio::test]
async fn station_write_failure_fails_job_without_links() {
    let pool = setup_pool().await;
    let orch = orchestrator(
        &pool,
        MockCatalog::new(twelve_entry_catalog()),
        MockModel::returning(
            r#"{"name":"Doomed","genre":"Mixed","songs":[{"title":"Intro","artist":"The xx"}]}"#,
        ),
    );

    let job_id = orch.submit(Uuid::new_v4(), "doomed job").await.unwrap();

    // Break the station table so the station insert fails mid-job
    sqlx::query("DROP TABLE radio_stations")
        .execute(&pool)
        .await
        .unwrap();

    orch.process_job(job_id).await.unwrap();

    let job = db::jobs::load_job(&pool, job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Failed);
    assert!(job.radio_station_id.is_none());
    assert!(job.error_message.is_some());

    let links: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM radio_station_songs")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(links, 0);
}

#[tokio::test]
async fn lost_terminal_transition_is_tolerated() {
    let pool = setup_pool().await;
    let catalog = AbortingCatalog {
        entries: twelve_entry_catalog(),
        pool: pool.clone(),
    };
    let orch = GenerationOrchestrator::new(
        pool.clone(),
        Arc::new(catalog),
        Arc::new(MockModel::returning(
            r#"{"name":"Raced","genre":"Mixed","songs":[{"title":"Intro","artist":"The xx"}]}"#,
        )),
    );

    let job_id = orch.submit(Uuid::new_v4(), "raced job").await.unwrap();

    // Generation still finishes, but its completion update finds the job
    // already terminal and must not overwrite it or raise.
    orch.process_job(job_id).await.unwrap();

    let job = db::jobs::load_job(&pool, job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Failed);
    assert_eq!(job.error_message.as_deref(), Some("aborted externally"));
    assert!(job.radio_station_id.is_none());
}

#[tokio::test]
async fn weekly_generation_submits_a_themed_pending_job() {
    let pool = setup_pool().await;
    let orch = orchestrator(
        &pool,
        MockCatalog::new(twelve_entry_catalog()),
        MockModel::unreachable(),
    );

    let job_id = orch
        .generate_weekly(Uuid::new_v4(), "fresh indie finds")
        .await
        .unwrap();

    let job = db::jobs::load_job(&pool, job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Pending);
    assert!(job.prompt.contains("Weekly discovery mix"));
    assert!(job.prompt.contains("fresh indie finds"));
}
