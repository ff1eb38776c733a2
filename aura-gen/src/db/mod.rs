//! Database access for aura-gen
//!
//! Job and station persistence in the shared AuraRadio SQLite database.
//! The `songs` catalog table is owned by the library service and only read
//! here (see [`crate::catalog`]).

pub mod jobs;
pub mod stations;

use anyhow::Result;
use sqlx::SqlitePool;
use std::path::Path;

/// Open the shared database and create service tables
pub async fn init_service_database(db_path: &Path) -> Result<SqlitePool> {
    let pool = aura_common::db::init_database_pool(db_path).await?;
    init_tables(&pool).await?;
    Ok(pool)
}

/// Initialize aura-gen specific tables
///
/// Creates generation_jobs, radio_stations and radio_station_songs if they
/// don't exist.
pub async fn init_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS generation_jobs (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            prompt TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'pending',
            radio_station_id TEXT,
            error_message TEXT,
            metadata TEXT NOT NULL DEFAULT '{}',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS radio_stations (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            genre TEXT NOT NULL DEFAULT '',
            is_ai_generated INTEGER NOT NULL DEFAULT 0,
            ai_prompt TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            metadata TEXT NOT NULL DEFAULT '{}',
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS radio_station_songs (
            radio_station_id TEXT NOT NULL,
            song_id TEXT NOT NULL,
            position INTEGER NOT NULL,
            PRIMARY KEY (radio_station_id, position)
        )
        "#,
    )
    .execute(pool)
    .await?;

    tracing::info!(
        "Database tables initialized (generation_jobs, radio_stations, radio_station_songs)"
    );

    Ok(())
}
