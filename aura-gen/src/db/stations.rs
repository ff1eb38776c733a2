//! Radio station persistence
//!
//! Stations created by the generation pipeline always carry their
//! originating prompt; song links carry an explicit 0-based position so the
//! suggestion order survives storage.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Radio station record as created by this service
#[derive(Debug, Clone)]
pub struct RadioStation {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub genre: String,
    pub is_ai_generated: bool,
    pub ai_prompt: Option<String>,
    pub is_active: bool,
    pub metadata: Map<String, Value>,
    pub created_at: DateTime<Utc>,
}

impl RadioStation {
    /// Create an AI-generated station carrying its originating prompt
    pub fn new_generated(name: String, description: String, genre: String, prompt: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            description,
            genre,
            is_ai_generated: true,
            ai_prompt: Some(prompt),
            is_active: true,
            metadata: Map::new(),
            created_at: Utc::now(),
        }
    }
}

/// Save station to database
pub async fn save_station(pool: &SqlitePool, station: &RadioStation) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO radio_stations (
            id, name, description, genre, is_ai_generated, ai_prompt,
            is_active, metadata, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(station.id.to_string())
    .bind(&station.name)
    .bind(&station.description)
    .bind(&station.genre)
    .bind(station.is_ai_generated as i64)
    .bind(&station.ai_prompt)
    .bind(station.is_active as i64)
    .bind(serde_json::to_string(&station.metadata)?)
    .bind(station.created_at.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

/// Load station by id
pub async fn load_station(pool: &SqlitePool, station_id: Uuid) -> Result<Option<RadioStation>> {
    let row = sqlx::query(
        r#"
        SELECT id, name, description, genre, is_ai_generated, ai_prompt,
               is_active, metadata, created_at
        FROM radio_stations
        WHERE id = ?
        "#,
    )
    .bind(station_id.to_string())
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => {
            let id_str: String = row.get("id");
            let metadata_str: String = row.get("metadata");
            let created_str: String = row.get("created_at");
            let is_ai_generated: i64 = row.get("is_ai_generated");
            let is_active: i64 = row.get("is_active");

            Ok(Some(RadioStation {
                id: Uuid::parse_str(&id_str)?,
                name: row.get("name"),
                description: row.get("description"),
                genre: row.get("genre"),
                is_ai_generated: is_ai_generated != 0,
                ai_prompt: row.get("ai_prompt"),
                is_active: is_active != 0,
                metadata: serde_json::from_str(&metadata_str)?,
                created_at: DateTime::parse_from_rfc3339(&created_str)?.with_timezone(&Utc),
            }))
        }
        None => Ok(None),
    }
}

/// Link a song to a station at an explicit position
pub async fn link_station_song(
    pool: &SqlitePool,
    station_id: Uuid,
    song_id: Uuid,
    position: i64,
) -> Result<()> {
    sqlx::query(
        "INSERT INTO radio_station_songs (radio_station_id, song_id, position) VALUES (?, ?, ?)",
    )
    .bind(station_id.to_string())
    .bind(song_id.to_string())
    .bind(position)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load a station's song ids ordered by position
pub async fn load_station_song_ids(pool: &SqlitePool, station_id: Uuid) -> Result<Vec<Uuid>> {
    let rows: Vec<(String,)> = sqlx::query_as(
        "SELECT song_id FROM radio_station_songs WHERE radio_station_id = ? ORDER BY position",
    )
    .bind(station_id.to_string())
    .fetch_all(pool)
    .await?;

    let mut ids = Vec::with_capacity(rows.len());
    for (id_str,) in rows {
        ids.push(Uuid::parse_str(&id_str)?);
    }
    Ok(ids)
}
