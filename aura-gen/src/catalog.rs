//! Catalog store adapter
//!
//! The song catalog is owned by the library service; this adapter only
//! reads it. An empty catalog is a valid (if unfortunate) state and comes
//! back as an empty sample, never as an error.

use async_trait::async_trait;
use aura_common::Result;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// One catalog entry as seen by the generation pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub id: Uuid,
    pub title: String,
    pub artist: String,
    pub genre: String,
}

/// Read-only view of the song catalog
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// An ordered sample of up to `limit` entries
    async fn sample(&self, limit: u32) -> Result<Vec<CatalogEntry>>;

    /// Look up a single entry by id
    async fn get(&self, id: Uuid) -> Result<Option<CatalogEntry>>;
}

/// Catalog adapter over the shared `songs` table
pub struct SqliteCatalog {
    db: SqlitePool,
}

impl SqliteCatalog {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    fn entry_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<CatalogEntry> {
        let id_str: String = row.get("id");
        let id = Uuid::parse_str(&id_str)
            .map_err(|e| aura_common::Error::Internal(format!("Invalid UUID in catalog: {}", e)))?;
        Ok(CatalogEntry {
            id,
            title: row.get("title"),
            artist: row.get("artist"),
            genre: row.get("genre"),
        })
    }
}

#[async_trait]
impl CatalogStore for SqliteCatalog {
    async fn sample(&self, limit: u32) -> Result<Vec<CatalogEntry>> {
        // rowid order keeps the sample stable across calls
        let rows = sqlx::query(
            "SELECT id, title, artist, genre FROM songs ORDER BY rowid LIMIT ?",
        )
        .bind(limit as i64)
        .fetch_all(&self.db)
        .await?;

        rows.iter().map(Self::entry_from_row).collect()
    }

    async fn get(&self, id: Uuid) -> Result<Option<CatalogEntry>> {
        let row = sqlx::query("SELECT id, title, artist, genre FROM songs WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.db)
            .await?;

        match row {
            Some(row) => Ok(Some(Self::entry_from_row(&row)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Create the songs table the library service normally owns
    async fn setup_test_db() -> SqlitePool {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        sqlx::query(
            r#"
            CREATE TABLE songs (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                artist TEXT NOT NULL,
                genre TEXT NOT NULL DEFAULT ''
            )
            "#,
        )
        .execute(&pool)
        .await
        .unwrap();
        pool
    }

    async fn insert_song(pool: &SqlitePool, title: &str, artist: &str, genre: &str) -> Uuid {
        let id = Uuid::new_v4();
        sqlx::query("INSERT INTO songs (id, title, artist, genre) VALUES (?, ?, ?, ?)")
            .bind(id.to_string())
            .bind(title)
            .bind(artist)
            .bind(genre)
            .execute(pool)
            .await
            .unwrap();
        id
    }

    #[tokio::test]
    async fn sample_preserves_insertion_order_and_limit() {
        let pool = setup_test_db().await;
        let a = insert_song(&pool, "Intro", "The xx", "Indie").await;
        let b = insert_song(&pool, "Weird Fishes", "Radiohead", "Alternative").await;
        let _c = insert_song(&pool, "Holocene", "Bon Iver", "Folk").await;

        let catalog = SqliteCatalog::new(pool);
        let sample = catalog.sample(2).await.unwrap();

        assert_eq!(sample.len(), 2);
        assert_eq!(sample[0].id, a);
        assert_eq!(sample[1].id, b);
    }

    #[tokio::test]
    async fn empty_catalog_yields_empty_sample_not_error() {
        let pool = setup_test_db().await;
        let catalog = SqliteCatalog::new(pool);
        assert!(catalog.sample(100).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn get_by_id() {
        let pool = setup_test_db().await;
        let id = insert_song(&pool, "Intro", "The xx", "Indie").await;

        let catalog = SqliteCatalog::new(pool);
        let entry = catalog.get(id).await.unwrap().unwrap();
        assert_eq!(entry.title, "Intro");
        assert!(catalog.get(Uuid::new_v4()).await.unwrap().is_none());
    }
}
