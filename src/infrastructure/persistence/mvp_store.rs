//! SQLite store populated from the JSON sink.
//!
//! The store is rebuilt from scratch on every load: the file is deleted,
//! the schema recreated, and both tables filled in one transaction. The
//! `active` table is reserved for runtime MVP tracking and never written
//! here.

use std::path::Path;

use anyhow::{Context, Result};
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::SqlitePool;

use crate::domain::Mvp;

pub struct MvpStore {
    pool: SqlitePool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadSummary {
    pub mvps: u64,
    pub respawns: u64,
}

impl MvpStore {
    /// Open the store file, creating it and the schema if needed.
    pub async fn open(path: &Path) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options)
            .await
            .with_context(|| format!("failed to open {}", path.display()))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS "mvp" (
                "id" INTEGER NOT NULL PRIMARY KEY,
                "name" VARCHAR(50),
                "favorite" INTEGER NOT NULL DEFAULT 0
            )
        "#,
        )
        .execute(&pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS "respawn" (
                "id" INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
                "mvp_id" INTEGER NOT NULL,
                "map_id" TEXT NOT NULL,
                "time" INTEGER NOT NULL
            )
        "#,
        )
        .execute(&pool)
        .await?;

        // Reserved for a future runtime tracker; same shape as respawn.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS "active" (
                "id" INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
                "mvp_id" INTEGER NOT NULL,
                "map_id" TEXT NOT NULL,
                "time" INTEGER NOT NULL
            )
        "#,
        )
        .execute(&pool)
        .await?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Bulk-insert every record and its spawn points in one transaction.
    pub async fn populate(&self, mvps: &[Mvp]) -> Result<LoadSummary> {
        let mut summary = LoadSummary { mvps: 0, respawns: 0 };
        let mut tx = self.pool.begin().await?;

        for mvp in mvps {
            sqlx::query("INSERT INTO mvp (id, name) VALUES (?, ?)")
                .bind(mvp.id)
                .bind(&mvp.name)
                .execute(&mut *tx)
                .await?;
            summary.mvps += 1;

            for spawn in &mvp.maps {
                sqlx::query("INSERT INTO respawn (mvp_id, map_id, time) VALUES (?, ?, ?)")
                    .bind(mvp.id)
                    .bind(&spawn.map_name)
                    .bind(spawn.respawn_time)
                    .execute(&mut *tx)
                    .await?;
                summary.respawns += 1;
            }
        }

        tx.commit().await?;
        Ok(summary)
    }
}

/// Read the JSON sink and rebuild the relational store from it.
///
/// A sink that cannot be read or parsed is fatal for the load phase.
pub async fn load_sink(sink_path: &Path, db_path: &Path) -> Result<LoadSummary> {
    let json = tokio::fs::read_to_string(sink_path)
        .await
        .with_context(|| format!("failed to read {}", sink_path.display()))?;
    let mvps: Vec<Mvp> = serde_json::from_str(&json)
        .with_context(|| format!("failed to parse {}", sink_path.display()))?;

    if tokio::fs::try_exists(db_path).await.unwrap_or(false) {
        tokio::fs::remove_file(db_path)
            .await
            .with_context(|| format!("failed to remove {}", db_path.display()))?;
    }
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let store = MvpStore::open(db_path).await?;
    let summary = store.populate(&mvps).await?;

    let rows: Vec<(i64, String, i64)> =
        sqlx::query_as("SELECT id, name, favorite FROM mvp ORDER BY id")
            .fetch_all(store.pool())
            .await?;
    for (id, name, favorite) in rows {
        tracing::debug!("mvp row: ({}, {}, {})", id, name, favorite);
    }

    Ok(summary)
}
