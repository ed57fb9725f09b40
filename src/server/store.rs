// SPDX-License-Identifier: MIT
// SQLite-backed task store plus the field validation rules applied on
// create and update.

use anyhow::{anyhow, Context as _, Result};
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;

use crate::model::{FieldErrors, TaskRecord};

/// Default timeout for individual SQLite queries.
/// Prevents hung queries from blocking the server indefinitely.
const QUERY_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// Execute a future with the standard query timeout.
async fn with_timeout<T>(fut: impl std::future::Future<Output = Result<T>>) -> Result<T> {
    match tokio::time::timeout(QUERY_TIMEOUT, fut).await {
        Ok(result) => result,
        Err(_) => Err(anyhow!(
            "database query timed out after {}s",
            QUERY_TIMEOUT.as_secs()
        )),
    }
}

// ─── Validation ───────────────────────────────────────────────────────────────

/// Validate an incoming task payload. Empty mapping = passed.
///
/// A missing field and a too-short field get distinct messages; the messages
/// are part of the HTTP contract and are surfaced verbatim by the views.
pub fn validate(payload: &TaskRecord) -> FieldErrors {
    let mut errors = FieldErrors::new();

    match payload.get("title") {
        None => {
            errors.insert("title".into(), "Title is required".into());
        }
        Some(_) if payload.text("title").chars().count() < 3 => {
            errors.insert("title".into(), "Title must be 3 characters or longer".into());
        }
        Some(_) => {}
    }

    match payload.get("description") {
        None => {
            errors.insert("description".into(), "Description is required".into());
        }
        Some(_) if payload.text("description").chars().count() < 5 => {
            errors.insert(
                "description".into(),
                "Description must be 5 characters or longer".into(),
            );
        }
        Some(_) => {}
    }

    errors
}

// ─── Row type ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
pub struct TaskRow {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

impl TaskRow {
    /// Flatten the row into the open-map shape the client consumes.
    pub fn into_record(self) -> TaskRecord {
        let mut record = TaskRecord::new();
        record.set("id", self.id);
        record.set("title", self.title);
        record.set("description", self.description);
        record.set("status", self.status);
        record.set("created_at", self.created_at);
        record.set("updated_at", self.updated_at);
        record
    }
}

// ─── TaskStore ────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct TaskStore {
    pool: SqlitePool,
}

fn now_ts() -> String {
    Utc::now().to_rfc3339()
}

impl TaskStore {
    /// Open (or create) the task database under `data_dir`.
    pub async fn open(data_dir: &Path) -> Result<Self> {
        tokio::fs::create_dir_all(data_dir)
            .await
            .with_context(|| format!("could not create data dir {}", data_dir.display()))?;
        let db_path = data_dir.join("taskpad.db");
        let opts =
            SqliteConnectOptions::from_str(&format!("sqlite://{}?mode=rwc", db_path.display()))?
                .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
                .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
                .create_if_missing(true);

        let pool = SqlitePool::connect_with(opts).await?;
        Self::migrate(&pool).await?;
        Ok(Self { pool })
    }

    /// In-memory store for tests. Single connection — every query must see
    /// the same `:memory:` database.
    pub async fn open_in_memory() -> Result<Self> {
        let opts = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(opts)
            .await?;
        Self::migrate(&pool).await?;
        Ok(Self { pool })
    }

    async fn migrate(pool: &SqlitePool) -> Result<()> {
        sqlx::migrate!("src/server/migrations")
            .run(pool)
            .await
            .context("failed to run database migrations")?;
        Ok(())
    }

    /// All tasks, oldest first (id order).
    pub async fn list(&self) -> Result<Vec<TaskRow>> {
        let pool = self.pool.clone();
        with_timeout(async {
            Ok(sqlx::query_as("SELECT * FROM tasks ORDER BY id")
                .fetch_all(&pool)
                .await?)
        })
        .await
    }

    pub async fn get(&self, id: i64) -> Result<Option<TaskRow>> {
        let pool = self.pool.clone();
        with_timeout(async {
            Ok(sqlx::query_as("SELECT * FROM tasks WHERE id = ?")
                .bind(id)
                .fetch_optional(&pool)
                .await?)
        })
        .await
    }

    /// Insert a validated draft. New tasks always start `pending`.
    pub async fn insert(&self, title: &str, description: &str) -> Result<TaskRow> {
        let pool = self.pool.clone();
        let now = now_ts();
        let id = with_timeout(async {
            let result = sqlx::query(
                "INSERT INTO tasks (title, description, status, created_at, updated_at)
                 VALUES (?, ?, 'pending', ?, ?)",
            )
            .bind(title)
            .bind(description)
            .bind(&now)
            .bind(&now)
            .execute(&pool)
            .await?;
            Ok(result.last_insert_rowid())
        })
        .await?;

        self.get(id)
            .await?
            .ok_or_else(|| anyhow!("task {id} vanished after insert"))
    }

    /// Update a validated record. Returns `None` if the id does not exist.
    pub async fn update(
        &self,
        id: i64,
        title: &str,
        description: &str,
        status: &str,
    ) -> Result<Option<TaskRow>> {
        let pool = self.pool.clone();
        let now = now_ts();
        let affected = with_timeout(async {
            let result = sqlx::query(
                "UPDATE tasks SET title = ?, description = ?, status = ?, updated_at = ?
                 WHERE id = ?",
            )
            .bind(title)
            .bind(description)
            .bind(status)
            .bind(&now)
            .bind(id)
            .execute(&pool)
            .await?;
            Ok(result.rows_affected())
        })
        .await?;

        if affected == 0 {
            return Ok(None);
        }
        self.get(id).await
    }

    /// Delete by id. Idempotent — returns whether a row was removed.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let pool = self.pool.clone();
        with_timeout(async {
            let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
                .bind(id)
                .execute(&pool)
                .await?;
            Ok(result.rows_affected() > 0)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(title: &str, description: &str) -> TaskRecord {
        let mut record = TaskRecord::new();
        record.set("title", title);
        record.set("description", description);
        record
    }

    #[test]
    fn validate_missing_fields() {
        let errors = validate(&TaskRecord::new());
        assert_eq!(errors.get("title").unwrap(), "Title is required");
        assert_eq!(errors.get("description").unwrap(), "Description is required");
    }

    #[test]
    fn validate_length_boundaries() {
        // One below each boundary fails; the boundary itself passes.
        let errors = validate(&payload("ab", "abcd"));
        assert_eq!(
            errors.get("title").unwrap(),
            "Title must be 3 characters or longer"
        );
        assert_eq!(
            errors.get("description").unwrap(),
            "Description must be 5 characters or longer"
        );

        assert!(validate(&payload("abc", "abcde")).is_empty());
    }

    #[test]
    fn validate_empty_string_is_too_short_not_missing() {
        let errors = validate(&payload("", ""));
        assert_eq!(
            errors.get("title").unwrap(),
            "Title must be 3 characters or longer"
        );
    }

    #[tokio::test]
    async fn insert_defaults_to_pending_and_sets_timestamps() {
        let store = TaskStore::open_in_memory().await.unwrap();
        let row = store.insert("groceries", "milk and eggs").await.unwrap();
        assert_eq!(row.status, "pending");
        assert!(!row.created_at.is_empty());
        assert_eq!(row.created_at, row.updated_at);
    }

    #[tokio::test]
    async fn list_orders_by_id() {
        let store = TaskStore::open_in_memory().await.unwrap();
        let a = store.insert("first", "first task").await.unwrap();
        let b = store.insert("second", "second task").await.unwrap();

        let rows = store.list().await.unwrap();
        assert_eq!(
            rows.iter().map(|r| r.id).collect::<Vec<_>>(),
            vec![a.id, b.id]
        );
    }

    #[tokio::test]
    async fn update_unknown_id_returns_none() {
        let store = TaskStore::open_in_memory().await.unwrap();
        let updated = store.update(999, "title", "description", "done").await.unwrap();
        assert!(updated.is_none());
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = TaskStore::open_in_memory().await.unwrap();
        let row = store.insert("ephemeral", "short-lived").await.unwrap();
        assert!(store.delete(row.id).await.unwrap());
        assert!(!store.delete(row.id).await.unwrap());
    }
}
