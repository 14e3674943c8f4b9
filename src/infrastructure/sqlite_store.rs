use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::application::{AppError, AppResult, BroadcastTargetStore, WatchRegistry};
use crate::domain::{BroadcastTarget, NewNotifyRequest, NotifyRequest, Scope};

type NotifyRow = (i64, String, String, String, String, Option<String>, i64);

/// Durable store for both the watch registry and broadcast targets.
///
/// Every operation is a single statement, so each record is written atomically
/// and concurrent writers to different rows never block on each other's logic.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// db_url examples
    /// - "sqlite:/data/steamsync.db"
    /// - "sqlite:./steamsync.db"
    /// - "sqlite::memory:" (single connection, lost on drop)
    pub async fn new(db_url: &str) -> AppResult<Self> {
        let options = SqliteConnectOptions::from_str(db_url)
            .map_err(|e| AppError::Storage(e.to_string()))?
            .create_if_missing(true);

        // each in-memory connection is its own database: keep exactly one alive
        let pool_options = if db_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> AppResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS notify_requests (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              watcher_id TEXT NOT NULL,
              target_handle TEXT NOT NULL,
              game_pattern TEXT NOT NULL,
              scope TEXT NOT NULL CHECK(scope IN ('private', 'group')),
              group_id TEXT,
              created_at INTEGER NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Storage(e.to_string()))?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_notify_requests_watcher
              ON notify_requests(watcher_id);
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Storage(e.to_string()))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS auto_post_targets (
              group_id TEXT NOT NULL,
              topic_id TEXT,
              purpose TEXT NOT NULL,
              PRIMARY KEY (group_id, purpose)
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Storage(e.to_string()))?;

        Ok(())
    }
}

fn row_to_request(row: NotifyRow) -> AppResult<NotifyRequest> {
    let (id, watcher_id, target_handle, game_pattern, scope, group_id, created_at) = row;
    let scope = Scope::parse(&scope).map_err(|e| AppError::Storage(e.to_string()))?;
    Ok(NotifyRequest {
        id,
        watcher_id,
        target_handle,
        game_pattern,
        scope,
        group_id,
        created_at: DateTime::<Utc>::from_timestamp(created_at, 0).unwrap_or_default(),
    })
}

#[async_trait]
impl WatchRegistry for SqliteStore {
    async fn add(&self, request: NewNotifyRequest) -> AppResult<i64> {
        let request = request.validate()?;

        let result = sqlx::query(
            r#"
            INSERT INTO notify_requests(
              watcher_id, target_handle, game_pattern, scope, group_id, created_at
            ) VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&request.watcher_id)
        .bind(&request.target_handle)
        .bind(&request.game_pattern)
        .bind(request.scope.as_str())
        .bind(request.group_id.as_deref())
        .bind(Utc::now().timestamp())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Storage(e.to_string()))?;

        Ok(result.last_insert_rowid())
    }

    async fn list_by_watcher(&self, watcher_id: &str) -> AppResult<Vec<NotifyRequest>> {
        let rows: Vec<NotifyRow> = sqlx::query_as(
            r#"
            SELECT id, watcher_id, target_handle, game_pattern, scope, group_id, created_at
            FROM notify_requests WHERE watcher_id = ? ORDER BY id
            "#,
        )
        .bind(watcher_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Storage(e.to_string()))?;

        rows.into_iter().map(row_to_request).collect()
    }

    async fn remove(&self, id: i64) -> AppResult<()> {
        // deleting a missing id affects zero rows, which is fine
        sqlx::query("DELETE FROM notify_requests WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;
        Ok(())
    }

    async fn scan_all(&self) -> AppResult<Vec<NotifyRequest>> {
        let rows: Vec<NotifyRow> = sqlx::query_as(
            r#"
            SELECT id, watcher_id, target_handle, game_pattern, scope, group_id, created_at
            FROM notify_requests ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Storage(e.to_string()))?;

        rows.into_iter().map(row_to_request).collect()
    }
}

#[async_trait]
impl BroadcastTargetStore for SqliteStore {
    async fn upsert_target(&self, target: &BroadcastTarget) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO auto_post_targets(group_id, topic_id, purpose) VALUES(?, ?, ?)
            ON CONFLICT(group_id, purpose) DO UPDATE SET topic_id=excluded.topic_id
            "#,
        )
        .bind(&target.destination_id)
        .bind(target.channel_ref.as_deref())
        .bind(&target.purpose)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Storage(e.to_string()))?;

        Ok(())
    }

    async fn list_by_purpose(&self, purpose: &str) -> AppResult<Vec<BroadcastTarget>> {
        let rows: Vec<(String, Option<String>, String)> = sqlx::query_as(
            r#"
            SELECT group_id, topic_id, purpose FROM auto_post_targets
            WHERE purpose = ? ORDER BY group_id
            "#,
        )
        .bind(purpose)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Storage(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|(destination_id, channel_ref, purpose)| BroadcastTarget {
                destination_id,
                channel_ref,
                purpose,
            })
            .collect())
    }
}
