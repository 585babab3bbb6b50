//! # Offline Queue Repository
//!
//! Manages the durable buffer of mutations made while OFFLINE.
//!
//! ## The Buffer Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Offline Buffer Implementation                        │
//! │                                                                         │
//! │  LOCAL MUTATION while OFFLINE (e.g., add_product)                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  1. Apply to the in-memory store (immediately visible)                  │
//! │  2. INSERT INTO offline_queue (id, store_id, category, op, payload)     │
//! │     ← id is client-generated, stable across replay attempts             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ... user keeps selling; rows accumulate per category ...               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CONNECTIVITY RETURNS (OFFLINE → ONLINE edge)                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Replay pass (duka-sync):                                               │
//! │    1. SELECT * FROM offline_queue ORDER BY created_at  (FIFO)           │
//! │    2. For each row: send to the data provider                           │
//! │       a. Applied / Duplicate → row id collected for deletion            │
//! │       b. Conflict            → surfaced, row id collected for deletion  │
//! │       c. Retryable failure   → attempts += 1, last_error recorded       │
//! │    3. DELETE collected ids in ONE transaction                           │
//! │                                                                         │
//! │  KEY GUARANTEES:                                                        │
//! │  • A buffered mutation is never lost (it's in SQLite)                   │
//! │  • Replay is at-least-once; the provider dedupes by command id          │
//! │  • Rows survive process restarts between OFFLINE and ONLINE             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use duka_core::OfflineCommand;

/// Row shape for `offline_queue`; mapped to the pure domain type on read.
#[derive(sqlx::FromRow)]
struct CommandRow {
    id: String,
    store_id: String,
    category: String,
    op: String,
    payload: String,
    attempts: i64,
    last_error: Option<String>,
    created_at: chrono::DateTime<Utc>,
    attempted_at: Option<chrono::DateTime<Utc>>,
}

impl From<CommandRow> for OfflineCommand {
    fn from(row: CommandRow) -> Self {
        OfflineCommand {
            id: row.id,
            store_id: row.store_id,
            category: row.category,
            op: row.op,
            payload: row.payload,
            attempts: row.attempts,
            last_error: row.last_error,
            created_at: row.created_at,
            attempted_at: row.attempted_at,
        }
    }
}

/// Repository for offline queue operations.
#[derive(Debug, Clone)]
pub struct QueueRepository {
    pool: SqlitePool,
}

impl QueueRepository {
    /// Creates a new QueueRepository.
    pub fn new(pool: SqlitePool) -> Self {
        QueueRepository { pool }
    }

    /// Buffers a mutation for later replay.
    ///
    /// Generates the command id and creation timestamp here so every
    /// buffered mutation carries a stable identity from the moment it is
    /// written.
    ///
    /// ## Arguments
    /// * `store_id` - The store the mutation belongs to
    /// * `category` - Buffer category: "products", "customers", "transactions"
    /// * `op` - Operation within the category: "create", "update", ...
    /// * `payload` - JSON serialization of the full mutation
    ///
    /// ## Example
    /// ```rust,ignore
    /// let payload = serde_json::to_string(&new_product)?;
    /// let cmd = repo.append(store_id, "products", "insert", &payload).await?;
    /// ```
    pub async fn append(
        &self,
        store_id: &str,
        category: &str,
        op: &str,
        payload: &str,
    ) -> DbResult<OfflineCommand> {
        let command = OfflineCommand {
            id: Uuid::new_v4().to_string(),
            store_id: store_id.to_string(),
            category: category.to_string(),
            op: op.to_string(),
            payload: payload.to_string(),
            attempts: 0,
            last_error: None,
            created_at: Utc::now(),
            attempted_at: None,
        };

        debug!(
            category = %category,
            op = %op,
            command_id = %command.id,
            "Buffering offline command"
        );

        sqlx::query(
            r#"
            INSERT INTO offline_queue (
                id, store_id, category, op, payload,
                attempts, last_error, created_at, attempted_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&command.id)
        .bind(&command.store_id)
        .bind(&command.category)
        .bind(&command.op)
        .bind(&command.payload)
        .bind(command.attempts)
        .bind(&command.last_error)
        .bind(command.created_at)
        .bind(command.attempted_at)
        .execute(&self.pool)
        .await?;

        Ok(command)
    }

    /// Reads the full buffer in FIFO order (oldest first).
    ///
    /// Replay consumes this list top to bottom so mutations land on the
    /// remote side in the order the till produced them.
    pub async fn all(&self) -> DbResult<Vec<OfflineCommand>> {
        let rows = sqlx::query_as::<_, CommandRow>(
            r#"
            SELECT id, store_id, category, op, payload,
                   attempts, last_error, created_at, attempted_at
            FROM offline_queue
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(OfflineCommand::from).collect())
    }

    /// Reads one category of the buffer in FIFO order.
    pub async fn by_category(&self, category: &str) -> DbResult<Vec<OfflineCommand>> {
        let rows = sqlx::query_as::<_, CommandRow>(
            r#"
            SELECT id, store_id, category, op, payload,
                   attempts, last_error, created_at, attempted_at
            FROM offline_queue
            WHERE category = ?1
            ORDER BY created_at ASC
            "#,
        )
        .bind(category)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(OfflineCommand::from).collect())
    }

    /// Counts buffered commands.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM offline_queue")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Records a failed replay attempt; the command stays buffered.
    ///
    /// ## Arguments
    /// * `id` - The command id
    /// * `error` - Error message describing the failure
    pub async fn mark_failed(&self, id: &str, error: &str) -> DbResult<()> {
        let now = Utc::now();

        sqlx::query(
            r#"
            UPDATE offline_queue SET
                attempts = attempts + 1,
                last_error = ?2,
                attempted_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(error)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Deletes a set of commands in one transaction.
    ///
    /// Used after a replay pass to drop everything that was applied,
    /// deduplicated, or surfaced as a conflict - either all of them leave
    /// the buffer or none do.
    ///
    /// ## Returns
    /// Number of deleted rows.
    pub async fn delete_many(&self, ids: &[String]) -> DbResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let mut deleted = 0u64;
        for id in ids {
            let result = sqlx::query("DELETE FROM offline_queue WHERE id = ?1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            deleted += result.rows_affected();
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        debug!(deleted = deleted, "Cleared replayed commands");

        Ok(deleted)
    }

    /// Deletes the entire buffer.
    ///
    /// ## Returns
    /// Number of deleted rows.
    pub async fn clear(&self) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM offline_queue")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
