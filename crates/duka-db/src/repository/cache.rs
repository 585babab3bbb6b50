//! # TTL Cache Repository
//!
//! Read-through cache rows with a wall-clock expiry check. Each row stores
//! the value alongside the moment it was cached (epoch millis); the caller
//! supplies the acceptable age on read. Expired rows are deleted as they are
//! discovered rather than by a background sweeper.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;

/// Repository for the `cache_entries` table.
///
/// ## Usage
/// ```rust,ignore
/// let cache = db.cache();
///
/// cache.put("dashboard_stats", &json, Utc::now().timestamp_millis()).await?;
///
/// // Accept entries up to five minutes old
/// let hit = cache.get("dashboard_stats", 5 * 60 * 1000).await?;
/// ```
#[derive(Debug, Clone)]
pub struct CacheRepository {
    pool: SqlitePool,
}

impl CacheRepository {
    /// Creates a new CacheRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CacheRepository { pool }
    }

    /// Stores a value with the moment it was cached.
    ///
    /// ## Arguments
    /// * `key` - Cache key
    /// * `value` - Cached value (JSON string by convention)
    /// * `cached_at_ms` - Epoch millis the value was produced at
    pub async fn put(&self, key: &str, value: &str, cached_at_ms: i64) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO cache_entries (key, value, cached_at_ms)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                cached_at_ms = excluded.cached_at_ms
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(cached_at_ms)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Fetches a value no older than `max_age_ms`.
    ///
    /// ## Returns
    /// * `Some(value)` - A row exists and is still fresh
    /// * `None` - No row, or the row was older than `max_age_ms`
    ///   (expired rows are deleted on the way out)
    pub async fn get(&self, key: &str, max_age_ms: i64) -> DbResult<Option<String>> {
        let row: Option<(String, i64)> =
            sqlx::query_as("SELECT value, cached_at_ms FROM cache_entries WHERE key = ?1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        let Some((value, cached_at_ms)) = row else {
            return Ok(None);
        };

        let age_ms = Utc::now().timestamp_millis() - cached_at_ms;
        if age_ms > max_age_ms {
            debug!(key = %key, age_ms = age_ms, "Cache entry expired, deleting");

            sqlx::query("DELETE FROM cache_entries WHERE key = ?1")
                .bind(key)
                .execute(&self.pool)
                .await?;

            return Ok(None);
        }

        Ok(Some(value))
    }

    /// Deletes every cache row.
    ///
    /// ## Returns
    /// Number of deleted rows.
    pub async fn purge(&self) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM cache_entries")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_fresh_entry_is_returned() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let cache = db.cache();

        let now = Utc::now().timestamp_millis();
        cache.put("stats", r#"{"sales":12}"#, now).await.unwrap();

        let hit = cache.get("stats", 60_000).await.unwrap();
        assert_eq!(hit.as_deref(), Some(r#"{"sales":12}"#));
    }

    #[tokio::test]
    async fn test_expired_entry_is_deleted_on_read() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let cache = db.cache();

        // Cached ten minutes ago, caller accepts one minute
        let stale = Utc::now().timestamp_millis() - 10 * 60 * 1000;
        cache.put("stats", "{}", stale).await.unwrap();

        assert_eq!(cache.get("stats", 60_000).await.unwrap(), None);

        // Row is gone even for a caller with a huge max age
        assert_eq!(cache.get("stats", i64::MAX).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_missing_key_is_none() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        assert_eq!(db.cache().get("nope", 60_000).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_put_refreshes_timestamp() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let cache = db.cache();

        let stale = Utc::now().timestamp_millis() - 10 * 60 * 1000;
        cache.put("stats", "old", stale).await.unwrap();
        cache
            .put("stats", "new", Utc::now().timestamp_millis())
            .await
            .unwrap();

        assert_eq!(cache.get("stats", 60_000).await.unwrap().as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn test_purge_removes_everything() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let cache = db.cache();

        let now = Utc::now().timestamp_millis();
        cache.put("a", "1", now).await.unwrap();
        cache.put("b", "2", now).await.unwrap();

        assert_eq!(cache.purge().await.unwrap(), 2);
        assert_eq!(cache.get("a", i64::MAX).await.unwrap(), None);
    }
}
