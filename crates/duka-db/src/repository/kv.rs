//! # Key/Value Repository
//!
//! Plain text key/value rows for small durable facts: the demo-mode flag,
//! theme preference, last-sync timestamp, and the demo user record. Anything
//! structured is stored as a JSON string by the caller; this layer never
//! parses values.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;

/// Repository for the `local_kv` table.
///
/// ## Usage
/// ```rust,ignore
/// let kv = db.kv();
///
/// kv.set("last_sync_at", &now.to_rfc3339()).await?;
/// let stamp = kv.get("last_sync_at").await?;
/// ```
#[derive(Debug, Clone)]
pub struct KvRepository {
    pool: SqlitePool,
}

impl KvRepository {
    /// Creates a new KvRepository.
    pub fn new(pool: SqlitePool) -> Self {
        KvRepository { pool }
    }

    /// Stores a value under a key, replacing any previous value.
    pub async fn set(&self, key: &str, value: &str) -> DbResult<()> {
        let now = Utc::now();

        debug!(key = %key, "Writing kv entry");

        sqlx::query(
            r#"
            INSERT INTO local_kv (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Fetches a value by key.
    ///
    /// ## Returns
    /// `None` when the key has never been set (or was removed).
    pub async fn get(&self, key: &str) -> DbResult<Option<String>> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM local_kv WHERE key = ?1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        Ok(value)
    }

    /// Removes a key.
    ///
    /// ## Returns
    /// `true` if a row was deleted, `false` if the key was absent.
    pub async fn remove(&self, key: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM local_kv WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_set_get_roundtrip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let kv = db.kv();

        assert_eq!(kv.get("theme").await.unwrap(), None);

        kv.set("theme", "dark").await.unwrap();
        assert_eq!(kv.get("theme").await.unwrap(), Some("dark".to_string()));
    }

    #[tokio::test]
    async fn test_set_replaces_previous_value() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let kv = db.kv();

        kv.set("demo_mode", "true").await.unwrap();
        kv.set("demo_mode", "false").await.unwrap();

        assert_eq!(
            kv.get("demo_mode").await.unwrap(),
            Some("false".to_string())
        );
    }

    #[tokio::test]
    async fn test_remove_reports_presence() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let kv = db.kv();

        kv.set("last_sync_at", "2025-01-01T00:00:00Z").await.unwrap();

        assert!(kv.remove("last_sync_at").await.unwrap());
        assert!(!kv.remove("last_sync_at").await.unwrap());
        assert_eq!(kv.get("last_sync_at").await.unwrap(), None);
    }
}
