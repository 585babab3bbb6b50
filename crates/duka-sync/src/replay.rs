//! # Replay Engine
//!
//! Replays the offline buffer against the remote data provider once
//! connectivity returns.
//!
//! ## Replay Pass Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Replay Pass Flow                                 │
//! │                                                                         │
//! │  1. Read: SELECT * FROM offline_queue ORDER BY created_at  (FIFO)       │
//! │                                                                         │
//! │  2. Partition: attempts >= max_replay_attempts → abandoned (logged)     │
//! │                                                                         │
//! │  3. For each remaining command: provider.apply_command(cmd)             │
//! │       Applied            → synced,   row leaves the buffer              │
//! │       Duplicate          → deduped,  row leaves the buffer              │
//! │       Conflict           → surfaced, row leaves the buffer              │
//! │       Err (retryable)    → attempts += 1, last_error set, row KEPT      │
//! │       Err (rejected)     → surfaced as conflict, row leaves the buffer  │
//! │                                                                         │
//! │  4. DELETE the departing rows in one transaction                        │
//! │                                                                         │
//! │  5. Clean pass (buffer empty, nothing failed)?                          │
//! │       → stamp last_sync_at in the KV store                              │
//! │                                                                         │
//! │  AT-LEAST-ONCE: a crash between step 3 and 4 re-sends commands on the   │
//! │  next pass; the provider's dedup on command id makes that harmless.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use duka_core::OfflineCommand;
use duka_db::Database;
use duka_store::{ApplyOutcome, DataProvider, ProviderError};

use crate::command::{ConflictReport, SyncReport};
use crate::error::SyncResult;

/// KV key holding the RFC 3339 timestamp of the last clean sync pass.
pub const LAST_SYNC_KEY: &str = "last_sync_at";

/// Replays buffered commands against the remote provider.
pub struct ReplayEngine {
    db: Arc<Database>,
    provider: Arc<dyn DataProvider>,
    max_attempts: i64,
}

impl ReplayEngine {
    /// Creates a replay engine.
    pub fn new(db: Arc<Database>, provider: Arc<dyn DataProvider>, max_attempts: i64) -> Self {
        ReplayEngine {
            db,
            provider,
            max_attempts,
        }
    }

    /// Runs one replay pass over the full buffer.
    ///
    /// Commands are replayed in FIFO order so mutations land remotely in
    /// the order the till produced them. The pass never aborts midway on a
    /// per-command failure; every command gets its attempt and the report
    /// accounts for all of them.
    pub async fn run_pass(&self) -> SyncResult<SyncReport> {
        let queue = self.db.queue();
        let entries = queue.all().await?;

        if entries.is_empty() {
            debug!("Offline buffer empty, nothing to replay");
            return Ok(SyncReport::default());
        }

        info!(pending = entries.len(), "Starting replay pass");

        let mut report = SyncReport::default();
        let mut departing: Vec<String> = Vec::new();

        let (processable, exhausted): (Vec<_>, Vec<_>) = entries
            .into_iter()
            .partition(|c| c.attempts < self.max_attempts);

        for command in exhausted {
            warn!(
                command_id = %command.id,
                category = %command.category,
                attempts = command.attempts,
                last_error = command.last_error.as_deref().unwrap_or("none"),
                "Dropping command that exhausted its replay attempts"
            );
            departing.push(command.id);
            report.abandoned += 1;
        }

        for command in processable {
            match self.provider.apply_command(&command).await {
                Ok(ApplyOutcome::Applied) => {
                    debug!(command_id = %command.id, "Command applied");
                    departing.push(command.id);
                    report.synced += 1;
                }
                Ok(ApplyOutcome::Duplicate) => {
                    debug!(command_id = %command.id, "Command already applied remotely");
                    departing.push(command.id);
                    report.duplicates += 1;
                }
                Ok(ApplyOutcome::Conflict { reason }) => {
                    warn!(command_id = %command.id, reason = %reason, "Replay conflict");
                    report.conflicts.push(conflict_report(&command, &reason));
                    departing.push(command.id);
                }
                Err(e) if e.is_retryable() => {
                    debug!(command_id = %command.id, error = %e, "Retryable replay failure");
                    queue.mark_failed(&command.id, &e.to_string()).await?;
                    report.failed += 1;
                }
                Err(ProviderError::Rejected(reason)) => {
                    // The provider understood the command and refused it;
                    // retrying verbatim can never land. Surface it like a
                    // conflict so the caller gets a merge decision.
                    warn!(command_id = %command.id, reason = %reason, "Command rejected by provider");
                    report.conflicts.push(conflict_report(&command, &reason));
                    departing.push(command.id);
                }
                Err(e) => {
                    queue.mark_failed(&command.id, &e.to_string()).await?;
                    report.failed += 1;
                }
            }
        }

        queue.delete_many(&departing).await?;

        if report.is_clean() && queue.count().await? == 0 {
            self.db
                .kv()
                .set(LAST_SYNC_KEY, &Utc::now().to_rfc3339())
                .await?;
        }

        info!(
            synced = report.synced,
            duplicates = report.duplicates,
            conflicts = report.conflicts.len(),
            failed = report.failed,
            abandoned = report.abandoned,
            "Replay pass complete"
        );

        Ok(report)
    }
}

fn conflict_report(command: &OfflineCommand, reason: &str) -> ConflictReport {
    ConflictReport {
        command_id: command.id.clone(),
        store_id: command.store_id.clone(),
        category: command.category.clone(),
        op: command.op.clone(),
        payload: command.payload.clone(),
        reason: reason.to_string(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use duka_db::DbConfig;
    use duka_store::DemoDataProvider;
    use serde_json::json;

    const STORE: &str = "store-1";

    async fn engine_with(max_attempts: i64) -> (ReplayEngine, Arc<Database>, Arc<DemoDataProvider>) {
        let db = Arc::new(Database::new(DbConfig::in_memory()).await.unwrap());
        let provider = Arc::new(DemoDataProvider::new());
        let engine = ReplayEngine::new(db.clone(), provider.clone(), max_attempts);
        (engine, db, provider)
    }

    #[tokio::test]
    async fn test_clean_pass_syncs_and_clears() {
        let (engine, db, provider) = engine_with(10).await;
        let queue = db.queue();

        for i in 0..3 {
            let payload = json!({"id": format!("p{}", i), "name": "Soda"}).to_string();
            queue.append(STORE, "products", "insert", &payload).await.unwrap();
        }

        let report = engine.run_pass().await.unwrap();

        assert_eq!(report.synced, 3);
        assert!(report.is_clean());
        assert_eq!(queue.count().await.unwrap(), 0);
        assert_eq!(provider.row_count("products"), 3);

        // Clean pass stamps the last-sync marker.
        assert!(db.kv().get(LAST_SYNC_KEY).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_duplicate_commands_are_deduped() {
        let (engine, db, provider) = engine_with(10).await;
        let queue = db.queue();

        let cmd = queue
            .append(STORE, "products", "insert", r#"{"id":"p1"}"#)
            .await
            .unwrap();

        // The provider saw this id before the pass started (e.g. a crash
        // after apply but before the buffer row was deleted).
        provider.apply_command(&cmd).await.unwrap();

        let report = engine.run_pass().await.unwrap();

        assert_eq!(report.synced, 0);
        assert_eq!(report.duplicates, 1);
        assert_eq!(provider.row_count("products"), 1);
        assert_eq!(queue.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_conflict_is_surfaced_and_cleared() {
        let (engine, db, provider) = engine_with(10).await;
        let queue = db.queue();

        let cmd = queue
            .append(STORE, "products", "insert", r#"{"id":"p1"}"#)
            .await
            .unwrap();
        provider.mark_conflict(&cmd.id);

        let report = engine.run_pass().await.unwrap();

        assert_eq!(report.conflicts.len(), 1);
        assert_eq!(report.conflicts[0].command_id, cmd.id);
        assert!(!report.is_clean());

        // The conflicting row leaves the buffer; it needs a human, not a retry.
        assert_eq!(queue.count().await.unwrap(), 0);

        // No clean-sync stamp after a conflicted pass.
        assert!(db.kv().get(LAST_SYNC_KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_retryable_failure_keeps_command() {
        let (engine, db, provider) = engine_with(10).await;
        let queue = db.queue();

        let cmd = queue
            .append(STORE, "products", "insert", r#"{"id":"p1"}"#)
            .await
            .unwrap();
        provider.fail_times(&cmd.id, 1);

        let first = engine.run_pass().await.unwrap();
        assert_eq!(first.failed, 1);
        assert_eq!(queue.count().await.unwrap(), 1);
        assert_eq!(queue.all().await.unwrap()[0].attempts, 1);

        let second = engine.run_pass().await.unwrap();
        assert_eq!(second.synced, 1);
        assert_eq!(queue.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_exhausted_command_is_abandoned() {
        let (engine, db, provider) = engine_with(1).await;
        let queue = db.queue();

        let cmd = queue
            .append(STORE, "products", "insert", r#"{"id":"p1"}"#)
            .await
            .unwrap();
        provider.fail_times(&cmd.id, 1);

        // First pass: retryable failure, attempts goes to 1.
        engine.run_pass().await.unwrap();

        // Second pass: attempts == max, the command is dropped up front.
        let report = engine.run_pass().await.unwrap();
        assert_eq!(report.abandoned, 1);
        assert_eq!(queue.count().await.unwrap(), 0);
        assert_eq!(provider.row_count("products"), 0);
    }

    #[tokio::test]
    async fn test_rejected_command_becomes_conflict() {
        let (engine, db, _provider) = engine_with(10).await;
        let queue = db.queue();

        // An op the provider does not understand is a hard rejection.
        queue
            .append(STORE, "products", "upsert", r#"{"id":"p1"}"#)
            .await
            .unwrap();

        let report = engine.run_pass().await.unwrap();

        assert_eq!(report.conflicts.len(), 1);
        assert_eq!(queue.count().await.unwrap(), 0);
    }
}
