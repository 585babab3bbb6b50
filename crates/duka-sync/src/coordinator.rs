//! # Offline Coordinator
//!
//! The mutation router: decides per call whether a write goes straight to
//! the remote provider or into the durable offline buffer, and owns the
//! replay trigger plus the generic TTL cache.
//!
//! ## Routing Decision
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Mutation Routing                                    │
//! │                                                                         │
//! │  submit(store, category, op, payload)                                   │
//! │       │                                                                 │
//! │       ├── OFFLINE ──► offline_queue row (durable)      → Buffered       │
//! │       │                                                                 │
//! │       └── ONLINE ───► provider.apply_command(cmd)                       │
//! │                │                                                        │
//! │                ├── Applied / Duplicate                 → Applied        │
//! │                ├── Conflict                            → Conflict       │
//! │                ├── Err retryable ──► buffer instead    → Buffered       │
//! │                └── Err rejected                        → error          │
//! │                                                                         │
//! │  Online writes use the same idempotent command shape as replay, so a   │
//! │  call that times out halfway can be buffered and re-sent without ever  │
//! │  double-applying.                                                      │
//! │                                                                         │
//! │  go_online() on the OFFLINE → ONLINE edge runs sync_offline_data().    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use duka_core::OfflineCommand;
use duka_db::Database;
use duka_store::{ApplyOutcome, DataProvider, ProviderError};

use crate::command::{categories, SyncReport};
use crate::config::SyncTunables;
use crate::connectivity::{ConnectivityMonitor, ConnectivityState};
use crate::error::{SyncError, SyncResult};
use crate::replay::{ReplayEngine, LAST_SYNC_KEY};

/// Where a submitted mutation ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The provider applied it immediately (online path).
    Applied,

    /// It landed in the durable offline buffer for later replay.
    Buffered,

    /// The provider reported the mutation can never apply as written;
    /// the caller owes the user a merge decision.
    Conflict { reason: String },
}

/// Routes store mutations between the remote provider and the offline
/// buffer, and replays the buffer when connectivity returns.
///
/// Constructed once at composition time with its dependencies injected;
/// shared by reference (`Arc<OfflineCoordinator>`).
pub struct OfflineCoordinator {
    db: Arc<Database>,
    connectivity: ConnectivityMonitor,
    replay: ReplayEngine,
    provider: Arc<dyn DataProvider>,
    tunables: SyncTunables,
}

impl OfflineCoordinator {
    /// Creates a coordinator starting in the ONLINE state.
    pub fn new(
        db: Arc<Database>,
        provider: Arc<dyn DataProvider>,
        tunables: SyncTunables,
    ) -> Self {
        let replay = ReplayEngine::new(db.clone(), provider.clone(), tunables.max_replay_attempts);
        OfflineCoordinator {
            db,
            connectivity: ConnectivityMonitor::new(ConnectivityState::Online),
            replay,
            provider,
            tunables,
        }
    }

    /// The connectivity monitor, for subscribing or direct signal injection.
    pub fn connectivity(&self) -> &ConnectivityMonitor {
        &self.connectivity
    }

    /// Whether the engine currently routes writes straight to the provider.
    pub fn is_online(&self) -> bool {
        self.connectivity.is_online()
    }

    // =========================================================================
    // Connectivity signals
    // =========================================================================

    /// Records loss of connectivity; subsequent mutations buffer locally.
    pub fn go_offline(&self) {
        self.connectivity.set_offline();
    }

    /// Records restored connectivity.
    ///
    /// ## Returns
    /// `Some(report)` when this call was the actual OFFLINE → ONLINE edge
    /// and a replay pass ran; `None` when the engine was already online.
    pub async fn go_online(&self) -> SyncResult<Option<SyncReport>> {
        if !self.connectivity.set_online() {
            return Ok(None);
        }

        let report = self.sync_offline_data().await?;
        Ok(Some(report))
    }

    // =========================================================================
    // Mutation routing
    // =========================================================================

    /// Routes one mutation: direct to the provider while online, into the
    /// durable buffer while offline.
    ///
    /// The payload is the full mutation as JSON (for `update` ops:
    /// `{"id": ..., "patch": {...}}`). The command id is generated here so
    /// the same identity covers the direct attempt and any later replay.
    ///
    /// ## Errors
    /// - `UnknownCategory` for a category the buffer does not model
    /// - `BufferWriteFailed` when offline and the durable append failed
    ///   (the caller should warn: this write will not survive a restart)
    /// - `Provider` when the provider rejected a direct write outright
    pub async fn submit(
        &self,
        store_id: &str,
        category: &str,
        op: &str,
        payload: &str,
    ) -> SyncResult<SubmitOutcome> {
        if !categories::is_valid(category) {
            return Err(SyncError::UnknownCategory(category.to_string()));
        }

        if !self.is_online() {
            return self.buffer(store_id, category, op, payload).await;
        }

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

        match self.provider.apply_command(&command).await {
            Ok(ApplyOutcome::Applied) | Ok(ApplyOutcome::Duplicate) => {
                debug!(command_id = %command.id, category = %category, "Direct write applied");
                Ok(SubmitOutcome::Applied)
            }
            Ok(ApplyOutcome::Conflict { reason }) => {
                warn!(command_id = %command.id, reason = %reason, "Direct write conflicted");
                Ok(SubmitOutcome::Conflict { reason })
            }
            Err(e) if e.is_retryable() => {
                // The backend is unreachable even though the platform still
                // says online. Fall back to buffering rather than losing
                // the write or blocking the till.
                warn!(command_id = %command.id, error = %e, "Provider unreachable, buffering write");
                self.buffer(store_id, category, op, payload).await
            }
            Err(ProviderError::Rejected(reason)) => {
                Err(SyncError::Provider(ProviderError::Rejected(reason)))
            }
            Err(e) => Err(SyncError::Provider(e)),
        }
    }

    /// Appends a mutation to the durable offline buffer.
    async fn buffer(
        &self,
        store_id: &str,
        category: &str,
        op: &str,
        payload: &str,
    ) -> SyncResult<SubmitOutcome> {
        match self.db.queue().append(store_id, category, op, payload).await {
            Ok(command) => {
                debug!(command_id = %command.id, category = %category, "Mutation buffered");
                Ok(SubmitOutcome::Buffered)
            }
            Err(e) => {
                // Logged AND returned: the till keeps running, but the
                // caller can tell the user this write is not durable.
                warn!(category = %category, error = %e, "Failed to buffer offline mutation");
                Err(SyncError::BufferWriteFailed(e.to_string()))
            }
        }
    }

    // =========================================================================
    // Replay
    // =========================================================================

    /// Replays the full offline buffer against the provider.
    ///
    /// ## Errors
    /// `Offline` when connectivity has not returned yet.
    pub async fn sync_offline_data(&self) -> SyncResult<SyncReport> {
        if !self.is_online() {
            return Err(SyncError::Offline);
        }

        self.replay.run_pass().await
    }

    /// Number of commands waiting in the buffer.
    pub async fn pending_count(&self) -> SyncResult<i64> {
        Ok(self.db.queue().count().await?)
    }

    /// Timestamp of the last clean sync pass, if any.
    pub async fn last_sync_at(&self) -> SyncResult<Option<DateTime<Utc>>> {
        let stamp = self.db.kv().get(LAST_SYNC_KEY).await?;
        Ok(stamp
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc)))
    }

    // =========================================================================
    // Generic TTL cache
    // =========================================================================

    /// Caches a value under a key, stamped with the current wall clock.
    /// Independent of the offline buffer.
    ///
    /// Cache-write failures are downgraded to a warning: a cold cache is
    /// an inconvenience, not lost data.
    pub async fn cache_data(&self, key: &str, value: &str) {
        let now = Utc::now().timestamp_millis();
        if let Err(e) = self.db.cache().put(key, value, now).await {
            warn!(key = %key, error = %e, "Cache write failed");
        }
    }

    /// Fetches a cached value no older than `max_age_ms` (the configured
    /// default when `None`). Miss and expiry both yield `None`.
    pub async fn get_cached_data(&self, key: &str, max_age_ms: Option<i64>) -> Option<String> {
        let max_age = max_age_ms.unwrap_or(self.tunables.cache_max_age_ms);
        match self.db.cache().get(key, max_age).await {
            Ok(hit) => hit,
            Err(e) => {
                warn!(key = %key, error = %e, "Cache read failed");
                None
            }
        }
    }

    /// Explicit teardown: closes nothing itself (the database is shared)
    /// but logs the final buffer depth so an operator can see whether
    /// writes were stranded.
    pub async fn dispose(&self) {
        match self.db.queue().count().await {
            Ok(0) => info!("Offline coordinator disposed, buffer empty"),
            Ok(n) => warn!(pending = n, "Offline coordinator disposed with buffered writes"),
            Err(e) => warn!(error = %e, "Offline coordinator disposed, buffer unreadable"),
        }
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

    async fn coordinator() -> (OfflineCoordinator, Arc<DemoDataProvider>) {
        let db = Arc::new(Database::new(DbConfig::in_memory()).await.unwrap());
        let provider = Arc::new(DemoDataProvider::new());
        let coordinator =
            OfflineCoordinator::new(db, provider.clone(), SyncTunables::default());
        (coordinator, provider)
    }

    fn product_payload(id: &str) -> String {
        json!({"id": id, "name": "Soda 500ml", "retail_price_cents": 5000}).to_string()
    }

    #[tokio::test]
    async fn test_online_submit_goes_direct() {
        let (coordinator, provider) = coordinator().await;

        let outcome = coordinator
            .submit(STORE, "products", "insert", &product_payload("p1"))
            .await
            .unwrap();

        assert_eq!(outcome, SubmitOutcome::Applied);
        assert_eq!(provider.row_count("products"), 1);
        assert_eq!(coordinator.pending_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_offline_mutations_buffer_then_sync_on_reconnect() {
        let (coordinator, provider) = coordinator().await;

        coordinator.go_offline();
        for i in 0..3 {
            let outcome = coordinator
                .submit(STORE, "products", "insert", &product_payload(&format!("p{}", i)))
                .await
                .unwrap();
            assert_eq!(outcome, SubmitOutcome::Buffered);
        }
        assert_eq!(coordinator.pending_count().await.unwrap(), 3);
        assert_eq!(provider.row_count("products"), 0);

        let report = coordinator.go_online().await.unwrap().expect("edge");

        assert_eq!(report.synced, 3);
        assert!(report.is_clean());
        assert_eq!(coordinator.pending_count().await.unwrap(), 0);
        assert_eq!(provider.row_count("products"), 3);
        assert!(coordinator.last_sync_at().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_repeated_online_signal_is_not_an_edge() {
        let (coordinator, _provider) = coordinator().await;

        assert!(coordinator.go_online().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sync_while_offline_is_an_error() {
        let (coordinator, _provider) = coordinator().await;
        coordinator.go_offline();

        let err = coordinator.sync_offline_data().await.unwrap_err();
        assert!(matches!(err, SyncError::Offline));
    }

    #[tokio::test]
    async fn test_unreachable_provider_falls_back_to_buffer() {
        let (coordinator, provider) = coordinator().await;

        // Platform says online but the backend is down.
        provider.set_available(false);

        let outcome = coordinator
            .submit(STORE, "products", "insert", &product_payload("p1"))
            .await
            .unwrap();

        assert_eq!(outcome, SubmitOutcome::Buffered);
        assert_eq!(coordinator.pending_count().await.unwrap(), 1);

        provider.set_available(true);
        let report = coordinator.sync_offline_data().await.unwrap();
        assert_eq!(report.synced, 1);
    }

    #[tokio::test]
    async fn test_unknown_category_rejected() {
        let (coordinator, _provider) = coordinator().await;

        let err = coordinator
            .submit(STORE, "suppliers", "insert", "{}")
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::UnknownCategory(_)));
    }

    #[tokio::test]
    async fn test_cache_roundtrip_and_expiry() {
        let (coordinator, _provider) = coordinator().await;

        coordinator.cache_data("dashboard_stats", r#"{"sales":12}"#).await;

        let fresh = coordinator.get_cached_data("dashboard_stats", None).await;
        assert_eq!(fresh.as_deref(), Some(r#"{"sales":12}"#));

        // A zero-tolerance reader treats any age as expired... use 1ms and
        // a sleep to force it past the window.
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let expired = coordinator.get_cached_data("dashboard_stats", Some(1)).await;
        assert_eq!(expired, None);
    }
}
