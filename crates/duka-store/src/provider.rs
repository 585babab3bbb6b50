//! # Data Provider Seam
//!
//! Abstraction over the remote backend the client reads from and writes to.
//! The store data service owns session state; this trait is how that state
//! (and the offline buffer behind it) reaches durable remote storage.
//!
//! ## Two Paths to the Provider
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Provider Call Paths                                │
//! │                                                                         │
//! │  ONLINE                              OFFLINE → RECONNECT                │
//! │  ──────                              ────────────────────               │
//! │                                                                         │
//! │  mutation ──► insert()/update()      mutation ──► offline_queue row     │
//! │                 │                                     │                 │
//! │                 ▼                                     ▼ (reconnect)     │
//! │             remote row               replay ──► apply_command()         │
//! │                                                       │                 │
//! │                                        ┌──────────────┼──────────────┐  │
//! │                                        ▼              ▼              ▼  │
//! │                                     Applied      Duplicate      Conflict│
//! │                                   (row landed)  (id seen        (cannot │
//! │                                                  before)         apply) │
//! │                                                                         │
//! │  DEDUP CONTRACT: command ids are client-generated and stable across     │
//! │  replays; the provider must treat a re-sent id as Duplicate, never      │
//! │  as a second application.                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use duka_core::OfflineCommand;

// =============================================================================
// Remote Tables
// =============================================================================

/// Remote table names the client layer touches.
pub mod tables {
    pub const STORES: &str = "stores";
    pub const CUSTOMERS: &str = "customers";
    pub const TENANTS: &str = "tenants";
    pub const TENANT_USERS: &str = "tenant_users";
    pub const SECURITY_EVENTS: &str = "security_events";
    pub const USER_ROLES: &str = "user_roles";
}

// =============================================================================
// Error Type
// =============================================================================

/// Provider failure, split by whether retrying the same call can succeed.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The backend could not be reached or answered too slowly. Retryable.
    #[error("Provider unavailable: {0}")]
    Unavailable(String),

    /// The backend understood the request and refused it. Not retryable.
    #[error("Provider rejected request: {0}")]
    Rejected(String),
}

impl ProviderError {
    /// Returns true if the same call may succeed on a later attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ProviderError::Unavailable(_))
    }
}

/// Result type alias for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

// =============================================================================
// Apply Outcome
// =============================================================================

/// What happened when a buffered command was replayed at the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The command landed and took effect.
    Applied,

    /// The provider has seen this command id before; the earlier
    /// application stands and nothing changed.
    Duplicate,

    /// The command can never apply as written (e.g. the target row is
    /// gone remotely). Retrying verbatim is pointless.
    Conflict { reason: String },
}

// =============================================================================
// Provider Trait
// =============================================================================

/// Remote backend operations the client layer depends on.
///
/// Implementations talk to the real backend; [`DemoDataProvider`] is the
/// in-memory stand-in used by tests and the demo binary.
#[async_trait]
pub trait DataProvider: Send + Sync {
    /// Fetches rows from `table` matching every key in `filter`.
    /// An empty filter object matches all rows.
    async fn select(&self, table: &str, filter: &Value) -> ProviderResult<Vec<Value>>;

    /// Inserts a row and returns it as stored.
    async fn insert(&self, table: &str, row: Value) -> ProviderResult<Value>;

    /// Merges `patch` into the row with the given id and returns the
    /// updated row.
    async fn update(&self, table: &str, id: &str, patch: Value) -> ProviderResult<Value>;

    /// Replays one buffered command. Must be idempotent on command id:
    /// a re-sent id reports [`ApplyOutcome::Duplicate`].
    async fn apply_command(&self, command: &OfflineCommand) -> ProviderResult<ApplyOutcome>;
}

// =============================================================================
// Demo Provider
// =============================================================================

/// In-memory provider for tests and the demo binary.
///
/// Behaves like a well-mannered backend: rows live in per-table vecs,
/// command ids are remembered for dedup, and knobs simulate outages and
/// conflicts.
#[derive(Debug, Default)]
pub struct DemoDataProvider {
    /// Rows per table.
    tables: Mutex<HashMap<String, Vec<Value>>>,

    /// Command ids already applied (dedup set).
    seen_commands: Mutex<HashSet<String>>,

    /// Command ids forced to report a conflict.
    conflict_commands: Mutex<HashSet<String>>,

    /// Remaining simulated failures per command id.
    failures: Mutex<HashMap<String, u32>>,

    /// When false, every call reports Unavailable.
    available: AtomicBool,

    /// Simulated round-trip latency per call, in milliseconds.
    latency_ms: u64,
}

impl DemoDataProvider {
    pub fn new() -> Self {
        DemoDataProvider {
            tables: Mutex::new(HashMap::new()),
            seen_commands: Mutex::new(HashSet::new()),
            conflict_commands: Mutex::new(HashSet::new()),
            failures: Mutex::new(HashMap::new()),
            available: AtomicBool::new(true),
            latency_ms: 0,
        }
    }

    /// Adds simulated latency to every call.
    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    /// Flips backend availability. While false, every call returns
    /// [`ProviderError::Unavailable`].
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Forces the given command id to report a conflict when replayed.
    pub fn mark_conflict(&self, command_id: &str) {
        self.conflict_commands
            .lock()
            .expect("demo provider lock poisoned")
            .insert(command_id.to_string());
    }

    /// Makes the next `times` replays of the given command id fail
    /// retryably before succeeding.
    pub fn fail_times(&self, command_id: &str, times: u32) {
        self.failures
            .lock()
            .expect("demo provider lock poisoned")
            .insert(command_id.to_string(), times);
    }

    /// Number of rows currently in a table.
    pub fn row_count(&self, table: &str) -> usize {
        self.tables
            .lock()
            .expect("demo provider lock poisoned")
            .get(table)
            .map(|rows| rows.len())
            .unwrap_or(0)
    }

    /// Simulated network delay. Always awaited before any lock is taken
    /// so no lock is ever held across an await point.
    async fn simulate_latency(&self) {
        if self.latency_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.latency_ms)).await;
        }
    }

    fn check_available(&self) -> ProviderResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(ProviderError::Unavailable("backend offline".to_string()))
        }
    }

    fn row_matches(row: &Value, filter: &Value) -> bool {
        match filter.as_object() {
            Some(fields) => fields.iter().all(|(key, expected)| row.get(key) == Some(expected)),
            None => true,
        }
    }
}

#[async_trait]
impl DataProvider for DemoDataProvider {
    async fn select(&self, table: &str, filter: &Value) -> ProviderResult<Vec<Value>> {
        self.simulate_latency().await;
        self.check_available()?;

        let tables = self.tables.lock().expect("demo provider lock poisoned");
        let rows = tables
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| Self::row_matches(row, filter))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        Ok(rows)
    }

    async fn insert(&self, table: &str, row: Value) -> ProviderResult<Value> {
        self.simulate_latency().await;
        self.check_available()?;

        let mut tables = self.tables.lock().expect("demo provider lock poisoned");
        let rows = tables.entry(table.to_string()).or_default();

        if let Some(id) = row.get("id").and_then(Value::as_str) {
            if rows
                .iter()
                .any(|existing| existing.get("id").and_then(Value::as_str) == Some(id))
            {
                return Err(ProviderError::Rejected(format!(
                    "duplicate id '{}' in table '{}'",
                    id, table
                )));
            }
        }

        debug!(table = %table, "Demo provider insert");

        rows.push(row.clone());
        Ok(row)
    }

    async fn update(&self, table: &str, id: &str, patch: Value) -> ProviderResult<Value> {
        self.simulate_latency().await;
        self.check_available()?;

        let mut tables = self.tables.lock().expect("demo provider lock poisoned");
        let rows = tables.entry(table.to_string()).or_default();

        let row = rows
            .iter_mut()
            .find(|row| row.get("id").and_then(Value::as_str) == Some(id))
            .ok_or_else(|| {
                ProviderError::Rejected(format!("no row '{}' in table '{}'", id, table))
            })?;

        if let (Some(target), Some(fields)) = (row.as_object_mut(), patch.as_object()) {
            for (key, value) in fields {
                target.insert(key.clone(), value.clone());
            }
        }

        debug!(table = %table, id = %id, "Demo provider update");

        Ok(row.clone())
    }

    async fn apply_command(&self, command: &OfflineCommand) -> ProviderResult<ApplyOutcome> {
        self.simulate_latency().await;
        self.check_available()?;

        // Simulated transient outage for this specific command.
        {
            let mut failures = self.failures.lock().expect("demo provider lock poisoned");
            if let Some(remaining) = failures.get_mut(&command.id) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(ProviderError::Unavailable(
                        "simulated transient failure".to_string(),
                    ));
                }
            }
        }

        // Dedup on command id before anything else.
        {
            let seen = self
                .seen_commands
                .lock()
                .expect("demo provider lock poisoned");
            if seen.contains(&command.id) {
                debug!(command_id = %command.id, "Demo provider duplicate command");
                return Ok(ApplyOutcome::Duplicate);
            }
        }

        if self
            .conflict_commands
            .lock()
            .expect("demo provider lock poisoned")
            .contains(&command.id)
        {
            return Ok(ApplyOutcome::Conflict {
                reason: "remote row changed since the command was buffered".to_string(),
            });
        }

        let payload: Value = serde_json::from_str(&command.payload)
            .map_err(|e| ProviderError::Rejected(format!("malformed payload: {}", e)))?;

        let mut tables = self.tables.lock().expect("demo provider lock poisoned");
        let rows = tables.entry(command.category.clone()).or_default();

        match command.op.as_str() {
            "insert" => {
                rows.push(payload);
            }
            "update" => {
                let id = payload.get("id").and_then(Value::as_str).unwrap_or_default();
                let row = rows
                    .iter_mut()
                    .find(|row| row.get("id").and_then(Value::as_str) == Some(id));

                match row {
                    Some(row) => {
                        if let (Some(target), Some(fields)) = (
                            row.as_object_mut(),
                            payload.get("patch").and_then(Value::as_object),
                        ) {
                            for (key, value) in fields {
                                target.insert(key.clone(), value.clone());
                            }
                        }
                    }
                    // The target row never made it remotely; replaying the
                    // same patch can never land.
                    None => {
                        return Ok(ApplyOutcome::Conflict {
                            reason: format!(
                                "no row '{}' in table '{}'",
                                id, command.category
                            ),
                        });
                    }
                }
            }
            other => {
                return Err(ProviderError::Rejected(format!("unknown op '{}'", other)));
            }
        }

        self.seen_commands
            .lock()
            .expect("demo provider lock poisoned")
            .insert(command.id.clone());

        debug!(
            command_id = %command.id,
            category = %command.category,
            op = %command.op,
            "Demo provider applied command"
        );

        Ok(ApplyOutcome::Applied)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn command(id: &str, op: &str, payload: Value) -> OfflineCommand {
        OfflineCommand {
            id: id.to_string(),
            store_id: "store-1".to_string(),
            category: tables::CUSTOMERS.to_string(),
            op: op.to_string(),
            payload: payload.to_string(),
            attempts: 0,
            last_error: None,
            created_at: Utc::now(),
            attempted_at: None,
        }
    }

    #[tokio::test]
    async fn test_insert_then_select() {
        let provider = DemoDataProvider::new();

        provider
            .insert(tables::CUSTOMERS, json!({"id": "c1", "name": "Amina"}))
            .await
            .unwrap();

        let rows = provider
            .select(tables::CUSTOMERS, &json!({}))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["name"], "Amina");
    }

    #[tokio::test]
    async fn test_select_filters_rows() {
        let provider = DemoDataProvider::new();
        provider
            .insert(tables::USER_ROLES, json!({"id": "r1", "user_id": "u1"}))
            .await
            .unwrap();
        provider
            .insert(tables::USER_ROLES, json!({"id": "r2", "user_id": "u2"}))
            .await
            .unwrap();

        let rows = provider
            .select(tables::USER_ROLES, &json!({"user_id": "u2"}))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["id"], "r2");
    }

    #[tokio::test]
    async fn test_update_merges_patch() {
        let provider = DemoDataProvider::new();
        provider
            .insert(tables::TENANTS, json!({"id": "t1", "plan": "basic"}))
            .await
            .unwrap();

        let updated = provider
            .update(tables::TENANTS, "t1", json!({"plan": "premium"}))
            .await
            .unwrap();

        assert_eq!(updated["plan"], "premium");
        assert_eq!(updated["id"], "t1");
    }

    #[tokio::test]
    async fn test_update_missing_row_rejected() {
        let provider = DemoDataProvider::new();

        let err = provider
            .update(tables::TENANTS, "ghost", json!({"plan": "premium"}))
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::Rejected(_)));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_apply_command_dedupes_on_id() {
        let provider = DemoDataProvider::new();
        let cmd = command("cmd-1", "insert", json!({"id": "c1", "name": "Amina"}));

        let first = provider.apply_command(&cmd).await.unwrap();
        let second = provider.apply_command(&cmd).await.unwrap();

        assert_eq!(first, ApplyOutcome::Applied);
        assert_eq!(second, ApplyOutcome::Duplicate);
        assert_eq!(provider.row_count(tables::CUSTOMERS), 1);
    }

    #[tokio::test]
    async fn test_apply_update_without_target_row_conflicts() {
        let provider = DemoDataProvider::new();
        let cmd = command(
            "cmd-2",
            "update",
            json!({"id": "ghost", "patch": {"name": "Neema"}}),
        );

        let outcome = provider.apply_command(&cmd).await.unwrap();
        assert!(matches!(outcome, ApplyOutcome::Conflict { .. }));

        // A conflicting command is not remembered as applied.
        let again = provider.apply_command(&cmd).await.unwrap();
        assert!(matches!(again, ApplyOutcome::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_forced_conflict() {
        let provider = DemoDataProvider::new();
        provider.mark_conflict("cmd-3");

        let cmd = command("cmd-3", "insert", json!({"id": "c3"}));
        let outcome = provider.apply_command(&cmd).await.unwrap();

        assert!(matches!(outcome, ApplyOutcome::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_transient_failure_then_success() {
        let provider = DemoDataProvider::new();
        provider.fail_times("cmd-4", 1);

        let cmd = command("cmd-4", "insert", json!({"id": "c4"}));

        let err = provider.apply_command(&cmd).await.unwrap_err();
        assert!(err.is_retryable());

        let outcome = provider.apply_command(&cmd).await.unwrap();
        assert_eq!(outcome, ApplyOutcome::Applied);
    }

    #[tokio::test]
    async fn test_unavailable_backend() {
        let provider = DemoDataProvider::new();
        provider.set_available(false);

        let err = provider
            .select(tables::STORES, &json!({}))
            .await
            .unwrap_err();
        assert!(err.is_retryable());

        provider.set_available(true);
        assert!(provider.select(tables::STORES, &json!({})).await.is_ok());
    }
}
