//! # duka-sync: Offline Queue & Sync Engine for Duka POS
//!
//! Connectivity tracking, durable offline buffering, and at-least-once
//! replay against the remote data provider. This crate is why the till
//! keeps selling when the shop's internet does not.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Offline-First Data Path                           │
//! │                                                                         │
//! │   Frontend mutation                                                     │
//! │        │                                                                │
//! │        ▼                                                                │
//! │   StoreDataService (duka-store)  ← in-memory truth, always applied      │
//! │        │                                                                │
//! │        ▼                                                                │
//! │   ┌──────────────────────────────────────────────────────────────┐     │
//! │   │                ★ duka-sync (THIS CRATE) ★                    │     │
//! │   │                                                              │     │
//! │   │  ConnectivityMonitor ──► OfflineCoordinator ──► ReplayEngine │     │
//! │   │   ONLINE ⇄ OFFLINE        routes writes        FIFO replay   │     │
//! │   │   watch channel           owns TTL cache       dedup+conflict│     │
//! │   └────────────┬──────────────────────┬────────────────┬─────────┘     │
//! │                │                      │                │               │
//! │                ▼                      ▼                ▼               │
//! │           EngineConfig           duka-db          DataProvider         │
//! │           (TOML + env)        (offline_queue)     (duka-store)         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`connectivity`] - ONLINE ⇄ OFFLINE state machine on a watch channel
//! - [`coordinator`] - mutation routing, sync trigger, TTL cache facade
//! - [`replay`] - at-least-once replay pass with dedup and conflicts
//! - [`command`] - categories, replay outcomes, the sync report
//! - [`config`] - `EngineConfig` (TOML file + environment overrides)
//! - [`error`] - `SyncError` with retryable classification
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use duka_sync::{EngineConfig, OfflineCoordinator};
//!
//! let config = EngineConfig::load_or_default(None);
//! let coordinator = Arc::new(OfflineCoordinator::new(db, provider, config.sync.clone()));
//!
//! coordinator.go_offline();
//! coordinator.submit(store_id, "products", "insert", &payload).await?; // buffered
//! let report = coordinator.go_online().await?; // replays the buffer
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod command;
pub mod config;
pub mod connectivity;
pub mod coordinator;
pub mod error;
pub mod replay;

// =============================================================================
// Re-exports
// =============================================================================

pub use command::{categories, ops, ConflictReport, ReplayOutcome, SyncReport};
pub use config::{DemoSettings, EngineConfig, StorageSettings, SyncTunables, TerminalConfig};
pub use connectivity::{ConnectivityMonitor, ConnectivityState};
pub use coordinator::{OfflineCoordinator, SubmitOutcome};
pub use error::{SyncError, SyncResult};
pub use replay::{ReplayEngine, LAST_SYNC_KEY};
