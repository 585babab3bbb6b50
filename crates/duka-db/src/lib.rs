//! # duka-db: Durable Local Storage for Duka POS
//!
//! This crate provides the SQLite-backed persistence that makes the client
//! engine offline-first. It stores small key/value records, the offline
//! mutation queue, and a read-through TTL cache.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Duka POS Local Data Flow                         │
//! │                                                                         │
//! │  OfflineCoordinator (duka-sync)                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     duka-db (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │   (kv.rs,     │    │  (embedded)  │  │   │
//! │  │   │               │    │    queue.rs,  │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│    cache.rs)  │    │ 001_local_   │  │   │
//! │  │   │ Connection    │    │               │    │ storage.sql  │  │   │
//! │  │   │ Management    │    │               │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   ~/.local/share/duka-pos/duka.db                               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (kv, queue, cache)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use duka_db::{Database, DbConfig};
//!
//! // Create database with default config
//! let config = DbConfig::new("path/to/duka.db");
//! let db = Database::new(config).await?;
//!
//! // Use repositories
//! db.kv().set("theme", "dark").await?;
//! let pending = db.queue().count().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::cache::CacheRepository;
pub use repository::kv::KvRepository;
pub use repository::queue::QueueRepository;
