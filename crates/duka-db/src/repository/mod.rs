//! # Repository Module
//!
//! Repository implementations over the local SQLite store.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  Engine Service                                                         │
//! │       │                                                                 │
//! │       │  db.queue().append(store_id, "products", "create", json)       │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  QueueRepository                                                        │
//! │  ├── append(&self, ...)                                                 │
//! │  ├── all(&self)                                                         │
//! │  ├── delete_many(&self, ids)                                            │
//! │  └── clear(&self)                                                       │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! │                                                                         │
//! │  Benefits:                                                              │
//! │  • Clean separation of concerns                                        │
//! │  • Easy to test (in-memory pool)                                       │
//! │  • SQL is isolated in one place                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`kv::KvRepository`] - Plain key/value flags and stamps
//! - [`queue::QueueRepository`] - Offline mutation buffer
//! - [`cache::CacheRepository`] - Read-through TTL cache

pub mod cache;
pub mod kv;
pub mod queue;
