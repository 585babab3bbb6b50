//! # duka-store: Store Data Service for Duka POS
//!
//! The session-scoped source of truth for store data, plus the provider
//! seam through which that data reaches the remote backend.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Frontend (sell / inventory / customers screens)                       │
//! │        │                                                                │
//! │        ▼                                                                │
//! │   ┌──────────────────────────────────────────────────────────────┐     │
//! │   │                 ★ duka-store (THIS CRATE) ★                  │     │
//! │   │                                                              │     │
//! │   │   ┌──────────────────────┐   ┌──────────────────────────┐   │     │
//! │   │   │   StoreDataService   │   │   DataProvider (trait)   │   │     │
//! │   │   │                      │   │                          │   │     │
//! │   │   │  per-store entities  │   │  select/insert/update    │   │     │
//! │   │   │  cash balance        │   │  apply_command (replay)  │   │     │
//! │   │   │  settings records    │   │  DemoDataProvider impl   │   │     │
//! │   │   └──────────────────────┘   └──────────────────────────┘   │     │
//! │   └──────────────┬───────────────────────────┬──────────────────┘     │
//! │                  │ pure types                │ replay / direct writes  │
//! │                  ▼                           ▼                         │
//! │             duka-core                   duka-sync                      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`service`] - `StoreDataService`: synchronous per-store CRUD + snapshots
//! - [`provider`] - `DataProvider` trait, outcomes, and the demo backend
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use duka_store::{DemoDataProvider, StoreDataService};
//!
//! let store_data = Arc::new(StoreDataService::new());
//! let provider: Arc<dyn duka_store::DataProvider> = Arc::new(DemoDataProvider::new());
//!
//! let product = store_data.add_product("store-1", new_product)?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod provider;
pub mod service;

// =============================================================================
// Re-exports
// =============================================================================

pub use provider::{
    tables, ApplyOutcome, DataProvider, DemoDataProvider, ProviderError, ProviderResult,
};
pub use service::{CashDirection, StoreData, StoreDataService};
