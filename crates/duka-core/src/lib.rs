//! # duka-core: Pure Business Logic for Duka POS
//!
//! This crate is the **heart** of Duka POS. It contains all business logic
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Duka POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                      Frontend (web UI)                          │   │
//! │  │    Inventory UI ──► Sell UI ──► Customers UI ──► Reports UI    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │           Service layer (duka-store / duka-sync / duka-tenant)  │   │
//! │  │    StoreDataService, OfflineCoordinator, SessionBridge          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ duka-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  access   │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │  roles    │  │   rules   │  │   │
//! │  │   │  Customer │  │  TaxCalc  │  │  plans    │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Store, Product, Customer, Transaction, Tenant)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`settings`] - Closed per-category settings records (store, printer, SMS)
//! - [`access`] - Role permissions, plan features, feature-access decisions
//! - [`receipt`] - Fixed-width receipt text rendering
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in KES cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use duka_core::money::Money;
//! use duka_core::types::TaxRate;
//!
//! // Create money from cents (never from floats!)
//! let price = Money::from_cents(25000); // KSh 250.00
//!
//! // Calculate VAT at the Kenyan standard rate
//! let vat = TaxRate::from_bps(1600); // 16%
//! let tax = price.calculate_tax(vat);
//! assert_eq!(tax.cents(), 4000); // KSh 40.00
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod access;
pub mod error;
pub mod money;
pub mod receipt;
pub mod settings;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use duka_core::Money` instead of
// `use duka_core::money::Money`

pub use access::{check_feature_access, role_permissions, subscription_features};
pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use receipt::render_receipt;
pub use settings::{PrinterSettings, SmsSettings, StoreSettings};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Sentinel customer id for anonymous ("walk-in") sales.
///
/// ## Why a constant?
/// Every store's customer map always contains exactly one walk-in record so
/// the sell screen never has to special-case "no customer selected". The nil
/// UUID keeps it recognizable and impossible to collide with generated ids.
pub const WALK_IN_CUSTOMER_ID: &str = "00000000-0000-0000-0000-000000000000";

/// Maximum line items allowed in a single transaction
///
/// ## Business Reason
/// Prevents runaway baskets and ensures reasonable transaction sizes.
/// Can be made configurable per-tenant in future versions.
pub const MAX_TRANSACTION_ITEMS: usize = 100;

/// Maximum quantity of a single line item
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10)
/// Configurable per-tenant in future versions.
pub const MAX_ITEM_QUANTITY: i64 = 999;
