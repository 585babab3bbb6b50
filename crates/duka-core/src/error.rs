//! # Error Types
//!
//! Domain-specific error types for duka-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  duka-core errors (this file)                                           │
//! │  ├── CoreError        - Business rule violations, missing entities      │
//! │  └── ValidationError  - Input validation failures                       │
//! │                                                                         │
//! │  duka-db errors (separate crate)                                        │
//! │  └── DbError          - Durable storage failures                        │
//! │                                                                         │
//! │  duka-sync / duka-tenant errors (separate crates)                       │
//! │  ├── SyncError        - Offline queue and replay failures               │
//! │  └── TenantError      - Provider, rate-limit, billing failures          │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → service errors → caller message    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (entity id, amounts, etc.)
//! 3. Errors are enum variants, never String
//! 4. A missing mutation target is an explicit `*NotFound`, never a silent no-op

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations or domain logic failures.
/// They should be caught and translated to user-friendly messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product cannot be found in the store's inventory.
    ///
    /// ## When This Occurs
    /// - Product id doesn't exist in the store's data
    /// - Product was removed by another terminal before this update landed
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Customer cannot be found in the store's customer list.
    #[error("Customer not found: {0}")]
    CustomerNotFound(String),

    /// Supplier cannot be found in the store's supplier list.
    #[error("Supplier not found: {0}")]
    SupplierNotFound(String),

    /// A stock mutation would take the count below zero.
    ///
    /// ## When This Occurs
    /// - An inventory update sets stock negative while the store settings
    ///   leave `allow_negative_stock` off
    #[error("Stock for {name} cannot go negative (would become {resulting})")]
    NegativeStock { name: String, resulting: i64 },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when caller input doesn't meet requirements.
/// Used for early validation before business logic runs; they never
/// reach a remote provider.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid phone number, invalid barcode).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., duplicate barcode within a store).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },

    /// Payment splits on a completed transaction do not sum to its total.
    ///
    /// Partial payment is representable, but only as an explicit credit
    /// split covering the shortfall.
    #[error("Payment splits total {splits_cents} but transaction total is {total_cents}")]
    SplitMismatch { splits_cents: i64, total_cents: i64 },

    /// The walk-in sentinel customer can never carry credit.
    #[error("Walk-in customer cannot be billed on credit")]
    WalkInCredit,
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
