//! # Replay Commands and Reports
//!
//! The buffered-mutation vocabulary shared by the coordinator and the
//! replay engine. The durable row type itself ([`duka_core::OfflineCommand`])
//! lives in the pure crate so the storage layer can return it without a
//! reverse dependency; this module adds the replay-side types around it.

use serde::{Deserialize, Serialize};

/// Buffer category names. Categories key the per-category buffers and map
/// one-to-one onto the remote tables replay writes to.
pub mod categories {
    pub const PRODUCTS: &str = "products";
    pub const CUSTOMERS: &str = "customers";
    pub const TRANSACTIONS: &str = "transactions";

    /// All valid categories, in replay priority order.
    pub const ALL: [&str; 3] = [PRODUCTS, CUSTOMERS, TRANSACTIONS];

    /// Whether a category name is one the buffer accepts.
    pub fn is_valid(category: &str) -> bool {
        ALL.contains(&category)
    }
}

/// Operation names within a category.
pub mod ops {
    pub const INSERT: &str = "insert";
    pub const UPDATE: &str = "update";
}

// =============================================================================
// Replay Outcomes
// =============================================================================

/// What replay concluded about one buffered command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplayOutcome {
    /// The provider applied the command.
    Synced,

    /// The provider had already applied this command id in an earlier
    /// pass; nothing changed, the buffer row can go.
    Duplicate,

    /// The command can never apply as written. It leaves the buffer, but
    /// the conflict is surfaced for an explicit merge decision.
    Conflict { reason: String },

    /// A retryable failure; the command stays buffered with its attempt
    /// count incremented.
    Retry { error: String },

    /// The command exhausted its replay attempts and was dropped.
    Abandoned,
}

/// A conflict surfaced by a replay pass, carrying enough context for the
/// caller to present a merge decision instead of silently losing the write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConflictReport {
    /// The buffered command's client-generated id.
    pub command_id: String,
    pub store_id: String,
    pub category: String,
    pub op: String,
    /// The buffered mutation as JSON, for display/merge.
    pub payload: String,
    /// Why the provider could not apply it.
    pub reason: String,
}

// =============================================================================
// Sync Report
// =============================================================================

/// Summary of one replay pass over the offline buffer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncReport {
    /// Commands the provider applied this pass.
    pub synced: usize,

    /// Commands the provider had already seen (deduplicated).
    pub duplicates: usize,

    /// Commands that can never apply; each needs a merge decision.
    pub conflicts: Vec<ConflictReport>,

    /// Commands that failed retryably and remain buffered.
    pub failed: usize,

    /// Commands dropped after exhausting their replay attempts.
    pub abandoned: usize,
}

impl SyncReport {
    /// True when every buffered command left the queue cleanly: applied or
    /// deduplicated, with no conflicts, retries, or drops.
    pub fn is_clean(&self) -> bool {
        self.conflicts.is_empty() && self.failed == 0 && self.abandoned == 0
    }

    /// Total commands that left the buffer this pass.
    pub fn cleared(&self) -> usize {
        self.synced + self.duplicates + self.conflicts.len() + self.abandoned
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
