//! # Sync Error Types
//!
//! Error types for the offline queue and replay engine.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sync Error Categories                             │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │    Storage      │  │      Replay             │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Storage        │  │  Provider               │ │
//! │  │  ConfigLoad/    │  │  (wraps         │  │  BufferWriteFailed      │ │
//! │  │  SaveFailed     │  │   DbError)      │  │  Serialization          │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  Retryable vs. permanent: `is_retryable()` drives whether a buffered   │
//! │  command stays in the queue for another replay pass.                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use duka_store::ProviderError;

/// Result type alias for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Sync error type covering configuration, storage, and replay failures.
#[derive(Debug, Error)]
pub enum SyncError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid engine configuration.
    #[error("Invalid engine configuration: {0}")]
    InvalidConfig(String),

    /// Failed to load the config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save the config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Storage Errors
    // =========================================================================
    /// Durable local storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] duka_db::DbError),

    /// Writing a mutation to the offline buffer failed. The in-memory
    /// application already happened; the caller should warn the user that
    /// this write will not survive a restart.
    #[error("Failed to buffer offline mutation: {0}")]
    BufferWriteFailed(String),

    // =========================================================================
    // Replay Errors
    // =========================================================================
    /// The remote data provider rejected or could not service a call.
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// A command payload could not be serialized or deserialized.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// A mutation named a buffer category the queue does not model.
    #[error("Unknown buffer category: {0}")]
    UnknownCategory(String),

    /// A replay pass was requested while the engine is OFFLINE.
    #[error("Cannot sync while offline")]
    Offline,
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for SyncError {
    fn from(err: toml::de::Error) -> Self {
        SyncError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for SyncError {
    fn from(err: toml::ser::Error) -> Self {
        SyncError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization (for replay logic)
// =============================================================================

impl SyncError {
    /// Returns true if the same operation may succeed on a later attempt.
    ///
    /// Storage failures and unavailable providers are worth retrying; a
    /// rejected request or bad configuration is not.
    pub fn is_retryable(&self) -> bool {
        match self {
            SyncError::Storage(_) => true,
            SyncError::Provider(p) => p.is_retryable(),
            SyncError::Offline => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        let unavailable = SyncError::Provider(ProviderError::Unavailable("down".into()));
        assert!(unavailable.is_retryable());

        let rejected = SyncError::Provider(ProviderError::Rejected("bad row".into()));
        assert!(!rejected.is_retryable());

        assert!(!SyncError::InvalidConfig("bad".into()).is_retryable());
        assert!(SyncError::Offline.is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = SyncError::BufferWriteFailed("disk full".into());
        assert_eq!(
            err.to_string(),
            "Failed to buffer offline mutation: disk full"
        );
    }
}
