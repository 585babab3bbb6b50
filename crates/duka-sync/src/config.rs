//! # Engine Configuration
//!
//! Configuration for the client engine: terminal identity, local storage
//! location, sync tunables, and demo-mode settings.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     DUKA_TERMINAL_ID=till-1                                            │
//! │     DUKA_DB_PATH=/var/lib/duka/duka.db                                 │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/duka-pos/engine.toml (Linux)                             │
//! │     ~/Library/Application Support/ke.duka.pos/engine.toml (macOS)      │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     auto-generated terminal id, in-config database path                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # engine.toml
//! [terminal]
//! id = "550e8400-e29b-41d4-a716-446655440000"
//! name = "Till 1"
//! store_id = "store-001"
//!
//! [storage]
//! db_path = "duka.db"
//!
//! [sync]
//! max_replay_attempts = 10
//! cache_max_age_ms = 300000
//!
//! [demo]
//! enabled = false
//! simulated_latency_ms = 150
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{SyncError, SyncResult};

// =============================================================================
// Terminal Configuration
// =============================================================================

/// Identity of this till terminal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerminalConfig {
    /// Unique terminal identifier (UUID v4).
    /// Auto-generated on first run if not provided.
    pub id: String,

    /// Human-readable terminal name (e.g., "Till 1", "Back Office").
    #[serde(default = "default_terminal_name")]
    pub name: String,

    /// The store this terminal belongs to.
    #[serde(default = "default_store_id")]
    pub store_id: String,
}

fn default_terminal_name() -> String {
    "Till 1".to_string()
}

fn default_store_id() -> String {
    "default-store".to_string()
}

impl Default for TerminalConfig {
    fn default() -> Self {
        TerminalConfig {
            id: Uuid::new_v4().to_string(),
            name: default_terminal_name(),
            store_id: default_store_id(),
        }
    }
}

// =============================================================================
// Storage Settings
// =============================================================================

/// Durable local storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    /// SQLite database file. Relative paths resolve against the platform
    /// data directory; `:memory:` keeps everything in RAM (tests).
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// Run embedded migrations at startup.
    #[serde(default = "default_true")]
    pub run_migrations: bool,
}

fn default_db_path() -> String {
    "duka.db".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for StorageSettings {
    fn default() -> Self {
        StorageSettings {
            db_path: default_db_path(),
            run_migrations: true,
        }
    }
}

// =============================================================================
// Sync Tunables
// =============================================================================

/// Offline queue and cache behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncTunables {
    /// Replay attempts before a buffered command is skipped and logged.
    #[serde(default = "default_max_replay_attempts")]
    pub max_replay_attempts: i64,

    /// Default acceptable age for cache reads (milliseconds).
    #[serde(default = "default_cache_max_age")]
    pub cache_max_age_ms: i64,
}

fn default_max_replay_attempts() -> i64 {
    10
}

fn default_cache_max_age() -> i64 {
    5 * 60 * 1000
}

impl Default for SyncTunables {
    fn default() -> Self {
        SyncTunables {
            max_replay_attempts: default_max_replay_attempts(),
            cache_max_age_ms: default_cache_max_age(),
        }
    }
}

// =============================================================================
// Demo Settings
// =============================================================================

/// Demo-mode settings for the headless shell and tests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoSettings {
    /// Run against in-process demo providers instead of the real backend.
    #[serde(default)]
    pub enabled: bool,

    /// Simulated round-trip latency for demo provider calls (milliseconds).
    #[serde(default = "default_demo_latency")]
    pub simulated_latency_ms: u64,
}

fn default_demo_latency() -> u64 {
    150
}

impl Default for DemoSettings {
    fn default() -> Self {
        DemoSettings {
            enabled: false,
            simulated_latency_ms: default_demo_latency(),
        }
    }
}

// =============================================================================
// Main Engine Configuration
// =============================================================================

/// Complete engine configuration.
///
/// ## Example Config File
/// ```toml
/// [terminal]
/// id = "550e8400-e29b-41d4-a716-446655440000"
/// name = "Till 1"
/// store_id = "store-kawangware"
///
/// [storage]
/// db_path = "duka.db"
/// run_migrations = true
///
/// [sync]
/// max_replay_attempts = 10
/// cache_max_age_ms = 300000
///
/// [demo]
/// enabled = true
/// simulated_latency_ms = 150
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Terminal identity.
    #[serde(default)]
    pub terminal: TerminalConfig,

    /// Durable local storage settings.
    #[serde(default)]
    pub storage: StorageSettings,

    /// Offline queue and cache tunables.
    #[serde(default)]
    pub sync: SyncTunables,

    /// Demo-mode settings.
    #[serde(default)]
    pub demo: DemoSettings,
}

impl EngineConfig {
    /// Creates a new config with defaults and a generated terminal id.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (engine.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> SyncResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading engine config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns defaults if loading fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load engine config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> SyncResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| SyncError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Engine config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> SyncResult<()> {
        if self.terminal.id.is_empty() {
            return Err(SyncError::InvalidConfig(
                "terminal.id must not be empty".into(),
            ));
        }

        if self.terminal.store_id.is_empty() {
            return Err(SyncError::InvalidConfig(
                "terminal.store_id must not be empty".into(),
            ));
        }

        if self.storage.db_path.is_empty() {
            return Err(SyncError::InvalidConfig(
                "storage.db_path must not be empty".into(),
            ));
        }

        if self.sync.max_replay_attempts <= 0 {
            return Err(SyncError::InvalidConfig(
                "sync.max_replay_attempts must be greater than 0".into(),
            ));
        }

        if self.sync.cache_max_age_ms <= 0 {
            return Err(SyncError::InvalidConfig(
                "sync.cache_max_age_ms must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(id) = std::env::var("DUKA_TERMINAL_ID") {
            debug!(terminal_id = %id, "Overriding terminal id from environment");
            self.terminal.id = id;
        }

        if let Ok(name) = std::env::var("DUKA_TERMINAL_NAME") {
            self.terminal.name = name;
        }

        if let Ok(id) = std::env::var("DUKA_STORE_ID") {
            self.terminal.store_id = id;
        }

        if let Ok(path) = std::env::var("DUKA_DB_PATH") {
            debug!(db_path = %path, "Overriding database path from environment");
            self.storage.db_path = path;
        }

        if let Ok(demo) = std::env::var("DUKA_DEMO_MODE") {
            self.demo.enabled = demo != "false" && demo != "0";
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("ke", "duka", "pos")
            .map(|dirs| dirs.config_dir().join("engine.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Returns the terminal id.
    pub fn terminal_id(&self) -> &str {
        &self.terminal.id
    }

    /// Returns the store id this terminal serves.
    pub fn store_id(&self) -> &str {
        &self.terminal.store_id
    }

    /// Resolves the database path, anchoring relative paths in the
    /// platform data directory.
    pub fn db_path(&self) -> PathBuf {
        let raw = PathBuf::from(&self.storage.db_path);
        if raw.is_absolute() || self.storage.db_path == ":memory:" {
            return raw;
        }
        directories::ProjectDirs::from("ke", "duka", "pos")
            .map(|dirs| dirs.data_dir().join(&raw))
            .unwrap_or(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert!(!config.terminal.id.is_empty()); // Auto-generated
        assert_eq!(config.terminal.store_id, "default-store");
        assert_eq!(config.sync.max_replay_attempts, 10);
        assert!(!config.demo.enabled);
    }

    #[test]
    fn test_config_validation() {
        let mut config = EngineConfig::default();
        assert!(config.validate().is_ok());

        // Empty terminal id should fail
        config.terminal.id = String::new();
        assert!(config.validate().is_err());

        // Zero replay attempts should fail
        config.terminal.id = "till-1".to_string();
        config.sync.max_replay_attempts = 0;
        assert!(config.validate().is_err());

        config.sync.max_replay_attempts = 5;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = EngineConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[terminal]"));
        assert!(toml_str.contains("[sync]"));

        let parsed: EngineConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.terminal.id, config.terminal.id);
    }

    #[test]
    fn test_partial_file_gets_defaults() {
        let parsed: EngineConfig = toml::from_str(
            r#"
            [terminal]
            id = "till-9"
            store_id = "store-42"
            "#,
        )
        .unwrap();

        assert_eq!(parsed.terminal.id, "till-9");
        assert_eq!(parsed.terminal.name, "Till 1");
        assert_eq!(parsed.sync.cache_max_age_ms, 5 * 60 * 1000);
    }

    #[test]
    fn test_memory_db_path_is_not_anchored() {
        let mut config = EngineConfig::default();
        config.storage.db_path = ":memory:".to_string();
        assert_eq!(config.db_path(), PathBuf::from(":memory:"));
    }
}
