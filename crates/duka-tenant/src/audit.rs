//! # Security Audit Trail
//!
//! Structured security events recorded to the remote `security_events`
//! table and mirrored into the log stream.
//!
//! Recording is best-effort: an unreachable backend downgrades to a log
//! warning instead of failing the auth flow that triggered the event. A
//! shop must be able to sign in while the audit table is down.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use duka_store::{tables, DataProvider};

// =============================================================================
// Event Types
// =============================================================================

/// How alarming a security event is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        }
    }
}

/// One entry in the security audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityEvent {
    /// Stable event name, e.g. `sign_in`, `sign_in_failed`, `rate_limited`.
    pub event_type: String,
    /// What the event touched, e.g. `auth` or `billing`.
    pub resource: String,
    /// The acting user, when one is known.
    pub actor_id: Option<String>,
    /// Human-readable detail. Never contains credentials.
    pub detail: String,
    pub severity: Severity,
    pub created_at: DateTime<Utc>,
}

impl SecurityEvent {
    pub fn new(event_type: &str, resource: &str, detail: &str, severity: Severity) -> Self {
        SecurityEvent {
            event_type: event_type.to_string(),
            resource: resource.to_string(),
            actor_id: None,
            detail: detail.to_string(),
            severity,
            created_at: Utc::now(),
        }
    }

    pub fn with_actor(mut self, actor_id: &str) -> Self {
        self.actor_id = Some(actor_id.to_string());
        self
    }
}

// =============================================================================
// Audit Sink
// =============================================================================

/// Writes security events to the remote audit table.
#[derive(Clone)]
pub struct AuditSink {
    data: Arc<dyn DataProvider>,
}

impl AuditSink {
    pub fn new(data: Arc<dyn DataProvider>) -> Self {
        AuditSink { data }
    }

    /// Records one event. Mirrors it to the log stream first, then
    /// attempts the remote insert; insert failures are logged and
    /// swallowed.
    pub async fn record(&self, event: SecurityEvent) {
        info!(
            event_type = %event.event_type,
            resource = %event.resource,
            actor = event.actor_id.as_deref().unwrap_or("anonymous"),
            severity = event.severity.as_str(),
            detail = %event.detail,
            "Security event"
        );

        let row = json!({
            "id": Uuid::new_v4().to_string(),
            "event_type": event.event_type,
            "resource": event.resource,
            "actor_id": event.actor_id,
            "detail": event.detail,
            "severity": event.severity.as_str(),
            "created_at": event.created_at.to_rfc3339(),
        });

        if let Err(e) = self.data.insert(tables::SECURITY_EVENTS, row).await {
            warn!(error = %e, "Failed to persist security event");
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
