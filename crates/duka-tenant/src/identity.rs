//! # Identity Provider Seam
//!
//! Abstraction over the external auth backend: credential sign-in/up,
//! the current session, and the auth event stream the session bridge
//! subscribes to.
//!
//! ## Event Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Auth Event Flow                                    │
//! │                                                                         │
//! │   IdentityProvider ──(broadcast)──► SessionBridge.handle_auth_event     │
//! │                                                                         │
//! │   SignedIn        user + session arrive together                        │
//! │   SignedOut       both cleared                                          │
//! │   TokenRefreshed  session replaced, user untouched                      │
//! │   UserUpdated     user replaced, session untouched                      │
//! │                                                                         │
//! │   Provider errors cross the trait as TenantError::Provider(String):    │
//! │   plain messages only, nothing internal leaks to the frontend.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;

use crate::error::{TenantError, TenantResult};

// =============================================================================
// Session Types
// =============================================================================

/// The authenticated user as the identity backend describes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    /// Free-form profile metadata (display name, phone, ...).
    pub metadata: Value,
}

/// An access token and its expiry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

/// A signed-in user together with their session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionPair {
    pub user: AuthUser,
    pub session: AuthSession,
}

// =============================================================================
// Auth Events
// =============================================================================

/// What changed at the identity backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEventKind {
    SignedIn,
    SignedOut,
    TokenRefreshed,
    UserUpdated,
}

impl AuthEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthEventKind::SignedIn => "signed_in",
            AuthEventKind::SignedOut => "signed_out",
            AuthEventKind::TokenRefreshed => "token_refreshed",
            AuthEventKind::UserUpdated => "user_updated",
        }
    }
}

/// One auth state change, with whatever the backend attached to it.
#[derive(Debug, Clone)]
pub struct AuthEvent {
    pub kind: AuthEventKind,
    pub user: Option<AuthUser>,
    pub session: Option<AuthSession>,
}

// =============================================================================
// Provider Trait
// =============================================================================

/// External auth backend operations the session bridge depends on.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// The session restored from backend storage, if one survives.
    async fn current_session(&self) -> TenantResult<Option<SessionPair>>;

    /// Signs in with email and password.
    async fn sign_in_with_password(&self, email: &str, password: &str)
        -> TenantResult<SessionPair>;

    /// Registers a new account and signs it in.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: Value,
    ) -> TenantResult<SessionPair>;

    /// Ends the current session.
    async fn sign_out(&self) -> TenantResult<()>;

    /// Subscribes to the auth event stream.
    fn subscribe(&self) -> broadcast::Receiver<AuthEvent>;
}

// =============================================================================
// Demo Provider
// =============================================================================

const DEMO_SESSION_HOURS: i64 = 1;

/// In-memory identity backend for tests and the demo binary.
pub struct DemoIdentityProvider {
    /// email -> (password, user)
    users: Mutex<HashMap<String, (String, AuthUser)>>,
    current: Mutex<Option<SessionPair>>,
    events: broadcast::Sender<AuthEvent>,
    latency_ms: u64,
}

impl Default for DemoIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl DemoIdentityProvider {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(16);
        DemoIdentityProvider {
            users: Mutex::new(HashMap::new()),
            current: Mutex::new(None),
            events,
            latency_ms: 0,
        }
    }

    /// Adds simulated latency to every call.
    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    /// Seeds a known account.
    pub fn with_user(self, email: &str, password: &str) -> Self {
        let user = AuthUser {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            metadata: Value::Null,
        };
        self.users
            .lock()
            .expect("identity lock poisoned")
            .insert(email.to_string(), (password.to_string(), user));
        self
    }

    /// Id of a seeded account, for wiring role rows in tests and the demo.
    pub fn user_id(&self, email: &str) -> Option<String> {
        self.users
            .lock()
            .expect("identity lock poisoned")
            .get(email)
            .map(|(_, user)| user.id.clone())
    }

    /// Rotates the current access token and broadcasts `TokenRefreshed`,
    /// the way a backend does shortly before expiry.
    pub fn refresh_token(&self) -> TenantResult<()> {
        let mut current = self.current.lock().expect("identity lock poisoned");
        let pair = current.as_mut().ok_or(TenantError::NotSignedIn)?;
        pair.session = fresh_session();

        let _ = self.events.send(AuthEvent {
            kind: AuthEventKind::TokenRefreshed,
            user: None,
            session: Some(pair.session.clone()),
        });
        Ok(())
    }

    async fn simulate_latency(&self) {
        if self.latency_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.latency_ms)).await;
        }
    }
}

fn fresh_session() -> AuthSession {
    AuthSession {
        access_token: Uuid::new_v4().to_string(),
        expires_at: Utc::now() + ChronoDuration::hours(DEMO_SESSION_HOURS),
    }
}

#[async_trait]
impl IdentityProvider for DemoIdentityProvider {
    async fn current_session(&self) -> TenantResult<Option<SessionPair>> {
        self.simulate_latency().await;
        Ok(self
            .current
            .lock()
            .expect("identity lock poisoned")
            .clone())
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> TenantResult<SessionPair> {
        self.simulate_latency().await;

        let user = {
            let users = self.users.lock().expect("identity lock poisoned");
            match users.get(email) {
                Some((stored, user)) if stored == password => user.clone(),
                // Same message for unknown email and wrong password, so the
                // response does not reveal which accounts exist.
                _ => return Err(TenantError::Provider("Invalid login credentials".into())),
            }
        };

        let pair = SessionPair {
            user,
            session: fresh_session(),
        };
        *self.current.lock().expect("identity lock poisoned") = Some(pair.clone());

        debug!(email = %email, "Demo identity sign-in");
        let _ = self.events.send(AuthEvent {
            kind: AuthEventKind::SignedIn,
            user: Some(pair.user.clone()),
            session: Some(pair.session.clone()),
        });

        Ok(pair)
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: Value,
    ) -> TenantResult<SessionPair> {
        self.simulate_latency().await;

        let user = {
            let mut users = self.users.lock().expect("identity lock poisoned");
            if users.contains_key(email) {
                return Err(TenantError::Provider("User already registered".into()));
            }
            let user = AuthUser {
                id: Uuid::new_v4().to_string(),
                email: email.to_string(),
                metadata,
            };
            users.insert(email.to_string(), (password.to_string(), user.clone()));
            user
        };

        let pair = SessionPair {
            user,
            session: fresh_session(),
        };
        *self.current.lock().expect("identity lock poisoned") = Some(pair.clone());

        debug!(email = %email, "Demo identity sign-up");
        let _ = self.events.send(AuthEvent {
            kind: AuthEventKind::SignedIn,
            user: Some(pair.user.clone()),
            session: Some(pair.session.clone()),
        });

        Ok(pair)
    }

    async fn sign_out(&self) -> TenantResult<()> {
        self.simulate_latency().await;
        *self.current.lock().expect("identity lock poisoned") = None;

        let _ = self.events.send(AuthEvent {
            kind: AuthEventKind::SignedOut,
            user: None,
            session: None,
        });
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sign_in_with_seeded_user() {
        let provider = DemoIdentityProvider::new().with_user("amina@duka.ke", "hunter2");

        let pair = provider
            .sign_in_with_password("amina@duka.ke", "hunter2")
            .await
            .unwrap();
        assert_eq!(pair.user.email, "amina@duka.ke");
        assert!(provider.current_session().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_email_same_message() {
        let provider = DemoIdentityProvider::new().with_user("amina@duka.ke", "hunter2");

        let wrong = provider
            .sign_in_with_password("amina@duka.ke", "nope")
            .await
            .unwrap_err();
        let unknown = provider
            .sign_in_with_password("ghost@duka.ke", "nope")
            .await
            .unwrap_err();

        assert_eq!(wrong.to_string(), unknown.to_string());
    }

    #[tokio::test]
    async fn test_sign_up_rejects_existing_email() {
        let provider = DemoIdentityProvider::new().with_user("amina@duka.ke", "hunter2");

        let err = provider
            .sign_up("amina@duka.ke", "other", Value::Null)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("already registered"));
    }

    #[tokio::test]
    async fn test_events_are_broadcast() {
        let provider = DemoIdentityProvider::new().with_user("amina@duka.ke", "hunter2");
        let mut rx = provider.subscribe();

        provider
            .sign_in_with_password("amina@duka.ke", "hunter2")
            .await
            .unwrap();
        assert_eq!(rx.recv().await.unwrap().kind, AuthEventKind::SignedIn);

        provider.refresh_token().unwrap();
        let refreshed = rx.recv().await.unwrap();
        assert_eq!(refreshed.kind, AuthEventKind::TokenRefreshed);
        assert!(refreshed.session.is_some());

        provider.sign_out().await.unwrap();
        assert_eq!(rx.recv().await.unwrap().kind, AuthEventKind::SignedOut);
    }
}
