//! # Session Bridge
//!
//! The single stable view of "who is signed in" that every other layer
//! consults. Wraps the identity provider, resolves the user's role from
//! the `user_roles` table, and feeds the security audit trail.
//!
//! ## State & Staleness
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Session Bridge State                                │
//! │                                                                         │
//! │  view: { user, session, role, loading }                                 │
//! │                                                                         │
//! │  ROLE RESOLUTION is two-phase:                                          │
//! │    1. sign-in/restore sets a PROVISIONAL role (staff) immediately       │
//! │    2. an async fetch against user_roles replaces it with the real one   │
//! │                                                                         │
//! │  Each fetch carries a sequence number from an AtomicU64. A fetch may    │
//! │  only apply its result while it is still the LATEST fetch; a slow       │
//! │  response from a superseded fetch is discarded, so a sign-out followed  │
//! │  by a different sign-in can never end up wearing the old user's role.   │
//! │                                                                         │
//! │  RATE LIMITING runs before any provider contact:                        │
//! │    sign-in: 5 attempts / 5 min per email                                │
//! │    sign-up: 3 attempts / hour per email                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{json, Value};
use tokio::sync::{broadcast, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use duka_core::{role_permissions, UserRole};
use duka_store::{tables, DataProvider};

use crate::audit::{AuditSink, SecurityEvent, Severity};
use crate::error::{TenantError, TenantResult};
use crate::identity::{AuthEvent, AuthEventKind, AuthSession, AuthUser, IdentityProvider};
use crate::ratelimit::AttemptLimiter;

// =============================================================================
// Limits
// =============================================================================

const SIGN_IN_MAX_ATTEMPTS: usize = 5;
const SIGN_IN_WINDOW: Duration = Duration::from_secs(5 * 60);
const SIGN_UP_MAX_ATTEMPTS: usize = 3;
const SIGN_UP_WINDOW: Duration = Duration::from_secs(60 * 60);

/// Role assumed while the authoritative one is still being fetched.
/// Staff is the least-privileged signed-in role.
const PROVISIONAL_ROLE: UserRole = UserRole::Staff;

// =============================================================================
// Session View
// =============================================================================

/// Snapshot of the current auth state.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    pub user: Option<AuthUser>,
    pub session: Option<AuthSession>,
    pub role: UserRole,
    pub loading: bool,
}

impl Default for SessionView {
    fn default() -> Self {
        SessionView {
            user: None,
            session: None,
            role: PROVISIONAL_ROLE,
            loading: false,
        }
    }
}

impl SessionView {
    pub fn is_signed_in(&self) -> bool {
        self.user.is_some()
    }
}

// =============================================================================
// Session Bridge
// =============================================================================

/// Stable session facade over the identity provider.
pub struct SessionBridge {
    identity: Arc<dyn IdentityProvider>,
    data: Arc<dyn DataProvider>,
    audit: AuditSink,
    view: RwLock<SessionView>,
    /// Monotonic tag for role fetches; only the latest may apply.
    fetch_seq: AtomicU64,
    sign_in_limiter: AttemptLimiter,
    sign_up_limiter: AttemptLimiter,
    event_task: Mutex<Option<JoinHandle<()>>>,
}

impl SessionBridge {
    pub fn new(identity: Arc<dyn IdentityProvider>, data: Arc<dyn DataProvider>) -> Self {
        SessionBridge {
            identity,
            audit: AuditSink::new(data.clone()),
            data,
            view: RwLock::new(SessionView::default()),
            fetch_seq: AtomicU64::new(0),
            sign_in_limiter: AttemptLimiter::new(SIGN_IN_MAX_ATTEMPTS, SIGN_IN_WINDOW),
            sign_up_limiter: AttemptLimiter::new(SIGN_UP_MAX_ATTEMPTS, SIGN_UP_WINDOW),
            event_task: Mutex::new(None),
        }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Restores any surviving session, resolves its role, and starts
    /// listening to the provider's auth event stream.
    pub async fn init(self: &Arc<Self>) -> TenantResult<()> {
        self.view.write().await.loading = true;

        match self.identity.current_session().await {
            Ok(Some(pair)) => {
                {
                    let mut view = self.view.write().await;
                    view.user = Some(pair.user);
                    view.session = Some(pair.session);
                    view.role = PROVISIONAL_ROLE;
                    view.loading = false;
                }
                if let Err(e) = self.refresh_role().await {
                    warn!(error = %e, "Role resolution failed, keeping provisional role");
                }
            }
            Ok(None) => {
                self.view.write().await.loading = false;
            }
            // Session restore is best-effort; the till starts signed out.
            Err(e) => {
                warn!(error = %e, "Session restore failed");
                self.view.write().await.loading = false;
            }
        }

        let this = Arc::clone(self);
        let handle = tokio::spawn(async move {
            let mut rx = this.identity.subscribe();
            loop {
                match rx.recv().await {
                    Ok(event) => this.handle_auth_event(event).await,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Auth event stream lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
        *self.event_task.lock().expect("event task lock poisoned") = Some(handle);

        Ok(())
    }

    /// Stops the event listener and resets the view. The provider session
    /// itself is left alone; call [`sign_out`](Self::sign_out) first to
    /// end it.
    pub async fn dispose(&self) {
        if let Some(handle) = self
            .event_task
            .lock()
            .expect("event task lock poisoned")
            .take()
        {
            handle.abort();
        }
        *self.view.write().await = SessionView::default();
        debug!("Session bridge disposed");
    }

    // =========================================================================
    // Auth Operations
    // =========================================================================

    /// Signs in with email and password. Rate-limited per email before any
    /// provider contact.
    pub async fn sign_in(&self, email: &str, password: &str) -> TenantResult<SessionView> {
        let key = format!("sign_in:{}", email.trim().to_lowercase());
        if let Err(retry_after) = self.sign_in_limiter.check_and_record(&key) {
            self.audit
                .record(SecurityEvent::new(
                    "rate_limited",
                    "auth",
                    &format!("sign-in throttled for {}", email),
                    Severity::Warning,
                ))
                .await;
            return Err(rate_limited("sign-in", retry_after));
        }

        match self.identity.sign_in_with_password(email, password).await {
            Ok(pair) => {
                let actor = pair.user.id.clone();
                {
                    let mut view = self.view.write().await;
                    view.user = Some(pair.user);
                    view.session = Some(pair.session);
                    view.role = PROVISIONAL_ROLE;
                    view.loading = false;
                }
                self.audit
                    .record(
                        SecurityEvent::new("sign_in", "auth", "user signed in", Severity::Info)
                            .with_actor(&actor),
                    )
                    .await;
                if let Err(e) = self.refresh_role().await {
                    warn!(error = %e, "Role resolution failed, keeping provisional role");
                }
                Ok(self.view().await)
            }
            Err(e) => {
                self.audit
                    .record(SecurityEvent::new(
                        "sign_in_failed",
                        "auth",
                        &format!("sign-in failed for {}: {}", email, e),
                        Severity::Warning,
                    ))
                    .await;
                Err(e)
            }
        }
    }

    /// Registers a new account. Rate-limited per email before any provider
    /// contact.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: Value,
    ) -> TenantResult<SessionView> {
        let key = format!("sign_up:{}", email.trim().to_lowercase());
        if let Err(retry_after) = self.sign_up_limiter.check_and_record(&key) {
            self.audit
                .record(SecurityEvent::new(
                    "rate_limited",
                    "auth",
                    &format!("sign-up throttled for {}", email),
                    Severity::Warning,
                ))
                .await;
            return Err(rate_limited("sign-up", retry_after));
        }

        match self.identity.sign_up(email, password, metadata).await {
            Ok(pair) => {
                let actor = pair.user.id.clone();
                {
                    let mut view = self.view.write().await;
                    view.user = Some(pair.user);
                    view.session = Some(pair.session);
                    view.role = PROVISIONAL_ROLE;
                    view.loading = false;
                }
                self.audit
                    .record(
                        SecurityEvent::new("sign_up", "auth", "account created", Severity::Info)
                            .with_actor(&actor),
                    )
                    .await;
                if let Err(e) = self.refresh_role().await {
                    warn!(error = %e, "Role resolution failed, keeping provisional role");
                }
                Ok(self.view().await)
            }
            Err(e) => {
                self.audit
                    .record(SecurityEvent::new(
                        "sign_up_failed",
                        "auth",
                        &format!("sign-up failed for {}: {}", email, e),
                        Severity::Warning,
                    ))
                    .await;
                Err(e)
            }
        }
    }

    /// Ends the session at the provider and clears the view.
    pub async fn sign_out(&self) -> TenantResult<()> {
        let actor = self.view.read().await.user.as_ref().map(|u| u.id.clone());
        self.identity.sign_out().await?;
        *self.view.write().await = SessionView::default();

        let mut event = SecurityEvent::new("sign_out", "auth", "user signed out", Severity::Info);
        if let Some(actor) = actor {
            event = event.with_actor(&actor);
        }
        self.audit.record(event).await;
        Ok(())
    }

    // =========================================================================
    // Role Resolution
    // =========================================================================

    /// Starts a role fetch generation. Results from earlier generations
    /// will be discarded.
    pub fn begin_role_fetch(&self) -> u64 {
        self.fetch_seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Applies a fetched role only if `seq` is still the latest fetch.
    /// Returns whether the role was applied.
    pub async fn apply_role_fetch(&self, seq: u64, role: UserRole) -> bool {
        if self.fetch_seq.load(Ordering::SeqCst) != seq {
            debug!(seq, role = %role, "Discarding stale role fetch");
            return false;
        }
        self.view.write().await.role = role;
        debug!(seq, role = %role, "Role resolved");
        true
    }

    /// Fetches the signed-in user's role from the user_roles table.
    ///
    /// A user without a role row keeps the provisional staff role. The
    /// result is applied through the sequence gate, so a slow fetch that
    /// was superseded changes nothing.
    pub async fn refresh_role(&self) -> TenantResult<UserRole> {
        let seq = self.begin_role_fetch();

        let user_id = self
            .view
            .read()
            .await
            .user
            .as_ref()
            .map(|u| u.id.clone())
            .ok_or(TenantError::NotSignedIn)?;

        let rows = self
            .data
            .select(tables::USER_ROLES, &json!({ "user_id": user_id }))
            .await?;

        let role = rows
            .first()
            .and_then(|row| row.get("role"))
            .and_then(Value::as_str)
            .and_then(|name| UserRole::from_str(name).ok())
            .unwrap_or(PROVISIONAL_ROLE);

        self.apply_role_fetch(seq, role).await;
        Ok(role)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Snapshot of the current view.
    pub async fn view(&self) -> SessionView {
        self.view.read().await.clone()
    }

    /// Permission check against the resolved role.
    ///
    /// super_admin passes every check, including permission names the
    /// capability record does not model. Nobody signed in means nothing
    /// is allowed.
    pub async fn has_permission(&self, permission: &str) -> bool {
        let view = self.view.read().await;
        if view.user.is_none() {
            return false;
        }
        if view.role == UserRole::SuperAdmin {
            return true;
        }
        role_permissions(view.role).allows(permission)
    }

    // =========================================================================
    // Event Handling
    // =========================================================================

    /// Applies one provider auth event to the view.
    pub async fn handle_auth_event(&self, event: AuthEvent) {
        debug!(kind = event.kind.as_str(), "Auth event");

        match event.kind {
            AuthEventKind::SignedIn => {
                {
                    let mut view = self.view.write().await;
                    view.user = event.user;
                    view.session = event.session;
                    view.role = PROVISIONAL_ROLE;
                    view.loading = false;
                }
                if let Err(e) = self.refresh_role().await {
                    warn!(error = %e, "Role resolution failed, keeping provisional role");
                }
            }
            AuthEventKind::SignedOut => {
                // Invalidate in-flight role fetches for the departing user.
                self.begin_role_fetch();
                *self.view.write().await = SessionView::default();
            }
            AuthEventKind::TokenRefreshed => {
                if let Some(session) = event.session {
                    self.view.write().await.session = Some(session);
                }
            }
            AuthEventKind::UserUpdated => {
                if let Some(user) = event.user {
                    self.view.write().await.user = Some(user);
                }
            }
        }
    }
}

fn rate_limited(action: &str, retry_after: Duration) -> TenantError {
    TenantError::RateLimited {
        action: action.to_string(),
        retry_after_secs: retry_after.as_secs().max(1),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::DemoIdentityProvider;
    use duka_store::DemoDataProvider;

    const EMAIL: &str = "amina@duka.ke";
    const PASSWORD: &str = "hunter2";

    async fn bridge_with_role(role: Option<&str>) -> (Arc<SessionBridge>, Arc<DemoDataProvider>) {
        let identity = Arc::new(DemoIdentityProvider::new().with_user(EMAIL, PASSWORD));
        let data = Arc::new(DemoDataProvider::new());

        if let Some(role) = role {
            let user_id = identity.user_id(EMAIL).unwrap();
            data.insert(
                tables::USER_ROLES,
                json!({"id": "r1", "user_id": user_id, "role": role}),
            )
            .await
            .unwrap();
        }

        (Arc::new(SessionBridge::new(identity, data.clone())), data)
    }

    #[tokio::test]
    async fn test_sign_in_resolves_role_from_table() {
        let (bridge, _) = bridge_with_role(Some("owner")).await;

        let view = bridge.sign_in(EMAIL, PASSWORD).await.unwrap();

        assert!(view.is_signed_in());
        assert_eq!(view.role, UserRole::Owner);
        assert!(bridge.has_permission("manage_settings").await);
    }

    #[tokio::test]
    async fn test_missing_role_row_stays_staff() {
        let (bridge, _) = bridge_with_role(None).await;

        let view = bridge.sign_in(EMAIL, PASSWORD).await.unwrap();

        assert_eq!(view.role, UserRole::Staff);
        assert!(bridge.has_permission("process_transactions").await);
        assert!(!bridge.has_permission("manage_settings").await);
    }

    #[tokio::test]
    async fn test_super_admin_passes_unknown_permissions() {
        let (bridge, _) = bridge_with_role(Some("super_admin")).await;
        bridge.sign_in(EMAIL, PASSWORD).await.unwrap();

        assert!(bridge.has_permission("launch_rockets").await);
    }

    #[tokio::test]
    async fn test_signed_out_allows_nothing() {
        let (bridge, _) = bridge_with_role(Some("owner")).await;
        assert!(!bridge.has_permission("process_transactions").await);
    }

    #[tokio::test]
    async fn test_sixth_sign_in_attempt_rejected_with_correct_password() {
        let (bridge, _) = bridge_with_role(None).await;

        for _ in 0..5 {
            let _ = bridge.sign_in(EMAIL, "wrong").await;
        }

        // The window counts attempts, not failures; the right password on
        // attempt six is still thrown back.
        let err = bridge.sign_in(EMAIL, PASSWORD).await.unwrap_err();
        assert!(matches!(err, TenantError::RateLimited { .. }));
        assert!(!bridge.view().await.is_signed_in());
    }

    #[tokio::test]
    async fn test_rate_limit_is_per_email() {
        let identity = Arc::new(
            DemoIdentityProvider::new()
                .with_user("a@duka.ke", "pw")
                .with_user("b@duka.ke", "pw"),
        );
        let data = Arc::new(DemoDataProvider::new());
        let bridge = SessionBridge::new(identity, data);

        for _ in 0..5 {
            let _ = bridge.sign_in("a@duka.ke", "wrong").await;
        }

        assert!(bridge.sign_in("b@duka.ke", "pw").await.is_ok());
    }

    #[tokio::test]
    async fn test_failed_sign_in_recorded_in_audit_trail() {
        let (bridge, data) = bridge_with_role(None).await;

        let _ = bridge.sign_in(EMAIL, "wrong").await;

        let rows = data
            .select(tables::SECURITY_EVENTS, &json!({"event_type": "sign_in_failed"}))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["severity"], "warning");
    }

    #[tokio::test]
    async fn test_stale_role_fetch_is_discarded() {
        let (bridge, _) = bridge_with_role(None).await;
        bridge.sign_in(EMAIL, PASSWORD).await.unwrap();

        let stale = bridge.begin_role_fetch();
        let latest = bridge.begin_role_fetch();

        // The slow, superseded fetch comes back with an elevated role.
        assert!(!bridge.apply_role_fetch(stale, UserRole::Owner).await);
        assert_eq!(bridge.view().await.role, UserRole::Staff);

        assert!(bridge.apply_role_fetch(latest, UserRole::Manager).await);
        assert_eq!(bridge.view().await.role, UserRole::Manager);
    }

    #[tokio::test]
    async fn test_sign_out_clears_view() {
        let (bridge, _) = bridge_with_role(Some("owner")).await;
        bridge.sign_in(EMAIL, PASSWORD).await.unwrap();

        bridge.sign_out().await.unwrap();

        let view = bridge.view().await;
        assert!(!view.is_signed_in());
        assert_eq!(view.role, UserRole::Staff);
    }

    #[tokio::test]
    async fn test_init_restores_surviving_session() {
        let identity = Arc::new(DemoIdentityProvider::new().with_user(EMAIL, PASSWORD));
        identity.sign_in_with_password(EMAIL, PASSWORD).await.unwrap();

        let data = Arc::new(DemoDataProvider::new());
        let user_id = identity.user_id(EMAIL).unwrap();
        data.insert(
            tables::USER_ROLES,
            json!({"id": "r1", "user_id": user_id, "role": "admin"}),
        )
        .await
        .unwrap();

        let bridge = Arc::new(SessionBridge::new(identity, data));
        bridge.init().await.unwrap();

        let view = bridge.view().await;
        assert!(view.is_signed_in());
        assert!(!view.loading);
        assert_eq!(view.role, UserRole::Admin);

        bridge.dispose().await;
        assert!(!bridge.view().await.is_signed_in());
    }

    // Multi-threaded runtime so the spawned event listener task gets to
    // subscribe before the refresh event is broadcast.
    #[tokio::test(flavor = "multi_thread")]
    async fn test_token_refresh_event_updates_session() {
        let identity = Arc::new(DemoIdentityProvider::new().with_user(EMAIL, PASSWORD));
        let data = Arc::new(DemoDataProvider::new());
        let bridge = Arc::new(SessionBridge::new(identity.clone(), data));
        bridge.init().await.unwrap();

        bridge.sign_in(EMAIL, PASSWORD).await.unwrap();
        let before = bridge.view().await.session.unwrap().access_token;

        identity.refresh_token().unwrap();
        // Give the event listener a beat to run.
        tokio::time::sleep(Duration::from_millis(50)).await;

        let after = bridge.view().await.session.unwrap().access_token;
        assert_ne!(before, after);

        bridge.dispose().await;
    }
}
