//! # duka-tenant: Session Bridge & Billing for Duka POS
//!
//! Identity, roles, the security audit trail, and subscription billing.
//! Everything between "a person typed a password" and "the till knows
//! what they may do".
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tenant & Identity Layer                          │
//! │                                                                         │
//! │   Frontend auth calls                                                   │
//! │        │                                                                │
//! │        ▼                                                                │
//! │   ┌──────────────────────────────────────────────────────────────┐     │
//! │   │               ★ duka-tenant (THIS CRATE) ★                   │     │
//! │   │                                                              │     │
//! │   │   AttemptLimiter ──► SessionBridge ◄── auth events           │     │
//! │   │   (5/5min, 3/hr)    {user, session,     (broadcast)          │     │
//! │   │                      role, loading}                          │     │
//! │   │                          │                                   │     │
//! │   │        ┌─────────────────┼──────────────────┐                │     │
//! │   │        ▼                 ▼                  ▼                │     │
//! │   │   AuditSink         user_roles         BillingService        │     │
//! │   │ (security_events)  (role lookup)     (plan ⇄ price map)      │     │
//! │   └────────┬─────────────────┬──────────────────┬────────────────┘     │
//! │            │                 │                  │                      │
//! │            ▼                 ▼                  ▼                      │
//! │       DataProvider     IdentityProvider   BillingProvider              │
//! │       (duka-store)     (auth backend)     (payment backend)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`session`] - the session bridge: view, role resolution, permissions
//! - [`identity`] - the identity provider seam and auth events
//! - [`ratelimit`] - sliding-window attempt limiter
//! - [`audit`] - security events to the audit table
//! - [`billing`] - subscription checks, plan mapping, redirect URLs
//! - [`error`] - `TenantError` with plain-string provider messages

// =============================================================================
// Module Declarations
// =============================================================================

pub mod audit;
pub mod billing;
pub mod error;
pub mod identity;
pub mod ratelimit;
pub mod session;

// =============================================================================
// Re-exports
// =============================================================================

pub use audit::{AuditSink, SecurityEvent, Severity};
pub use billing::{
    plan_for_price, BillingProvider, BillingService, DemoBillingProvider, SubscriptionCheck,
};
pub use error::{TenantError, TenantResult};
pub use identity::{
    AuthEvent, AuthEventKind, AuthSession, AuthUser, DemoIdentityProvider, IdentityProvider,
    SessionPair,
};
pub use ratelimit::AttemptLimiter;
pub use session::{SessionBridge, SessionView};
