//! # Subscription Billing
//!
//! Subscription checks against the payment backend, the price-to-plan
//! mapping, and checkout/portal redirect handling.
//!
//! ## Refresh Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   Subscription Refresh                                  │
//! │                                                                         │
//! │   BillingProvider.check_subscription(tenant)                            │
//! │        │                                                                │
//! │        ▼                                                                │
//! │   plan_for_price(amount)      ≤ 2999 → basic                            │
//! │                               ≤ 5999 → premium                          │
//! │                               else   → enterprise                       │
//! │        │                                                                │
//! │        ▼                                                                │
//! │   tenants row updated: subscription_plan, subscription_status,          │
//! │                        next_billing_date                                │
//! │                                                                         │
//! │   Checkout / portal URLs are validated with `url` before they are       │
//! │   handed to the frontend for redirect; only http(s) passes.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde_json::json;
use tracing::info;
use url::Url;

use duka_core::{SubscriptionPlan, SubscriptionStatus};
use duka_store::{tables, DataProvider};

use crate::error::{TenantError, TenantResult};

// =============================================================================
// Price-to-Plan Mapping
// =============================================================================

/// Maps the price amount reported by the payment backend to a plan tier.
pub fn plan_for_price(amount: i64) -> SubscriptionPlan {
    if amount <= 2999 {
        SubscriptionPlan::Basic
    } else if amount <= 5999 {
        SubscriptionPlan::Premium
    } else {
        SubscriptionPlan::Enterprise
    }
}

// =============================================================================
// Provider Trait
// =============================================================================

/// What the payment backend reports for a tenant's subscription.
#[derive(Debug, Clone)]
pub struct SubscriptionCheck {
    pub status: SubscriptionStatus,
    /// The price the tenant is paying, in the backend's minor units.
    pub price_amount: i64,
    pub next_billing_date: Option<DateTime<Utc>>,
}

/// Payment backend operations the billing service depends on.
#[async_trait]
pub trait BillingProvider: Send + Sync {
    /// Fetches the live subscription state for a tenant.
    async fn check_subscription(&self, tenant_id: &str) -> TenantResult<SubscriptionCheck>;

    /// Creates a checkout session for the given plan and returns its URL.
    async fn create_checkout(&self, tenant_id: &str, plan: SubscriptionPlan)
        -> TenantResult<String>;

    /// Returns the customer portal URL for managing the subscription.
    async fn customer_portal(&self, tenant_id: &str) -> TenantResult<String>;
}

// =============================================================================
// Billing Service
// =============================================================================

/// Refreshes tenant subscription state and brokers redirect URLs.
pub struct BillingService {
    billing: Arc<dyn BillingProvider>,
    data: Arc<dyn DataProvider>,
}

impl BillingService {
    pub fn new(billing: Arc<dyn BillingProvider>, data: Arc<dyn DataProvider>) -> Self {
        BillingService { billing, data }
    }

    /// Checks the subscription at the payment backend and writes the
    /// resolved plan and status back onto the tenant row.
    pub async fn refresh_subscription(
        &self,
        tenant_id: &str,
    ) -> TenantResult<(SubscriptionPlan, SubscriptionStatus)> {
        let check = self.billing.check_subscription(tenant_id).await?;
        let plan = plan_for_price(check.price_amount);

        self.data
            .update(
                tables::TENANTS,
                tenant_id,
                json!({
                    "subscription_plan": plan.as_str(),
                    "subscription_status": check.status.as_str(),
                    "next_billing_date": check.next_billing_date.map(|d| d.to_rfc3339()),
                }),
            )
            .await?;

        info!(
            tenant_id = %tenant_id,
            plan = plan.as_str(),
            status = check.status.as_str(),
            "Subscription refreshed"
        );

        Ok((plan, check.status))
    }

    /// Creates a checkout session and returns its validated URL.
    pub async fn create_checkout(
        &self,
        tenant_id: &str,
        plan: SubscriptionPlan,
    ) -> TenantResult<Url> {
        let raw = self.billing.create_checkout(tenant_id, plan).await?;
        validate_redirect(&raw)
    }

    /// Returns the validated customer portal URL.
    pub async fn customer_portal(&self, tenant_id: &str) -> TenantResult<Url> {
        let raw = self.billing.customer_portal(tenant_id).await?;
        validate_redirect(&raw)
    }
}

/// The frontend opens these URLs in a browser, so only http(s) may pass.
fn validate_redirect(raw: &str) -> TenantResult<Url> {
    let url = Url::parse(raw)?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(TenantError::InvalidRedirect(format!(
            "unsupported scheme '{}'",
            other
        ))),
    }
}

// =============================================================================
// Demo Provider
// =============================================================================

/// In-memory payment backend for tests and the demo binary.
pub struct DemoBillingProvider {
    price_amount: std::sync::atomic::AtomicI64,
    status: std::sync::Mutex<SubscriptionStatus>,
}

impl Default for DemoBillingProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl DemoBillingProvider {
    pub fn new() -> Self {
        DemoBillingProvider {
            price_amount: std::sync::atomic::AtomicI64::new(1500),
            status: std::sync::Mutex::new(SubscriptionStatus::Active),
        }
    }

    pub fn set_price(&self, amount: i64) {
        self.price_amount
            .store(amount, std::sync::atomic::Ordering::SeqCst);
    }

    pub fn set_status(&self, status: SubscriptionStatus) {
        *self.status.lock().expect("billing lock poisoned") = status;
    }
}

#[async_trait]
impl BillingProvider for DemoBillingProvider {
    async fn check_subscription(&self, _tenant_id: &str) -> TenantResult<SubscriptionCheck> {
        Ok(SubscriptionCheck {
            status: *self.status.lock().expect("billing lock poisoned"),
            price_amount: self.price_amount.load(std::sync::atomic::Ordering::SeqCst),
            next_billing_date: Some(Utc::now() + ChronoDuration::days(30)),
        })
    }

    async fn create_checkout(
        &self,
        tenant_id: &str,
        plan: SubscriptionPlan,
    ) -> TenantResult<String> {
        Ok(format!(
            "https://billing.example.com/checkout/{}?plan={}",
            tenant_id,
            plan.as_str()
        ))
    }

    async fn customer_portal(&self, tenant_id: &str) -> TenantResult<String> {
        Ok(format!("https://billing.example.com/portal/{}", tenant_id))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use duka_store::DemoDataProvider;

    #[test]
    fn test_plan_thresholds() {
        assert_eq!(plan_for_price(0), SubscriptionPlan::Basic);
        assert_eq!(plan_for_price(2999), SubscriptionPlan::Basic);
        assert_eq!(plan_for_price(3000), SubscriptionPlan::Premium);
        assert_eq!(plan_for_price(5999), SubscriptionPlan::Premium);
        assert_eq!(plan_for_price(6000), SubscriptionPlan::Enterprise);
    }

    async fn service_with_tenant() -> (BillingService, Arc<DemoDataProvider>, Arc<DemoBillingProvider>) {
        let data = Arc::new(DemoDataProvider::new());
        data.insert(
            tables::TENANTS,
            json!({"id": "t1", "subscription_plan": "basic", "subscription_status": "trial"}),
        )
        .await
        .unwrap();

        let billing = Arc::new(DemoBillingProvider::new());
        let service = BillingService::new(billing.clone(), data.clone());
        (service, data, billing)
    }

    #[tokio::test]
    async fn test_refresh_updates_tenant_row() {
        let (service, data, billing) = service_with_tenant().await;
        billing.set_price(4500);

        let (plan, status) = service.refresh_subscription("t1").await.unwrap();
        assert_eq!(plan, SubscriptionPlan::Premium);
        assert_eq!(status, SubscriptionStatus::Active);

        let rows = data
            .select(tables::TENANTS, &json!({"id": "t1"}))
            .await
            .unwrap();
        assert_eq!(rows[0]["subscription_plan"], "premium");
        assert_eq!(rows[0]["subscription_status"], "active");
        assert!(rows[0]["next_billing_date"].is_string());
    }

    #[tokio::test]
    async fn test_refresh_carries_past_due() {
        let (service, data, billing) = service_with_tenant().await;
        billing.set_status(SubscriptionStatus::PastDue);

        let (_, status) = service.refresh_subscription("t1").await.unwrap();
        assert_eq!(status, SubscriptionStatus::PastDue);

        let rows = data
            .select(tables::TENANTS, &json!({"id": "t1"}))
            .await
            .unwrap();
        assert_eq!(rows[0]["subscription_status"], "past_due");
    }

    #[tokio::test]
    async fn test_checkout_url_is_validated() {
        let (service, _, _) = service_with_tenant().await;

        let url = service
            .create_checkout("t1", SubscriptionPlan::Premium)
            .await
            .unwrap();
        assert_eq!(url.scheme(), "https");
        assert!(url.path().contains("t1"));
    }

    #[test]
    fn test_non_http_redirect_rejected() {
        assert!(validate_redirect("https://ok.example.com/x").is_ok());
        assert!(matches!(
            validate_redirect("javascript:alert(1)"),
            Err(TenantError::InvalidRedirect(_))
        ));
        assert!(validate_redirect("not a url").is_err());
    }
}
