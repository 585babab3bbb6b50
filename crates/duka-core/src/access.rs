//! # Access Control
//!
//! Role permissions, subscription plan features, and the feature-access
//! decision. Everything here is a pure function over explicit inputs - no
//! session state, no provider calls - so the gate is unit-testable without
//! mocks and safe to consult from any layer.
//!
//! ## Decision Order
//! ```text
//! check_feature_access(feature, plan, status)
//!        │
//!        ├── status not active/trial? ──► core allow-list only
//!        │                                 {transactions, basic_reports,
//!        │                                  inventory}
//!        │
//!        └── status ok ──► plan's feature record decides
//!                           (unknown feature name ──► allow)
//! ```
//!
//! The permissive fallback for unmodeled feature names is deliberate:
//! availability over strict denial. A typo in a call site must not lock a
//! paying shop out of its till.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use ts_rs::TS;

use crate::types::{SubscriptionPlan, SubscriptionStatus, UserRole};

/// Features that stay available on any subscription status, including
/// past_due and suspended. A shop must always be able to sell.
const CORE_ALLOW_LIST: [&str; 3] = ["transactions", "basic_reports", "inventory"];

// =============================================================================
// Role Permissions
// =============================================================================

/// Fixed capability record for one role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RolePermissions {
    pub can_manage_stores: bool,
    pub can_manage_users: bool,
    pub can_manage_settings: bool,
    pub can_view_reports: bool,
    pub can_process_transactions: bool,
    pub can_process_refunds: bool,
    pub can_manage_inventory: bool,
    pub can_manage_customers: bool,
}

impl RolePermissions {
    /// The all-false record. Unknown roles resolve to this.
    pub const fn none() -> Self {
        RolePermissions {
            can_manage_stores: false,
            can_manage_users: false,
            can_manage_settings: false,
            can_view_reports: false,
            can_process_transactions: false,
            can_process_refunds: false,
            can_manage_inventory: false,
            can_manage_customers: false,
        }
    }

    /// The all-true record, held by super_admin and owner.
    pub const fn all() -> Self {
        RolePermissions {
            can_manage_stores: true,
            can_manage_users: true,
            can_manage_settings: true,
            can_view_reports: true,
            can_process_transactions: true,
            can_process_refunds: true,
            can_manage_inventory: true,
            can_manage_customers: true,
        }
    }

    /// Looks up a permission by its string name.
    ///
    /// Unknown permission names are denied here; the session bridge makes
    /// super_admin bypass this lookup entirely.
    pub fn allows(&self, permission: &str) -> bool {
        match permission {
            "manage_stores" => self.can_manage_stores,
            "manage_users" => self.can_manage_users,
            "manage_settings" => self.can_manage_settings,
            "view_reports" => self.can_view_reports,
            "process_transactions" => self.can_process_transactions,
            "process_refunds" => self.can_process_refunds,
            "manage_inventory" => self.can_manage_inventory,
            "manage_customers" => self.can_manage_customers,
            _ => false,
        }
    }
}

/// Maps a role to its fixed capability record.
pub fn role_permissions(role: UserRole) -> RolePermissions {
    match role {
        UserRole::SuperAdmin | UserRole::Owner => RolePermissions::all(),
        UserRole::Admin => RolePermissions {
            can_manage_stores: false,
            can_manage_users: true,
            can_manage_settings: true,
            can_view_reports: true,
            can_process_transactions: true,
            can_process_refunds: true,
            can_manage_inventory: true,
            can_manage_customers: true,
        },
        UserRole::Manager => RolePermissions {
            can_manage_stores: false,
            can_manage_users: false,
            can_manage_settings: false,
            can_view_reports: true,
            can_process_transactions: true,
            can_process_refunds: true,
            can_manage_inventory: true,
            can_manage_customers: true,
        },
        UserRole::Staff => RolePermissions {
            can_manage_stores: false,
            can_manage_users: false,
            can_manage_settings: false,
            can_view_reports: false,
            can_process_transactions: true,
            can_process_refunds: false,
            can_manage_inventory: false,
            can_manage_customers: true,
        },
    }
}

/// String-keyed variant for callers holding a raw role name (e.g. a row
/// straight from the user_roles table). Unknown names yield the all-false
/// default.
pub fn role_permissions_by_name(role: &str) -> RolePermissions {
    UserRole::from_str(role)
        .map(role_permissions)
        .unwrap_or_default()
}

// =============================================================================
// Plan Features
// =============================================================================

/// Fixed feature record for one subscription plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PlanFeatures {
    pub multi_store: bool,
    pub advanced_reports: bool,
    pub analytics: bool,
    pub api: bool,
    pub white_label: bool,
    pub priority_support: bool,
    pub custom_integrations: bool,
}

impl PlanFeatures {
    /// The all-false record. Unknown plans resolve to this.
    pub const fn none() -> Self {
        PlanFeatures {
            multi_store: false,
            advanced_reports: false,
            analytics: false,
            api: false,
            white_label: false,
            priority_support: false,
            custom_integrations: false,
        }
    }
}

/// Maps a plan to its fixed feature record.
pub fn subscription_features(plan: SubscriptionPlan) -> PlanFeatures {
    match plan {
        SubscriptionPlan::Enterprise => PlanFeatures {
            multi_store: true,
            advanced_reports: true,
            analytics: true,
            api: true,
            white_label: true,
            priority_support: true,
            custom_integrations: true,
        },
        SubscriptionPlan::Premium => PlanFeatures {
            multi_store: true,
            advanced_reports: true,
            analytics: true,
            api: false,
            white_label: false,
            priority_support: true,
            custom_integrations: false,
        },
        SubscriptionPlan::Basic => PlanFeatures::none(),
    }
}

/// String-keyed variant. Unknown plan names yield the all-false default.
pub fn subscription_features_by_name(plan: &str) -> PlanFeatures {
    SubscriptionPlan::from_str(plan)
        .map(subscription_features)
        .unwrap_or_default()
}

// =============================================================================
// Feature Access Decision
// =============================================================================

/// Decides whether `feature` is available under the given plan and status.
///
/// The status gate runs first and overrides the plan: a premium tenant in
/// past_due keeps only the core allow-list. Feature names the record does
/// not model are allowed.
pub fn check_feature_access(
    feature: &str,
    plan: SubscriptionPlan,
    status: SubscriptionStatus,
) -> bool {
    if !status.is_entitled() {
        return CORE_ALLOW_LIST.contains(&feature);
    }
    feature_allowed(feature, subscription_features(plan))
}

/// String-keyed variant for callers holding raw plan/status names. An
/// unparseable status counts as not entitled; an unparseable plan gets the
/// all-false feature record.
pub fn check_feature_access_by_name(feature: &str, plan: &str, status: &str) -> bool {
    let entitled = SubscriptionStatus::from_str(status)
        .map(|s| s.is_entitled())
        .unwrap_or(false);
    if !entitled {
        return CORE_ALLOW_LIST.contains(&feature);
    }
    feature_allowed(feature, subscription_features_by_name(plan))
}

/// Explicit named mapping per feature key; unrecognized names pass.
fn feature_allowed(feature: &str, features: PlanFeatures) -> bool {
    match feature {
        "multi_store" => features.multi_store,
        "advanced_reports" => features.advanced_reports,
        "analytics" => features.analytics,
        "api" => features.api,
        "white_label" => features.white_label,
        "priority_support" => features.priority_support,
        "custom_integrations" => features.custom_integrations,
        _ => true,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staff_cannot_manage_settings_owner_can() {
        assert!(!role_permissions(UserRole::Staff).can_manage_settings);
        assert!(role_permissions(UserRole::Owner).can_manage_settings);
    }

    #[test]
    fn test_unknown_role_is_all_false() {
        let perms = role_permissions_by_name("cashier");
        assert_eq!(perms, RolePermissions::none());
    }

    #[test]
    fn test_unknown_plan_is_all_false() {
        let features = subscription_features_by_name("platinum");
        assert_eq!(features, PlanFeatures::none());
    }

    #[test]
    fn test_multi_store_gating() {
        assert!(!check_feature_access(
            "multi_store",
            SubscriptionPlan::Basic,
            SubscriptionStatus::Active
        ));
        assert!(check_feature_access(
            "multi_store",
            SubscriptionPlan::Premium,
            SubscriptionStatus::Active
        ));
        // Status gate overrides plan
        assert!(!check_feature_access(
            "multi_store",
            SubscriptionPlan::Premium,
            SubscriptionStatus::PastDue
        ));
    }

    #[test]
    fn test_allow_list_survives_bad_status() {
        for feature in ["transactions", "basic_reports", "inventory"] {
            assert!(check_feature_access(
                feature,
                SubscriptionPlan::Basic,
                SubscriptionStatus::Suspended
            ));
        }
        assert!(!check_feature_access(
            "analytics",
            SubscriptionPlan::Enterprise,
            SubscriptionStatus::Suspended
        ));
    }

    #[test]
    fn test_unknown_feature_is_permissive_when_entitled() {
        assert!(check_feature_access(
            "receipt_reprint",
            SubscriptionPlan::Basic,
            SubscriptionStatus::Active
        ));
        // ...but the status gate still applies to unknown names
        assert!(!check_feature_access(
            "receipt_reprint",
            SubscriptionPlan::Basic,
            SubscriptionStatus::Cancelled
        ));
    }

    #[test]
    fn test_by_name_variant_handles_garbage() {
        assert!(check_feature_access_by_name(
            "multi_store",
            "premium",
            "active"
        ));
        assert!(!check_feature_access_by_name(
            "multi_store",
            "premium",
            "???"
        ));
        assert!(!check_feature_access_by_name("multi_store", "???", "active"));
        assert!(check_feature_access_by_name("transactions", "???", "???"));
    }

    #[test]
    fn test_permission_string_lookup() {
        let owner = role_permissions(UserRole::Owner);
        assert!(owner.allows("manage_settings"));
        assert!(!owner.allows("launch_rockets"));

        let staff = role_permissions(UserRole::Staff);
        assert!(staff.allows("process_transactions"));
        assert!(!staff.allows("process_refunds"));
    }
}
