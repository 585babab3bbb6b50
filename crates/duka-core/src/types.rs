//! # Domain Types
//!
//! Core domain types used throughout Duka POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │   Transaction   │   │  PaymentSplit   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  method         │       │
//! │  │  retail/whole-  │   │  items (frozen) │   │  amount_cents   │       │
//! │  │  sale prices    │   │  total_cents    │   │  reference      │       │
//! │  │  stock          │   │  payments[]     │   │  (M-Pesa code)  │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Customer     │   │     Tenant      │   │    UserRole     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  loyalty points │   │  plan + status  │   │  super_admin    │       │
//! │  │  credit limit   │   │  usage limits   │   │  owner … staff  │       │
//! │  │  walk-in flag   │   │  billing dates  │   └─────────────────┘       │
//! │  └─────────────────┘   └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity Pattern
//! Every entity carries a UUID v4 string id, generated client-side so records
//! created offline never need a server round-trip to become referenceable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::money::Money;
use crate::settings::{PrinterSettings, SmsSettings, StoreSettings};
use crate::WALK_IN_CUSTOMER_ID;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 1600 bps = 16% (Kenyan standard VAT rate)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage (for convenience).
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    /// Checks if tax rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// User Role
// =============================================================================

/// Staff role within a tenant. Determines the permission record a user gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Platform operator. Implicitly passes every permission check.
    SuperAdmin,
    /// Business owner. Full control of their tenant.
    Owner,
    /// Trusted manager with user administration rights.
    Admin,
    /// Shift manager: reports and refunds, no user administration.
    Manager,
    /// Till operator: sells and looks up inventory, nothing else.
    Staff,
}

impl UserRole {
    /// Stable lowercase name used in storage and the user_roles table.
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::SuperAdmin => "super_admin",
            UserRole::Owner => "owner",
            UserRole::Admin => "admin",
            UserRole::Manager => "manager",
            UserRole::Staff => "staff",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "super_admin" => Ok(UserRole::SuperAdmin),
            "owner" => Ok(UserRole::Owner),
            "admin" => Ok(UserRole::Admin),
            "manager" => Ok(UserRole::Manager),
            "staff" => Ok(UserRole::Staff),
            _ => Err(format!("Invalid user role: {}", s)),
        }
    }
}

// =============================================================================
// Subscription Plan & Status
// =============================================================================

/// Subscription tier a tenant pays for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionPlan {
    Basic,
    Premium,
    Enterprise,
}

impl SubscriptionPlan {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionPlan::Basic => "basic",
            SubscriptionPlan::Premium => "premium",
            SubscriptionPlan::Enterprise => "enterprise",
        }
    }
}

impl fmt::Display for SubscriptionPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SubscriptionPlan {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "basic" => Ok(SubscriptionPlan::Basic),
            "premium" => Ok(SubscriptionPlan::Premium),
            "enterprise" => Ok(SubscriptionPlan::Enterprise),
            _ => Err(format!("Invalid subscription plan: {}", s)),
        }
    }
}

/// Billing state of a tenant's subscription.
///
/// Only `Active` and `Trial` unlock plan features; every other status drops
/// the tenant to the core allow-list (see [`crate::access`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    PastDue,
    Cancelled,
    Suspended,
    Trial,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::PastDue => "past_due",
            SubscriptionStatus::Cancelled => "cancelled",
            SubscriptionStatus::Suspended => "suspended",
            SubscriptionStatus::Trial => "trial",
        }
    }

    /// Whether this status entitles the tenant to its plan's features.
    #[inline]
    pub fn is_entitled(&self) -> bool {
        matches!(self, SubscriptionStatus::Active | SubscriptionStatus::Trial)
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SubscriptionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(SubscriptionStatus::Active),
            "past_due" => Ok(SubscriptionStatus::PastDue),
            "cancelled" => Ok(SubscriptionStatus::Cancelled),
            "suspended" => Ok(SubscriptionStatus::Suspended),
            "trial" => Ok(SubscriptionStatus::Trial),
            _ => Err(format!("Invalid subscription status: {}", s)),
        }
    }
}

// =============================================================================
// Store
// =============================================================================

/// A single physical or logical retail location.
///
/// Stores are owned by the tenant and never hard-deleted in-session;
/// deactivation flips `is_active` instead.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Store {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name, e.g. "Mama Njeri Shop - Kawangware".
    pub name: String,

    /// Physical address or landmark description.
    pub address: String,

    /// Contact phone (Kenyan format, e.g. +254712345678).
    pub phone: String,

    /// Optional contact email.
    pub email: Option<String>,

    /// Whether the store is active (soft delete).
    pub is_active: bool,

    /// Pricing/receipt behavior for this store.
    pub settings: StoreSettings,

    /// Receipt printer configuration.
    pub printer: PrinterSettings,

    /// SMS notification configuration.
    pub sms: SmsSettings,

    /// When the store was created.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale in one store's inventory.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown to the attendant and on receipts.
    pub name: String,

    /// Free-form category, e.g. "Beverages".
    pub category: String,

    /// What the store paid per unit, in cents.
    pub buying_price_cents: i64,

    /// Wholesale price per unit, in cents.
    pub wholesale_price_cents: i64,

    /// Retail price per unit, in cents.
    pub retail_price_cents: i64,

    /// Current stock count. Non-negative unless the store settings
    /// allow negative stock.
    pub stock: i64,

    /// Barcode (EAN-13, UPC-A, etc.). Unique within the store when present.
    pub barcode: Option<String>,

    /// Stock level at or below which the product counts as low-stock.
    pub low_stock_threshold: i64,

    /// When the product was created.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the retail price as a Money type.
    #[inline]
    pub fn retail_price(&self) -> Money {
        Money::from_cents(self.retail_price_cents)
    }

    /// Returns the wholesale price as a Money type.
    #[inline]
    pub fn wholesale_price(&self) -> Money {
        Money::from_cents(self.wholesale_price_cents)
    }

    /// Whether current stock is at or below the low-stock threshold.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.stock <= self.low_stock_threshold
    }
}

/// Input for creating a product. Id and timestamps are assigned by the
/// store data service.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewProduct {
    pub name: String,
    pub category: String,
    pub buying_price_cents: i64,
    pub wholesale_price_cents: i64,
    pub retail_price_cents: i64,
    pub stock: i64,
    pub barcode: Option<String>,
    pub low_stock_threshold: i64,
}

/// Partial update for a product. Only fields present are merged; absent
/// fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub buying_price_cents: Option<i64>,
    pub wholesale_price_cents: Option<i64>,
    pub retail_price_cents: Option<i64>,
    pub stock: Option<i64>,
    pub barcode: Option<String>,
    pub low_stock_threshold: Option<i64>,
}

impl ProductPatch {
    /// Merges the patch into the product. Caller is responsible for bumping
    /// `updated_at` afterwards.
    pub fn apply_to(&self, product: &mut Product) {
        if let Some(name) = &self.name {
            product.name = name.clone();
        }
        if let Some(category) = &self.category {
            product.category = category.clone();
        }
        if let Some(cents) = self.buying_price_cents {
            product.buying_price_cents = cents;
        }
        if let Some(cents) = self.wholesale_price_cents {
            product.wholesale_price_cents = cents;
        }
        if let Some(cents) = self.retail_price_cents {
            product.retail_price_cents = cents;
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
        if let Some(barcode) = &self.barcode {
            product.barcode = Some(barcode.clone());
        }
        if let Some(threshold) = self.low_stock_threshold {
            product.low_stock_threshold = threshold;
        }
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A customer known to one store, including loyalty and credit standing.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Customer {
    /// Unique identifier (UUID v4). The walk-in sentinel uses the nil UUID.
    pub id: String,

    /// Customer name, or "Walk-in Customer" for the sentinel.
    pub name: String,

    /// Contact phone.
    pub phone: String,

    /// Optional contact email.
    pub email: Option<String>,

    /// Loyalty points balance (non-negative).
    pub loyalty_points: i64,

    /// Maximum credit the store extends to this customer, in cents.
    pub credit_limit_cents: i64,

    /// Outstanding credit balance, in cents. May exceed the limit only
    /// through explicit override paths.
    pub outstanding_balance_cents: i64,

    /// When the customer was created.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Customer {
    /// The synthetic walk-in customer every store's customer map contains.
    /// Zero loyalty, zero credit, never billed.
    pub fn walk_in(created_at: DateTime<Utc>) -> Self {
        Customer {
            id: WALK_IN_CUSTOMER_ID.to_string(),
            name: "Walk-in Customer".to_string(),
            phone: String::new(),
            email: None,
            loyalty_points: 0,
            credit_limit_cents: 0,
            outstanding_balance_cents: 0,
            created_at,
        }
    }

    /// Whether this is the walk-in sentinel.
    #[inline]
    pub fn is_walk_in(&self) -> bool {
        self.id == WALK_IN_CUSTOMER_ID
    }
}

/// Input for creating a customer. Loyalty and outstanding balance start at
/// zero; id and timestamp are assigned by the store data service.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewCustomer {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub credit_limit_cents: i64,
}

/// Partial update for a customer.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CustomerPatch {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub loyalty_points: Option<i64>,
    pub credit_limit_cents: Option<i64>,
    pub outstanding_balance_cents: Option<i64>,
}

impl CustomerPatch {
    /// Merges the patch into the customer, touching only present fields.
    pub fn apply_to(&self, customer: &mut Customer) {
        if let Some(name) = &self.name {
            customer.name = name.clone();
        }
        if let Some(phone) = &self.phone {
            customer.phone = phone.clone();
        }
        if let Some(email) = &self.email {
            customer.email = Some(email.clone());
        }
        if let Some(points) = self.loyalty_points {
            customer.loyalty_points = points;
        }
        if let Some(cents) = self.credit_limit_cents {
            customer.credit_limit_cents = cents;
        }
        if let Some(cents) = self.outstanding_balance_cents {
            customer.outstanding_balance_cents = cents;
        }
    }
}

// =============================================================================
// Attendant
// =============================================================================

/// A staff member who operates the till at one store.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Attendant {
    pub id: String,
    pub name: String,
    pub phone: String,
    /// Role determining what this attendant may do.
    pub role: UserRole,
    /// Whether the attendant is active (soft delete).
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Input for creating an attendant.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewAttendant {
    pub name: String,
    pub phone: String,
    pub role: UserRole,
}

// =============================================================================
// Supplier
// =============================================================================

/// A supplier one store restocks from.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Supplier {
    pub id: String,
    pub name: String,
    pub contact_person: String,
    pub phone: String,
    pub email: Option<String>,
    /// What this supplier provides, e.g. "Dairy products".
    pub supplies: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Input for creating a supplier.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewSupplier {
    pub name: String,
    pub contact_person: String,
    pub phone: String,
    pub email: Option<String>,
    pub supplies: String,
}

/// Partial update for a supplier.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SupplierPatch {
    pub name: Option<String>,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub supplies: Option<String>,
}

impl SupplierPatch {
    /// Merges the patch into the supplier, touching only present fields.
    pub fn apply_to(&self, supplier: &mut Supplier) {
        if let Some(name) = &self.name {
            supplier.name = name.clone();
        }
        if let Some(person) = &self.contact_person {
            supplier.contact_person = person.clone();
        }
        if let Some(phone) = &self.phone {
            supplier.phone = phone.clone();
        }
        if let Some(email) = &self.email {
            supplier.email = Some(email.clone());
        }
        if let Some(supplies) = &self.supplies {
            supplier.supplies = supplies.clone();
        }
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// The status of a sale transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    /// Paid and finalized.
    Completed,
    /// Awaiting payment or confirmation (e.g. M-Pesa in flight).
    Pending,
    /// Money returned after completion.
    Refunded,
    /// Cancelled before completion.
    Voided,
}

impl Default for TransactionStatus {
    fn default() -> Self {
        TransactionStatus::Completed
    }
}

/// How a payment split was settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash into the drawer.
    Cash,
    /// M-Pesa mobile money.
    Mpesa,
    /// Card payment on an external terminal.
    Card,
    /// Store credit against the customer's account.
    Credit,
}

impl PaymentMethod {
    /// Fixed-width label used on printed receipts.
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "CASH",
            PaymentMethod::Mpesa => "M-PESA",
            PaymentMethod::Card => "CARD",
            PaymentMethod::Credit => "CREDIT",
        }
    }
}

/// One payment towards a transaction. A transaction can carry several
/// splits for mixed tenders (e.g. part cash, part M-Pesa).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaymentSplit {
    pub method: PaymentMethod,
    /// Amount settled by this split, in cents.
    pub amount_cents: i64,
    /// External reference (M-Pesa confirmation code, card auth, etc.).
    pub reference: Option<String>,
}

impl PaymentSplit {
    /// Returns the split amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

/// A line item in a transaction.
/// Uses snapshot pattern to freeze product data at time of sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TransactionItem {
    /// Product this line refers to.
    pub product_id: String,
    /// Product name at time of sale (frozen).
    pub name_snapshot: String,
    /// Unit price in cents at time of sale (frozen).
    pub unit_price_cents: i64,
    /// Quantity sold.
    pub quantity: i64,
    /// Line total (unit_price × quantity).
    pub line_total_cents: i64,
}

impl TransactionItem {
    /// Snapshots a product into a line item, freezing name and price.
    ///
    /// Price freezing matters: if the product's price changes after the
    /// sale, the transaction must still show what the customer paid.
    pub fn from_product(product: &Product, quantity: i64) -> Self {
        TransactionItem {
            product_id: product.id.clone(),
            name_snapshot: product.name.clone(),
            unit_price_cents: product.retail_price_cents,
            quantity,
            line_total_cents: product.retail_price_cents * quantity,
        }
    }

    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Returns the line total as Money.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }
}

/// A finalized sale. Append-only: once recorded, a transaction is never
/// mutated (refunds and voids are status transitions recorded at creation
/// of the corrective entry, not edits).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Transaction {
    pub id: String,
    pub store_id: String,
    /// Ordered line items (product snapshots).
    pub items: Vec<TransactionItem>,
    /// Sum of line totals, in cents.
    pub total_cents: i64,
    /// Customer reference (walk-in sentinel for anonymous sales).
    pub customer_id: String,
    /// Attendant who rang up the sale.
    pub attendant_id: String,
    /// One or more payment splits. For a completed transaction these sum
    /// to `total_cents`; a shortfall must be an explicit credit split.
    pub payments: Vec<PaymentSplit>,
    pub status: TransactionStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Returns the transaction total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Sum of all payment split amounts, in cents.
    pub fn splits_total_cents(&self) -> i64 {
        self.payments.iter().map(|p| p.amount_cents).sum()
    }
}

/// Input for recording a transaction. The store data service computes the
/// total from the items, validates payments, and assigns id + timestamp.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TransactionDraft {
    pub items: Vec<TransactionItem>,
    pub customer_id: String,
    pub attendant_id: String,
    pub payments: Vec<PaymentSplit>,
    pub status: TransactionStatus,
}

// =============================================================================
// Tenant
// =============================================================================

/// Usage ceilings attached to a subscription plan.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UsageLimits {
    pub max_stores: i64,
    pub max_users: i64,
    pub max_products: i64,
}

impl UsageLimits {
    /// Default ceilings per plan tier.
    pub fn for_plan(plan: SubscriptionPlan) -> Self {
        match plan {
            SubscriptionPlan::Basic => UsageLimits {
                max_stores: 1,
                max_users: 3,
                max_products: 500,
            },
            SubscriptionPlan::Premium => UsageLimits {
                max_stores: 3,
                max_users: 10,
                max_products: 5_000,
            },
            SubscriptionPlan::Enterprise => UsageLimits {
                max_stores: 100,
                max_users: 100,
                max_products: 100_000,
            },
        }
    }
}

/// A billing/subscription unit that owns one or more stores.
///
/// Created on signup, updated by the billing check, deactivated on
/// persistent non-payment.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Tenant {
    pub id: String,
    pub business_name: String,
    pub plan: SubscriptionPlan,
    pub status: SubscriptionStatus,
    /// Start of the current billing period.
    #[ts(as = "Option<String>")]
    pub current_period_start: Option<DateTime<Utc>>,
    /// When the next invoice falls due.
    #[ts(as = "Option<String>")]
    pub next_billing_date: Option<DateTime<Utc>>,
    pub limits: UsageLimits,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Offline Buffer
// =============================================================================

/// A buffered mutation awaiting replay against the remote data provider.
///
/// Commands are written while the engine is OFFLINE and replayed in FIFO
/// order once connectivity returns. The `id` is generated on the client at
/// buffering time so the remote side can deduplicate replays.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OfflineCommand {
    /// Client-generated command id, stable across replay attempts.
    pub id: String,
    pub store_id: String,
    /// Buffer category: "products", "customers" or "transactions".
    pub category: String,
    /// Operation within the category: "create", "update", "delete", "append".
    pub op: String,
    /// The full mutation as JSON.
    pub payload: String,
    /// Number of replay attempts so far.
    pub attempts: i64,
    /// Last replay error, if any attempt failed.
    pub last_error: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    /// When replay was last attempted.
    #[ts(as = "Option<String>")]
    pub attempted_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_tax_rate_from_bps() {
        let rate = TaxRate::from_bps(1600);
        assert_eq!(rate.bps(), 1600);
        assert!((rate.percentage() - 16.0).abs() < 0.001);
    }

    #[test]
    fn test_role_round_trip() {
        for role in [
            UserRole::SuperAdmin,
            UserRole::Owner,
            UserRole::Admin,
            UserRole::Manager,
            UserRole::Staff,
        ] {
            let parsed: UserRole = role.as_str().parse().unwrap();
            assert_eq!(parsed, role);
        }
        assert!("cashier".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_status_entitlement() {
        assert!(SubscriptionStatus::Active.is_entitled());
        assert!(SubscriptionStatus::Trial.is_entitled());
        assert!(!SubscriptionStatus::PastDue.is_entitled());
        assert!(!SubscriptionStatus::Cancelled.is_entitled());
        assert!(!SubscriptionStatus::Suspended.is_entitled());
    }

    #[test]
    fn test_walk_in_sentinel() {
        let walk_in = Customer::walk_in(Utc::now());
        assert!(walk_in.is_walk_in());
        assert_eq!(walk_in.loyalty_points, 0);
        assert_eq!(walk_in.credit_limit_cents, 0);
    }

    #[test]
    fn test_product_patch_touches_only_present_fields() {
        let now = Utc::now();
        let mut product = Product {
            id: "p1".to_string(),
            name: "Soda 300ml".to_string(),
            category: "Beverages".to_string(),
            buying_price_cents: 3000,
            wholesale_price_cents: 4000,
            retail_price_cents: 5000,
            stock: 24,
            barcode: None,
            low_stock_threshold: 6,
            created_at: now,
            updated_at: now,
        };

        let patch = ProductPatch {
            retail_price_cents: Some(5500),
            stock: Some(20),
            ..Default::default()
        };
        patch.apply_to(&mut product);

        assert_eq!(product.retail_price_cents, 5500);
        assert_eq!(product.stock, 20);
        // Untouched fields stay as they were
        assert_eq!(product.name, "Soda 300ml");
        assert_eq!(product.buying_price_cents, 3000);
        assert_eq!(product.barcode, None);
    }

    #[test]
    fn test_item_snapshot_freezes_price() {
        let now = Utc::now();
        let mut product = Product {
            id: "p1".to_string(),
            name: "Bread 400g".to_string(),
            category: "Bakery".to_string(),
            buying_price_cents: 4500,
            wholesale_price_cents: 5500,
            retail_price_cents: 6500,
            stock: 10,
            barcode: None,
            low_stock_threshold: 2,
            created_at: now,
            updated_at: now,
        };

        let item = TransactionItem::from_product(&product, 2);
        assert_eq!(item.unit_price_cents, 6500);
        assert_eq!(item.line_total_cents, 13000);

        // Later price change must not affect the snapshot
        product.retail_price_cents = 7000;
        assert_eq!(item.unit_price_cents, 6500);
    }

    #[test]
    fn test_splits_total() {
        let tx = Transaction {
            id: "t1".to_string(),
            store_id: "s1".to_string(),
            items: vec![],
            total_cents: 10000,
            customer_id: crate::WALK_IN_CUSTOMER_ID.to_string(),
            attendant_id: "a1".to_string(),
            payments: vec![
                PaymentSplit {
                    method: PaymentMethod::Cash,
                    amount_cents: 4000,
                    reference: None,
                },
                PaymentSplit {
                    method: PaymentMethod::Mpesa,
                    amount_cents: 6000,
                    reference: Some("SFC8XK2Q1P".to_string()),
                },
            ],
            status: TransactionStatus::Completed,
            created_at: Utc::now(),
        };
        assert_eq!(tx.splits_total_cents(), 10000);
    }

    #[test]
    fn test_usage_limits_scale_with_plan() {
        let basic = UsageLimits::for_plan(SubscriptionPlan::Basic);
        let enterprise = UsageLimits::for_plan(SubscriptionPlan::Enterprise);
        assert_eq!(basic.max_stores, 1);
        assert!(enterprise.max_stores > basic.max_stores);
    }
}
