//! # Store Data Service
//!
//! Single source of truth for store-scoped business entities during a
//! session: products, customers, transactions, attendants, suppliers, the
//! cash balance, and the three settings records.
//!
//! ## Thread Safety
//! The per-store map is wrapped in `std::sync::RwLock` because:
//! 1. Reads vastly outnumber writes at a till
//! 2. All operations are synchronous and complete inside the lock
//! 3. A mutation must be visible to every read that follows it
//!
//! ## Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Store Data Operations                                │
//! │                                                                         │
//! │  Caller Action             Service Method          State Change         │
//! │  ─────────────             ──────────────          ────────────         │
//! │                                                                         │
//! │  New product form ────────► add_product() ────────► products.push(p)    │
//! │                                                                         │
//! │  Edit dialog ─────────────► update_product() ─────► merge patch fields  │
//! │                                                                         │
//! │  Checkout ────────────────► add_transaction() ────► ledger.push(tx)     │
//! │                                                                         │
//! │  Cash drawer count ───────► update_cash_balance() ► balance ± amount    │
//! │                                                                         │
//! │  Inventory screen ────────► products() ───────────► (snapshot clone)    │
//! │                                                                         │
//! │  NOTE: Mutations lazily create the store's record (walk-in customer     │
//! │        seeded); plain reads on an unknown store return empty data.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use duka_core::error::CoreResult;
use duka_core::validation::{
    validate_barcode, validate_loyalty_points, validate_name, validate_new_customer,
    validate_new_product, validate_new_supplier, validate_phone, validate_price_cents,
    validate_transaction,
};
use duka_core::{
    Attendant, CoreError, Customer, CustomerPatch, Money, NewAttendant, NewCustomer, NewProduct,
    NewSupplier, PrinterSettings, Product, ProductPatch, SmsSettings, StoreSettings, Supplier,
    SupplierPatch, Transaction, TransactionDraft, ValidationError,
};

// =============================================================================
// Per-Store Data
// =============================================================================

/// Everything one store owns during a session.
///
/// ## Invariants
/// - `customers` always contains the walk-in sentinel
/// - `transactions` is append-only; entries are never mutated
/// - Entity ids are unique within their sequence
#[derive(Debug, Clone)]
pub struct StoreData {
    pub products: Vec<Product>,
    pub customers: Vec<Customer>,
    pub transactions: Vec<Transaction>,
    pub attendants: Vec<Attendant>,
    pub suppliers: Vec<Supplier>,
    /// Signed running total; no floor.
    pub cash_balance: Money,
    pub settings: StoreSettings,
    pub printer: PrinterSettings,
    pub sms: SmsSettings,
}

impl StoreData {
    /// Creates store data with defaults and the walk-in customer seeded.
    pub fn new() -> Self {
        StoreData {
            products: Vec::new(),
            customers: vec![Customer::walk_in(Utc::now())],
            transactions: Vec::new(),
            attendants: Vec::new(),
            suppliers: Vec::new(),
            cash_balance: Money::zero(),
            settings: StoreSettings::default(),
            printer: PrinterSettings::default(),
            sms: SmsSettings::default(),
        }
    }
}

impl Default for StoreData {
    fn default() -> Self {
        Self::new()
    }
}

/// Which way a cash balance adjustment goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CashDirection {
    Add,
    Subtract,
}

// =============================================================================
// Service
// =============================================================================

/// Explicitly constructed store data service.
///
/// Construct once at composition time and share by reference
/// (typically `Arc<StoreDataService>`); there is no ambient instance.
///
/// ## Usage
/// ```rust,ignore
/// let store_data = Arc::new(StoreDataService::new());
///
/// let product = store_data.add_product(store_id, new_product)?;
/// let snapshot = store_data.products(store_id);
/// ```
#[derive(Debug, Default)]
pub struct StoreDataService {
    stores: RwLock<HashMap<String, StoreData>>,
}

/// Generates an id no existing entity holds.
fn fresh_id<F>(taken: F) -> String
where
    F: Fn(&str) -> bool,
{
    loop {
        let id = Uuid::new_v4().to_string();
        if !taken(&id) {
            return id;
        }
    }
}

impl StoreDataService {
    /// Creates an empty service; store records appear lazily as they are
    /// first mutated.
    pub fn new() -> Self {
        StoreDataService {
            stores: RwLock::new(HashMap::new()),
        }
    }

    // ===== Snapshot reads =====

    /// Current product snapshot; empty for an unknown store.
    pub fn products(&self, store_id: &str) -> Vec<Product> {
        let stores = self.stores.read().expect("store map lock poisoned");
        stores
            .get(store_id)
            .map(|d| d.products.clone())
            .unwrap_or_default()
    }

    /// Current customer snapshot; empty for an unknown store.
    pub fn customers(&self, store_id: &str) -> Vec<Customer> {
        let stores = self.stores.read().expect("store map lock poisoned");
        stores
            .get(store_id)
            .map(|d| d.customers.clone())
            .unwrap_or_default()
    }

    /// Current transaction ledger snapshot; empty for an unknown store.
    pub fn transactions(&self, store_id: &str) -> Vec<Transaction> {
        let stores = self.stores.read().expect("store map lock poisoned");
        stores
            .get(store_id)
            .map(|d| d.transactions.clone())
            .unwrap_or_default()
    }

    /// Current attendant snapshot; empty for an unknown store.
    pub fn attendants(&self, store_id: &str) -> Vec<Attendant> {
        let stores = self.stores.read().expect("store map lock poisoned");
        stores
            .get(store_id)
            .map(|d| d.attendants.clone())
            .unwrap_or_default()
    }

    /// Current supplier snapshot; empty for an unknown store.
    pub fn suppliers(&self, store_id: &str) -> Vec<Supplier> {
        let stores = self.stores.read().expect("store map lock poisoned");
        stores
            .get(store_id)
            .map(|d| d.suppliers.clone())
            .unwrap_or_default()
    }

    // ===== Products =====

    /// Validates and inserts a product, assigning a fresh id and timestamps.
    ///
    /// ## Errors
    /// - Validation failures on name, prices, stock, or barcode format
    /// - `Duplicate` when the barcode is already taken in this store
    pub fn add_product(&self, store_id: &str, new: NewProduct) -> CoreResult<Product> {
        validate_new_product(&new)?;

        let mut stores = self.stores.write().expect("store map lock poisoned");
        let data = stores
            .entry(store_id.to_string())
            .or_insert_with(StoreData::new);

        if let Some(barcode) = &new.barcode {
            if data.products.iter().any(|p| p.barcode.as_deref() == Some(barcode.as_str())) {
                return Err(ValidationError::Duplicate {
                    field: "barcode".to_string(),
                    value: barcode.clone(),
                }
                .into());
            }
        }

        let id = fresh_id(|candidate| data.products.iter().any(|p| p.id == candidate));
        let now = Utc::now();
        let product = Product {
            id,
            name: new.name,
            category: new.category,
            buying_price_cents: new.buying_price_cents,
            wholesale_price_cents: new.wholesale_price_cents,
            retail_price_cents: new.retail_price_cents,
            stock: new.stock,
            barcode: new.barcode,
            low_stock_threshold: new.low_stock_threshold,
            created_at: now,
            updated_at: now,
        };

        debug!(store_id = %store_id, product_id = %product.id, "Product added");

        data.products.push(product.clone());
        Ok(product)
    }

    /// Merges a partial update into an existing product.
    ///
    /// ## Errors
    /// - `ProductNotFound` when the id is absent (callers distinguish
    ///   "applied" from "ignored")
    /// - `NegativeStock` when the patch would take stock below zero and the
    ///   store settings do not allow it
    /// - `Duplicate` when the patch points the barcode at one another
    ///   product already carries
    pub fn update_product(
        &self,
        store_id: &str,
        id: &str,
        patch: ProductPatch,
    ) -> CoreResult<Product> {
        if let Some(name) = &patch.name {
            validate_name(name)?;
        }
        if let Some(cents) = patch.buying_price_cents {
            validate_price_cents("buying_price", cents)?;
        }
        if let Some(cents) = patch.wholesale_price_cents {
            validate_price_cents("wholesale_price", cents)?;
        }
        if let Some(cents) = patch.retail_price_cents {
            validate_price_cents("retail_price", cents)?;
        }
        if let Some(barcode) = &patch.barcode {
            validate_barcode(barcode)?;
        }

        let mut stores = self.stores.write().expect("store map lock poisoned");
        let data = stores
            .entry(store_id.to_string())
            .or_insert_with(StoreData::new);

        if let Some(barcode) = &patch.barcode {
            if data
                .products
                .iter()
                .any(|p| p.id != id && p.barcode.as_deref() == Some(barcode.as_str()))
            {
                return Err(ValidationError::Duplicate {
                    field: "barcode".to_string(),
                    value: barcode.clone(),
                }
                .into());
            }
        }

        let allow_negative = data.settings.allow_negative_stock;
        let product = data
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| CoreError::ProductNotFound(id.to_string()))?;

        if let Some(stock) = patch.stock {
            if stock < 0 && !allow_negative {
                return Err(CoreError::NegativeStock {
                    name: product.name.clone(),
                    resulting: stock,
                });
            }
        }

        patch.apply_to(product);
        product.updated_at = Utc::now();

        debug!(store_id = %store_id, product_id = %id, "Product updated");

        Ok(product.clone())
    }

    // ===== Customers =====

    /// Validates and inserts a customer, assigning a fresh id and timestamp.
    pub fn add_customer(&self, store_id: &str, new: NewCustomer) -> CoreResult<Customer> {
        validate_new_customer(&new)?;

        let mut stores = self.stores.write().expect("store map lock poisoned");
        let data = stores
            .entry(store_id.to_string())
            .or_insert_with(StoreData::new);

        let id = fresh_id(|candidate| data.customers.iter().any(|c| c.id == candidate));
        let customer = Customer {
            id,
            name: new.name,
            phone: new.phone,
            email: new.email,
            loyalty_points: 0,
            credit_limit_cents: new.credit_limit_cents,
            outstanding_balance_cents: 0,
            created_at: Utc::now(),
        };

        debug!(store_id = %store_id, customer_id = %customer.id, "Customer added");

        data.customers.push(customer.clone());
        Ok(customer)
    }

    /// Merges a partial update into an existing customer.
    ///
    /// ## Errors
    /// `CustomerNotFound` when the id is absent.
    pub fn update_customer(
        &self,
        store_id: &str,
        id: &str,
        patch: CustomerPatch,
    ) -> CoreResult<Customer> {
        if let Some(name) = &patch.name {
            validate_name(name)?;
        }
        if let Some(phone) = &patch.phone {
            validate_phone(phone)?;
        }
        if let Some(points) = patch.loyalty_points {
            validate_loyalty_points(points)?;
        }
        if let Some(cents) = patch.credit_limit_cents {
            validate_price_cents("credit_limit", cents)?;
        }

        let mut stores = self.stores.write().expect("store map lock poisoned");
        let data = stores
            .entry(store_id.to_string())
            .or_insert_with(StoreData::new);

        let customer = data
            .customers
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| CoreError::CustomerNotFound(id.to_string()))?;

        patch.apply_to(customer);

        debug!(store_id = %store_id, customer_id = %id, "Customer updated");

        Ok(customer.clone())
    }

    // ===== Attendants =====

    /// Inserts an attendant, assigning a fresh id and timestamp.
    pub fn add_attendant(&self, store_id: &str, new: NewAttendant) -> CoreResult<Attendant> {
        validate_name(&new.name)?;
        validate_phone(&new.phone)?;

        let mut stores = self.stores.write().expect("store map lock poisoned");
        let data = stores
            .entry(store_id.to_string())
            .or_insert_with(StoreData::new);

        let id = fresh_id(|candidate| data.attendants.iter().any(|a| a.id == candidate));
        let attendant = Attendant {
            id,
            name: new.name,
            phone: new.phone,
            role: new.role,
            is_active: true,
            created_at: Utc::now(),
        };

        debug!(store_id = %store_id, attendant_id = %attendant.id, "Attendant added");

        data.attendants.push(attendant.clone());
        Ok(attendant)
    }

    // ===== Suppliers =====

    /// Validates and inserts a supplier, assigning a fresh id and timestamp.
    pub fn add_supplier(&self, store_id: &str, new: NewSupplier) -> CoreResult<Supplier> {
        validate_new_supplier(&new)?;

        let mut stores = self.stores.write().expect("store map lock poisoned");
        let data = stores
            .entry(store_id.to_string())
            .or_insert_with(StoreData::new);

        let id = fresh_id(|candidate| data.suppliers.iter().any(|s| s.id == candidate));
        let supplier = Supplier {
            id,
            name: new.name,
            contact_person: new.contact_person,
            phone: new.phone,
            email: new.email,
            supplies: new.supplies,
            created_at: Utc::now(),
        };

        debug!(store_id = %store_id, supplier_id = %supplier.id, "Supplier added");

        data.suppliers.push(supplier.clone());
        Ok(supplier)
    }

    /// Merges a partial update into an existing supplier.
    ///
    /// ## Errors
    /// `SupplierNotFound` when the id is absent.
    pub fn update_supplier(
        &self,
        store_id: &str,
        id: &str,
        patch: SupplierPatch,
    ) -> CoreResult<Supplier> {
        if let Some(name) = &patch.name {
            validate_name(name)?;
        }
        if let Some(phone) = &patch.phone {
            validate_phone(phone)?;
        }

        let mut stores = self.stores.write().expect("store map lock poisoned");
        let data = stores
            .entry(store_id.to_string())
            .or_insert_with(StoreData::new);

        let supplier = data
            .suppliers
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| CoreError::SupplierNotFound(id.to_string()))?;

        patch.apply_to(supplier);

        debug!(store_id = %store_id, supplier_id = %id, "Supplier updated");

        Ok(supplier.clone())
    }

    /// Removes a supplier by id.
    ///
    /// ## Errors
    /// `SupplierNotFound` when the id is absent.
    pub fn delete_supplier(&self, store_id: &str, id: &str) -> CoreResult<()> {
        let mut stores = self.stores.write().expect("store map lock poisoned");
        let data = stores
            .entry(store_id.to_string())
            .or_insert_with(StoreData::new);

        let initial_len = data.suppliers.len();
        data.suppliers.retain(|s| s.id != id);

        if data.suppliers.len() == initial_len {
            return Err(CoreError::SupplierNotFound(id.to_string()));
        }

        debug!(store_id = %store_id, supplier_id = %id, "Supplier deleted");

        Ok(())
    }

    // ===== Transactions =====

    /// Validates and appends a transaction to the store's ledger.
    ///
    /// The total is computed from the line items here; the draft cannot
    /// assert its own total. Appended transactions are never mutated.
    ///
    /// ## Errors
    /// - `SplitMismatch` when a completed transaction's payment splits do
    ///   not sum to the total
    /// - `WalkInCredit` when a credit split targets the walk-in customer
    /// - Item-level validation failures (empty items, bad quantities)
    pub fn add_transaction(
        &self,
        store_id: &str,
        draft: TransactionDraft,
    ) -> CoreResult<Transaction> {
        let mut stores = self.stores.write().expect("store map lock poisoned");
        let data = stores
            .entry(store_id.to_string())
            .or_insert_with(StoreData::new);

        let id = fresh_id(|candidate| data.transactions.iter().any(|t| t.id == candidate));
        let total_cents: i64 = draft.items.iter().map(|i| i.line_total_cents).sum();
        let transaction = Transaction {
            id,
            store_id: store_id.to_string(),
            items: draft.items,
            total_cents,
            customer_id: draft.customer_id,
            attendant_id: draft.attendant_id,
            payments: draft.payments,
            status: draft.status,
            created_at: Utc::now(),
        };

        validate_transaction(&transaction)?;

        debug!(
            store_id = %store_id,
            transaction_id = %transaction.id,
            total_cents = transaction.total_cents,
            "Transaction appended"
        );

        data.transactions.push(transaction.clone());
        Ok(transaction)
    }

    // ===== Cash balance =====

    /// Adds to or subtracts from the signed running balance.
    ///
    /// No floor is enforced; the balance may go negative (e.g. a float
    /// taken out of the drawer before the morning's sales).
    ///
    /// ## Returns
    /// The new balance.
    pub fn update_cash_balance(
        &self,
        store_id: &str,
        amount: Money,
        direction: CashDirection,
    ) -> Money {
        let mut stores = self.stores.write().expect("store map lock poisoned");
        let data = stores
            .entry(store_id.to_string())
            .or_insert_with(StoreData::new);

        data.cash_balance = match direction {
            CashDirection::Add => data.cash_balance + amount,
            CashDirection::Subtract => data.cash_balance - amount,
        };

        debug!(
            store_id = %store_id,
            balance_cents = data.cash_balance.cents(),
            "Cash balance updated"
        );

        data.cash_balance
    }

    /// Current cash balance; zero for an unknown store.
    pub fn cash_balance(&self, store_id: &str) -> Money {
        let stores = self.stores.read().expect("store map lock poisoned");
        stores
            .get(store_id)
            .map(|d| d.cash_balance)
            .unwrap_or_else(Money::zero)
    }

    // ===== Settings =====

    /// Current store settings; defaults for an unknown store.
    pub fn store_settings(&self, store_id: &str) -> StoreSettings {
        let stores = self.stores.read().expect("store map lock poisoned");
        stores
            .get(store_id)
            .map(|d| d.settings.clone())
            .unwrap_or_default()
    }

    /// Replaces the store settings record.
    pub fn update_store_settings(&self, store_id: &str, settings: StoreSettings) {
        let mut stores = self.stores.write().expect("store map lock poisoned");
        let data = stores
            .entry(store_id.to_string())
            .or_insert_with(StoreData::new);
        data.settings = settings;
    }

    /// Current printer settings; defaults for an unknown store.
    pub fn printer_settings(&self, store_id: &str) -> PrinterSettings {
        let stores = self.stores.read().expect("store map lock poisoned");
        stores
            .get(store_id)
            .map(|d| d.printer.clone())
            .unwrap_or_default()
    }

    /// Replaces the printer settings record.
    pub fn update_printer_settings(&self, store_id: &str, settings: PrinterSettings) {
        let mut stores = self.stores.write().expect("store map lock poisoned");
        let data = stores
            .entry(store_id.to_string())
            .or_insert_with(StoreData::new);
        data.printer = settings;
    }

    /// Current SMS settings; defaults for an unknown store.
    pub fn sms_settings(&self, store_id: &str) -> SmsSettings {
        let stores = self.stores.read().expect("store map lock poisoned");
        stores
            .get(store_id)
            .map(|d| d.sms.clone())
            .unwrap_or_default()
    }

    /// Replaces the SMS settings record.
    pub fn update_sms_settings(&self, store_id: &str, settings: SmsSettings) {
        let mut stores = self.stores.write().expect("store map lock poisoned");
        let data = stores
            .entry(store_id.to_string())
            .or_insert_with(StoreData::new);
        data.sms = settings;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use duka_core::{
        PaymentMethod, PaymentSplit, TransactionItem, TransactionStatus, UserRole,
        WALK_IN_CUSTOMER_ID,
    };

    const STORE: &str = "store-1";
    const OTHER_STORE: &str = "store-2";

    fn new_product(name: &str) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            category: "Beverages".to_string(),
            buying_price_cents: 3_000,
            wholesale_price_cents: 4_000,
            retail_price_cents: 5_000,
            stock: 24,
            barcode: None,
            low_stock_threshold: 5,
        }
    }

    fn new_customer(name: &str) -> NewCustomer {
        NewCustomer {
            name: name.to_string(),
            phone: "+254700000001".to_string(),
            email: None,
            credit_limit_cents: 100_000,
        }
    }

    fn draft_for(product: &Product, quantity: i64, payments: Vec<PaymentSplit>) -> TransactionDraft {
        TransactionDraft {
            items: vec![TransactionItem::from_product(product, quantity)],
            customer_id: WALK_IN_CUSTOMER_ID.to_string(),
            attendant_id: "attendant-1".to_string(),
            payments,
            status: TransactionStatus::Completed,
        }
    }

    #[test]
    fn test_added_product_immediately_visible() {
        let service = StoreDataService::new();

        let added = service.add_product(STORE, new_product("Soda 500ml")).unwrap();
        let snapshot = service.products(STORE);

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, added.id);
        assert_eq!(snapshot[0].name, "Soda 500ml");
    }

    #[test]
    fn test_unknown_store_reads_are_empty() {
        let service = StoreDataService::new();

        assert!(service.products("nope").is_empty());
        assert!(service.customers("nope").is_empty());
        assert!(service.transactions("nope").is_empty());
        assert!(service.attendants("nope").is_empty());
        assert!(service.suppliers("nope").is_empty());
        assert!(service.cash_balance("nope").is_zero());
    }

    #[test]
    fn test_no_cross_store_leakage() {
        let service = StoreDataService::new();

        service.add_product(STORE, new_product("Soda")).unwrap();
        service.add_product(OTHER_STORE, new_product("Bread")).unwrap();

        let first = service.products(STORE);
        let second = service.products(OTHER_STORE);
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
        assert_eq!(first[0].name, "Soda");
        assert_eq!(second[0].name, "Bread");
    }

    #[test]
    fn test_walk_in_seeded_on_first_mutation() {
        let service = StoreDataService::new();

        service.add_product(STORE, new_product("Soda")).unwrap();

        let customers = service.customers(STORE);
        assert_eq!(customers.len(), 1);
        assert!(customers[0].is_walk_in());
    }

    #[test]
    fn test_update_customer_changes_only_patched_fields() {
        let service = StoreDataService::new();
        let customer = service.add_customer(STORE, new_customer("Amina")).unwrap();

        let patch = CustomerPatch {
            loyalty_points: Some(120),
            ..Default::default()
        };
        let updated = service.update_customer(STORE, &customer.id, patch).unwrap();

        assert_eq!(updated.loyalty_points, 120);
        assert_eq!(updated.name, customer.name);
        assert_eq!(updated.phone, customer.phone);
        assert_eq!(updated.credit_limit_cents, customer.credit_limit_cents);
    }

    #[test]
    fn test_update_missing_ids_report_not_found() {
        let service = StoreDataService::new();

        let product_err = service
            .update_product(STORE, "ghost", ProductPatch::default())
            .unwrap_err();
        assert!(matches!(product_err, CoreError::ProductNotFound(_)));

        let customer_err = service
            .update_customer(STORE, "ghost", CustomerPatch::default())
            .unwrap_err();
        assert!(matches!(customer_err, CoreError::CustomerNotFound(_)));

        let supplier_err = service.delete_supplier(STORE, "ghost").unwrap_err();
        assert!(matches!(supplier_err, CoreError::SupplierNotFound(_)));
    }

    #[test]
    fn test_duplicate_barcode_rejected() {
        let service = StoreDataService::new();

        let mut first = new_product("Soda");
        first.barcode = Some("5449000000996".to_string());
        service.add_product(STORE, first).unwrap();

        let mut second = new_product("Water");
        second.barcode = Some("5449000000996".to_string());
        let err = service.add_product(STORE, second).unwrap_err();

        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::Duplicate { .. })
        ));
    }

    #[test]
    fn test_negative_stock_blocked_unless_allowed() {
        let service = StoreDataService::new();
        let product = service.add_product(STORE, new_product("Soda")).unwrap();

        let patch = ProductPatch {
            stock: Some(-3),
            ..Default::default()
        };
        let err = service
            .update_product(STORE, &product.id, patch.clone())
            .unwrap_err();
        assert!(matches!(err, CoreError::NegativeStock { resulting: -3, .. }));

        // Flip the override and the same patch lands.
        let mut settings = service.store_settings(STORE);
        settings.allow_negative_stock = true;
        service.update_store_settings(STORE, settings);

        let updated = service.update_product(STORE, &product.id, patch).unwrap();
        assert_eq!(updated.stock, -3);
    }

    #[test]
    fn test_supplier_lifecycle() {
        let service = StoreDataService::new();

        let supplier = service
            .add_supplier(
                STORE,
                NewSupplier {
                    name: "Bidco".to_string(),
                    contact_person: "Joseph".to_string(),
                    phone: "+254711000000".to_string(),
                    email: None,
                    supplies: "Cooking oil".to_string(),
                },
            )
            .unwrap();

        let patch = SupplierPatch {
            supplies: Some("Cooking oil, soap".to_string()),
            ..Default::default()
        };
        let updated = service.update_supplier(STORE, &supplier.id, patch).unwrap();
        assert_eq!(updated.supplies, "Cooking oil, soap");
        assert_eq!(updated.contact_person, "Joseph");

        service.delete_supplier(STORE, &supplier.id).unwrap();
        assert!(service.suppliers(STORE).is_empty());
    }

    #[test]
    fn test_add_attendant() {
        let service = StoreDataService::new();

        let attendant = service
            .add_attendant(
                STORE,
                NewAttendant {
                    name: "Wanjiku".to_string(),
                    phone: "+254722000000".to_string(),
                    role: UserRole::Staff,
                },
            )
            .unwrap();

        assert!(attendant.is_active);
        assert_eq!(service.attendants(STORE).len(), 1);
    }

    #[test]
    fn test_transaction_total_computed_and_appended() {
        let service = StoreDataService::new();
        let product = service.add_product(STORE, new_product("Soda")).unwrap();

        let draft = draft_for(
            &product,
            3,
            vec![PaymentSplit {
                method: PaymentMethod::Cash,
                amount_cents: 15_000,
                reference: None,
            }],
        );
        let tx = service.add_transaction(STORE, draft).unwrap();

        assert_eq!(tx.total_cents, 15_000);
        assert_eq!(service.transactions(STORE).len(), 1);
    }

    #[test]
    fn test_transaction_split_mismatch_rejected() {
        let service = StoreDataService::new();
        let product = service.add_product(STORE, new_product("Soda")).unwrap();

        let draft = draft_for(
            &product,
            3,
            vec![PaymentSplit {
                method: PaymentMethod::Mpesa,
                amount_cents: 10_000, // total is 15_000
                reference: Some("QTX12345".to_string()),
            }],
        );
        let err = service.add_transaction(STORE, draft).unwrap_err();

        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::SplitMismatch { .. })
        ));
        assert!(service.transactions(STORE).is_empty());
    }

    #[test]
    fn test_cash_balance_add_then_subtract() {
        let service = StoreDataService::new();

        service.update_cash_balance(STORE, Money::from_cents(500), CashDirection::Add);
        let balance =
            service.update_cash_balance(STORE, Money::from_cents(200), CashDirection::Subtract);

        assert_eq!(balance.cents(), 300);
        assert_eq!(service.cash_balance(STORE).cents(), 300);
    }

    #[test]
    fn test_cash_balance_may_go_negative() {
        let service = StoreDataService::new();

        let balance =
            service.update_cash_balance(STORE, Money::from_cents(700), CashDirection::Subtract);

        assert_eq!(balance.cents(), -700);
    }

    #[test]
    fn test_settings_roundtrip() {
        let service = StoreDataService::new();

        let mut printer = service.printer_settings(STORE);
        assert_eq!(printer.port, 9100);

        printer.enabled = true;
        printer.ip = "10.0.0.50".to_string();
        service.update_printer_settings(STORE, printer);

        let readback = service.printer_settings(STORE);
        assert!(readback.enabled);
        assert_eq!(readback.ip, "10.0.0.50");
    }
}
