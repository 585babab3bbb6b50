//! # Duka POS Demo Shell
//!
//! Headless composition root that wires every engine crate together and
//! walks one shop day end to end:
//!
//! 1. Load config, open local storage, sign in the shop owner
//! 2. Stock the shelves and register a customer (online, direct writes)
//! 3. Lose connectivity, keep selling (mutations buffered locally)
//! 4. Reconnect and replay the buffer, reporting the sync outcome
//! 5. Ring up a split-payment sale and print the receipt
//!
//! Everything runs against the demo providers; no real backend, auth
//! service, or printer is contacted.

use std::error::Error;
use std::sync::Arc;

use serde_json::json;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use duka_core::{
    render_receipt, NewAttendant, NewCustomer, NewProduct, PaymentMethod, PaymentSplit, Store,
    SubscriptionPlan, TransactionDraft, TransactionItem, TransactionStatus, UserRole,
    WALK_IN_CUSTOMER_ID,
};
use duka_db::{Database, DbConfig};
use duka_printer::{ReceiptPrinter, StdoutPrinter};
use duka_store::{tables, DataProvider, DemoDataProvider, StoreDataService};
use duka_sync::{categories, ops, EngineConfig, OfflineCoordinator};
use duka_tenant::{BillingService, DemoBillingProvider, DemoIdentityProvider, SessionBridge};

const OWNER_EMAIL: &str = "amina@duka.ke";
const OWNER_PASSWORD: &str = "duka-demo";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("Starting Duka POS demo");

    // -------------------------------------------------------------------------
    // Configuration & storage
    // -------------------------------------------------------------------------

    let config = EngineConfig::load_or_default(None);
    config.validate()?;
    let store_id = config.store_id().to_string();
    info!(
        terminal = %config.terminal.name,
        store_id = %store_id,
        "Configuration loaded"
    );

    // The demo keeps its buffer in memory; a real terminal points this at
    // the file from config.db_path().
    let db = Arc::new(Database::new(DbConfig::in_memory()).await?);

    // -------------------------------------------------------------------------
    // Providers & services
    // -------------------------------------------------------------------------

    let provider = Arc::new(DemoDataProvider::new().with_latency(config.demo.simulated_latency_ms));
    let data: Arc<dyn DataProvider> = provider.clone();

    let identity = Arc::new(DemoIdentityProvider::new().with_user(OWNER_EMAIL, OWNER_PASSWORD));
    let owner_id = identity
        .user_id(OWNER_EMAIL)
        .ok_or("seeded demo user missing")?;
    data.insert(
        tables::USER_ROLES,
        json!({"id": "role-1", "user_id": owner_id, "role": UserRole::Owner.as_str()}),
    )
    .await?;
    data.insert(
        tables::TENANTS,
        json!({"id": "tenant-1", "business_name": "Mama Njeri Shop"}),
    )
    .await?;

    let store_data = Arc::new(StoreDataService::new());
    let coordinator = Arc::new(OfflineCoordinator::new(
        db.clone(),
        data.clone(),
        config.sync.clone(),
    ));
    let bridge = Arc::new(SessionBridge::new(identity.clone(), data.clone()));
    let billing = BillingService::new(Arc::new(DemoBillingProvider::new()), data.clone());

    // -------------------------------------------------------------------------
    // Sign in & subscription
    // -------------------------------------------------------------------------

    bridge.init().await?;
    let view = bridge.sign_in(OWNER_EMAIL, OWNER_PASSWORD).await?;
    info!(
        email = OWNER_EMAIL,
        role = view.role.as_str(),
        "Signed in"
    );

    let (plan, status) = billing.refresh_subscription("tenant-1").await?;
    info!(plan = plan.as_str(), status = status.as_str(), "Subscription checked");
    if plan == SubscriptionPlan::Basic {
        let checkout = billing
            .create_checkout("tenant-1", SubscriptionPlan::Premium)
            .await?;
        info!(url = %checkout, "Premium upgrade available");
    }

    // -------------------------------------------------------------------------
    // Stock the shelves (online)
    // -------------------------------------------------------------------------

    let bread = store_data.add_product(
        &store_id,
        NewProduct {
            name: "Bread 400g".into(),
            category: "Bakery".into(),
            buying_price_cents: 4500,
            wholesale_price_cents: 5000,
            retail_price_cents: 6500,
            stock: 24,
            barcode: None,
            low_stock_threshold: 5,
        },
    )?;
    let milk = store_data.add_product(
        &store_id,
        NewProduct {
            name: "Milk 500ml".into(),
            category: "Dairy".into(),
            buying_price_cents: 4000,
            wholesale_price_cents: 4500,
            retail_price_cents: 5500,
            stock: 36,
            barcode: Some("6161100110014".into()),
            low_stock_threshold: 6,
        },
    )?;
    coordinator
        .submit(
            &store_id,
            categories::PRODUCTS,
            ops::INSERT,
            &serde_json::to_string(&bread)?,
        )
        .await?;
    coordinator
        .submit(
            &store_id,
            categories::PRODUCTS,
            ops::INSERT,
            &serde_json::to_string(&milk)?,
        )
        .await?;

    let attendant = store_data.add_attendant(
        &store_id,
        NewAttendant {
            name: "Wanjiku".into(),
            phone: "+254712000001".into(),
            role: UserRole::Staff,
        },
    )?;
    info!(products = store_data.products(&store_id).len(), "Shelves stocked");

    // -------------------------------------------------------------------------
    // Offline spell: the network drops, the till keeps selling
    // -------------------------------------------------------------------------

    coordinator.go_offline();

    let customer = store_data.add_customer(
        &store_id,
        NewCustomer {
            name: "Otieno".into(),
            phone: "+254722000002".into(),
            email: None,
            credit_limit_cents: 50_000,
        },
    )?;
    coordinator
        .submit(
            &store_id,
            categories::CUSTOMERS,
            ops::INSERT,
            &serde_json::to_string(&customer)?,
        )
        .await?;

    let offline_sale = store_data.add_transaction(
        &store_id,
        TransactionDraft {
            items: vec![TransactionItem::from_product(&milk, 1)],
            customer_id: WALK_IN_CUSTOMER_ID.into(),
            attendant_id: attendant.id.clone(),
            payments: vec![PaymentSplit {
                method: PaymentMethod::Cash,
                amount_cents: 5500,
                reference: None,
            }],
            status: TransactionStatus::Completed,
        },
    )?;
    coordinator
        .submit(
            &store_id,
            categories::TRANSACTIONS,
            ops::INSERT,
            &serde_json::to_string(&offline_sale)?,
        )
        .await?;
    info!(
        pending = coordinator.pending_count().await?,
        "Sold through the outage, mutations buffered"
    );

    // -------------------------------------------------------------------------
    // Reconnect & replay
    // -------------------------------------------------------------------------

    if let Some(report) = coordinator.go_online().await? {
        info!(
            synced = report.synced,
            conflicts = report.conflicts.len(),
            failed = report.failed,
            "Buffer replayed"
        );
        for conflict in &report.conflicts {
            warn!(
                category = %conflict.category,
                reason = %conflict.reason,
                "Replay conflict needs review"
            );
        }
    }
    if let Some(at) = coordinator.last_sync_at().await? {
        info!(last_sync_at = %at.to_rfc3339(), "Fully synced");
    }

    // -------------------------------------------------------------------------
    // Checkout with a split payment, receipt to the printer
    // -------------------------------------------------------------------------

    let sale = store_data.add_transaction(
        &store_id,
        TransactionDraft {
            items: vec![
                TransactionItem::from_product(&bread, 2),
                TransactionItem::from_product(&milk, 1),
            ],
            customer_id: customer.id.clone(),
            attendant_id: attendant.id.clone(),
            payments: vec![
                PaymentSplit {
                    method: PaymentMethod::Cash,
                    amount_cents: 8500,
                    reference: None,
                },
                PaymentSplit {
                    method: PaymentMethod::Mpesa,
                    amount_cents: 10_000,
                    reference: Some("SFE8K2M1QX".into()),
                },
            ],
            status: TransactionStatus::Completed,
        },
    )?;
    coordinator
        .submit(
            &store_id,
            categories::TRANSACTIONS,
            ops::INSERT,
            &serde_json::to_string(&sale)?,
        )
        .await?;

    let store = demo_store(&store_id, &store_data);
    let receipt = render_receipt(&store, &sale, Some(&customer), Some(&attendant));
    let printer = StdoutPrinter;
    printer.print(&receipt).await?;

    // -------------------------------------------------------------------------
    // Shut down cleanly
    // -------------------------------------------------------------------------

    bridge.sign_out().await?;
    bridge.dispose().await;
    coordinator.dispose().await;
    info!("Demo complete");

    Ok(())
}

/// Store record for receipt rendering, from the service's settings.
fn demo_store(store_id: &str, store_data: &StoreDataService) -> Store {
    Store {
        id: store_id.to_string(),
        name: "Mama Njeri Shop".to_string(),
        address: "Kawangware, Nairobi".to_string(),
        phone: "+254712345678".to_string(),
        email: None,
        is_active: true,
        settings: store_data.store_settings(store_id),
        printer: store_data.printer_settings(store_id),
        sms: store_data.sms_settings(store_id),
        created_at: chrono::Utc::now(),
    }
}
