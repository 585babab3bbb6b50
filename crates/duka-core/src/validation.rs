//! # Validation Module
//!
//! Input validation for Duka POS.
//!
//! Validation runs before business logic and before anything is queued for
//! sync, so bad input never reaches durable storage or a remote provider.
//! Field-level failures map 1:1 to user-facing form messages.
//!
//! ## Usage
//! ```rust
//! use duka_core::validation::{validate_name, validate_phone};
//!
//! validate_name("Maize Flour 2kg").unwrap();
//! validate_phone("+254712345678").unwrap();
//! ```

use crate::error::ValidationError;
use crate::types::{NewCustomer, NewProduct, NewSupplier, PaymentMethod, Transaction, TransactionStatus};
use crate::{MAX_ITEM_QUANTITY, MAX_TRANSACTION_ITEMS, WALK_IN_CUSTOMER_ID};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates an entity display name (product, customer, supplier, store).
///
/// ## Rules
/// - Must not be empty after trimming
/// - Must be at most 200 characters
pub fn validate_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a phone number.
///
/// ## Rules
/// - Optional leading `+`
/// - 7 to 15 digits (covers local 07xx and international +254 formats)
///
/// ## Example
/// ```rust
/// use duka_core::validation::validate_phone;
///
/// assert!(validate_phone("+254712345678").is_ok());
/// assert!(validate_phone("0712345678").is_ok());
/// assert!(validate_phone("call me").is_err());
/// ```
pub fn validate_phone(phone: &str) -> ValidationResult<()> {
    let phone = phone.trim();

    if phone.is_empty() {
        return Err(ValidationError::Required {
            field: "phone".to_string(),
        });
    }

    let digits = phone.strip_prefix('+').unwrap_or(phone);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "must contain only digits, optionally prefixed with +".to_string(),
        });
    }

    if digits.len() < 7 || digits.len() > 15 {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "must be 7 to 15 digits".to_string(),
        });
    }

    Ok(())
}

/// Validates a barcode (EAN-13, UPC-A, Code 128 alphanumerics).
///
/// ## Rules
/// - Must not be empty after trimming
/// - Must be at most 32 characters
/// - Alphanumeric characters only
pub fn validate_barcode(barcode: &str) -> ValidationResult<()> {
    let barcode = barcode.trim();

    if barcode.is_empty() {
        return Err(ValidationError::Required {
            field: "barcode".to_string(),
        });
    }

    if barcode.len() > 32 {
        return Err(ValidationError::TooLong {
            field: "barcode".to_string(),
            max: 32,
        });
    }

    if !barcode.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ValidationError::InvalidFormat {
            field: "barcode".to_string(),
            reason: "must contain only letters and digits".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a price in cents. Zero is allowed (free items, promo lines).
pub fn validate_price_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a line item quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a loyalty points balance. Points never go negative.
pub fn validate_loyalty_points(points: i64) -> ValidationResult<()> {
    if points < 0 {
        return Err(ValidationError::OutOfRange {
            field: "loyalty_points".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

// =============================================================================
// Entity Validators
// =============================================================================

/// Validates input for a new product.
pub fn validate_new_product(product: &NewProduct) -> ValidationResult<()> {
    validate_name(&product.name)?;
    validate_price_cents("buying_price", product.buying_price_cents)?;
    validate_price_cents("wholesale_price", product.wholesale_price_cents)?;
    validate_price_cents("retail_price", product.retail_price_cents)?;

    if product.stock < 0 {
        return Err(ValidationError::OutOfRange {
            field: "stock".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    if product.low_stock_threshold < 0 {
        return Err(ValidationError::OutOfRange {
            field: "low_stock_threshold".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    if let Some(barcode) = &product.barcode {
        validate_barcode(barcode)?;
    }

    Ok(())
}

/// Validates input for a new customer.
pub fn validate_new_customer(customer: &NewCustomer) -> ValidationResult<()> {
    validate_name(&customer.name)?;
    validate_phone(&customer.phone)?;
    validate_price_cents("credit_limit", customer.credit_limit_cents)?;
    Ok(())
}

/// Validates input for a new supplier.
pub fn validate_new_supplier(supplier: &NewSupplier) -> ValidationResult<()> {
    validate_name(&supplier.name)?;
    validate_phone(&supplier.phone)?;
    Ok(())
}

/// Validates a transaction before it is appended to the ledger.
///
/// ## Checks
/// ```text
/// ┌─────────────────────────────────────────────────────────────────┐
/// │  1. At least one line item, at most MAX_TRANSACTION_ITEMS       │
/// │  2. Every quantity in 1..=999                                   │
/// │  3. Every line_total == unit_price × quantity                   │
/// │  4. total == sum of line totals                                 │
/// │  5. Completed ⇒ payment splits sum to total                     │
/// │     (shortfall only as an explicit credit split)                │
/// │  6. Credit split ⇒ customer is not the walk-in sentinel         │
/// └─────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_transaction(tx: &Transaction) -> ValidationResult<()> {
    if tx.items.is_empty() {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        });
    }

    if tx.items.len() > MAX_TRANSACTION_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_TRANSACTION_ITEMS as i64,
        });
    }

    let mut computed_total = 0i64;
    for item in &tx.items {
        validate_quantity(item.quantity)?;

        if item.line_total_cents != item.unit_price_cents * item.quantity {
            return Err(ValidationError::InvalidFormat {
                field: "line_total".to_string(),
                reason: format!(
                    "{} x {} != {}",
                    item.unit_price_cents, item.quantity, item.line_total_cents
                ),
            });
        }
        computed_total += item.line_total_cents;
    }

    if computed_total != tx.total_cents {
        return Err(ValidationError::InvalidFormat {
            field: "total".to_string(),
            reason: format!("expected {}, got {}", computed_total, tx.total_cents),
        });
    }

    let has_credit = tx
        .payments
        .iter()
        .any(|p| p.method == PaymentMethod::Credit);
    if has_credit && tx.customer_id == WALK_IN_CUSTOMER_ID {
        return Err(ValidationError::WalkInCredit);
    }

    if tx.status == TransactionStatus::Completed {
        let splits = tx.splits_total_cents();
        if splits != tx.total_cents {
            return Err(ValidationError::SplitMismatch {
                splits_cents: splits,
                total_cents: tx.total_cents,
            });
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PaymentSplit, TransactionItem};
    use chrono::Utc;

    fn test_transaction(total: i64, payments: Vec<PaymentSplit>) -> Transaction {
        Transaction {
            id: "t1".to_string(),
            store_id: "s1".to_string(),
            items: vec![TransactionItem {
                product_id: "p1".to_string(),
                name_snapshot: "Soda 300ml".to_string(),
                unit_price_cents: total,
                quantity: 1,
                line_total_cents: total,
            }],
            total_cents: total,
            customer_id: WALK_IN_CUSTOMER_ID.to_string(),
            attendant_id: "a1".to_string(),
            payments,
            status: TransactionStatus::Completed,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("+254712345678").is_ok());
        assert!(validate_phone("0712345678").is_ok());
        assert!(validate_phone("").is_err());
        assert!(validate_phone("12 34").is_err());
        assert!(validate_phone("123").is_err());
        assert!(validate_phone("+").is_err());
    }

    #[test]
    fn test_validate_barcode() {
        assert!(validate_barcode("6161100402104").is_ok());
        assert!(validate_barcode("ABC123").is_ok());
        assert!(validate_barcode("").is_err());
        assert!(validate_barcode("has space").is_err());
        assert!(validate_barcode(&"9".repeat(40)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_completed_transaction_requires_matching_splits() {
        let ok = test_transaction(
            5000,
            vec![PaymentSplit {
                method: PaymentMethod::Cash,
                amount_cents: 5000,
                reference: None,
            }],
        );
        assert!(validate_transaction(&ok).is_ok());

        let short = test_transaction(
            5000,
            vec![PaymentSplit {
                method: PaymentMethod::Cash,
                amount_cents: 4000,
                reference: None,
            }],
        );
        assert!(matches!(
            validate_transaction(&short),
            Err(ValidationError::SplitMismatch { .. })
        ));
    }

    #[test]
    fn test_walk_in_cannot_take_credit() {
        let tx = test_transaction(
            5000,
            vec![
                PaymentSplit {
                    method: PaymentMethod::Cash,
                    amount_cents: 3000,
                    reference: None,
                },
                PaymentSplit {
                    method: PaymentMethod::Credit,
                    amount_cents: 2000,
                    reference: None,
                },
            ],
        );
        assert!(matches!(
            validate_transaction(&tx),
            Err(ValidationError::WalkInCredit)
        ));
    }

    #[test]
    fn test_credit_shortfall_allowed_for_named_customer() {
        let mut tx = test_transaction(
            5000,
            vec![
                PaymentSplit {
                    method: PaymentMethod::Mpesa,
                    amount_cents: 3000,
                    reference: Some("SFC8XK2Q1P".to_string()),
                },
                PaymentSplit {
                    method: PaymentMethod::Credit,
                    amount_cents: 2000,
                    reference: None,
                },
            ],
        );
        tx.customer_id = "c-regular".to_string();
        assert!(validate_transaction(&tx).is_ok());
    }

    #[test]
    fn test_transaction_total_must_match_items() {
        let mut tx = test_transaction(
            5000,
            vec![PaymentSplit {
                method: PaymentMethod::Cash,
                amount_cents: 5000,
                reference: None,
            }],
        );
        tx.total_cents = 4999;
        tx.payments[0].amount_cents = 4999;
        assert!(validate_transaction(&tx).is_err());
    }

    #[test]
    fn test_empty_transaction_rejected() {
        let mut tx = test_transaction(5000, vec![]);
        tx.items.clear();
        assert!(matches!(
            validate_transaction(&tx),
            Err(ValidationError::Required { .. })
        ));
    }

    #[test]
    fn test_validate_new_product() {
        let good = NewProduct {
            name: "Maize Flour 2kg".to_string(),
            category: "Dry Goods".to_string(),
            buying_price_cents: 12000,
            wholesale_price_cents: 14000,
            retail_price_cents: 15500,
            stock: 40,
            barcode: Some("6161100402104".to_string()),
            low_stock_threshold: 10,
        };
        assert!(validate_new_product(&good).is_ok());

        let mut bad = good.clone();
        bad.retail_price_cents = -1;
        assert!(validate_new_product(&bad).is_err());

        let mut bad = good.clone();
        bad.stock = -5;
        assert!(validate_new_product(&bad).is_err());

        let mut bad = good;
        bad.barcode = Some("not a barcode!".to_string());
        assert!(validate_new_product(&bad).is_err());
    }
}
