//! # Receipt Rendering
//!
//! Renders a transaction as a fixed-width plain-text block: store header,
//! itemized lines, total, VAT content, payment breakdown, footer. The block
//! goes either to a display surface for manual printing or straight to a
//! network receipt printer as raw bytes.
//!
//! Pure string building - the printer I/O lives in `duka-printer`.

use crate::money::Money;
use crate::types::{Attendant, Customer, Store, TaxRate, Transaction};

/// Minimum usable paper width; narrower settings are clamped up to this.
const MIN_WIDTH: usize = 20;

/// Renders the printable receipt text for a transaction.
///
/// `customer` and `attendant` are the resolved references from the store's
/// data; either may be absent (e.g. a sale recorded before the attendant
/// list synced) and the corresponding line is simply omitted.
pub fn render_receipt(
    store: &Store,
    tx: &Transaction,
    customer: Option<&Customer>,
    attendant: Option<&Attendant>,
) -> String {
    let width = store.printer.paper_width.max(MIN_WIDTH);
    let mut lines: Vec<String> = Vec::new();

    // ----- Header -----
    lines.push(center(&store.name.to_uppercase(), width));
    if !store.address.is_empty() {
        lines.push(center(&store.address, width));
    }
    if !store.phone.is_empty() {
        lines.push(center(&format!("Tel: {}", store.phone), width));
    }
    if !store.settings.receipt_header.is_empty() {
        for wrapped in wrap(&store.settings.receipt_header, width) {
            lines.push(center(&wrapped, width));
        }
    }
    lines.push(divider(width));

    // ----- Sale metadata -----
    lines.push(format!("Receipt: {}", short_id(&tx.id)));
    lines.push(format!("Date: {}", tx.created_at.format("%Y-%m-%d %H:%M")));
    if let Some(attendant) = attendant {
        lines.push(truncate(&format!("Attendant: {}", attendant.name), width));
    }
    if let Some(customer) = customer {
        lines.push(truncate(&format!("Customer: {}", customer.name), width));
    }
    lines.push(divider(width));

    // ----- Line items -----
    for item in &tx.items {
        lines.push(truncate(&item.name_snapshot, width));
        let qty_col = format!("  {} x {}", item.quantity, item.unit_price());
        lines.push(two_col(&qty_col, &item.line_total().to_string(), width));
    }
    lines.push(divider(width));

    // ----- Totals -----
    lines.push(two_col("TOTAL", &tx.total().to_string(), width));
    let rate = TaxRate::from_bps(store.settings.tax_rate_bps);
    if !rate.is_zero() {
        // Prices are VAT-inclusive; show the tax content for compliance
        let vat = vat_content(tx.total(), rate);
        let label = format!("VAT ({}) incl.", format_rate(rate));
        lines.push(two_col(&label, &vat.to_string(), width));
    }
    lines.push(divider(width));

    // ----- Payment breakdown -----
    for split in &tx.payments {
        lines.push(two_col(split.method.label(), &split.amount().to_string(), width));
        if let Some(reference) = &split.reference {
            lines.push(truncate(&format!("  Ref: {}", reference), width));
        }
    }
    lines.push(divider(width));

    // ----- Footer -----
    if !store.settings.receipt_footer.is_empty() {
        for wrapped in wrap(&store.settings.receipt_footer, width) {
            lines.push(center(&wrapped, width));
        }
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Tax content of a VAT-inclusive amount: total × rate / (1 + rate).
fn vat_content(total: Money, rate: TaxRate) -> Money {
    let bps = rate.bps() as i128;
    let cents = total.cents() as i128;
    let vat = (cents * bps + (10000 + bps) / 2) / (10000 + bps);
    Money::from_cents(vat as i64)
}

/// "1600 bps" -> "16%", "1625 bps" -> "16.25%".
fn format_rate(rate: TaxRate) -> String {
    if rate.bps() % 100 == 0 {
        format!("{}%", rate.bps() / 100)
    } else {
        format!("{:.2}%", rate.percentage())
    }
}

fn short_id(id: &str) -> String {
    id.chars().take(8).collect()
}

fn divider(width: usize) -> String {
    "-".repeat(width)
}

/// Centers text within the paper width. Text wider than the paper is
/// returned unchanged (the printer clips it).
fn center(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        return text.to_string();
    }
    let pad = (width - len) / 2;
    format!("{}{}", " ".repeat(pad), text)
}

/// Truncates text to the paper width on a character boundary.
fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        text.chars().take(width).collect()
    }
}

/// Left text, right-aligned value, padded to exactly `width` where possible.
/// If both sides cannot fit, the left side is truncated to keep the value
/// column intact - amounts must never be clipped.
fn two_col(left: &str, right: &str, width: usize) -> String {
    let right_len = right.chars().count();
    let max_left = width.saturating_sub(right_len + 1);
    let left: String = if left.chars().count() > max_left {
        left.chars().take(max_left).collect()
    } else {
        left.to_string()
    };
    let pad = width.saturating_sub(left.chars().count() + right_len);
    format!("{}{}{}", left, " ".repeat(pad), right)
}

/// Greedy word wrap; a single word longer than the width is hard-split.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if word_len > width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let chars: Vec<char> = word.chars().collect();
            for chunk in chars.chunks(width) {
                lines.push(chunk.iter().collect());
            }
            continue;
        }
        let current_len = current.chars().count();
        if current.is_empty() {
            current = word.to_string();
        } else if current_len + 1 + word_len <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{PrinterSettings, SmsSettings, StoreSettings};
    use crate::types::{
        PaymentMethod, PaymentSplit, TransactionItem, TransactionStatus, UserRole,
    };
    use chrono::Utc;

    fn test_store(width: usize) -> Store {
        Store {
            id: "s1".to_string(),
            name: "Mama Njeri Shop".to_string(),
            address: "Kawangware, Nairobi".to_string(),
            phone: "+254712345678".to_string(),
            email: None,
            is_active: true,
            settings: StoreSettings::default(),
            printer: PrinterSettings {
                paper_width: width,
                ..Default::default()
            },
            sms: SmsSettings::default(),
            created_at: Utc::now(),
        }
    }

    fn test_transaction() -> Transaction {
        Transaction {
            id: "7f3a9b21-0000-0000-0000-000000000000".to_string(),
            store_id: "s1".to_string(),
            items: vec![
                TransactionItem {
                    product_id: "p1".to_string(),
                    name_snapshot: "Soda 300ml".to_string(),
                    unit_price_cents: 5500,
                    quantity: 2,
                    line_total_cents: 11000,
                },
                TransactionItem {
                    product_id: "p2".to_string(),
                    name_snapshot: "Maize Flour 2kg".to_string(),
                    unit_price_cents: 15500,
                    quantity: 1,
                    line_total_cents: 15500,
                },
            ],
            total_cents: 26500,
            customer_id: crate::WALK_IN_CUSTOMER_ID.to_string(),
            attendant_id: "a1".to_string(),
            payments: vec![
                PaymentSplit {
                    method: PaymentMethod::Cash,
                    amount_cents: 20000,
                    reference: None,
                },
                PaymentSplit {
                    method: PaymentMethod::Mpesa,
                    amount_cents: 6500,
                    reference: Some("SFC8XK2Q1P".to_string()),
                },
            ],
            status: TransactionStatus::Completed,
            created_at: Utc::now(),
        }
    }

    fn test_attendant() -> Attendant {
        Attendant {
            id: "a1".to_string(),
            name: "Grace".to_string(),
            phone: "+254700000001".to_string(),
            role: UserRole::Staff,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_receipt_fits_paper_width() {
        let store = test_store(32);
        let customer = Customer::walk_in(Utc::now());
        let text = render_receipt(&store, &test_transaction(), Some(&customer), Some(&test_attendant()));

        for line in text.lines() {
            assert!(
                line.chars().count() <= 32,
                "line exceeds paper width: {:?}",
                line
            );
        }
    }

    #[test]
    fn test_receipt_contains_expected_sections() {
        let store = test_store(32);
        let text = render_receipt(&store, &test_transaction(), None, Some(&test_attendant()));

        assert!(text.contains("MAMA NJERI SHOP"));
        assert!(text.contains("Soda 300ml"));
        assert!(text.contains("TOTAL"));
        assert!(text.contains("KSh 265.00"));
        assert!(text.contains("CASH"));
        assert!(text.contains("M-PESA"));
        assert!(text.contains("Ref: SFC8XK2Q1P"));
        assert!(text.contains("VAT (16%) incl."));
        assert!(text.contains("Thank you for shopping with us!"));
        // No customer was resolved, so no customer line
        assert!(!text.contains("Customer:"));
    }

    #[test]
    fn test_total_right_aligned() {
        let store = test_store(32);
        let text = render_receipt(&store, &test_transaction(), None, None);
        let total_line = text
            .lines()
            .find(|l| l.starts_with("TOTAL"))
            .expect("total line present");
        assert_eq!(total_line.chars().count(), 32);
        assert!(total_line.ends_with("KSh 265.00"));
    }

    #[test]
    fn test_vat_content_inclusive_math() {
        // KSh 116.00 gross at 16% -> KSh 16.00 tax content
        let vat = vat_content(Money::from_cents(11600), TaxRate::from_bps(1600));
        assert_eq!(vat.cents(), 1600);
    }

    #[test]
    fn test_long_product_name_truncated() {
        let store = test_store(24);
        let mut tx = test_transaction();
        tx.items[0].name_snapshot =
            "Extremely Long Product Name That Never Ends 500ml".to_string();
        let text = render_receipt(&store, &tx, None, None);
        for line in text.lines() {
            assert!(line.chars().count() <= 24);
        }
    }

    #[test]
    fn test_wrap_splits_on_words() {
        let lines = wrap("Thank you for shopping with us!", 16);
        assert_eq!(lines, vec!["Thank you for", "shopping with", "us!"]);
    }
}
