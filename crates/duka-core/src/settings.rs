//! # Store Settings
//!
//! Closed per-category settings records. Each category has an exhaustive
//! field list so behavior-gating flags are always typed; there are no
//! open-ended dictionaries anywhere in the settings path.
//!
//! Three categories, mirroring how the product configures a store:
//! - [`StoreSettings`] — currency, VAT, receipt text, stock policy
//! - [`PrinterSettings`] — network receipt printer
//! - [`SmsSettings`] — customer/owner SMS notifications

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// =============================================================================
// Store Settings
// =============================================================================

/// Pricing and receipt behavior for one store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StoreSettings {
    /// ISO currency code. The engine only does KES math today, but the
    /// code travels with every receipt.
    #[serde(default = "default_currency")]
    pub currency: String,

    /// VAT rate in basis points (1600 = 16%).
    #[serde(default = "default_tax_rate_bps")]
    pub tax_rate_bps: u32,

    /// Extra header text printed under the store name.
    #[serde(default)]
    pub receipt_header: String,

    /// Footer text printed at the bottom of every receipt.
    #[serde(default = "default_receipt_footer")]
    pub receipt_footer: String,

    /// Alert when product stock falls to its low-stock threshold.
    #[serde(default = "default_true")]
    pub low_stock_alerts: bool,

    /// Permit stock counts to go below zero (e.g. sell-before-restock
    /// kiosks). Off by default.
    #[serde(default)]
    pub allow_negative_stock: bool,
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            currency: default_currency(),
            tax_rate_bps: default_tax_rate_bps(),
            receipt_header: String::new(),
            receipt_footer: default_receipt_footer(),
            low_stock_alerts: true,
            allow_negative_stock: false,
        }
    }
}

// =============================================================================
// Printer Settings
// =============================================================================

/// Network receipt printer configuration for one store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PrinterSettings {
    /// Whether receipt printing is enabled at all.
    #[serde(default)]
    pub enabled: bool,

    /// Friendly printer name shown in settings UI.
    #[serde(default = "default_printer_name")]
    pub printer_name: String,

    /// Printer IP on the shop LAN.
    #[serde(default = "default_printer_ip")]
    pub ip: String,

    /// Raw-socket port. 9100 is the de-facto standard for receipt printers.
    #[serde(default = "default_printer_port")]
    pub port: u16,

    /// Paper width in characters. 32 suits common 58mm thermal rolls.
    #[serde(default = "default_paper_width")]
    pub paper_width: usize,

    /// Print automatically on completed sale instead of on demand.
    #[serde(default)]
    pub auto_print: bool,
}

impl Default for PrinterSettings {
    fn default() -> Self {
        PrinterSettings {
            enabled: false,
            printer_name: default_printer_name(),
            ip: default_printer_ip(),
            port: default_printer_port(),
            paper_width: default_paper_width(),
            auto_print: false,
        }
    }
}

// =============================================================================
// SMS Settings
// =============================================================================

/// SMS notification configuration for one store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SmsSettings {
    /// Whether any SMS sending is enabled.
    #[serde(default)]
    pub enabled: bool,

    /// Registered alphanumeric sender id.
    #[serde(default)]
    pub sender_id: String,

    /// Text the customer a receipt summary after each sale.
    #[serde(default)]
    pub send_receipt: bool,

    /// Text the owner when a product hits its low-stock threshold.
    #[serde(default)]
    pub low_stock_notify: bool,
}

impl Default for SmsSettings {
    fn default() -> Self {
        SmsSettings {
            enabled: false,
            sender_id: String::new(),
            send_receipt: false,
            low_stock_notify: false,
        }
    }
}

// =============================================================================
// Serde Default Functions
// =============================================================================

fn default_currency() -> String {
    "KES".to_string()
}

fn default_tax_rate_bps() -> u32 {
    1600
}

fn default_receipt_footer() -> String {
    "Thank you for shopping with us!".to_string()
}

fn default_printer_name() -> String {
    "Receipt Printer".to_string()
}

fn default_printer_ip() -> String {
    "192.168.1.100".to_string()
}

fn default_printer_port() -> u16 {
    9100
}

fn default_paper_width() -> usize {
    32
}

fn default_true() -> bool {
    true
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_settings_defaults() {
        let settings = StoreSettings::default();
        assert_eq!(settings.currency, "KES");
        assert_eq!(settings.tax_rate_bps, 1600);
        assert!(settings.low_stock_alerts);
        assert!(!settings.allow_negative_stock);
    }

    #[test]
    fn test_printer_settings_defaults() {
        let settings = PrinterSettings::default();
        assert_eq!(settings.port, 9100);
        assert_eq!(settings.paper_width, 32);
        assert!(!settings.enabled);
    }

    #[test]
    fn test_settings_deserialize_with_missing_fields() {
        // Older persisted settings may lack newer fields; serde defaults fill them
        let settings: StoreSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings.currency, "KES");
        assert_eq!(settings.tax_rate_bps, 1600);

        let printer: PrinterSettings = serde_json::from_str(r#"{"ip":"10.0.0.5"}"#).unwrap();
        assert_eq!(printer.ip, "10.0.0.5");
        assert_eq!(printer.port, 9100);
    }
}
