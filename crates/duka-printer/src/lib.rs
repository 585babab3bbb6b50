//! # duka-printer: Receipt Printer Transport for Duka POS
//!
//! Gets rendered receipt text (see `duka_core::receipt`) onto paper.
//! Shop thermal printers speak raw text over TCP port 9100; the demo
//! binary prints to the terminal instead.
//!
//! ```rust,ignore
//! use duka_printer::{NetworkPrinter, ReceiptPrinter};
//!
//! let printer = NetworkPrinter::from_settings(&store.printer)?;
//! if printer.is_online().await {
//!     printer.print(&rendered).await?;
//! }
//! ```

pub mod error;
pub mod printer;

pub use error::{PrintError, PrintResult};
pub use printer::{NetworkPrinter, ReceiptPrinter, StdoutPrinter};
