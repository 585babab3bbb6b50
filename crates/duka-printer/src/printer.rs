//! # Receipt Printer Transport
//!
//! The [`ReceiptPrinter`] seam and its two implementations: a raw TCP
//! printer for real shop hardware and a stdout printer for the demo.
//!
//! Thermal receipt printers on a shop LAN almost universally accept raw
//! text on port 9100. There is no handshake and no acknowledgement; a
//! successful connect-and-write is as much confirmation as the protocol
//! gives us.

use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use duka_core::PrinterSettings;

use crate::error::{PrintError, PrintResult};

/// How long to wait for the printer to accept a connection and the data.
const PRINT_TIMEOUT: Duration = Duration::from_secs(5);

/// Shorter probe timeout; `is_online` runs from settings screens and
/// must not hang the UI.
const PROBE_TIMEOUT: Duration = Duration::from_millis(500);

// =============================================================================
// Printer Trait
// =============================================================================

/// Where rendered receipt text goes.
#[async_trait]
pub trait ReceiptPrinter: Send + Sync {
    /// Sends one rendered receipt.
    async fn print(&self, text: &str) -> PrintResult<()>;

    /// Cheap reachability probe.
    async fn is_online(&self) -> bool;
}

// =============================================================================
// Network Printer
// =============================================================================

/// Raw-socket printer on the shop LAN.
pub struct NetworkPrinter {
    addr: SocketAddr,
    name: String,
}

impl NetworkPrinter {
    /// Builds a printer from store settings.
    ///
    /// Fails if printing is disabled or the address does not parse;
    /// reachability is not checked here.
    pub fn from_settings(settings: &PrinterSettings) -> PrintResult<Self> {
        if !settings.enabled {
            return Err(PrintError::Disabled);
        }

        let raw = format!("{}:{}", settings.ip, settings.port);
        let addr: SocketAddr = raw
            .parse()
            .map_err(|_| PrintError::InvalidAddress(raw.clone()))?;

        Ok(NetworkPrinter {
            addr,
            name: settings.printer_name.clone(),
        })
    }
}

#[async_trait]
impl ReceiptPrinter for NetworkPrinter {
    async fn print(&self, text: &str) -> PrintResult<()> {
        debug!(printer = %self.name, addr = %self.addr, bytes = text.len(), "Connecting to printer");

        let mut stream = timeout(PRINT_TIMEOUT, TcpStream::connect(self.addr))
            .await
            .map_err(|_| PrintError::Timeout(PRINT_TIMEOUT))??;

        timeout(PRINT_TIMEOUT, async {
            stream.write_all(text.as_bytes()).await?;
            // Paper feed + cut margin after the rendered body.
            stream.write_all(b"\n\n\n").await?;
            stream.flush().await
        })
        .await
        .map_err(|_| PrintError::Timeout(PRINT_TIMEOUT))??;

        info!(printer = %self.name, "Receipt sent");
        Ok(())
    }

    async fn is_online(&self) -> bool {
        match timeout(PROBE_TIMEOUT, TcpStream::connect(self.addr)).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                warn!(addr = %self.addr, error = %e, "Printer unreachable");
                false
            }
            Err(_) => {
                warn!(addr = %self.addr, "Printer probe timed out");
                false
            }
        }
    }
}

// =============================================================================
// Stdout Printer
// =============================================================================

/// Demo-mode printer that writes receipts to the terminal.
#[derive(Debug, Default)]
pub struct StdoutPrinter;

#[async_trait]
impl ReceiptPrinter for StdoutPrinter {
    async fn print(&self, text: &str) -> PrintResult<()> {
        println!("{}", text);
        Ok(())
    }

    async fn is_online(&self) -> bool {
        true
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    fn settings(ip: &str, port: u16) -> PrinterSettings {
        PrinterSettings {
            enabled: true,
            ip: ip.to_string(),
            port,
            ..PrinterSettings::default()
        }
    }

    #[test]
    fn test_disabled_settings_rejected() {
        let mut s = settings("192.168.1.50", 9100);
        s.enabled = false;
        assert!(matches!(
            NetworkPrinter::from_settings(&s),
            Err(PrintError::Disabled)
        ));
    }

    #[test]
    fn test_bad_address_rejected() {
        let s = settings("not an ip", 9100);
        assert!(matches!(
            NetworkPrinter::from_settings(&s),
            Err(PrintError::InvalidAddress(_))
        ));
    }

    #[tokio::test]
    async fn test_print_reaches_fake_printer() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let accept = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut received = Vec::new();
            socket.read_to_end(&mut received).await.unwrap();
            received
        });

        let printer =
            NetworkPrinter::from_settings(&settings("127.0.0.1", addr.port())).unwrap();
        printer.print("TOTAL: KSh 150.00").await.unwrap();

        let received = accept.await.unwrap();
        let text = String::from_utf8(received).unwrap();
        assert!(text.starts_with("TOTAL: KSh 150.00"));
        assert!(text.ends_with("\n\n\n"));
    }

    #[tokio::test]
    async fn test_is_online_probe() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let printer =
            NetworkPrinter::from_settings(&settings("127.0.0.1", addr.port())).unwrap();
        assert!(printer.is_online().await);

        drop(listener);
        // A closed port refuses quickly; the probe reports offline.
        assert!(!printer.is_online().await);
    }

    #[tokio::test]
    async fn test_stdout_printer_always_succeeds() {
        let printer = StdoutPrinter;
        assert!(printer.is_online().await);
        printer.print("demo receipt").await.unwrap();
    }
}
