//! Printer error types.

use thiserror::Error;

/// Result type alias for printer operations.
pub type PrintResult<T> = Result<T, PrintError>;

/// Why a receipt failed to reach the printer.
#[derive(Debug, Error)]
pub enum PrintError {
    /// The printer address in settings could not be parsed.
    #[error("Invalid printer address '{0}'")]
    InvalidAddress(String),

    /// Printing is disabled in store settings.
    #[error("Printing is disabled")]
    Disabled,

    /// The printer did not answer within the timeout.
    #[error("Printer connection timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Socket-level failure while connecting or writing.
    #[error("Printer I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PrintError::InvalidAddress("not-an-ip:abc".into());
        assert_eq!(err.to_string(), "Invalid printer address 'not-an-ip:abc'");
    }
}
