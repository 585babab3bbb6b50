//! # Tenant Error Types
//!
//! Errors for the session bridge, rate limiter, and billing service.
//!
//! Provider failures cross this boundary as plain strings. The frontend
//! renders these messages directly, so no provider error object (with
//! stack traces or internal request ids) may leak through.

use thiserror::Error;

use duka_store::ProviderError;

/// Result type alias for tenant operations.
pub type TenantResult<T> = Result<T, TenantError>;

/// Tenant error type covering auth, rate limiting, and billing failures.
#[derive(Debug, Error)]
pub enum TenantError {
    // =========================================================================
    // Rate Limiting
    // =========================================================================
    /// The local limiter rejected the attempt before any provider contact.
    #[error("Too many {action} attempts. Try again in {retry_after_secs} seconds")]
    RateLimited {
        action: String,
        retry_after_secs: u64,
    },

    // =========================================================================
    // Auth & Provider
    // =========================================================================
    /// The identity or billing provider failed; holds the plain message
    /// and nothing else.
    #[error("{0}")]
    Provider(String),

    /// An operation that needs a signed-in user ran without one.
    #[error("No active session")]
    NotSignedIn,

    // =========================================================================
    // Billing
    // =========================================================================
    /// A checkout or portal redirect URL failed validation.
    #[error("Invalid redirect URL: {0}")]
    InvalidRedirect(String),
}

impl From<ProviderError> for TenantError {
    fn from(err: ProviderError) -> Self {
        TenantError::Provider(err.to_string())
    }
}

impl From<url::ParseError> for TenantError {
    fn from(err: url::ParseError) -> Self {
        TenantError::InvalidRedirect(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limited_message_names_the_action() {
        let err = TenantError::RateLimited {
            action: "sign-in".to_string(),
            retry_after_secs: 242,
        };
        assert_eq!(
            err.to_string(),
            "Too many sign-in attempts. Try again in 242 seconds"
        );
    }

    #[test]
    fn test_provider_error_flattens_to_message() {
        let err: TenantError = ProviderError::Rejected("bad row".to_string()).into();
        assert_eq!(err.to_string(), "Provider rejected request: bad row");
    }
}
