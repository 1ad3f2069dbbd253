//! Pricing error types.

use thiserror::Error;

/// Errors that can occur while resolving a rate.
///
/// Pricing runs before any durable write, so every variant here means the
/// submission was refused with no trace left behind.
#[derive(Debug, Error)]
pub enum PricingError {
    /// No active rate covers the requested category code.
    #[error("No active rate for activity code '{code}'")]
    RateNotFound {
        /// Code that failed to resolve.
        code: String,
    },

    /// The rate source could not produce an answer right now.
    #[error("Rate source unavailable: {0}")]
    RateUnavailable(String),
}

impl PricingError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::RateNotFound { .. } => "RATE_NOT_FOUND",
            Self::RateUnavailable(_) => "RATE_UNAVAILABLE",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::RateNotFound { .. } => 404,
            Self::RateUnavailable(_) => 502,
        }
    }

    /// Returns true if this error is retryable.
    ///
    /// A missing rate is a catalog fact; retrying the same submission
    /// cannot help. An unavailable source is transient by definition.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::RateUnavailable(_))
    }
}
