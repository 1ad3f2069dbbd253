//! Orchestrator error types.

use daura_shared::types::{AccountId, EntryId};
use thiserror::Error;

use crate::activity::ValidationError;
use crate::ledger::StoreError;
use crate::pricing::PricingError;

/// Errors that reject an activity submission outright.
///
/// Every variant here means no entry was written and no balance moved. An
/// apply failure after the entry is durable is NOT an error: the
/// submission succeeds with a `recorded` entry and the reconciliation
/// sweep finishes the job.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The request violates a validation rule.
    #[error(transparent)]
    InvalidRequest(#[from] ValidationError),

    /// The account identifier does not resolve to a known account.
    #[error("Unknown account: {0}")]
    UnknownAccount(AccountId),

    /// No active rate covers the category code.
    #[error("No active rate for activity code '{code}'")]
    RateNotFound {
        /// Code that failed to resolve.
        code: String,
    },

    /// The rate source could not produce an answer right now.
    #[error("Rate source unavailable: {0}")]
    RateUnavailable(String),

    /// The durable store rejected or could not complete the append.
    #[error("Persistence failure: {0}")]
    Persistence(String),
}

impl SubmitError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "INVALID_REQUEST",
            Self::UnknownAccount(_) => "UNKNOWN_ACCOUNT",
            Self::RateNotFound { .. } => "RATE_NOT_FOUND",
            Self::RateUnavailable(_) => "RATE_UNAVAILABLE",
            Self::Persistence(_) => "PERSISTENCE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - the submission itself is wrong
            Self::InvalidRequest(_) | Self::UnknownAccount(_) => 400,

            // 404 Not Found - no rate covers the code
            Self::RateNotFound { .. } => 404,

            // 502 Bad Gateway - the upstream rate source failed us
            Self::RateUnavailable(_) => 502,

            // 503 Service Unavailable - the store failed us
            Self::Persistence(_) => 503,
        }
    }

    /// Returns true if the same submission may succeed on retry.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::RateUnavailable(_) | Self::Persistence(_))
    }
}

impl From<PricingError> for SubmitError {
    fn from(err: PricingError) -> Self {
        match err {
            PricingError::RateNotFound { code } => Self::RateNotFound { code },
            PricingError::RateUnavailable(msg) => Self::RateUnavailable(msg),
        }
    }
}

impl From<StoreError> for SubmitError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(msg) => Self::Persistence(msg),
        }
    }
}

/// Errors that reject a reversal.
#[derive(Debug, Error)]
pub enum ReversalError {
    /// No entry exists with this identifier.
    #[error("Ledger entry not found: {0}")]
    EntryNotFound(EntryId),

    /// The entry is not in a state, or of a kind, that can be reversed.
    #[error("Entry {id} cannot be reversed: {reason}")]
    NotReversible {
        /// The entry that was refused.
        id: EntryId,
        /// Why it cannot be reversed.
        reason: &'static str,
    },

    /// The durable store rejected or could not complete the append.
    #[error("Persistence failure: {0}")]
    Persistence(String),
}

impl ReversalError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::EntryNotFound(_) => "ENTRY_NOT_FOUND",
            Self::NotReversible { .. } => "NOT_REVERSIBLE",
            Self::Persistence(_) => "PERSISTENCE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::EntryNotFound(_) => 404,
            Self::NotReversible { .. } => 409,
            Self::Persistence(_) => 503,
        }
    }

    /// Returns true if the same reversal may succeed on retry.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Persistence(_))
    }
}

impl From<StoreError> for ReversalError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(msg) => Self::Persistence(msg),
        }
    }
}
