//! Rate quote types.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Where a rate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateSource {
    /// Deterministic lookup in the local waste rate table.
    LocalTable,
    /// Single-shot call to the emission scoring service.
    ExternalService,
}

impl RateSource {
    /// Stable string form used on the wire and in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LocalTable => "local_table",
            Self::ExternalService => "external_service",
        }
    }
}

impl fmt::Display for RateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The outcome of one rate resolution.
///
/// Ephemeral: embedded into the ledger entry for audit, never stored on
/// its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateQuote {
    /// Multiplier converting quantity into value: points per kg, or CO2e
    /// per unit.
    pub rate: Decimal,
    /// Where the rate came from.
    pub source: RateSource,
    /// When resolution happened.
    pub resolved_at: DateTime<Utc>,
}

impl RateQuote {
    /// Creates a quote stamped with the current time.
    #[must_use]
    pub fn new(rate: Decimal, source: RateSource) -> Self {
        Self {
            rate,
            source,
            resolved_at: Utc::now(),
        }
    }
}
