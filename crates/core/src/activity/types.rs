//! Activity domain types.

use std::fmt;

use daura_shared::types::AccountId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Kind of user-reported activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    /// Recyclable waste sold at a collection point. Credits points.
    WasteSale,
    /// Consumption reported for emissions accounting. Informational only.
    EmissionReport,
}

impl ActivityKind {
    /// Returns true when entries of this kind move the account balance.
    ///
    /// Emission reports carry a CO2e value for audit but never credit or
    /// debit points.
    #[must_use]
    pub const fn affects_balance(self) -> bool {
        matches!(self, Self::WasteSale)
    }

    /// Units accepted for submissions of this kind.
    #[must_use]
    pub const fn allowed_units(self) -> &'static [Unit] {
        match self {
            Self::WasteSale => &[Unit::Kg],
            Self::EmissionReport => &[Unit::Kwh, Unit::Liter, Unit::Km],
        }
    }

    /// Stable string form used on the wire and in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::WasteSale => "waste_sale",
            Self::EmissionReport => "emission_report",
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Measurement unit for an activity quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    /// Kilograms (waste weight).
    Kg,
    /// Kilowatt-hours (electricity consumption).
    Kwh,
    /// Liters (fuel consumption).
    Liter,
    /// Kilometers (transport distance).
    Km,
}

impl Unit {
    /// Stable string form used on the wire and in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Kg => "kg",
            Self::Kwh => "kwh",
            Self::Liter => "liter",
            Self::Km => "km",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One activity submission, consumed by the orchestrator.
///
/// Never persisted as-is; an accepted request produces exactly one ledger
/// entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityRequest {
    /// Account the activity belongs to.
    pub account_id: AccountId,
    /// What happened.
    pub kind: ActivityKind,
    /// Category code within the kind: a waste category such as
    /// `pet_plastic`, or a scoring activity id such as `electricity`.
    pub code: String,
    /// How much, in `unit`.
    pub quantity: Decimal,
    /// Measurement unit for `quantity`.
    pub unit: Unit,
    /// Client-supplied token that makes retried submissions safe.
    pub idempotency_key: Option<String>,
}
