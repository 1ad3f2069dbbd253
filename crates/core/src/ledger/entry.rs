//! Ledger entry domain types.

use std::fmt;

use chrono::{DateTime, Utc};
use daura_shared::types::{AccountId, EntryId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::activity::{ActivityKind, ActivityRequest, Unit};
use crate::pricing::{RateQuote, RateSource};

/// Application status of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    /// Durably recorded; the balance does not reflect it yet.
    Recorded,
    /// The value is reflected in the balance, or there was nothing to apply.
    Applied,
    /// Apply attempts exhausted; parked for administrative review.
    FailedApply,
}

impl EntryStatus {
    /// Stable string form used on the wire and in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Recorded => "recorded",
            Self::Applied => "applied",
            Self::FailedApply => "failed_apply",
        }
    }

    /// Returns true when no further transition is possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Applied | Self::FailedApply)
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable accounting record of one priced activity.
///
/// Sign convention on `value`: positive credits the account, negative
/// debits it. Emission reports carry their CO2e total as `value` but never
/// touch a balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Unique identifier, generated at creation.
    pub id: EntryId,
    /// Account the entry belongs to.
    pub account_id: AccountId,
    /// Kind of activity that produced the entry.
    pub kind: ActivityKind,
    /// Category code within the kind.
    pub code: String,
    /// Reported quantity.
    pub quantity: Decimal,
    /// Unit of the quantity.
    pub unit: Unit,
    /// Per-unit rate applied at pricing time.
    pub rate: Decimal,
    /// Where the rate came from.
    pub rate_source: RateSource,
    /// When the rate was resolved.
    pub priced_at: DateTime<Utc>,
    /// Computed value: quantity x rate, signed.
    pub value: Decimal,
    /// Application status.
    pub status: EntryStatus,
    /// Client idempotency key, when one was supplied.
    pub idempotency_key: Option<String>,
    /// The entry this one reverses, for correction entries.
    pub reverses: Option<EntryId>,
    /// Apply attempts consumed by the reconciliation sweep.
    pub apply_attempts: u32,
    /// When the entry was written.
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Returns true when this entry's value is meant to move the balance.
    #[must_use]
    pub const fn affects_balance(&self) -> bool {
        self.kind.affects_balance()
    }
}

/// Input for appending a ledger entry.
#[derive(Debug, Clone)]
pub struct NewEntry {
    /// Account the entry belongs to.
    pub account_id: AccountId,
    /// Kind of activity.
    pub kind: ActivityKind,
    /// Category code within the kind.
    pub code: String,
    /// Reported quantity.
    pub quantity: Decimal,
    /// Unit of the quantity.
    pub unit: Unit,
    /// Per-unit rate applied at pricing time.
    pub rate: Decimal,
    /// Where the rate came from.
    pub rate_source: RateSource,
    /// When the rate was resolved.
    pub priced_at: DateTime<Utc>,
    /// Computed value, signed.
    pub value: Decimal,
    /// Status the entry is born with.
    pub status: EntryStatus,
    /// Client idempotency key, when one was supplied.
    pub idempotency_key: Option<String>,
    /// The entry this one reverses, for correction entries.
    pub reverses: Option<EntryId>,
}

impl NewEntry {
    /// Builds the insert input for a freshly priced submission.
    ///
    /// Entries that do not move a balance are born `applied`; there is
    /// nothing further to do for them.
    #[must_use]
    pub fn priced(request: &ActivityRequest, quote: &RateQuote, value: Decimal) -> Self {
        let status = if request.kind.affects_balance() {
            EntryStatus::Recorded
        } else {
            EntryStatus::Applied
        };

        Self {
            account_id: request.account_id,
            kind: request.kind,
            code: request.code.clone(),
            quantity: request.quantity,
            unit: request.unit,
            rate: quote.rate,
            rate_source: quote.source,
            priced_at: quote.resolved_at,
            value,
            status,
            idempotency_key: request.idempotency_key.clone(),
            reverses: None,
        }
    }

    /// Builds the insert input for a reversal of `entry`.
    ///
    /// The reversal negates the original value at the original rate; it is
    /// never re-priced. The derived idempotency key makes reversal
    /// idempotent: one correction per entry.
    #[must_use]
    pub fn reversal_of(entry: &LedgerEntry) -> Self {
        Self {
            account_id: entry.account_id,
            kind: entry.kind,
            code: entry.code.clone(),
            quantity: entry.quantity,
            unit: entry.unit,
            rate: entry.rate,
            rate_source: entry.rate_source,
            priced_at: Utc::now(),
            value: -entry.value,
            status: EntryStatus::Recorded,
            idempotency_key: Some(Self::reversal_key(entry.id)),
            reverses: Some(entry.id),
        }
    }

    /// The idempotency key reserved for the reversal of `entry_id`.
    #[must_use]
    pub fn reversal_key(entry_id: EntryId) -> String {
        format!("reversal:{entry_id}")
    }
}
