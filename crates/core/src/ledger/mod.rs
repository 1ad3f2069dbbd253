//! Ledger entry domain types and the durable-store port.
//!
//! Ledger entries are immutable once written: quantity, unit, rate, and
//! value never change, and entries are never deleted. Only the application
//! status may transition (`recorded` to `applied`, or `recorded` to
//! `failed_apply`). Corrections are new, explicitly-linked reversal
//! entries.

pub mod entry;
pub mod store;
pub mod value;

#[cfg(test)]
mod value_props;

pub use entry::{EntryStatus, LedgerEntry, NewEntry};
pub use store::{
    AccountSnapshot, ApplyOutcome, InsertOutcome, LedgerStore, RejectReason, StoreError,
};
pub use value::{RATE_SCALE, VALUE_SCALE, entry_value, rate_from_total};
