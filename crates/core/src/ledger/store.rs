//! The durable-store port for the accounting pipeline.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use daura_shared::types::{AccountId, EntryId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::entry::{LedgerEntry, NewEntry};

/// Errors surfaced by the durable store.
///
/// Missing rows are not errors here; reads return `Option` and writes
/// return outcome enums, so this type only carries genuine store failure.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store rejected or could not complete the operation.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Point-in-time view of an account balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountSnapshot {
    /// Account identifier.
    pub id: AccountId,
    /// Current running balance, in points.
    pub balance: Decimal,
    /// When the balance last changed.
    pub updated_at: DateTime<Utc>,
}

/// Result of appending an entry.
#[derive(Debug, Clone)]
pub enum InsertOutcome {
    /// A new entry was written.
    Inserted(LedgerEntry),
    /// An entry already existed for this (account, idempotency key); it is
    /// returned unchanged.
    Duplicate(LedgerEntry),
}

/// Why an apply attempt was refused without the store failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// No account row exists to increment.
    MissingAccount,
    /// The increment would take the balance below zero.
    WouldOverdraw,
}

/// Result of one apply attempt on a recorded entry.
#[derive(Debug, Clone)]
pub enum ApplyOutcome {
    /// The balance now reflects the entry value.
    Applied {
        /// The entry, now `applied`.
        entry: LedgerEntry,
        /// The account after the increment.
        account: AccountSnapshot,
    },
    /// Another writer already moved the entry out of `recorded`.
    AlreadyFinal(LedgerEntry),
    /// The increment was refused; the entry stays `recorded`.
    Rejected(RejectReason),
}

/// Durable-store port for ledger entries and account balances.
///
/// Implemented by the SeaORM repositories in `daura-db`; tests use an
/// in-memory fake. Implementations must provide read-committed isolation
/// and an atomic increment on the balance column: `apply_entry` must
/// serialize concurrent calls for one account rather than lose an update.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Point-reads an account.
    async fn account(&self, id: AccountId) -> Result<Option<AccountSnapshot>, StoreError>;

    /// Appends an entry, deduplicating on (account, idempotency key).
    async fn insert_entry(&self, entry: NewEntry) -> Result<InsertOutcome, StoreError>;

    /// Point-reads an entry.
    async fn entry(&self, id: EntryId) -> Result<Option<LedgerEntry>, StoreError>;

    /// Atomically applies a recorded entry to its account balance and
    /// flips the entry to `applied` in the same transaction.
    async fn apply_entry(&self, id: EntryId) -> Result<ApplyOutcome, StoreError>;

    /// Entries still `recorded` at or before `cutoff`, oldest first.
    async fn stale_recorded(
        &self,
        cutoff: DateTime<Utc>,
        limit: u64,
    ) -> Result<Vec<LedgerEntry>, StoreError>;

    /// Bumps the apply-attempt counter for a still-recorded entry.
    ///
    /// Returns the new attempt count, or `None` when the entry has already
    /// left `recorded`.
    async fn record_apply_attempt(&self, id: EntryId) -> Result<Option<u32>, StoreError>;

    /// Parks a recorded entry as `failed_apply` for administrative review.
    async fn mark_failed_apply(&self, id: EntryId) -> Result<(), StoreError>;
}
