//! In-memory collaborators for orchestrator tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use daura_shared::types::{AccountId, EntryId};
use rust_decimal::Decimal;

use crate::ledger::{
    AccountSnapshot, ApplyOutcome, EntryStatus, InsertOutcome, LedgerEntry, LedgerStore, NewEntry,
    RejectReason, StoreError,
};
use crate::pricing::{EmissionScorer, PricingError, RateLookup, ScoringError, ScoringRequest};

/// In-memory [`LedgerStore`] with the same observable semantics as the SQL
/// implementation: unique (account, idempotency key), atomic apply with a
/// non-negative balance guard, monotone status transitions.
#[derive(Default)]
pub(crate) struct MemStore {
    inner: Mutex<Inner>,
    fail_apply: AtomicBool,
}

#[derive(Default)]
struct Inner {
    accounts: HashMap<AccountId, AccountSnapshot>,
    entries: Vec<LedgerEntry>,
}

impl MemStore {
    pub fn add_account(&self, id: AccountId, balance: Decimal) {
        let mut inner = self.inner.lock().unwrap();
        inner.accounts.insert(
            id,
            AccountSnapshot {
                id,
                balance,
                updated_at: Utc::now(),
            },
        );
    }

    pub fn set_balance(&self, id: AccountId, balance: Decimal) {
        let mut inner = self.inner.lock().unwrap();
        let account = inner.accounts.get_mut(&id).unwrap();
        account.balance = balance;
    }

    /// Makes every following `apply_entry` call fail with a store error.
    pub fn fail_applies(&self, fail: bool) {
        self.fail_apply.store(fail, Ordering::SeqCst);
    }

    pub fn entry_count(&self) -> usize {
        self.inner.lock().unwrap().entries.len()
    }

    pub fn entries(&self) -> Vec<LedgerEntry> {
        self.inner.lock().unwrap().entries.clone()
    }

    /// Backdates an entry so the sweep's grace period has elapsed for it.
    pub fn age_entry(&self, id: EntryId, by: Duration) {
        let mut inner = self.inner.lock().unwrap();
        let entry = inner.entries.iter_mut().find(|e| e.id == id).unwrap();
        entry.created_at -= by;
    }
}

#[async_trait]
impl LedgerStore for MemStore {
    async fn account(&self, id: AccountId) -> Result<Option<AccountSnapshot>, StoreError> {
        Ok(self.inner.lock().unwrap().accounts.get(&id).cloned())
    }

    async fn insert_entry(&self, entry: NewEntry) -> Result<InsertOutcome, StoreError> {
        let mut inner = self.inner.lock().unwrap();

        if let Some(key) = entry.idempotency_key.as_deref() {
            if let Some(existing) = inner
                .entries
                .iter()
                .find(|e| e.account_id == entry.account_id && e.idempotency_key.as_deref() == Some(key))
            {
                return Ok(InsertOutcome::Duplicate(existing.clone()));
            }
        }

        let row = LedgerEntry {
            id: EntryId::new(),
            account_id: entry.account_id,
            kind: entry.kind,
            code: entry.code,
            quantity: entry.quantity,
            unit: entry.unit,
            rate: entry.rate,
            rate_source: entry.rate_source,
            priced_at: entry.priced_at,
            value: entry.value,
            status: entry.status,
            idempotency_key: entry.idempotency_key,
            reverses: entry.reverses,
            apply_attempts: 0,
            created_at: Utc::now(),
        };
        inner.entries.push(row.clone());
        Ok(InsertOutcome::Inserted(row))
    }

    async fn entry(&self, id: EntryId) -> Result<Option<LedgerEntry>, StoreError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .entries
            .iter()
            .find(|e| e.id == id)
            .cloned())
    }

    async fn apply_entry(&self, id: EntryId) -> Result<ApplyOutcome, StoreError> {
        if self.fail_apply.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected apply failure".to_string()));
        }

        let mut inner = self.inner.lock().unwrap();
        let Some(index) = inner.entries.iter().position(|e| e.id == id) else {
            return Err(StoreError::Unavailable(format!("no entry {id}")));
        };

        if inner.entries[index].status != EntryStatus::Recorded {
            return Ok(ApplyOutcome::AlreadyFinal(inner.entries[index].clone()));
        }

        let account_id = inner.entries[index].account_id;
        let value = inner.entries[index].value;
        let Some(account) = inner.accounts.get(&account_id) else {
            return Ok(ApplyOutcome::Rejected(RejectReason::MissingAccount));
        };
        let next = account.balance + value;
        if next < Decimal::ZERO {
            return Ok(ApplyOutcome::Rejected(RejectReason::WouldOverdraw));
        }

        let account = inner.accounts.get_mut(&account_id).unwrap();
        account.balance = next;
        account.updated_at = Utc::now();
        let account = account.clone();

        inner.entries[index].status = EntryStatus::Applied;
        Ok(ApplyOutcome::Applied {
            entry: inner.entries[index].clone(),
            account,
        })
    }

    async fn stale_recorded(
        &self,
        cutoff: DateTime<Utc>,
        limit: u64,
    ) -> Result<Vec<LedgerEntry>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut stale: Vec<LedgerEntry> = inner
            .entries
            .iter()
            .filter(|e| e.status == EntryStatus::Recorded && e.created_at <= cutoff)
            .cloned()
            .collect();
        stale.sort_by_key(|e| e.created_at);
        stale.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(stale)
    }

    async fn record_apply_attempt(&self, id: EntryId) -> Result<Option<u32>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let Some(entry) = inner.entries.iter_mut().find(|e| e.id == id) else {
            return Ok(None);
        };
        if entry.status != EntryStatus::Recorded {
            return Ok(None);
        }
        entry.apply_attempts += 1;
        Ok(Some(entry.apply_attempts))
    }

    async fn mark_failed_apply(&self, id: EntryId) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(entry) = inner
            .entries
            .iter_mut()
            .find(|e| e.id == id && e.status == EntryStatus::Recorded)
        {
            entry.status = EntryStatus::FailedApply;
        }
        Ok(())
    }
}

/// [`RateLookup`] over a fixed code-to-rate map.
pub(crate) struct FixedRates(pub HashMap<String, Decimal>);

impl FixedRates {
    pub fn with(code: &str, rate: Decimal) -> Self {
        Self(HashMap::from([(code.to_string(), rate)]))
    }

    pub fn empty() -> Self {
        Self(HashMap::new())
    }
}

#[async_trait]
impl RateLookup for FixedRates {
    async fn waste_rate(&self, code: &str) -> Result<Option<Decimal>, PricingError> {
        Ok(self.0.get(code).copied())
    }
}

/// [`EmissionScorer`] returning a fixed CO2e total.
pub(crate) struct FixedScorer(pub Decimal);

#[async_trait]
impl EmissionScorer for FixedScorer {
    async fn score(&self, _request: &ScoringRequest) -> Result<Decimal, ScoringError> {
        Ok(self.0)
    }
}

/// [`EmissionScorer`] that always fails.
pub(crate) struct DownScorer;

#[async_trait]
impl EmissionScorer for DownScorer {
    async fn score(&self, _request: &ScoringRequest) -> Result<Decimal, ScoringError> {
        Err(ScoringError::Transport("connection refused".to_string()))
    }
}
