//! The accounting orchestrator.
//!
//! Drives one submission through validate, price, append, apply, and runs
//! the reconciliation sweep that finishes entries whose apply step never
//! landed. The orchestrator holds no state of its own; everything durable
//! lives behind the [`LedgerStore`] port.
//!
//! The ordering invariant: the entry append is the commit point. Failures
//! before it reject the submission with no trace; failures after it
//! degrade the outcome to a `recorded` entry that reconciliation applies
//! exactly once later. The balance is derived state and may lag, but it
//! never double-counts an entry and never reflects an entry that does not
//! exist.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use daura_shared::config::LedgerConfig;
use daura_shared::types::EntryId;
use tracing::{error, info, warn};

use crate::activity::{ActivityRequest, validate_request};
use crate::ledger::{
    AccountSnapshot, ApplyOutcome, EntryStatus, InsertOutcome, LedgerEntry, LedgerStore, NewEntry,
    StoreError, entry_value,
};
use crate::pricing::RateResolver;

use super::error::{ReversalError, SubmitError};

/// The result of an accepted submission or reversal.
#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    /// The ledger entry for this submission.
    pub entry: LedgerEntry,
    /// The account after apply, when the entry value is reflected in it.
    ///
    /// `None` when the entry does not move a balance, or while it is still
    /// `recorded` and reconciliation has yet to finish the apply.
    pub balance: Option<AccountSnapshot>,
    /// True when an idempotency key matched an existing entry and nothing
    /// new was written.
    pub replayed: bool,
}

/// Summary of one reconciliation sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Entries examined this sweep.
    pub examined: usize,
    /// Entries whose apply landed this sweep.
    pub applied: usize,
    /// Entries parked as `failed_apply` for review.
    pub parked: usize,
}

/// The accounting orchestrator.
pub struct AccountingService {
    store: Arc<dyn LedgerStore>,
    resolver: RateResolver,
    max_apply_attempts: u32,
    reconcile_grace: Duration,
    sweep_batch_size: u64,
}

impl AccountingService {
    /// Creates the orchestrator over a store and a rate resolver.
    #[must_use]
    pub fn new(store: Arc<dyn LedgerStore>, resolver: RateResolver, config: &LedgerConfig) -> Self {
        let grace = i64::try_from(config.reconcile_grace_secs).unwrap_or(i64::MAX);
        Self {
            store,
            resolver,
            max_apply_attempts: config.max_apply_attempts,
            reconcile_grace: Duration::seconds(grace),
            sweep_batch_size: config.sweep_batch_size,
        }
    }

    /// Processes one activity submission end to end.
    ///
    /// A replayed submission (same account and idempotency key) is priced
    /// again but the fresh quote is discarded; the original entry wins and
    /// is returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError`] when the request is invalid, the account is
    /// unknown, no rate covers the code, the rate source is down, or the
    /// append itself fails. None of these leave an entry behind.
    pub async fn submit(&self, request: ActivityRequest) -> Result<SubmitOutcome, SubmitError> {
        validate_request(&request)?;

        if self.store.account(request.account_id).await?.is_none() {
            return Err(SubmitError::UnknownAccount(request.account_id));
        }

        let quote = self
            .resolver
            .resolve(request.kind, &request.code, request.quantity, request.unit)
            .await?;
        let value = entry_value(request.quantity, quote.rate);

        match self
            .store
            .insert_entry(NewEntry::priced(&request, &quote, value))
            .await?
        {
            InsertOutcome::Inserted(entry) => {
                info!(
                    entry_id = %entry.id,
                    account_id = %entry.account_id,
                    kind = %entry.kind,
                    value = %entry.value,
                    "Ledger entry appended"
                );
                Ok(self.apply_inserted(entry).await)
            }
            InsertOutcome::Duplicate(existing) => {
                info!(
                    entry_id = %existing.id,
                    account_id = %existing.account_id,
                    "Idempotent replay; returning original entry"
                );
                let balance = self.applied_balance(&existing).await;
                Ok(SubmitOutcome {
                    entry: existing,
                    balance,
                    replayed: true,
                })
            }
        }
    }

    /// Appends and applies a correction entry negating `entry_id`.
    ///
    /// Only applied, balance-moving entries can be reversed, and at most
    /// once: the derived idempotency key turns a repeated reversal into a
    /// replay of the first. A reversal the balance cannot absorb stays
    /// `recorded`; the sweep parks it as `failed_apply` for review once
    /// its attempt budget runs out, and the balance never goes negative.
    ///
    /// # Errors
    ///
    /// Returns [`ReversalError`] when the entry is missing, not
    /// reversible, or the store fails.
    pub async fn reverse(&self, entry_id: EntryId) -> Result<SubmitOutcome, ReversalError> {
        let entry = self
            .store
            .entry(entry_id)
            .await?
            .ok_or(ReversalError::EntryNotFound(entry_id))?;

        if !entry.affects_balance() {
            return Err(ReversalError::NotReversible {
                id: entry_id,
                reason: "entry does not move a balance",
            });
        }
        if entry.reverses.is_some() {
            return Err(ReversalError::NotReversible {
                id: entry_id,
                reason: "entry is itself a reversal",
            });
        }
        if entry.status != EntryStatus::Applied {
            return Err(ReversalError::NotReversible {
                id: entry_id,
                reason: "entry value is not reflected in the balance",
            });
        }

        match self.store.insert_entry(NewEntry::reversal_of(&entry)).await? {
            InsertOutcome::Inserted(reversal) => {
                info!(
                    entry_id = %reversal.id,
                    reverses = %entry_id,
                    value = %reversal.value,
                    "Reversal entry appended"
                );
                Ok(self.apply_inserted(reversal).await)
            }
            InsertOutcome::Duplicate(existing) => {
                let balance = self.applied_balance(&existing).await;
                Ok(SubmitOutcome {
                    entry: existing,
                    balance,
                    replayed: true,
                })
            }
        }
    }

    /// Runs one reconciliation sweep at `now`.
    ///
    /// Picks up entries that have sat in `recorded` beyond the grace
    /// period, retries their apply, and parks entries whose attempt budget
    /// is exhausted. The attempt counter is bumped before each retry, so a
    /// crash mid-sweep still consumes budget; entries another writer
    /// finished since the scan are skipped unharmed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store fails mid-sweep. The next
    /// sweep resumes from whatever is still `recorded`.
    pub async fn reconcile_once(&self, now: DateTime<Utc>) -> Result<SweepReport, StoreError> {
        let cutoff = now - self.reconcile_grace;
        let stale = self
            .store
            .stale_recorded(cutoff, self.sweep_batch_size)
            .await?;

        let mut report = SweepReport::default();
        for entry in stale {
            report.examined += 1;

            let Some(attempt) = self.store.record_apply_attempt(entry.id).await? else {
                continue;
            };

            match self.store.apply_entry(entry.id).await? {
                ApplyOutcome::Applied { entry, account } => {
                    report.applied += 1;
                    info!(
                        entry_id = %entry.id,
                        account_id = %entry.account_id,
                        balance = %account.balance,
                        attempt,
                        "Reconciliation applied stale entry"
                    );
                }
                ApplyOutcome::AlreadyFinal(_) => {}
                ApplyOutcome::Rejected(reason) => {
                    if attempt >= self.max_apply_attempts {
                        self.store.mark_failed_apply(entry.id).await?;
                        report.parked += 1;
                        error!(
                            entry_id = %entry.id,
                            account_id = %entry.account_id,
                            ?reason,
                            attempt,
                            "Apply attempts exhausted; entry parked for review"
                        );
                    } else {
                        warn!(
                            entry_id = %entry.id,
                            ?reason,
                            attempt,
                            "Apply refused; will retry next sweep"
                        );
                    }
                }
            }
        }

        Ok(report)
    }

    /// Runs the synchronous apply for a freshly inserted entry.
    ///
    /// The entry is durable by the time this runs, so nothing here is
    /// allowed to fail the submission: an apply error degrades the outcome
    /// to `recorded` and leaves the rest to the sweep.
    async fn apply_inserted(&self, entry: LedgerEntry) -> SubmitOutcome {
        if !entry.affects_balance() {
            return SubmitOutcome {
                entry,
                balance: None,
                replayed: false,
            };
        }

        // Detached task: a caller that hangs up mid-request must not
        // cancel an apply once the entry is durable.
        let store = Arc::clone(&self.store);
        let entry_id = entry.id;
        let apply = tokio::spawn(async move { store.apply_entry(entry_id).await });

        match apply.await {
            Ok(Ok(ApplyOutcome::Applied { entry, account })) => SubmitOutcome {
                entry,
                balance: Some(account),
                replayed: false,
            },
            Ok(Ok(ApplyOutcome::AlreadyFinal(entry))) => {
                let balance = self.applied_balance(&entry).await;
                SubmitOutcome {
                    entry,
                    balance,
                    replayed: false,
                }
            }
            Ok(Ok(ApplyOutcome::Rejected(reason))) => {
                warn!(
                    entry_id = %entry.id,
                    account_id = %entry.account_id,
                    ?reason,
                    "Apply refused; entry stays recorded for reconciliation"
                );
                SubmitOutcome {
                    entry,
                    balance: None,
                    replayed: false,
                }
            }
            Ok(Err(err)) => {
                error!(
                    entry_id = %entry.id,
                    account_id = %entry.account_id,
                    error = %err,
                    "Apply failed after append; reconciliation will retry"
                );
                SubmitOutcome {
                    entry,
                    balance: None,
                    replayed: false,
                }
            }
            Err(err) => {
                error!(
                    entry_id = %entry.id,
                    account_id = %entry.account_id,
                    error = %err,
                    "Apply task aborted after append; reconciliation will retry"
                );
                SubmitOutcome {
                    entry,
                    balance: None,
                    replayed: false,
                }
            }
        }
    }

    /// Best-effort account snapshot for entries whose value is already
    /// reflected in the balance. Fetch failures degrade to `None`; the
    /// entry status is the authoritative signal.
    async fn applied_balance(&self, entry: &LedgerEntry) -> Option<AccountSnapshot> {
        if !entry.affects_balance() || entry.status != EntryStatus::Applied {
            return None;
        }
        match self.store.account(entry.account_id).await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!(
                    account_id = %entry.account_id,
                    error = %err,
                    "Balance fetch after apply failed; omitting it from the outcome"
                );
                None
            }
        }
    }
}
