//! Ledger repository: the durable store behind the accounting pipeline.
//!
//! Implements the `LedgerStore` port on Postgres. Idempotent appends lean on
//! the partial unique index over (account_id, idempotency_key); applies run
//! in a transaction that locks the entry row and increments the account
//! balance with a conditional UPDATE, so concurrent applies serialize on row
//! locks instead of losing updates.

use chrono::Utc;
use daura_core::ledger::{
    AccountSnapshot, ApplyOutcome, InsertOutcome, LedgerEntry, LedgerStore, NewEntry, RejectReason,
    StoreError,
};
use daura_shared::types::{AccountId, EntryId, PageRequest};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait,
};

use crate::entities::{
    accounts, ledger_entries,
    sea_orm_active_enums::{ActivityKind, ActivityUnit, EntryStatus, RateSource},
};

/// Repository for ledger entries and account balances.
pub struct LedgerRepository {
    db: DatabaseConnection,
}

impl LedgerRepository {
    /// Creates a new ledger repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists an account's entries, newest first, with the total count.
    pub async fn entries_for_account(
        &self,
        account_id: AccountId,
        page: &PageRequest,
    ) -> Result<(Vec<LedgerEntry>, u64), DbErr> {
        let base = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::AccountId.eq(account_id.into_inner()));

        let total = base.clone().count(&self.db).await?;
        let rows = base
            .order_by_desc(ledger_entries::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok((rows.into_iter().map(entry_to_core).collect(), total))
    }

    /// Entries parked as `failed_apply`, oldest first, for administrative
    /// review.
    pub async fn failed_entries(&self, limit: u64) -> Result<Vec<LedgerEntry>, DbErr> {
        let rows = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::Status.eq(EntryStatus::FailedApply))
            .order_by_asc(ledger_entries::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await?;

        Ok(rows.into_iter().map(entry_to_core).collect())
    }

    async fn find_keyed(
        &self,
        account_id: AccountId,
        key: &str,
    ) -> Result<Option<ledger_entries::Model>, DbErr> {
        ledger_entries::Entity::find()
            .filter(ledger_entries::Column::AccountId.eq(account_id.into_inner()))
            .filter(ledger_entries::Column::IdempotencyKey.eq(key))
            .one(&self.db)
            .await
    }
}

#[async_trait::async_trait]
impl LedgerStore for LedgerRepository {
    async fn account(&self, id: AccountId) -> Result<Option<AccountSnapshot>, StoreError> {
        let account = accounts::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(store_err)?;

        Ok(account.as_ref().map(snapshot_from))
    }

    async fn insert_entry(&self, entry: NewEntry) -> Result<InsertOutcome, StoreError> {
        // Fast path: a keyed retry usually finds its original here.
        if let Some(key) = entry.idempotency_key.as_deref() {
            if let Some(existing) = self
                .find_keyed(entry.account_id, key)
                .await
                .map_err(store_err)?
            {
                return Ok(InsertOutcome::Duplicate(entry_to_core(existing)));
            }
        }

        let inserted = ledger_entries::ActiveModel {
            id: Set(EntryId::new().into_inner()),
            account_id: Set(entry.account_id.into_inner()),
            kind: Set(kind_to_db(entry.kind)),
            code: Set(entry.code.clone()),
            quantity: Set(entry.quantity),
            unit: Set(unit_to_db(entry.unit)),
            rate: Set(entry.rate),
            rate_source: Set(source_to_db(entry.rate_source)),
            priced_at: Set(entry.priced_at.into()),
            value: Set(entry.value),
            status: Set(status_to_db(entry.status)),
            idempotency_key: Set(entry.idempotency_key.clone()),
            reverses: Set(entry.reverses.map(EntryId::into_inner)),
            apply_attempts: Set(0),
            ..Default::default()
        }
        .insert(&self.db)
        .await;

        match inserted {
            Ok(model) => Ok(InsertOutcome::Inserted(entry_to_core(model))),
            Err(err) if is_unique_violation(&err) => {
                // Lost a concurrent race on the idempotency index; the
                // winner's row is the entry for this key.
                let Some(key) = entry.idempotency_key.as_deref() else {
                    return Err(store_err(err));
                };
                let existing = self
                    .find_keyed(entry.account_id, key)
                    .await
                    .map_err(store_err)?
                    .ok_or_else(|| {
                        StoreError::Unavailable(format!(
                            "duplicate key for '{key}' but no winning row"
                        ))
                    })?;
                Ok(InsertOutcome::Duplicate(entry_to_core(existing)))
            }
            Err(err) => Err(store_err(err)),
        }
    }

    async fn entry(&self, id: EntryId) -> Result<Option<LedgerEntry>, StoreError> {
        let entry = ledger_entries::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(store_err)?;

        Ok(entry.map(entry_to_core))
    }

    async fn apply_entry(&self, id: EntryId) -> Result<ApplyOutcome, StoreError> {
        let txn = self.db.begin().await.map_err(store_err)?;

        // Lock the entry row; concurrent applies of the same entry queue here
        // and observe the final status instead of double-crediting.
        let Some(entry) = ledger_entries::Entity::find_by_id(id.into_inner())
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(store_err)?
        else {
            return Err(StoreError::Unavailable(format!("no entry {id}")));
        };

        if entry.status != EntryStatus::Recorded {
            txn.commit().await.map_err(store_err)?;
            return Ok(ApplyOutcome::AlreadyFinal(entry_to_core(entry)));
        }

        let value = entry.value;
        let account_id = entry.account_id;

        // Conditional atomic increment; the second filter is the
        // non-negative balance floor.
        let update = accounts::Entity::update_many()
            .col_expr(
                accounts::Column::Balance,
                Expr::col(accounts::Column::Balance).add(value),
            )
            .col_expr(accounts::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(accounts::Column::Id.eq(account_id))
            .filter(Expr::expr(Expr::col(accounts::Column::Balance).add(value)).gte(Decimal::ZERO))
            .exec(&txn)
            .await
            .map_err(store_err)?;

        if update.rows_affected == 0 {
            let reason = if accounts::Entity::find_by_id(account_id)
                .one(&txn)
                .await
                .map_err(store_err)?
                .is_some()
            {
                RejectReason::WouldOverdraw
            } else {
                RejectReason::MissingAccount
            };
            txn.commit().await.map_err(store_err)?;
            return Ok(ApplyOutcome::Rejected(reason));
        }

        let mut active: ledger_entries::ActiveModel = entry.into();
        active.status = Set(EntryStatus::Applied);
        let applied = active.update(&txn).await.map_err(store_err)?;

        let account = accounts::Entity::find_by_id(account_id)
            .one(&txn)
            .await
            .map_err(store_err)?
            .ok_or_else(|| StoreError::Unavailable(format!("account {account_id} vanished")))?;

        txn.commit().await.map_err(store_err)?;

        Ok(ApplyOutcome::Applied {
            entry: entry_to_core(applied),
            account: snapshot_from(&account),
        })
    }

    async fn stale_recorded(
        &self,
        cutoff: chrono::DateTime<Utc>,
        limit: u64,
    ) -> Result<Vec<LedgerEntry>, StoreError> {
        let rows = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::Status.eq(EntryStatus::Recorded))
            .filter(ledger_entries::Column::CreatedAt.lte(cutoff))
            .order_by_asc(ledger_entries::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(store_err)?;

        Ok(rows.into_iter().map(entry_to_core).collect())
    }

    async fn record_apply_attempt(&self, id: EntryId) -> Result<Option<u32>, StoreError> {
        let txn = self.db.begin().await.map_err(store_err)?;

        let Some(entry) = ledger_entries::Entity::find_by_id(id.into_inner())
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(store_err)?
        else {
            txn.commit().await.map_err(store_err)?;
            return Ok(None);
        };

        if entry.status != EntryStatus::Recorded {
            txn.commit().await.map_err(store_err)?;
            return Ok(None);
        }

        let next = entry.apply_attempts.saturating_add(1);
        let mut active: ledger_entries::ActiveModel = entry.into();
        active.apply_attempts = Set(next);
        active.update(&txn).await.map_err(store_err)?;

        txn.commit().await.map_err(store_err)?;

        Ok(Some(attempts_to_core(next)))
    }

    async fn mark_failed_apply(&self, id: EntryId) -> Result<(), StoreError> {
        let txn = self.db.begin().await.map_err(store_err)?;

        let Some(entry) = ledger_entries::Entity::find_by_id(id.into_inner())
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(store_err)?
        else {
            txn.commit().await.map_err(store_err)?;
            return Ok(());
        };

        if entry.status == EntryStatus::Recorded {
            let mut active: ledger_entries::ActiveModel = entry.into();
            active.status = Set(EntryStatus::FailedApply);
            active.update(&txn).await.map_err(store_err)?;
        }

        txn.commit().await.map_err(store_err)?;

        Ok(())
    }
}

// ============================================================================
// Conversion helpers
// ============================================================================

fn store_err(err: DbErr) -> StoreError {
    StoreError::Unavailable(err.to_string())
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// Converts a database row to the core ledger entry.
fn entry_to_core(model: ledger_entries::Model) -> LedgerEntry {
    LedgerEntry {
        id: EntryId::from_uuid(model.id),
        account_id: AccountId::from_uuid(model.account_id),
        kind: kind_to_core(&model.kind),
        code: model.code,
        quantity: model.quantity,
        unit: unit_to_core(&model.unit),
        rate: model.rate,
        rate_source: source_to_core(&model.rate_source),
        priced_at: model.priced_at.with_timezone(&Utc),
        value: model.value,
        status: status_to_core(&model.status),
        idempotency_key: model.idempotency_key,
        reverses: model.reverses.map(EntryId::from_uuid),
        apply_attempts: attempts_to_core(model.apply_attempts),
        created_at: model.created_at.with_timezone(&Utc),
    }
}

/// Converts an account row to the core balance snapshot.
fn snapshot_from(model: &accounts::Model) -> AccountSnapshot {
    AccountSnapshot {
        id: AccountId::from_uuid(model.id),
        balance: model.balance,
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

fn attempts_to_core(attempts: i32) -> u32 {
    u32::try_from(attempts).unwrap_or(0)
}

fn kind_to_db(kind: daura_core::activity::ActivityKind) -> ActivityKind {
    match kind {
        daura_core::activity::ActivityKind::WasteSale => ActivityKind::WasteSale,
        daura_core::activity::ActivityKind::EmissionReport => ActivityKind::EmissionReport,
    }
}

fn kind_to_core(kind: &ActivityKind) -> daura_core::activity::ActivityKind {
    match kind {
        ActivityKind::WasteSale => daura_core::activity::ActivityKind::WasteSale,
        ActivityKind::EmissionReport => daura_core::activity::ActivityKind::EmissionReport,
    }
}

fn unit_to_db(unit: daura_core::activity::Unit) -> ActivityUnit {
    match unit {
        daura_core::activity::Unit::Kg => ActivityUnit::Kg,
        daura_core::activity::Unit::Kwh => ActivityUnit::Kwh,
        daura_core::activity::Unit::Liter => ActivityUnit::Liter,
        daura_core::activity::Unit::Km => ActivityUnit::Km,
    }
}

fn unit_to_core(unit: &ActivityUnit) -> daura_core::activity::Unit {
    match unit {
        ActivityUnit::Kg => daura_core::activity::Unit::Kg,
        ActivityUnit::Kwh => daura_core::activity::Unit::Kwh,
        ActivityUnit::Liter => daura_core::activity::Unit::Liter,
        ActivityUnit::Km => daura_core::activity::Unit::Km,
    }
}

fn status_to_db(status: daura_core::ledger::EntryStatus) -> EntryStatus {
    match status {
        daura_core::ledger::EntryStatus::Recorded => EntryStatus::Recorded,
        daura_core::ledger::EntryStatus::Applied => EntryStatus::Applied,
        daura_core::ledger::EntryStatus::FailedApply => EntryStatus::FailedApply,
    }
}

fn status_to_core(status: &EntryStatus) -> daura_core::ledger::EntryStatus {
    match status {
        EntryStatus::Recorded => daura_core::ledger::EntryStatus::Recorded,
        EntryStatus::Applied => daura_core::ledger::EntryStatus::Applied,
        EntryStatus::FailedApply => daura_core::ledger::EntryStatus::FailedApply,
    }
}

fn source_to_db(source: daura_core::pricing::RateSource) -> RateSource {
    match source {
        daura_core::pricing::RateSource::LocalTable => RateSource::LocalTable,
        daura_core::pricing::RateSource::ExternalService => RateSource::ExternalService,
    }
}

fn source_to_core(source: &RateSource) -> daura_core::pricing::RateSource {
    match source {
        RateSource::LocalTable => daura_core::pricing::RateSource::LocalTable,
        RateSource::ExternalService => daura_core::pricing::RateSource::ExternalService,
    }
}
