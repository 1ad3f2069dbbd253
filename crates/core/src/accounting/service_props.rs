//! Property-based tests for the accounting orchestrator.
//!
//! Conservation, idempotency, and recoverability hold for arbitrary
//! submission sequences, not just the handful of shapes the unit tests
//! pick.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{Duration, Utc};
use daura_shared::config::LedgerConfig;
use daura_shared::types::AccountId;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::activity::{ActivityKind, ActivityRequest, Unit};
use crate::ledger::{EntryStatus, LedgerStore, entry_value};
use crate::pricing::RateResolver;

use super::service::AccountingService;
use super::testing::{FixedRates, FixedScorer, MemStore};

const RATE: Decimal = dec!(10);

fn arb_quantity() -> impl Strategy<Value = Decimal> {
    // 0.001 kg to 50.000 kg, three decimal places.
    (1i64..=50_000).prop_map(|mantissa| Decimal::new(mantissa, 3))
}

fn make_service(store: &Arc<MemStore>, config: &LedgerConfig) -> AccountingService {
    let resolver = RateResolver::new(
        Arc::new(FixedRates::with("pet_plastic", RATE)),
        Arc::new(FixedScorer(dec!(0))),
        StdDuration::from_millis(50),
    );
    AccountingService::new(store.clone(), resolver, config)
}

fn make_sale(account_id: AccountId, quantity: Decimal, key: Option<String>) -> ActivityRequest {
    ActivityRequest {
        account_id,
        kind: ActivityKind::WasteSale,
        code: "pet_plastic".to_string(),
        quantity,
        unit: Unit::Kg,
        idempotency_key: key,
    }
}

fn block_on<F: Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(future)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    // Property 1: conservation. The final balance equals the sum of the
    // applied entry values, whatever the submission sequence.
    #[test]
    fn prop_balance_equals_sum_of_entry_values(quantities in prop::collection::vec(arb_quantity(), 1..20)) {
        block_on(async {
            let store = Arc::new(MemStore::default());
            let account_id = AccountId::new();
            store.add_account(account_id, dec!(0));
            let service = make_service(&store, &LedgerConfig::default());

            let mut expected = Decimal::ZERO;
            for quantity in quantities {
                let outcome = service
                    .submit(make_sale(account_id, quantity, None))
                    .await
                    .unwrap();
                prop_assert_eq!(outcome.entry.value, entry_value(quantity, RATE));
                expected += outcome.entry.value;
            }

            let account = store.account(account_id).await.unwrap().unwrap();
            prop_assert_eq!(account.balance, expected);
            Ok(())
        })?;
    }

    // Property 2: idempotency. Replaying one key any number of times
    // leaves exactly one entry and credits exactly once.
    #[test]
    fn prop_replays_credit_exactly_once(
        quantity in arb_quantity(),
        replays in 1usize..6,
    ) {
        block_on(async {
            let store = Arc::new(MemStore::default());
            let account_id = AccountId::new();
            store.add_account(account_id, dec!(0));
            let service = make_service(&store, &LedgerConfig::default());

            let mut first_id = None;
            for _ in 0..=replays {
                let outcome = service
                    .submit(make_sale(account_id, quantity, Some("key-1".to_string())))
                    .await
                    .unwrap();
                let id = *first_id.get_or_insert(outcome.entry.id);
                prop_assert_eq!(outcome.entry.id, id);
            }

            prop_assert_eq!(store.entry_count(), 1);
            let account = store.account(account_id).await.unwrap().unwrap();
            prop_assert_eq!(account.balance, entry_value(quantity, RATE));
            Ok(())
        })?;
    }

    // Property 3: recoverability. Entries stranded in `recorded` by apply
    // failures are applied exactly once by the sweep, across batches.
    #[test]
    fn prop_sweep_recovers_stranded_entries_exactly_once(
        quantities in prop::collection::vec(arb_quantity(), 1..20),
    ) {
        block_on(async {
            let store = Arc::new(MemStore::default());
            let account_id = AccountId::new();
            store.add_account(account_id, dec!(0));
            let config = LedgerConfig {
                sweep_batch_size: 7,
                ..LedgerConfig::default()
            };
            let service = make_service(&store, &config);

            store.fail_applies(true);
            let mut expected = Decimal::ZERO;
            for quantity in quantities {
                let outcome = service
                    .submit(make_sale(account_id, quantity, None))
                    .await
                    .unwrap();
                prop_assert_eq!(outcome.entry.status, EntryStatus::Recorded);
                expected += outcome.entry.value;
                store.age_entry(outcome.entry.id, Duration::minutes(10));
            }
            store.fail_applies(false);

            // Batches of 7; sweep until a pass finds nothing.
            loop {
                let report = service.reconcile_once(Utc::now()).await.unwrap();
                prop_assert_eq!(report.applied, report.examined);
                if report.examined == 0 {
                    break;
                }
            }

            prop_assert!(
                store
                    .entries()
                    .iter()
                    .all(|e| e.status == EntryStatus::Applied)
            );
            let account = store.account(account_id).await.unwrap().unwrap();
            prop_assert_eq!(account.balance, expected);
            Ok(())
        })?;
    }
}
