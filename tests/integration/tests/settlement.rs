//! Delegated rate updates and settlement back to the durable ledger

use proptest::prelude::*;
use ratebook_common::RegistryError;
use ratebook_integration_tests::{authority, fresh_registry, oracle_key};
use ratebook_registry::{
    guard::Caller,
    instructions::{process_add_oracle, process_delegate, process_settle, process_undelegate},
    rollup::EphemeralSession,
    DelegationState, RateData, SettledRate, SettlementSnapshot,
};

const T0: i64 = 1_700_000_000;

/// Durable record with `n` oracles, delegated
fn delegated(n: u8) -> RateData {
    let mut record = fresh_registry();
    for i in 0..n {
        process_add_oracle(&mut record, &authority(), b"bank", oracle_key(i)).unwrap();
    }
    process_delegate(&mut record, &authority(), T0).unwrap();
    record
}

#[test]
fn test_ephemeral_updates_reach_durable_on_settle() {
    let mut durable = delegated(2);
    let mut session = EphemeralSession::open(&durable).unwrap();

    session.update_rate(&Caller::signer(oracle_key(0)), 1450, T0 + 1).unwrap();
    session.update_rate(&Caller::signer(oracle_key(1)), 1470, T0 + 2).unwrap();
    session.update_rate(&Caller::signer(oracle_key(0)), 1455, T0 + 3).unwrap();

    // Durable copy is untouched until settlement
    assert_eq!(durable.oracles()[0].rate, 0);

    let outcome = process_settle(&mut durable, &authority(), &session.snapshot()).unwrap();

    assert_eq!(outcome.applied, 2);
    assert_eq!(durable.oracles()[0].rate, 1455);
    assert_eq!(durable.oracles()[0].last_updated, T0 + 3);
    assert_eq!(durable.oracles()[1].rate, 1470);
    assert_eq!(durable.revision, session.record().revision);
    assert!(durable.is_delegated());
}

#[test]
fn test_settle_twice_equals_settle_once() {
    let mut once = delegated(3);
    let mut session = EphemeralSession::open(&once).unwrap();
    session.update_rate(&Caller::signer(oracle_key(2)), 999, T0 + 5).unwrap();
    let snapshot = session.snapshot();
    let mut twice = once;

    process_settle(&mut once, &authority(), &snapshot).unwrap();
    process_settle(&mut twice, &authority(), &snapshot).unwrap();
    let replay = process_settle(&mut twice, &authority(), &snapshot).unwrap();

    assert!(replay.replayed);
    assert_eq!(once.as_bytes(), twice.as_bytes());
}

#[test]
fn test_out_of_order_snapshots_never_regress() {
    let mut durable = delegated(1);
    let mut session = EphemeralSession::open(&durable).unwrap();
    let oracle = Caller::signer(oracle_key(0));

    session.update_rate(&oracle, 100, T0 + 10).unwrap();
    let older = session.snapshot();
    session.update_rate(&oracle, 200, T0 + 20).unwrap();
    let newer = session.snapshot();

    process_settle(&mut durable, &authority(), &newer).unwrap();
    let outcome = process_settle(&mut durable, &authority(), &older).unwrap();

    assert!(outcome.replayed);
    assert_eq!(durable.oracles()[0].rate, 200);
    assert_eq!(durable.oracles()[0].last_updated, T0 + 20);
}

#[test]
fn test_stale_entry_in_newer_revision_is_ignored() {
    let mut durable = delegated(1);
    durable.oracles[0].record_rate(500, T0 + 100);

    let mut snapshot = SettlementSnapshot::new(durable.revision + 1);
    snapshot
        .push(SettledRate {
            pubkey: oracle_key(0),
            rate: 1,
            last_updated: T0 + 50,
        })
        .unwrap();
    snapshot
        .push(SettledRate {
            pubkey: oracle_key(77),
            rate: 2,
            last_updated: T0 + 60,
        })
        .unwrap();

    let outcome = process_settle(&mut durable, &authority(), &snapshot).unwrap();

    assert_eq!(outcome.stale, 1);
    assert_eq!(outcome.unknown, 1);
    assert_eq!(durable.oracles()[0].rate, 500);
    assert_eq!(durable.oracles().len(), 1);
}

#[test]
fn test_same_second_updates_across_settle_and_undelegate() {
    let mut durable = delegated(1);
    let mut session = EphemeralSession::open(&durable).unwrap();
    let oracle = Caller::signer(oracle_key(0));

    session.update_rate(&oracle, 100, T0 + 7).unwrap();
    process_settle(&mut durable, &authority(), &session.snapshot()).unwrap();

    session.update_rate(&oracle, 200, T0 + 7).unwrap();
    let outcome = process_undelegate(&mut durable, &authority(), &session.snapshot()).unwrap();

    assert_eq!(outcome.applied, 1);
    assert_eq!(outcome.stale, 0);
    assert_eq!(durable.oracles()[0].rate, session.record().oracles()[0].rate);
    assert_eq!(durable.oracles()[0].rate, 200);
    assert!(!durable.is_delegated());
}

#[test]
fn test_undelegate_settles_and_releases() {
    let mut durable = delegated(1);
    let mut session = EphemeralSession::open(&durable).unwrap();
    session.update_rate(&Caller::signer(oracle_key(0)), 1500, T0 + 9).unwrap();

    process_undelegate(&mut durable, &authority(), &session.snapshot()).unwrap();

    assert_eq!(durable.delegation_state(), Ok(DelegationState::Undelegated));
    assert_eq!(durable.delegated_at, 0);
    assert_eq!(durable.oracles()[0].rate, 1500);

    // The ephemeral copy can no longer be reopened
    assert_eq!(
        EphemeralSession::open(&durable).map(|_| ()),
        Err(RegistryError::NotDelegated)
    );
}

#[test]
fn test_settle_rejected_when_not_delegated_or_not_authority() {
    let mut record = fresh_registry();
    let snapshot = record.snapshot();

    assert_eq!(
        process_settle(&mut record, &authority(), &snapshot).map(|_| ()),
        Err(RegistryError::NotDelegated)
    );

    let mut record = delegated(1);
    assert_eq!(
        process_settle(&mut record, &Caller::signer(oracle_key(0)), &snapshot).map(|_| ()),
        Err(RegistryError::Unauthorized)
    );
}

#[test]
fn test_snapshot_wire_form_survives_transport() {
    let durable = delegated(2);
    let mut session = EphemeralSession::open(&durable).unwrap();
    session.update_rate(&Caller::signer(oracle_key(1)), 42, T0 + 1).unwrap();

    let snapshot = session.snapshot();
    let decoded = SettlementSnapshot::unpack(&snapshot.to_bytes()).unwrap();

    assert_eq!(decoded, snapshot);
}

proptest! {
    /// Any order of settlements over a series of snapshots ends at the state of
    /// the newest one.
    #[test]
    fn prop_settle_order_does_not_matter(
        rates in prop::collection::vec((0u8..4, 1u64..1_000_000), 1..20),
        order in prop::collection::vec(any::<prop::sample::Index>(), 1..20),
    ) {
        let base = delegated(4);
        let mut session = EphemeralSession::open(&base).unwrap();
        let mut snapshots = Vec::new();
        for (step, (oracle, rate)) in rates.iter().enumerate() {
            session
                .update_rate(&Caller::signer(oracle_key(*oracle)), *rate, T0 + 1 + step as i64)
                .unwrap();
            snapshots.push(session.snapshot());
        }

        let mut expected = base;
        process_settle(&mut expected, &authority(), snapshots.last().unwrap()).unwrap();

        let mut durable = base;
        for idx in &order {
            process_settle(&mut durable, &authority(), idx.get(&snapshots)).unwrap();
        }
        process_settle(&mut durable, &authority(), snapshots.last().unwrap()).unwrap();

        prop_assert_eq!(durable.as_bytes(), expected.as_bytes());
    }

    /// Settlement never moves an entry's timestamp backwards
    #[test]
    fn prop_settlement_is_monotonic(
        durable_ts in 1i64..1_000,
        settled_ts in 0i64..2_000,
        rate in any::<u64>(),
    ) {
        let mut durable = delegated(1);
        durable.oracles[0].record_rate(7, durable_ts);

        let mut snapshot = SettlementSnapshot::new(durable.revision + 1);
        snapshot.push(SettledRate { pubkey: oracle_key(0), rate, last_updated: settled_ts }).unwrap();
        process_settle(&mut durable, &authority(), &snapshot).unwrap();

        let entry = durable.oracles()[0];
        prop_assert!(entry.last_updated >= durable_ts);
        if settled_ts >= durable_ts {
            prop_assert_eq!(entry.rate, rate);
        } else {
            prop_assert_eq!(entry.rate, 7);
        }
    }
}
