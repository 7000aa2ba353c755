//! Registry lifecycle scenarios
//!
//! initialize, register, report, reject, delegate and release, checked against
//! the record after every step.

use ratebook_common::{RegistryError, MAX_ORACLES};
use ratebook_integration_tests::{authority, fresh_registry, oracle_key, AUTHORITY};
use ratebook_registry::{
    guard::Caller,
    instructions::{
        process_add_oracle, process_delegate, process_undelegate, process_update_rate,
    },
    DelegationState, ExecutionContext, RateData,
};

const T0: i64 = 1_700_000_000;

fn snapshot_bytes(record: &RateData) -> Vec<u8> {
    record.as_bytes().to_vec()
}

/// Record after registering X and reporting 1450
fn scenario_a() -> RateData {
    let pk_x = oracle_key(1);

    let mut record = fresh_registry();
    assert_eq!(record.authority, AUTHORITY);
    assert!(record.oracles().is_empty());
    assert_eq!(record.delegation_state(), Ok(DelegationState::Undelegated));

    process_add_oracle(&mut record, &authority(), b"X", pk_x).unwrap();
    let entry = record.oracles()[0];
    assert_eq!(record.oracles().len(), 1);
    assert_eq!(entry.name(), "X");
    assert_eq!(entry.pubkey, pk_x);
    assert_eq!(entry.rate, 0);
    assert_eq!(entry.last_updated, 0);

    process_update_rate(&mut record, &Caller::signer(pk_x), 1450, T0, ExecutionContext::Durable)
        .unwrap();
    let entry = record.oracles()[0];
    assert_eq!(entry.rate, 1450);
    assert!(entry.last_updated > 0);

    record
}

#[test]
fn test_scenario_a_register_and_report() {
    let record = scenario_a();
    assert_eq!(record.oracles()[0].last_updated, T0);
}

#[test]
fn test_scenario_b_unregistered_oracle_rejected() {
    let mut record = scenario_a();
    let before = snapshot_bytes(&record);

    let result = process_update_rate(
        &mut record,
        &Caller::signer(oracle_key(2)),
        1500,
        T0 + 15,
        ExecutionContext::Durable,
    );

    assert_eq!(result, Err(RegistryError::UnauthorizedOracle));
    assert_eq!(snapshot_bytes(&record), before);
}

#[test]
fn test_registered_oracle_must_sign() {
    let mut record = scenario_a();
    let before = snapshot_bytes(&record);

    let result = process_update_rate(
        &mut record,
        &Caller::unsigned(oracle_key(1)),
        1500,
        T0 + 15,
        ExecutionContext::Durable,
    );

    assert_eq!(result, Err(RegistryError::UnauthorizedOracle));
    assert_eq!(snapshot_bytes(&record), before);
}

#[test]
fn test_scenario_c_duplicate_oracle_rejected() {
    let mut record = fresh_registry();
    let pk_x = oracle_key(1);

    process_add_oracle(&mut record, &authority(), b"X", pk_x).unwrap();
    let result = process_add_oracle(&mut record, &authority(), b"X", pk_x);

    assert_eq!(result, Err(RegistryError::OracleAlreadyExists));
    assert_eq!(record.oracles().len(), 1);
}

#[test]
fn test_scenario_d_delegation_round_trip() {
    let mut record = scenario_a();

    process_delegate(&mut record, &authority(), T0 + 30).unwrap();
    assert_eq!(record.delegation_state(), Ok(DelegationState::Delegated));

    assert_eq!(
        process_delegate(&mut record, &authority(), T0 + 31),
        Err(RegistryError::AlreadyDelegated)
    );

    let snapshot = record.snapshot();
    process_undelegate(&mut record, &authority(), &snapshot).unwrap();
    assert_eq!(record.delegation_state(), Ok(DelegationState::Undelegated));

    assert_eq!(
        process_undelegate(&mut record, &authority(), &snapshot).map(|_| ()),
        Err(RegistryError::NotDelegated)
    );
}

#[test]
fn test_admin_operations_require_authority() {
    let mut record = scenario_a();
    let intruder = Caller::signer(oracle_key(9));
    let before = snapshot_bytes(&record);

    assert_eq!(
        process_add_oracle(&mut record, &intruder, b"Z", oracle_key(9)),
        Err(RegistryError::Unauthorized)
    );
    assert_eq!(
        process_delegate(&mut record, &intruder, T0),
        Err(RegistryError::Unauthorized)
    );
    // Right key without a signature
    assert_eq!(
        process_delegate(&mut record, &Caller::unsigned(AUTHORITY), T0),
        Err(RegistryError::Unauthorized)
    );
    assert_eq!(snapshot_bytes(&record), before);
}

#[test]
fn test_durable_ledger_frozen_while_delegated() {
    let mut record = scenario_a();
    process_delegate(&mut record, &authority(), T0 + 30).unwrap();
    let before = snapshot_bytes(&record);

    assert_eq!(
        process_update_rate(
            &mut record,
            &Caller::signer(oracle_key(1)),
            1600,
            T0 + 45,
            ExecutionContext::Durable,
        ),
        Err(RegistryError::AlreadyDelegated)
    );
    assert_eq!(
        process_add_oracle(&mut record, &authority(), b"Y", oracle_key(2)),
        Err(RegistryError::AlreadyDelegated)
    );
    assert_eq!(snapshot_bytes(&record), before);
}

#[test]
fn test_capacity_exceeded() {
    let mut record = fresh_registry();
    for i in 0..MAX_ORACLES as u8 {
        process_add_oracle(&mut record, &authority(), b"bank", oracle_key(i)).unwrap();
    }
    let before = snapshot_bytes(&record);

    assert_eq!(
        process_add_oracle(&mut record, &authority(), b"late", oracle_key(200)),
        Err(RegistryError::CapacityExceeded)
    );
    assert_eq!(snapshot_bytes(&record), before);

    // A duplicate on a full table reports the duplicate
    assert_eq!(
        process_add_oracle(&mut record, &authority(), b"bank", oracle_key(0)),
        Err(RegistryError::OracleAlreadyExists)
    );
}

#[test]
fn test_resubmitting_same_rate_only_refreshes_timestamp() {
    let mut record = scenario_a();
    let pk_x = oracle_key(1);

    process_update_rate(&mut record, &Caller::signer(pk_x), 1450, T0 + 15, ExecutionContext::Durable)
        .unwrap();

    let entry = record.oracles()[0];
    assert_eq!(entry.rate, 1450);
    assert_eq!(entry.last_updated, T0 + 15);
}

#[test]
fn test_record_survives_byte_round_trip() {
    let record = scenario_a();
    let loaded = RateData::load(record.as_bytes()).unwrap();

    assert_eq!(loaded.as_bytes(), record.as_bytes());
    assert_eq!(loaded.oracles()[0].rate, 1450);
}
