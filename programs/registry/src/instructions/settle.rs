//! Settle / Undelegate instructions - merge ephemeral state back into the
//! durable record

use crate::guard::{require_authority, Caller};
use crate::state::{DelegationState, RateData, SettlementOutcome, SettlementSnapshot};
use pinocchio::msg;
use pinocchio_log::log;
use ratebook_common::RegistryError;

/// Process settle instruction
///
/// Authority only, record must be `Delegated`. Merges `snapshot` and stays
/// delegated. Replays and out-of-order entries are ignored, never applied
/// twice and never regressing an entry.
pub fn process_settle(
    record: &mut RateData,
    caller: &Caller,
    snapshot: &SettlementSnapshot,
) -> Result<SettlementOutcome, RegistryError> {
    require_delegated(record, caller)?;

    let outcome = record.apply_settlement(snapshot);
    log_outcome(&outcome);
    Ok(outcome)
}

/// Process undelegate instruction
///
/// Commits `snapshot` with the same merge as [`process_settle`], then
/// mutation authority returns to the durable ledger. A snapshot that was
/// already committed merges as a no-op.
pub fn process_undelegate(
    record: &mut RateData,
    caller: &Caller,
    snapshot: &SettlementSnapshot,
) -> Result<SettlementOutcome, RegistryError> {
    require_delegated(record, caller)?;

    let outcome = record.apply_settlement(snapshot);
    record.set_delegation_state(DelegationState::Undelegated);
    record.delegated_at = 0;
    record.bump_revision();

    log_outcome(&outcome);
    msg!("Rate registry undelegated");
    Ok(outcome)
}

fn require_delegated(record: &RateData, caller: &Caller) -> Result<(), RegistryError> {
    require_authority(record, caller)?;
    if record.delegation_state()? != DelegationState::Delegated {
        msg!("Error: Rate registry is not delegated");
        return Err(RegistryError::NotDelegated);
    }
    Ok(())
}

fn log_outcome(outcome: &SettlementOutcome) {
    if outcome.replayed {
        msg!("Settlement already applied");
    } else {
        log!(
            "Settled {} entries, {} stale, {} unknown",
            outcome.applied,
            outcome.stale,
            outcome.unknown
        );
    }
}

#[cfg(test)]
#[path = "settle_test.rs"]
mod settle_test;
