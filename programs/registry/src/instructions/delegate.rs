//! Delegate instruction - hand rate updates to the ephemeral context

use crate::guard::{require_authority, Caller};
use crate::state::{DelegationState, RateData};
use pinocchio::msg;
use ratebook_common::RegistryError;

/// Process delegate instruction
///
/// Authority only. Moves the record to `Delegated`: from here on the durable
/// ledger refuses oracle updates and registrations until undelegation.
pub fn process_delegate(record: &mut RateData, caller: &Caller, now: i64) -> Result<(), RegistryError> {
    require_authority(record, caller)?;

    if record.delegation_state()? == DelegationState::Delegated {
        msg!("Error: Rate registry already delegated");
        return Err(RegistryError::AlreadyDelegated);
    }

    record.set_delegation_state(DelegationState::Delegated);
    record.delegated_at = now;
    record.bump_revision();

    msg!("Rate registry delegated");
    Ok(())
}
