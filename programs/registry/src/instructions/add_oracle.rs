//! AddOracle instruction - register a rate reporter

use crate::guard::{require_authority, Caller};
use crate::state::{OracleEntry, RateData};
use pinocchio::pubkey::Pubkey;
use pinocchio_log::log;
use ratebook_common::RegistryError;

/// Process add oracle instruction
///
/// Appends `{name, pubkey, rate: 0, last_updated: 0}` to the oracle table.
/// Checks run in order: authority, delegation, name, duplicate, capacity.
/// Any failure leaves the record untouched.
///
/// # Returns
/// Index of the new entry
pub fn process_add_oracle(
    record: &mut RateData,
    caller: &Caller,
    name: &[u8],
    pubkey: Pubkey,
) -> Result<usize, RegistryError> {
    require_authority(record, caller)?;
    record.delegation_state()?.check_admin_writable()?;

    let entry = OracleEntry::new(name, pubkey)?;
    let idx = record.push_oracle(entry)?;
    record.bump_revision();

    log!("Oracle {} registered at index {}", entry.name(), idx);
    Ok(idx)
}

#[cfg(test)]
#[path = "add_oracle_test.rs"]
mod add_oracle_test;
