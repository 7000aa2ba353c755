//! UpdateRate instruction - an oracle reports its rate

use crate::guard::{require_oracle_signer, Caller};
use crate::state::{ExecutionContext, RateData};
use pinocchio_log::log;
use ratebook_common::RegistryError;

/// Process update rate instruction
///
/// The caller must sign and match a registered oracle pubkey. Only that
/// entry's `rate` and `last_updated` change. The value is stored as given;
/// resubmitting the same rate only refreshes `last_updated`.
///
/// On the durable ledger this requires `Undelegated`; in the ephemeral
/// context it requires `Delegated`.
///
/// # Returns
/// Index of the updated entry
pub fn process_update_rate(
    record: &mut RateData,
    caller: &Caller,
    new_rate: u64,
    now: i64,
    ctx: ExecutionContext,
) -> Result<usize, RegistryError> {
    let idx = require_oracle_signer(record, caller)?;
    record.delegation_state()?.check_rate_writable(ctx)?;

    record.oracles[idx].record_rate(new_rate, now);
    record.bump_revision();

    log!("Rate updated by oracle {}: {}", idx, new_rate);
    Ok(idx)
}
