//! Program-derived address of the registry record

use pinocchio::pubkey::{try_find_program_address, Pubkey};
use ratebook_common::{RegistryError, RATE_DATA_SEED};

/// Derive the record PDA: `["rate_data"]` under `program_id`
///
/// Off-chain callers should use `solana_sdk::pubkey::Pubkey::find_program_address`
/// with the same seed; this version relies on the on-chain syscall.
pub fn derive_rate_data_pda(program_id: &Pubkey) -> Result<(Pubkey, u8), RegistryError> {
    try_find_program_address(&[RATE_DATA_SEED], program_id).ok_or(RegistryError::InvalidAccount)
}
