//! Signer-based authorization predicates
//!
//! Pure functions over the record as it is at operation time. Nothing here
//! touches accounts, so the rules are testable without a runtime.

use crate::state::{OracleEntry, RateData};
use pinocchio::{account_info::AccountInfo, msg, pubkey::Pubkey};
use ratebook_common::RegistryError;

/// Identity presented by the operation submitter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub key: Pubkey,
    /// Whether the transaction carries this key's signature
    pub is_signer: bool,
}

impl Caller {
    pub fn signer(key: Pubkey) -> Self {
        Self { key, is_signer: true }
    }

    /// Named in the request without a signature
    pub fn unsigned(key: Pubkey) -> Self {
        Self { key, is_signer: false }
    }

    pub fn from_account(account: &AccountInfo) -> Self {
        Self {
            key: *account.key(),
            is_signer: account.is_signer(),
        }
    }
}

/// `caller` proves possession of `required`
#[inline]
pub fn is_expected_signer(caller: &Pubkey, required: &Pubkey, is_signer: bool) -> bool {
    is_signer && caller == required
}

/// `caller` is the stored authority
#[inline]
pub fn is_authority(record: &RateData, caller: &Caller) -> bool {
    is_expected_signer(&caller.key, &record.authority, caller.is_signer)
}

/// Index of the oracle entry `caller` signs for, if any
#[inline]
pub fn registered_oracle_index(oracles: &[OracleEntry], caller: &Caller) -> Option<usize> {
    oracles
        .iter()
        .position(|entry| is_expected_signer(&caller.key, &entry.pubkey, caller.is_signer))
}

#[inline]
pub fn is_registered_oracle_signer(oracles: &[OracleEntry], caller: &Caller) -> bool {
    registered_oracle_index(oracles, caller).is_some()
}

pub fn require_authority(record: &RateData, caller: &Caller) -> Result<(), RegistryError> {
    if !is_authority(record, caller) {
        msg!("Error: Signer is not the authority");
        return Err(RegistryError::Unauthorized);
    }
    Ok(())
}

pub fn require_oracle_signer(record: &RateData, caller: &Caller) -> Result<usize, RegistryError> {
    registered_oracle_index(record.oracles(), caller).ok_or_else(|| {
        msg!("Error: Signer is not a registered oracle");
        RegistryError::UnauthorizedOracle
    })
}
