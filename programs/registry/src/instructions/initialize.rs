//! Initialize instruction - create the registry record at its PDA

use crate::pda::derive_rate_data_pda;
use crate::state::RateData;
use pinocchio::{
    account_info::AccountInfo,
    instruction::{Seed, Signer},
    msg,
    pubkey::Pubkey,
    sysvars::{rent::Rent, Sysvar},
    ProgramResult,
};
use pinocchio_system::instructions::{Allocate, Assign, CreateAccount, Transfer};
use ratebook_common::*;

/// Process initialize instruction
///
/// Allocates and funds the record at `["rate_data"]`, paid by `authority`,
/// then writes an empty oracle table with `authority` as administrator.
/// A second call fails with `AlreadyInitialized` and changes nothing.
///
/// # Arguments
/// * `program_id` - The registry program ID
/// * `rate_data_account` - Record account (PDA, not yet created)
/// * `authority_account` - Payer and future authority, must sign
pub fn process_initialize(
    program_id: &Pubkey,
    rate_data_account: &AccountInfo,
    authority_account: &AccountInfo,
) -> ProgramResult {
    if !authority_account.is_signer() {
        msg!("Error: Authority must sign initialize");
        return Err(RegistryError::Unauthorized.into());
    }

    let (expected_pda, bump) = derive_rate_data_pda(program_id)?;
    validate_key(rate_data_account, &expected_pda)?;
    validate_writable(rate_data_account)?;

    check_vacant(
        rate_data_account.data_len(),
        rate_data_account.is_owned_by(program_id),
    )?;

    let bump_seed = [bump];
    let seeds = [Seed::from(RATE_DATA_SEED), Seed::from(&bump_seed[..])];

    let space = RateData::LEN as u64;
    let required = Rent::get()?.minimum_balance(RateData::LEN);
    let current = rate_data_account.lamports();

    if current == 0 {
        CreateAccount {
            from: authority_account,
            to: rate_data_account,
            lamports: required,
            space,
            owner: program_id,
        }
        .invoke_signed(&[Signer::from(&seeds)])?;
    } else {
        // Someone pre-funded the address; top up, then allocate and assign.
        if current < required {
            Transfer {
                from: authority_account,
                to: rate_data_account,
                lamports: required - current,
            }
            .invoke()?;
        }
        Allocate {
            account: rate_data_account,
            space,
        }
        .invoke_signed(&[Signer::from(&seeds)])?;
        Assign {
            account: rate_data_account,
            owner: program_id,
        }
        .invoke_signed(&[Signer::from(&seeds)])?;
    }

    let record = unsafe { borrow_account_data_mut::<RateData>(rate_data_account)? };
    record.initialize_in_place(*authority_account.key(), bump);

    msg!("Rate registry initialized");
    Ok(())
}

/// The record address must not hold program state yet
pub fn check_vacant(data_len: usize, owned_by_program: bool) -> Result<(), RegistryError> {
    if data_len != 0 || owned_by_program {
        msg!("Error: Rate registry already initialized");
        return Err(RegistryError::AlreadyInitialized);
    }
    Ok(())
}

#[cfg(test)]
#[path = "initialize_test.rs"]
mod initialize_test;
