//! Registry program entrypoint

use pinocchio::{
    account_info::AccountInfo,
    msg,
    pubkey::Pubkey,
    sysvars::{clock::Clock, Sysvar},
    ProgramResult,
};

use crate::guard::Caller;
use crate::instructions::{
    process_add_oracle, process_delegate, process_initialize, process_settle, process_undelegate,
    process_update_rate, RegistryInstruction,
};
use crate::state::{ExecutionContext, RateData, SettlementSnapshot};
use ratebook_common::{
    borrow_account_data_mut, validate_key, validate_owner, validate_writable, InstructionReader,
    RegistryError,
};

#[cfg(all(feature = "bpf-entrypoint", target_os = "solana"))]
pinocchio::program_entrypoint!(process_instruction);
#[cfg(all(feature = "bpf-entrypoint", target_os = "solana"))]
pinocchio::no_allocator!();
#[cfg(all(feature = "bpf-entrypoint", target_os = "solana"))]
pinocchio::nostd_panic_handler!();

pub fn process_instruction(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    instruction_data: &[u8],
) -> ProgramResult {
    let (discriminator, data) = match instruction_data.split_first() {
        Some(split) => split,
        None => {
            msg!("Error: Instruction data is empty");
            return Err(RegistryError::InvalidInstruction.into());
        }
    };

    let instruction = match RegistryInstruction::try_from(*discriminator) {
        Ok(ix) => ix,
        Err(e) => {
            msg!("Error: Unknown instruction");
            return Err(e.into());
        }
    };

    if !is_routed(instruction, ExecutionContext::CURRENT) {
        msg!("Error: Instruction not available in this execution context");
        return Err(RegistryError::InvalidInstruction.into());
    }

    match instruction {
        RegistryInstruction::Initialize => {
            msg!("Instruction: Initialize");
            process_initialize_inner(program_id, accounts, data)
        }
        RegistryInstruction::AddOracle => {
            msg!("Instruction: AddOracle");
            process_add_oracle_inner(program_id, accounts, data)
        }
        RegistryInstruction::UpdateRate => {
            msg!("Instruction: UpdateRate");
            process_update_rate_inner(program_id, accounts, data)
        }
        RegistryInstruction::Delegate => {
            msg!("Instruction: Delegate");
            process_delegate_inner(program_id, accounts, data)
        }
        RegistryInstruction::Settle => {
            msg!("Instruction: Settle");
            process_settlement_inner(program_id, accounts, data, false)
        }
        RegistryInstruction::Undelegate => {
            msg!("Instruction: Undelegate");
            process_settlement_inner(program_id, accounts, data, true)
        }
    }
}

/// The ephemeral build only accepts rate updates; everything administrative
/// happens on the durable ledger.
pub fn is_routed(instruction: RegistryInstruction, ctx: ExecutionContext) -> bool {
    match ctx {
        ExecutionContext::Durable => true,
        ExecutionContext::Ephemeral => instruction == RegistryInstruction::UpdateRate,
    }
}

/// Validate and borrow the record account
fn load_record<'a>(
    program_id: &Pubkey,
    account: &'a AccountInfo,
) -> Result<&'a mut RateData, RegistryError> {
    validate_owner(account, program_id)?;
    validate_writable(account)?;

    if account.data_len() != RateData::LEN {
        msg!("Error: Rate registry account has incorrect size");
        return Err(RegistryError::InvalidAccount);
    }

    // SAFETY: no borrow of the account data is outstanding
    if !RateData::is_initialized(unsafe { account.borrow_data_unchecked() }) {
        msg!("Error: Account is not a rate registry");
        return Err(RegistryError::InvalidAccount);
    }

    // SAFETY: ownership and size checked; RateData is plain old data
    let record = unsafe { borrow_account_data_mut::<RateData>(account)? };
    if !record.validate() {
        msg!("Error: Invalid rate registry account");
        return Err(RegistryError::InvalidAccount);
    }
    Ok(record)
}

fn require_accounts(accounts: &[AccountInfo], n: usize) -> Result<(), RegistryError> {
    if accounts.len() < n {
        msg!("Error: Not enough accounts");
        return Err(RegistryError::InvalidInstruction);
    }
    Ok(())
}

/// Process initialize instruction
///
/// Expected accounts:
/// 0. `[writable]` Rate registry PDA (uninitialized)
/// 1. `[signer, writable]` Authority / payer
/// 2. `[]` System program
///
/// Expected data: none
fn process_initialize_inner(program_id: &Pubkey, accounts: &[AccountInfo], data: &[u8]) -> ProgramResult {
    require_accounts(accounts, 3)?;
    InstructionReader::new(data).finish()?;

    validate_key(&accounts[2], &pinocchio_system::ID)?;
    process_initialize(program_id, &accounts[0], &accounts[1])
}

/// Process add oracle instruction
///
/// Expected accounts:
/// 0. `[writable]` Rate registry
/// 1. `[signer]` Authority
///
/// Expected data layout:
/// - name_len: u8
/// - name: [u8; name_len] (UTF-8)
/// - pubkey: [u8; 32]
fn process_add_oracle_inner(program_id: &Pubkey, accounts: &[AccountInfo], data: &[u8]) -> ProgramResult {
    require_accounts(accounts, 2)?;

    let mut reader = InstructionReader::new(data);
    let name_len = reader.read_u8()? as usize;
    let name = reader.read_slice(name_len)?;
    let pubkey = reader.read_pubkey()?;
    reader.finish()?;

    let record = load_record(program_id, &accounts[0])?;
    let caller = Caller::from_account(&accounts[1]);
    process_add_oracle(record, &caller, name, pubkey)?;
    Ok(())
}

/// Process update rate instruction
///
/// Expected accounts:
/// 0. `[writable]` Rate registry
/// 1. `[signer]` Oracle
///
/// Expected data layout (8 bytes):
/// - rate: u64
fn process_update_rate_inner(program_id: &Pubkey, accounts: &[AccountInfo], data: &[u8]) -> ProgramResult {
    require_accounts(accounts, 2)?;

    let mut reader = InstructionReader::new(data);
    let rate = reader.read_u64()?;
    reader.finish()?;

    let record = load_record(program_id, &accounts[0])?;
    let caller = Caller::from_account(&accounts[1]);
    let now = Clock::get()?.unix_timestamp;
    process_update_rate(record, &caller, rate, now, ExecutionContext::CURRENT)?;
    Ok(())
}

/// Process delegate instruction
///
/// Expected accounts:
/// 0. `[writable]` Rate registry
/// 1. `[signer]` Authority
///
/// Expected data: none
fn process_delegate_inner(program_id: &Pubkey, accounts: &[AccountInfo], data: &[u8]) -> ProgramResult {
    require_accounts(accounts, 2)?;
    InstructionReader::new(data).finish()?;

    let record = load_record(program_id, &accounts[0])?;
    let caller = Caller::from_account(&accounts[1]);
    let now = Clock::get()?.unix_timestamp;
    process_delegate(record, &caller, now)?;
    Ok(())
}

/// Process settle / undelegate instruction
///
/// Expected accounts:
/// 0. `[writable]` Rate registry
/// 1. `[signer]` Authority
///
/// Expected data: settlement snapshot (see `state::settlement`)
fn process_settlement_inner(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    data: &[u8],
    release: bool,
) -> ProgramResult {
    require_accounts(accounts, 2)?;

    let snapshot = SettlementSnapshot::unpack(data)?;
    let record = load_record(program_id, &accounts[0])?;
    let caller = Caller::from_account(&accounts[1]);

    if release {
        process_undelegate(record, &caller, &snapshot)?;
    } else {
        process_settle(record, &caller, &snapshot)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "entrypoint_test.rs"]
mod entrypoint_test;
