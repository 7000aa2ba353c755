//! Instruction and transaction builders for the registry program

use anyhow::{bail, Result};
use ratebook_common::{MAX_NAME_LEN, RATE_DATA_SEED};
use ratebook_registry::{RegistryInstruction, SettlementSnapshot};
use solana_sdk::{
    hash::Hash,
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    signature::Keypair,
    signer::Signer,
    system_program,
    transaction::Transaction,
};

/// Registry record PDA and bump
pub fn rate_data_address(program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[RATE_DATA_SEED], program_id)
}

/// Build initialize instruction; `authority` pays for the record
pub fn build_initialize_instruction(program_id: &Pubkey, authority: &Pubkey) -> Instruction {
    let (rate_data, _) = rate_data_address(program_id);
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(rate_data, false),
            AccountMeta::new(*authority, true),
            AccountMeta::new_readonly(system_program::ID, false),
        ],
        data: vec![RegistryInstruction::Initialize as u8],
    }
}

/// Build add_oracle instruction
pub fn build_add_oracle_instruction(
    program_id: &Pubkey,
    authority: &Pubkey,
    name: &str,
    oracle: &Pubkey,
) -> Result<Instruction> {
    if name.is_empty() || name.len() > MAX_NAME_LEN {
        bail!("Oracle name must be 1..={} bytes, got {}", MAX_NAME_LEN, name.len());
    }

    let mut data = Vec::with_capacity(2 + name.len() + 32);
    data.push(RegistryInstruction::AddOracle as u8);
    data.push(name.len() as u8);
    data.extend_from_slice(name.as_bytes());
    data.extend_from_slice(oracle.as_ref());

    Ok(admin_instruction(program_id, authority, data))
}

/// Build update_rate instruction, signed by the oracle itself
pub fn build_update_rate_instruction(program_id: &Pubkey, oracle: &Pubkey, rate: u64) -> Instruction {
    let (rate_data, _) = rate_data_address(program_id);

    let mut data = Vec::with_capacity(9);
    data.push(RegistryInstruction::UpdateRate as u8);
    data.extend_from_slice(&rate.to_le_bytes());

    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(rate_data, false),
            AccountMeta::new_readonly(*oracle, true),
        ],
        data,
    }
}

pub fn build_delegate_instruction(program_id: &Pubkey, authority: &Pubkey) -> Instruction {
    admin_instruction(program_id, authority, vec![RegistryInstruction::Delegate as u8])
}

pub fn build_settle_instruction(
    program_id: &Pubkey,
    authority: &Pubkey,
    snapshot: &SettlementSnapshot,
) -> Instruction {
    settlement_instruction(program_id, authority, RegistryInstruction::Settle, snapshot)
}

pub fn build_undelegate_instruction(
    program_id: &Pubkey,
    authority: &Pubkey,
    snapshot: &SettlementSnapshot,
) -> Instruction {
    settlement_instruction(program_id, authority, RegistryInstruction::Undelegate, snapshot)
}

fn settlement_instruction(
    program_id: &Pubkey,
    authority: &Pubkey,
    kind: RegistryInstruction,
    snapshot: &SettlementSnapshot,
) -> Instruction {
    let mut data = vec![kind as u8];
    data.extend_from_slice(&snapshot.to_bytes());
    admin_instruction(program_id, authority, data)
}

fn admin_instruction(program_id: &Pubkey, authority: &Pubkey, data: Vec<u8>) -> Instruction {
    let (rate_data, _) = rate_data_address(program_id);
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(rate_data, false),
            AccountMeta::new_readonly(*authority, true),
        ],
        data,
    }
}

/// Sign `instructions` with `signer`, who also pays the fee
pub fn build_signed_transaction(
    instructions: &[Instruction],
    signer: &Keypair,
    recent_blockhash: Hash,
) -> Transaction {
    Transaction::new_signed_with_payer(
        instructions,
        Some(&signer.pubkey()),
        &[signer],
        recent_blockhash,
    )
}
