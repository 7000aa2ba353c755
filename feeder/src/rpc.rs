//! Reading the registry record and decoding program rejections

use anyhow::{Context, Result};
use ratebook_common::RegistryError;
use ratebook_registry::RateData;
use solana_client::{client_error::ClientError, nonblocking::rpc_client::RpcClient};
use solana_sdk::{
    instruction::{Instruction, InstructionError},
    pubkey::Pubkey,
    signature::{Keypair, Signature},
    transaction::TransactionError,
};

use crate::tx_builder::build_signed_transaction;

/// Where a transaction touching the record has to go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Durable,
    Ephemeral,
}

impl Route {
    /// Rate updates follow the record: the ephemeral context owns it while delegated
    pub fn for_record(record: &RateData) -> Self {
        if record.is_delegated() {
            Route::Ephemeral
        } else {
            Route::Durable
        }
    }
}

/// Fetch and decode the registry record at `address`
pub async fn fetch_record(client: &RpcClient, address: &Pubkey) -> Result<RateData> {
    let data = client
        .get_account_data(address)
        .await
        .with_context(|| format!("Failed to fetch registry record {}", address))?;

    RateData::load(&data).map_err(|e| anyhow::anyhow!("Invalid registry record {}: {:?}", address, e))
}

/// Sign, send and confirm `instructions` with `signer` as payer
pub async fn send_instructions(
    client: &RpcClient,
    instructions: &[Instruction],
    signer: &Keypair,
) -> std::result::Result<Signature, ClientError> {
    let blockhash = client.get_latest_blockhash().await?;
    let tx = build_signed_transaction(instructions, signer, blockhash);
    client.send_and_confirm_transaction(&tx).await
}

/// Registry error carried by a failed transaction, if any
pub fn registry_error(err: &ClientError) -> Option<RegistryError> {
    err.get_transaction_error()
        .as_ref()
        .and_then(registry_error_from_transaction)
}

pub fn registry_error_from_transaction(err: &TransactionError) -> Option<RegistryError> {
    match err {
        TransactionError::InstructionError(_, InstructionError::Custom(code)) => {
            RegistryError::from_code(*code)
        }
        _ => None,
    }
}
