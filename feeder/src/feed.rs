//! One feeding round and one settlement round

use anyhow::Result;
use ratebook_registry::{RateData, SettlementSnapshot};
use solana_client::{client_error::ClientError, nonblocking::rpc_client::RpcClient};
use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signer},
};

use crate::rpc::{fetch_record, registry_error, send_instructions, Route};
use crate::source::HttpRateSource;
use crate::tx_builder::{build_settle_instruction, build_update_rate_instruction};

/// Durable and ephemeral endpoints for one registry
pub struct Endpoints {
    pub durable: RpcClient,
    pub ephemeral: RpcClient,
    pub program_id: Pubkey,
    pub rate_data: Pubkey,
}

impl Endpoints {
    pub fn client(&self, route: Route) -> &RpcClient {
        match route {
            Route::Durable => &self.durable,
            Route::Ephemeral => &self.ephemeral,
        }
    }
}

/// Fetch one rate and submit it where the record currently lives.
///
/// Source failures and registry rejections end the round without an error so
/// the loop keeps running.
pub async fn feed_once(endpoints: &Endpoints, source: &HttpRateSource, oracle: &Keypair) -> Result<()> {
    let rate = match source.fetch().await {
        Ok(rate) => rate,
        Err(e) => {
            log::warn!("Skipping round, source {} failed: {}", source.url(), e);
            return Ok(());
        }
    };

    let record = fetch_record(&endpoints.durable, &endpoints.rate_data).await?;
    let oracle_key = oracle.pubkey().to_bytes();
    let Some((index, entry)) = record.find_oracle(&oracle_key) else {
        log::warn!("Oracle {} is not registered, skipping round", oracle.pubkey());
        return Ok(());
    };

    let route = Route::for_record(&record);
    log::debug!(
        "Submitting rate {} for {} (slot {}, previous {}) via {:?}",
        rate,
        entry.name(),
        index,
        entry.rate,
        route
    );

    let ix = build_update_rate_instruction(&endpoints.program_id, &oracle.pubkey(), rate);
    match send_instructions(endpoints.client(route), &[ix], oracle).await {
        Ok(signature) => {
            log::info!("Rate {} submitted: {}", rate, signature);
            Ok(())
        }
        Err(e) => report_rejection("update_rate", e),
    }
}

/// Snapshot to settle, if the ephemeral copy holds anything newer than the
/// durable record
pub fn pending_settlement(durable: &RateData, ephemeral: &RateData) -> Option<SettlementSnapshot> {
    if !durable.is_delegated() {
        return None;
    }
    let snapshot = ephemeral.snapshot();
    (snapshot.revision > durable.revision).then_some(snapshot)
}

/// Merge newer ephemeral state into the durable ledger, staying delegated
pub async fn settle_once(endpoints: &Endpoints, authority: &Keypair) -> Result<()> {
    let durable = fetch_record(&endpoints.durable, &endpoints.rate_data).await?;
    if !durable.is_delegated() {
        log::debug!("Registry is not delegated, nothing to settle");
        return Ok(());
    }

    let ephemeral = fetch_record(&endpoints.ephemeral, &endpoints.rate_data).await?;
    let Some(snapshot) = pending_settlement(&durable, &ephemeral) else {
        log::debug!("Durable record is current at revision {}", durable.revision);
        return Ok(());
    };

    log::info!(
        "Settling revision {} ({} oracles) over {}",
        snapshot.revision,
        snapshot.len(),
        durable.revision
    );

    let ix = build_settle_instruction(&endpoints.program_id, &authority.pubkey(), &snapshot);
    match send_instructions(&endpoints.durable, &[ix], authority).await {
        Ok(signature) => {
            log::info!("Settle submitted: {}", signature);
            Ok(())
        }
        Err(e) => report_rejection("settle", e),
    }
}

/// Log registry rejections and swallow them; anything else is a real failure
pub fn report_rejection(action: &str, err: ClientError) -> Result<()> {
    match registry_error(&err) {
        Some(code) if code.is_permanent_rejection() => {
            log::error!("{} permanently rejected: {:?}", action, code);
            Ok(())
        }
        Some(code) => {
            log::warn!("{} rejected: {:?}", action, code);
            Ok(())
        }
        None => Err(anyhow::Error::new(err).context(format!("{} failed", action))),
    }
}
