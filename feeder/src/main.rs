//! Ratebook rate feeder
//!
//! Off-chain service that polls an HTTP price source and submits the result
//! to the rate registry as a registered oracle. While the registry is
//! delegated, updates go to the ephemeral context and, when an authority key
//! is configured, newer ephemeral state is settled back periodically.
//!
//! Also carries the one-shot admin commands for the registry.

mod config;
mod feed;
mod rpc;
mod source;
mod tx_builder;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use config::Config;
use feed::{feed_once, report_rejection, settle_once, Endpoints};
use rpc::{fetch_record, send_instructions};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{
    commitment_config::CommitmentConfig,
    instruction::Instruction,
    pubkey::Pubkey,
    signature::{Keypair, Signer},
};
use source::HttpRateSource;
use std::{str::FromStr, time::Duration};
use tokio::time;
use tx_builder::{
    build_add_oracle_instruction, build_delegate_instruction, build_initialize_instruction,
    build_undelegate_instruction, rate_data_address,
};

#[derive(Parser)]
#[command(author, version, about = "Ratebook oracle feeder and registry admin")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll the source and submit rates (default)
    Run,
    /// Write a default config file
    InitConfig {
        #[arg(long, default_value = "feeder-config.toml")]
        path: String,
    },
    /// Create the registry record with the authority key
    Initialize,
    /// Register an oracle
    AddOracle {
        #[arg(long)]
        name: String,
        #[arg(long)]
        pubkey: String,
    },
    /// Hand rate updates to the ephemeral context
    Delegate,
    /// Commit ephemeral state and return the registry to the durable ledger
    Undelegate,
    /// Print the registry record
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Some(Commands::InitConfig { path }) = &cli.command {
        return Config::write_default(path);
    }

    let config = Config::load().unwrap_or_else(|_| {
        log::warn!("Failed to load config, using default devnet config");
        Config::default_devnet()
    });

    let program_id = config.program_id()?;
    let (rate_data, _) = rate_data_address(&program_id);
    let endpoints = Endpoints {
        durable: RpcClient::new_with_commitment(config.rpc_url.clone(), CommitmentConfig::confirmed()),
        ephemeral: RpcClient::new_with_commitment(
            config.ephemeral_rpc_url.clone(),
            CommitmentConfig::confirmed(),
        ),
        program_id,
        rate_data,
    };

    log::info!("Connected to RPC: {}", config.rpc_url);
    log::info!("Registry program: {}, record: {}", program_id, rate_data);

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run(&config, &endpoints).await,
        Commands::InitConfig { .. } => Ok(()),
        Commands::Initialize => {
            let authority = load_authority(&config)?;
            let ix = build_initialize_instruction(&program_id, &authority.pubkey());
            submit(&endpoints.durable, "initialize", ix, &authority).await
        }
        Commands::AddOracle { name, pubkey } => {
            let authority = load_authority(&config)?;
            let oracle = Pubkey::from_str(&pubkey).context(format!("Invalid oracle pubkey: {}", pubkey))?;
            let ix = build_add_oracle_instruction(&program_id, &authority.pubkey(), &name, &oracle)?;
            submit(&endpoints.durable, "add_oracle", ix, &authority).await
        }
        Commands::Delegate => {
            let authority = load_authority(&config)?;
            let ix = build_delegate_instruction(&program_id, &authority.pubkey());
            submit(&endpoints.durable, "delegate", ix, &authority).await
        }
        Commands::Undelegate => {
            let authority = load_authority(&config)?;
            let ephemeral = fetch_record(&endpoints.ephemeral, &rate_data).await?;
            let ix = build_undelegate_instruction(&program_id, &authority.pubkey(), &ephemeral.snapshot());
            submit(&endpoints.durable, "undelegate", ix, &authority).await
        }
        Commands::Show => {
            let record = fetch_record(&endpoints.durable, &rate_data).await?;
            println!(
                "authority: {}",
                Pubkey::new_from_array(record.authority)
            );
            println!("revision: {}", record.revision);
            println!("delegated: {}", record.is_delegated());
            for entry in record.oracles() {
                println!(
                    "{:<32} {} rate={} updated={}",
                    entry.name(),
                    Pubkey::new_from_array(entry.pubkey),
                    entry.rate,
                    entry.last_updated
                );
            }
            Ok(())
        }
    }
}

/// Feed loop, plus settlement when an authority key is configured
async fn run(config: &Config, endpoints: &Endpoints) -> Result<()> {
    let oracle = load_keypair(&config.oracle_keypair_path)?;
    log::info!("Oracle wallet: {}", oracle.pubkey());

    let authority = match &config.authority_keypair_path {
        Some(path) => Some(load_keypair(path)?),
        None => None,
    };
    if authority.is_none() {
        log::info!("No authority key configured, settlement disabled");
    }

    let source = HttpRateSource::new(&config.source)?;
    log::info!("Rate source: {} at {}", source.url(), config.source.json_pointer);

    let mut feed_interval = time::interval(Duration::from_secs(config.poll_interval_secs));
    let mut settle_interval = time::interval(Duration::from_secs(config.settle_interval_secs));

    loop {
        tokio::select! {
            _ = feed_interval.tick() => {
                if let Err(e) = feed_once(endpoints, &source, &oracle).await {
                    log::error!("Error feeding rate: {:#}", e);
                }
            }
            _ = settle_interval.tick(), if authority.is_some() => {
                if let Some(authority) = &authority {
                    if let Err(e) = settle_once(endpoints, authority).await {
                        log::error!("Error settling: {:#}", e);
                    }
                }
            }
        }
    }
}

async fn submit(client: &RpcClient, action: &str, ix: Instruction, signer: &Keypair) -> Result<()> {
    match send_instructions(client, &[ix], signer).await {
        Ok(signature) => {
            log::info!("{} submitted: {}", action, signature);
            Ok(())
        }
        Err(e) => report_rejection(action, e),
    }
}

fn load_authority(config: &Config) -> Result<Keypair> {
    let Some(path) = &config.authority_keypair_path else {
        bail!("authority_keypair_path is not set in the config");
    };
    load_keypair(path)
}

/// Load a keypair file, JSON byte array or base58 string
fn load_keypair(path: &str) -> Result<Keypair> {
    let expanded_path = shellexpand::tilde(path);
    let bytes = std::fs::read(expanded_path.as_ref())
        .context(format!("Failed to read keypair from {}", path))?;
    parse_keypair(&bytes)
}

fn parse_keypair(bytes: &[u8]) -> Result<Keypair> {
    let trimmed = bytes.trim_ascii();
    let raw = if trimmed.first() == Some(&b'[') {
        serde_json::from_slice::<Vec<u8>>(trimmed).context("Failed to parse keypair JSON")?
    } else {
        bs58::decode(trimmed)
            .into_vec()
            .context("Failed to decode base58 keypair")?
    };
    Keypair::from_bytes(&raw).context("Failed to create keypair from bytes")
}
