//! Feeder configuration

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// RPC URL of the durable ledger
    pub rpc_url: String,

    /// RPC URL of the ephemeral context, used while the registry is delegated
    pub ephemeral_rpc_url: String,

    /// Registry program ID (base58)
    pub program_id: String,

    /// Oracle keypair path; this key must be registered in the registry
    pub oracle_keypair_path: String,

    /// Authority keypair path. When set, the feeder also settles ephemeral
    /// state back to the durable ledger while delegated.
    #[serde(default)]
    pub authority_keypair_path: Option<String>,

    /// Seconds between rate fetches
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Seconds between settlements
    #[serde(default = "default_settle_interval_secs")]
    pub settle_interval_secs: u64,

    /// Where the rate comes from
    pub source: SourceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// HTTP endpoint returning JSON
    pub url: String,

    /// JSON pointer to the price, e.g. `/rates/NGN`
    pub json_pointer: String,

    /// Multiplier applied before rounding to an integer rate
    #[serde(default = "default_scale")]
    pub scale: u64,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_poll_interval_secs() -> u64 {
    15
}

fn default_settle_interval_secs() -> u64 {
    60
}

fn default_scale() -> u64 {
    1
}

fn default_timeout_secs() -> u64 {
    10
}

impl Config {
    /// Load configuration from the TOML file named by `FEEDER_CONFIG`
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("FEEDER_CONFIG")
            .unwrap_or_else(|_| "feeder-config.toml".to_string());
        Self::load_from(&config_path)
    }

    pub fn load_from(path: &str) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path))?;
        Self::parse(&config_str)
    }

    pub fn parse(config_str: &str) -> Result<Self> {
        let config: Config = toml::from_str(config_str).context("Failed to parse config TOML")?;
        config.program_id()?;
        Ok(config)
    }

    pub fn program_id(&self) -> Result<Pubkey> {
        Pubkey::from_str(&self.program_id)
            .context(format!("Invalid program_id: {}", self.program_id))
    }

    /// Create default configuration
    pub fn default_devnet() -> Self {
        Self {
            rpc_url: "https://api.devnet.solana.com".to_string(),
            ephemeral_rpc_url: "http://127.0.0.1:7799".to_string(),
            program_id: Pubkey::new_from_array(ratebook_registry::ID).to_string(),
            oracle_keypair_path: "~/.config/solana/oracle.json".to_string(),
            authority_keypair_path: None,
            poll_interval_secs: default_poll_interval_secs(),
            settle_interval_secs: default_settle_interval_secs(),
            source: SourceConfig {
                url: "https://open.er-api.com/v6/latest/USD".to_string(),
                json_pointer: "/rates/NGN".to_string(),
                scale: default_scale(),
                timeout_secs: default_timeout_secs(),
            },
        }
    }

    /// Write default config to file
    pub fn write_default(path: &str) -> Result<()> {
        let config = Self::default_devnet();
        let toml_str = toml::to_string_pretty(&config).context("Failed to serialize config")?;

        std::fs::write(path, toml_str).context(format!("Failed to write config to {}", path))?;

        log::info!("Created default config at {}", path);
        Ok(())
    }
}
