use anyhow::{Context, Result};
use ledger_api::StateDatabase;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ClientError;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    pub identity: IdentityConfig,
    pub channel: ChannelConfig,
    #[serde(default)]
    pub network: NetworkConfig,
    pub peers: Vec<PeerConfig>,
    #[serde(default)]
    pub driver: DriverConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// The user transactions are signed as.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityConfig {
    pub organization: String,
    pub user: String,
    pub msp_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChannelConfig {
    pub name: String,
    pub chaincode_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NetworkConfig {
    #[serde(default)]
    pub state_database: StateDatabase,
    /// Simulated round trip added to every endorsement.
    #[serde(default)]
    pub endorsement_delay_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PeerConfig {
    pub name: String,
    pub url: String,
    pub msp_id: String,
}

/// What the commit driver does when a transaction fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Record the failure and keep the other tasks running.
    #[default]
    Collect,
    /// End the run with the first failure.
    FailFast,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DriverConfig {
    #[serde(default = "default_tasks")]
    pub tasks: usize,
    /// Peer names to endorse on; empty means every configured peer.
    #[serde(default)]
    pub targets: Vec<String>,
    #[serde(default = "default_function")]
    pub function: String,
    #[serde(default = "default_asset_type")]
    pub asset_type: String,
    #[serde(default = "default_asset_name")]
    pub asset_name: String,
    #[serde(default)]
    pub failure_policy: FailurePolicy,
    /// Seed the ledger with `InitLedger` before the run.
    #[serde(default)]
    pub init_ledger: bool,
    /// Check every created asset is visible through `QueryAll` afterwards.
    #[serde(default)]
    pub verify: bool,
}

impl Default for DriverConfig {
    fn default() -> Self {
        DriverConfig {
            tasks: default_tasks(),
            targets: Vec::new(),
            function: default_function(),
            asset_type: default_asset_type(),
            asset_name: default_asset_name(),
            failure_policy: FailurePolicy::default(),
            init_ledger: false,
            verify: false,
        }
    }
}

fn default_tasks() -> usize {
    2
}

fn default_function() -> String {
    "AssetContract:Create".to_string()
}

fn default_asset_type() -> String {
    "Electronic".to_string()
}

fn default_asset_name() -> String {
    "FAN".to_string()
}

impl Config {
    /// Checks the references between sections: peers exist, targets name
    /// configured peers, and the driver has work to do.
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.peers.is_empty() {
            return Err(ClientError::Configuration(
                "at least one [[peers]] entry is required".to_string(),
            ));
        }
        if self.channel.name.is_empty() || self.channel.chaincode_id.is_empty() {
            return Err(ClientError::Configuration(
                "channel name and chaincode_id must not be empty".to_string(),
            ));
        }
        for target in &self.driver.targets {
            if !self.peers.iter().any(|p| &p.name == target) {
                return Err(ClientError::UnknownPeer(target.clone()));
            }
        }
        if self.driver.tasks == 0 {
            return Err(ClientError::Configuration(
                "driver.tasks must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Names of the peers the driver submits to.
    pub fn target_names(&self) -> Vec<String> {
        if self.driver.targets.is_empty() {
            self.peers.iter().map(|p| p.name.clone()).collect()
        } else {
            self.driver.targets.clone()
        }
    }
}

pub fn parse_config(s: &str) -> Result<Config> {
    let cfg: Config = toml::from_str(s).context("failed to parse TOML config")?;
    cfg.validate()?;
    Ok(cfg)
}

pub fn read_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let s = fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file '{}'", path.as_ref().display()))?;
    parse_config(&s)
        .with_context(|| format!("invalid config file '{}'", path.as_ref().display()))
}

pub fn read_config_from_toml() -> Result<Config> {
    // Search order:
    // 1. ./config/config.toml
    // 2. CARGO_MANIFEST_DIR/config/config.toml
    // 3. CARGO_MANIFEST_DIR/../config/config.toml (workspace root under cargo)
    let mut candidates = vec![PathBuf::from("config").join("config.toml")];
    if let Ok(crate_root) = std::env::var("CARGO_MANIFEST_DIR") {
        let crate_root = PathBuf::from(crate_root);
        candidates.push(crate_root.join("config").join("config.toml"));
        candidates.push(crate_root.join("..").join("config").join("config.toml"));
    }

    for candidate in &candidates {
        if candidate.exists() {
            return read_config(candidate);
        }
    }

    anyhow::bail!(
        "Could not find config.toml in ./config/config.toml or under CARGO_MANIFEST_DIR. Use --config-file to specify a path."
    )
}
