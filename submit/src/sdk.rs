use anyhow::{Context, Result};
use chaincode::AssetContract;
use client::{ChannelClient, Config, Network, Peer};
use std::sync::Arc;
use tracing::info;

/// Everything needed to talk to the channel: a client signed as the
/// configured user and the peers requests are sent to.
#[derive(Clone)]
pub struct Sdk {
    pub client: ChannelClient,
    pub targets: Vec<Peer>,
    pub chaincode_id: String,
}

impl Sdk {
    /// Brings up the channel from `config` with the asset chaincode installed
    /// and resolves the target peers once.
    pub fn from_config(config: &Config) -> Result<Self> {
        let network = Network::from_config(config)
            .context("failed to create network from config")?
            .with_chaincode(&config.channel.chaincode_id, Arc::new(AssetContract::new()));
        let client = ChannelClient::from_config(Arc::new(network), config);
        let targets = client
            .targets(&config.target_names())
            .context("failed to resolve target peers")?;

        for peer in &targets {
            info!("Target peer {} at {}", peer.name, peer.url);
        }

        Ok(Sdk {
            client,
            targets,
            chaincode_id: config.channel.chaincode_id.clone(),
        })
    }
}
