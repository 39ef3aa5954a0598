use ledger_api::{Chaincode, ReadWriteSet, StateDatabase, Version, WorldState};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::ClientError;
use crate::peer::Peer;

/// A single channel: its peers, installed chaincode and world state.
///
/// Peers endorse against the shared world state; ordering and commit go
/// through [`Network::order`], which validates and applies one transaction
/// per block.
pub struct Network {
    channel_id: String,
    state: Arc<WorldState>,
    peers: BTreeMap<String, Peer>,
    chaincodes: HashMap<String, Arc<dyn Chaincode>>,
}

impl Network {
    pub fn new(channel_id: &str, database: StateDatabase) -> Self {
        Network {
            channel_id: channel_id.to_string(),
            state: Arc::new(WorldState::new(database)),
            peers: BTreeMap::new(),
            chaincodes: HashMap::new(),
        }
    }

    /// Builds the channel described by `config`. Chaincode still has to be
    /// installed with [`Network::with_chaincode`].
    pub fn from_config(config: &Config) -> Result<Self, ClientError> {
        config.validate()?;
        let delay = Duration::from_millis(config.network.endorsement_delay_ms);
        let network = config.peers.iter().fold(
            Network::new(&config.channel.name, config.network.state_database),
            |network, peer_config| {
                network.with_peer(Peer::from_config(peer_config).with_delay(delay))
            },
        );
        info!(
            "Network for channel {} with {} peers on {}",
            network.channel_id,
            network.peers.len(),
            network.state.database()
        );
        Ok(network)
    }

    pub fn with_peer(mut self, peer: Peer) -> Self {
        self.peers.insert(peer.name.clone(), peer);
        self
    }

    pub fn with_chaincode(mut self, chaincode_id: &str, chaincode: Arc<dyn Chaincode>) -> Self {
        self.chaincodes.insert(chaincode_id.to_string(), chaincode);
        self
    }

    pub fn channel_id(&self) -> &str {
        &self.channel_id
    }

    pub fn world_state(&self) -> &Arc<WorldState> {
        &self.state
    }

    /// Looks up a configured peer by host name.
    pub fn peer(&self, name: &str) -> Result<Peer, ClientError> {
        let peer = self
            .peers
            .get(name)
            .cloned()
            .ok_or_else(|| ClientError::UnknownPeer(name.to_string()))?;
        debug!("peer {} at {}", peer.name, peer.url);
        Ok(peer)
    }

    pub fn peers(&self) -> impl Iterator<Item = &Peer> {
        self.peers.values()
    }

    pub fn chaincode(&self, chaincode_id: &str) -> Result<Arc<dyn Chaincode>, ClientError> {
        self.chaincodes
            .get(chaincode_id)
            .cloned()
            .ok_or_else(|| ClientError::UnknownChaincode {
                channel_id: self.channel_id.clone(),
                chaincode_id: chaincode_id.to_string(),
            })
    }

    /// Orders an endorsed transaction into its own block and commits it.
    pub fn order(&self, tx_id: &str, rwset: &ReadWriteSet) -> Result<Version, ClientError> {
        self.state.commit(rwset).map_err(|source| ClientError::Commit {
            tx_id: tx_id.to_string(),
            source,
        })
    }
}
