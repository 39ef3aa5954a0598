use ledger_api::{Chaincode, ReadWriteSet, Response, TxSimulator, WorldState};
use std::time::Duration;
use tracing::debug;

use crate::config::PeerConfig;
use crate::error::ClientError;
use crate::network::Network;

/// A signed request to run one chaincode function.
#[derive(Debug, Clone)]
pub struct Proposal {
    pub tx_id: String,
    pub chaincode_id: String,
    pub fcn: String,
    pub args: Vec<Vec<u8>>,
    pub creator: Vec<u8>,
}

/// A peer's simulation result for a proposal.
#[derive(Debug, Clone, PartialEq)]
pub struct Endorsement {
    pub peer: String,
    pub response: Response,
    pub rwset: ReadWriteSet,
}

impl Endorsement {
    /// Two endorsements agree when they produced the same response and the
    /// same read-write set.
    pub fn agrees_with(&self, other: &Endorsement) -> bool {
        self.response == other.response && self.rwset == other.rwset
    }
}

/// An endorsing peer of the channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Peer {
    pub name: String,
    pub url: String,
    pub msp_id: String,
    delay: Duration,
}

impl Peer {
    pub fn new(name: &str, url: &str, msp_id: &str) -> Self {
        Peer {
            name: name.to_string(),
            url: url.to_string(),
            msp_id: msp_id.to_string(),
            delay: Duration::ZERO,
        }
    }

    pub fn from_config(config: &PeerConfig) -> Self {
        Peer::new(&config.name, &config.url, &config.msp_id)
    }

    /// Adds a simulated network round trip to each endorsement.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Simulates `proposal` against the channel's committed state. Nothing is
    /// written; the writes come back in the endorsement's read-write set.
    pub async fn endorse(
        &self,
        network: &Network,
        proposal: &Proposal,
    ) -> Result<Endorsement, ClientError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let chaincode = network.chaincode(&proposal.chaincode_id)?;
        let (response, rwset) = simulate(
            network.world_state(),
            network.channel_id(),
            chaincode.as_ref(),
            proposal,
        );
        debug!(
            "Peer {} endorsed {} for {} with status {}",
            self.name, proposal.fcn, proposal.tx_id, response.status
        );
        Ok(Endorsement {
            peer: self.name.clone(),
            response,
            rwset,
        })
    }
}

fn simulate(
    state: &WorldState,
    channel_id: &str,
    chaincode: &dyn Chaincode,
    proposal: &Proposal,
) -> (Response, ReadWriteSet) {
    let mut sim = TxSimulator::new(state, channel_id, &proposal.tx_id, proposal.creator.clone());
    let response = chaincode.invoke(&mut sim, &proposal.fcn, &proposal.args);
    (response, sim.into_rwset())
}
