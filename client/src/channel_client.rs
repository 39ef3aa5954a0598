use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::error::ClientError;
use crate::identity::Identity;
use crate::network::Network;
use crate::peer::{Endorsement, Peer, Proposal};

/// A chaincode call: function name plus byte-array arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub chaincode_id: String,
    pub fcn: String,
    pub args: Vec<Vec<u8>>,
}

impl Request {
    pub fn new(chaincode_id: &str, fcn: &str, args: Vec<Vec<u8>>) -> Self {
        Request {
            chaincode_id: chaincode_id.to_string(),
            fcn: fcn.to_string(),
            args,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelResponse {
    pub transaction_id: String,
    pub payload: Vec<u8>,
    /// Block the transaction was committed in; `None` for queries.
    pub block_number: Option<u64>,
    pub endorsers: Vec<String>,
}

/// Submits transactions to a channel on behalf of one identity.
#[derive(Clone)]
pub struct ChannelClient {
    network: Arc<Network>,
    identity: Identity,
}

impl ChannelClient {
    pub fn new(network: Arc<Network>, identity: Identity) -> Self {
        ChannelClient { network, identity }
    }

    pub fn from_config(network: Arc<Network>, config: &Config) -> Self {
        ChannelClient::new(network, Identity::from_config(&config.identity))
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn network(&self) -> &Arc<Network> {
        &self.network
    }

    /// Resolves peers by name; any unknown name is a configuration error.
    pub fn targets(&self, names: &[String]) -> Result<Vec<Peer>, ClientError> {
        names.iter().map(|name| self.network.peer(name)).collect()
    }

    /// Endorses `request` on every target, checks the endorsements agree,
    /// then orders and commits the transaction. Resolves once the commit
    /// outcome is known.
    pub async fn execute(
        &self,
        request: &Request,
        targets: &[Peer],
    ) -> Result<ChannelResponse, ClientError> {
        if targets.is_empty() {
            return Err(ClientError::NoTargets(request.fcn.clone()));
        }
        let proposal = self.proposal(request)?;
        debug!(
            "Executing {} as {} on {} peers",
            proposal.fcn,
            proposal.tx_id,
            targets.len()
        );

        let endorsements = self.collect_endorsements(&proposal, targets).await?;
        let first = &endorsements[0];
        if let Some(odd) = endorsements.iter().find(|e| !e.agrees_with(first)) {
            error!(
                "Endorsement from {} differs from {} for {}",
                odd.peer, first.peer, proposal.tx_id
            );
            return Err(ClientError::EndorsementMismatch {
                tx_id: proposal.tx_id,
            });
        }

        let version = self.network.order(&proposal.tx_id, &first.rwset)?;
        info!(
            "Transaction {} committed in block {}",
            proposal.tx_id, version.block_num
        );
        Ok(ChannelResponse {
            transaction_id: proposal.tx_id,
            payload: first.response.payload.clone(),
            block_number: Some(version.block_num),
            endorsers: endorsements.iter().map(|e| e.peer.clone()).collect(),
        })
    }

    /// Evaluates `request` on the first target without committing anything.
    pub async fn query(
        &self,
        request: &Request,
        targets: &[Peer],
    ) -> Result<ChannelResponse, ClientError> {
        let peer = targets
            .first()
            .ok_or_else(|| ClientError::NoTargets(request.fcn.clone()))?;
        let proposal = self.proposal(request)?;
        let endorsement = peer.endorse(&self.network, &proposal).await?;
        check_status(&endorsement)?;
        Ok(ChannelResponse {
            transaction_id: proposal.tx_id,
            payload: endorsement.response.payload,
            block_number: None,
            endorsers: vec![endorsement.peer],
        })
    }

    fn proposal(&self, request: &Request) -> Result<Proposal, ClientError> {
        // Fail before contacting any peer when the chaincode is missing.
        self.network.chaincode(&request.chaincode_id)?;
        Ok(Proposal {
            tx_id: self.identity.new_transaction_id(),
            chaincode_id: request.chaincode_id.clone(),
            fcn: request.fcn.clone(),
            args: request.args.clone(),
            creator: self.identity.creator(),
        })
    }

    async fn collect_endorsements(
        &self,
        proposal: &Proposal,
        targets: &[Peer],
    ) -> Result<Vec<Endorsement>, ClientError> {
        let results = join_all(
            targets
                .iter()
                .map(|peer| peer.endorse(&self.network, proposal)),
        )
        .await;

        let mut endorsements = Vec::with_capacity(results.len());
        for result in results {
            let endorsement = result?;
            check_status(&endorsement)?;
            endorsements.push(endorsement);
        }
        Ok(endorsements)
    }
}

fn check_status(endorsement: &Endorsement) -> Result<(), ClientError> {
    if endorsement.response.is_ok() {
        Ok(())
    } else {
        Err(ClientError::Endorsement {
            peer: endorsement.peer.clone(),
            status: endorsement.response.status,
            message: endorsement.response.message.clone(),
        })
    }
}
