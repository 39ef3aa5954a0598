use ledger_api::LedgerError;
use thiserror::Error;

/// Failures seen by a client of the network.
///
/// `Configuration` and `UnknownPeer` are raised while resolving the network
/// at startup; every other variant is a submission failure.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("peer '{0}' not found in network configuration")]
    UnknownPeer(String),

    #[error("chaincode '{chaincode_id}' is not installed on channel '{channel_id}'")]
    UnknownChaincode {
        channel_id: String,
        chaincode_id: String,
    },

    #[error("no target peers given for {0}")]
    NoTargets(String),

    #[error(
        "Transaction processing for endorser [{peer}]: Chaincode status Code: ({status}) UNKNOWN. Description: {message}"
    )]
    Endorsement {
        peer: String,
        status: i32,
        message: String,
    },

    #[error("ProposalResponsePayloads do not match for transaction {tx_id}")]
    EndorsementMismatch { tx_id: String },

    #[error("transaction {tx_id} failed validation: {source}")]
    Commit {
        tx_id: String,
        #[source]
        source: LedgerError,
    },
}

impl ClientError {
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ClientError::Configuration(_) | ClientError::UnknownPeer(_)
        )
    }
}
