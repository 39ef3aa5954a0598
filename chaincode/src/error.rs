use ledger_api::LedgerError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContractError {
    /// The state store failed while reading, writing or iterating.
    #[error("error while {operation}, err: {source}")]
    Storage {
        operation: String,
        #[source]
        source: LedgerError,
    },

    #[error("error while marshalling {key}, err: {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("error while unmarshalling state for assetId:{id}, err: {source}")]
    Deserialization {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("asset {id} does not exist")]
    NotFound { id: String },

    #[error("Contract not found with name {0}")]
    UnknownContract(String),

    #[error("Function {function} not found in contract {contract}")]
    UnknownFunction { contract: String, function: String },

    #[error("Incorrect number of params. Expected {expected}, received {received}")]
    IncorrectParamCount { expected: usize, received: usize },

    #[error("Error managing parameter param{index}. Value is not valid UTF-8")]
    InvalidArgument { index: usize },
}

impl ContractError {
    pub(crate) fn storage(operation: impl Into<String>) -> impl FnOnce(LedgerError) -> Self {
        let operation = operation.into();
        move |source| ContractError::Storage { operation, source }
    }
}

pub type Result<T> = std::result::Result<T, ContractError>;
