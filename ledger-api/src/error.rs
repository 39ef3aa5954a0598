use thiserror::Error;

/// Errors raised by the state store and its iterators.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Read, write or iteration failure in the state database.
    #[error("state database error: {0}")]
    Storage(String),

    #[error("key must not be an empty string")]
    EmptyKey,

    /// The configured state database cannot evaluate selector queries.
    #[error("rich queries are not supported by the {0} state database")]
    RichQueryUnsupported(String),

    #[error("invalid query selector: {0}")]
    InvalidSelector(String),

    /// A key read during simulation changed before the transaction committed.
    #[error("MVCC read conflict on key '{key}'")]
    MvccReadConflict { key: String },
}

pub type Result<T> = std::result::Result<T, LedgerError>;
