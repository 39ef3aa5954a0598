use crate::error::{LedgerError, Result};
use crate::iterator::StateIterator;
use crate::query::Selector;
use crate::rwset::ReadWriteSet;
use crate::state::WorldState;

/// State access available to chaincode while it executes one transaction.
pub trait ChaincodeStub {
    fn get_tx_id(&self) -> &str;

    fn get_channel_id(&self) -> &str;

    /// Serialized identity of the client that submitted the transaction.
    fn get_creator(&self) -> Result<Vec<u8>>;

    fn get_state(&mut self, key: &str) -> Result<Option<Vec<u8>>>;

    fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<()>;

    /// Range scan over `[start, end)`; empty bounds are open.
    fn get_state_by_range(&mut self, start: &str, end: &str) -> Result<StateIterator>;

    /// Rich query, e.g. `{"selector":{"docType":"Asset"}}`.
    fn get_query_result(&mut self, query: &str) -> Result<StateIterator>;
}

/// Executes a transaction against committed state without modifying it.
/// Reads are versioned into the read-write set, writes are buffered there.
pub struct TxSimulator<'a> {
    state: &'a WorldState,
    channel_id: String,
    tx_id: String,
    creator: Vec<u8>,
    rwset: ReadWriteSet,
}

impl<'a> TxSimulator<'a> {
    pub fn new(state: &'a WorldState, channel_id: &str, tx_id: &str, creator: Vec<u8>) -> Self {
        TxSimulator {
            state,
            channel_id: channel_id.to_string(),
            tx_id: tx_id.to_string(),
            creator,
            rwset: ReadWriteSet::new(),
        }
    }

    pub fn rwset(&self) -> &ReadWriteSet {
        &self.rwset
    }

    pub fn into_rwset(self) -> ReadWriteSet {
        self.rwset
    }
}

impl ChaincodeStub for TxSimulator<'_> {
    fn get_tx_id(&self) -> &str {
        &self.tx_id
    }

    fn get_channel_id(&self) -> &str {
        &self.channel_id
    }

    fn get_creator(&self) -> Result<Vec<u8>> {
        Ok(self.creator.clone())
    }

    fn get_state(&mut self, key: &str) -> Result<Option<Vec<u8>>> {
        let stored = self.state.get(key)?;
        self.rwset.record_read(key, stored.as_ref().map(|v| v.version));
        Ok(stored.map(|v| v.value))
    }

    fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<()> {
        if key.is_empty() {
            return Err(LedgerError::EmptyKey);
        }
        self.rwset.record_write(key, value);
        Ok(())
    }

    fn get_state_by_range(&mut self, start: &str, end: &str) -> Result<StateIterator> {
        self.state.range(start, end)
    }

    fn get_query_result(&mut self, query: &str) -> Result<StateIterator> {
        let selector = Selector::parse(query)?;
        self.state.query(&selector)
    }
}
