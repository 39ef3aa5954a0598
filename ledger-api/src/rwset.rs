use std::collections::BTreeMap;

use crate::state::Version;

/// Reads and writes recorded while simulating one transaction.
///
/// Reads keep the version observed the first time a key was read (`None`
/// when the key did not exist). Writes are buffered and only reach the world
/// state when the transaction commits; a later write to the same key
/// replaces the earlier one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadWriteSet {
    reads: BTreeMap<String, Option<Version>>,
    writes: BTreeMap<String, Vec<u8>>,
}

impl ReadWriteSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_read(&mut self, key: &str, version: Option<Version>) {
        self.reads.entry(key.to_string()).or_insert(version);
    }

    pub fn record_write(&mut self, key: &str, value: Vec<u8>) {
        self.writes.insert(key.to_string(), value);
    }

    pub fn reads(&self) -> &BTreeMap<String, Option<Version>> {
        &self.reads
    }

    pub fn writes(&self) -> &BTreeMap<String, Vec<u8>> {
        &self.writes
    }
}
