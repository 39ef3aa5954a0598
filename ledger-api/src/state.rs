use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Bound;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

use crate::error::{LedgerError, Result};
use crate::iterator::{KV, StateIterator};
use crate::query::Selector;
use crate::rwset::ReadWriteSet;

/// Block in which a value was committed. Every block holds exactly one
/// transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub block_num: u64,
}

impl Version {
    pub fn new(block_num: u64) -> Self {
        Version { block_num }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedValue {
    pub value: Vec<u8>,
    pub version: Version,
}

/// Backing database flavour. Only CouchDB evaluates selector queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateDatabase {
    #[serde(alias = "goleveldb")]
    LevelDb,
    #[default]
    CouchDb,
}

impl StateDatabase {
    pub fn supports_rich_queries(self) -> bool {
        matches!(self, StateDatabase::CouchDb)
    }
}

impl fmt::Display for StateDatabase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateDatabase::LevelDb => write!(f, "goleveldb"),
            StateDatabase::CouchDb => write!(f, "CouchDB"),
        }
    }
}

#[derive(Debug, Default)]
struct StateInner {
    entries: BTreeMap<String, VersionedValue>,
    height: u64,
}

/// Shared, versioned key-value state of a channel.
///
/// Readers see committed values only. [`WorldState::commit`] is the single
/// writer: it validates a transaction's read versions and applies its writes
/// as one block while holding the write lock.
#[derive(Debug)]
pub struct WorldState {
    database: StateDatabase,
    inner: RwLock<StateInner>,
    open_iterators: Arc<AtomicUsize>,
}

impl WorldState {
    pub fn new(database: StateDatabase) -> Self {
        WorldState {
            database,
            inner: RwLock::new(StateInner::default()),
            open_iterators: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn database(&self) -> StateDatabase {
        self.database
    }

    /// Number of committed blocks.
    pub fn height(&self) -> Result<u64> {
        Ok(self.read_inner()?.height)
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.read_inner()?.entries.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Cursors handed out and not yet closed or dropped.
    pub fn open_iterators(&self) -> usize {
        self.open_iterators.load(Ordering::SeqCst)
    }

    pub fn get(&self, key: &str) -> Result<Option<VersionedValue>> {
        Ok(self.read_inner()?.entries.get(key).cloned())
    }

    /// Scans `[start, end)` in key order. An empty bound is open on that side.
    pub fn range(&self, start: &str, end: &str) -> Result<StateIterator> {
        let inner = self.read_inner()?;
        let entries = if !start.is_empty() && !end.is_empty() && start >= end {
            Vec::new()
        } else {
            let lower = if start.is_empty() {
                Bound::Unbounded
            } else {
                Bound::Included(start)
            };
            let upper = if end.is_empty() {
                Bound::Unbounded
            } else {
                Bound::Excluded(end)
            };
            inner
                .entries
                .range::<str, _>((lower, upper))
                .map(|(key, v)| KV {
                    key: key.clone(),
                    value: v.value.clone(),
                })
                .collect()
        };
        Ok(StateIterator::new(entries, self.open_iterators.clone()))
    }

    /// Evaluates a selector query over every value, in key order.
    pub fn query(&self, selector: &Selector) -> Result<StateIterator> {
        if !self.database.supports_rich_queries() {
            return Err(LedgerError::RichQueryUnsupported(self.database.to_string()));
        }
        let inner = self.read_inner()?;
        let entries = inner
            .entries
            .iter()
            .filter(|(_, v)| selector.matches(&v.value))
            .map(|(key, v)| KV {
                key: key.clone(),
                value: v.value.clone(),
            })
            .collect();
        Ok(StateIterator::new(entries, self.open_iterators.clone()))
    }

    /// Validates `rwset` against the current state and applies its writes as
    /// a new block. Nothing is applied when validation fails.
    pub fn commit(&self, rwset: &ReadWriteSet) -> Result<Version> {
        let mut inner = self.write_inner()?;
        for (key, read_version) in rwset.reads() {
            let current = inner.entries.get(key).map(|v| v.version);
            if current != *read_version {
                return Err(LedgerError::MvccReadConflict { key: key.clone() });
            }
        }

        let version = Version::new(inner.height + 1);
        for (key, value) in rwset.writes() {
            inner.entries.insert(
                key.clone(),
                VersionedValue {
                    value: value.clone(),
                    version,
                },
            );
        }
        inner.height = version.block_num;
        debug!(
            "Committed block {} with {} writes",
            version.block_num,
            rwset.writes().len()
        );
        Ok(version)
    }

    fn read_inner(&self) -> Result<RwLockReadGuard<'_, StateInner>> {
        self.inner
            .read()
            .map_err(|_| LedgerError::Storage("world state lock poisoned".to_string()))
    }

    fn write_inner(&self) -> Result<RwLockWriteGuard<'_, StateInner>> {
        self.inner
            .write()
            .map_err(|_| LedgerError::Storage("world state lock poisoned".to_string()))
    }
}

impl Default for WorldState {
    fn default() -> Self {
        WorldState::new(StateDatabase::default())
    }
}
