//! State store and invocation interfaces shared by chaincode and the peers
//! that execute it, together with an in-memory world state.

pub mod error;
pub mod iterator;
pub mod query;
pub mod rwset;
pub mod shim;
pub mod state;
pub mod stub;

pub use error::{LedgerError, Result};
pub use iterator::{KV, StateIterator};
pub use query::Selector;
pub use rwset::ReadWriteSet;
pub use shim::{Chaincode, Response};
pub use state::{StateDatabase, Version, VersionedValue, WorldState};
pub use stub::{ChaincodeStub, TxSimulator};
