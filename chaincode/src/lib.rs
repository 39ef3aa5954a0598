//! Asset chaincode: create and query operations over the channel's world
//! state.

pub mod contract;
pub mod error;
pub mod models;
pub mod router;

pub use contract::AssetContract;
pub use error::{ContractError, Result};
pub use models::Asset;
