//! In-process permissioned ledger network and the channel client used to
//! submit and evaluate chaincode transactions against it.

pub mod channel_client;
pub mod config;
pub mod error;
pub mod identity;
pub mod network;
pub mod peer;

pub use channel_client::{ChannelClient, ChannelResponse, Request};
pub use config::{Config, read_config, read_config_from_toml};
pub use error::ClientError;
pub use identity::Identity;
pub use network::Network;
pub use peer::Peer;
