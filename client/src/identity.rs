use serde_json::json;
use sha2::{Digest, Sha256};

use crate::config::IdentityConfig;

/// Signing identity of a client: a user enrolled with an organization's MSP.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub msp_id: String,
    pub user: String,
    pub organization: String,
}

impl Identity {
    pub fn new(msp_id: &str, user: &str, organization: &str) -> Self {
        Identity {
            msp_id: msp_id.to_string(),
            user: user.to_string(),
            organization: organization.to_string(),
        }
    }

    pub fn from_config(config: &IdentityConfig) -> Self {
        Identity::new(&config.msp_id, &config.user, &config.organization)
    }

    /// Enrollment id in the `User1@org1.example.com` form.
    pub fn enrollment_id(&self) -> String {
        format!(
            "{}@{}.example.com",
            self.user,
            self.organization.to_lowercase()
        )
    }

    /// Serialized identity handed to chaincode as the transaction creator.
    pub fn creator(&self) -> Vec<u8> {
        json!({
            "mspid": self.msp_id,
            "id": self.enrollment_id(),
        })
        .to_string()
        .into_bytes()
    }

    /// Fresh transaction id: hex SHA-256 over a random nonce and the creator.
    pub fn new_transaction_id(&self) -> String {
        let nonce = uuid::Uuid::new_v4();
        let mut hasher = Sha256::new();
        hasher.update(nonce.as_bytes());
        hasher.update(self.creator());
        hex::encode(hasher.finalize())
    }
}
