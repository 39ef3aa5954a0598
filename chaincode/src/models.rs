use serde::{Deserialize, Serialize};

/// Stored as `{"docType": .., "id": .., "name": ..}` under key `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    #[serde(rename = "docType")]
    pub doc_type: String,
    pub id: String,
    pub name: String,
}

impl Asset {
    pub fn new(doc_type: &str, id: &str, name: &str) -> Self {
        Asset {
            doc_type: doc_type.to_string(),
            id: id.to_string(),
            name: name.to_string(),
        }
    }
}
