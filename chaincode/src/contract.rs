use ledger_api::{ChaincodeStub, StateIterator};
use tracing::{debug, info};

use crate::error::{ContractError, Result};
use crate::models::Asset;

pub const CONTRACT_NAME: &str = "AssetContract";
pub const ASSET_DOC_TYPE: &str = "Asset";

const ASSET_TYPE_QUERY: &str = r#"{"selector":{"docType":"Asset"}}"#;

/// Asset records written and read through the transaction's stub.
#[derive(Debug, Default, Clone, Copy)]
pub struct AssetContract;

impl AssetContract {
    pub fn new() -> Self {
        AssetContract
    }

    /// Seeds assets "1", "2" and "3". Stops at the first failure; writes
    /// already issued stay in the transaction's write set.
    pub fn init_ledger(&self, stub: &mut dyn ChaincodeStub) -> Result<()> {
        let assets = [
            Asset::new(ASSET_DOC_TYPE, "1", "Car"),
            Asset::new(ASSET_DOC_TYPE, "2", "Mobile"),
            Asset::new(ASSET_DOC_TYPE, "3", "Laptop"),
        ];

        for asset in &assets {
            put_asset(stub, asset)?;
        }
        info!("Ledger initialised with {} assets", assets.len());
        Ok(())
    }

    /// Writes a new asset under `asset_id`, replacing any existing value.
    pub fn create(
        &self,
        stub: &mut dyn ChaincodeStub,
        asset_type: &str,
        asset_id: &str,
        name: &str,
    ) -> Result<()> {
        let client_id = stub
            .get_creator()
            .map_err(ContractError::storage("getting creator"))?;
        debug!(
            "Create {} requested by client {}",
            asset_id,
            String::from_utf8_lossy(&client_id)
        );

        put_asset(stub, &Asset::new(asset_type, asset_id, name))
    }

    pub fn query_by_id(&self, stub: &mut dyn ChaincodeStub, id: &str) -> Result<Asset> {
        let bytes = stub
            .get_state(id)
            .map_err(ContractError::storage(format!(
                "getting state for assetId:{}",
                id
            )))?
            .ok_or_else(|| ContractError::NotFound { id: id.to_string() })?;

        serde_json::from_slice(&bytes).map_err(|source| ContractError::Deserialization {
            id: id.to_string(),
            source,
        })
    }

    /// Every asset on the ledger, in key order.
    pub fn query_all(&self, stub: &mut dyn ChaincodeStub) -> Result<Vec<Asset>> {
        let iterator = stub
            .get_state_by_range("", "")
            .map_err(ContractError::storage("getting assets"))?;
        collect_assets(iterator)
    }

    /// Assets whose `docType` is "Asset". Needs a state database with rich
    /// query support.
    pub fn query_by_type(&self, stub: &mut dyn ChaincodeStub) -> Result<Vec<Asset>> {
        let iterator = stub
            .get_query_result(ASSET_TYPE_QUERY)
            .map_err(ContractError::storage("getting assets"))?;
        collect_assets(iterator)
    }
}

fn put_asset(stub: &mut dyn ChaincodeStub, asset: &Asset) -> Result<()> {
    let bytes = serde_json::to_vec(asset).map_err(|source| ContractError::Serialization {
        key: asset.id.clone(),
        source,
    })?;
    stub.put_state(&asset.id, bytes)
        .map_err(ContractError::storage(format!("put state for assetId:{}", asset.id)))
}

// The iterator is released on every return path: explicitly on success,
// by drop when decoding fails.
fn collect_assets(mut iterator: StateIterator) -> Result<Vec<Asset>> {
    let mut assets = Vec::new();
    while iterator.has_next() {
        let Some(kv) = iterator.next() else { break };
        let asset = serde_json::from_slice(&kv.value).map_err(|source| {
            ContractError::Deserialization {
                id: kv.key.clone(),
                source,
            }
        })?;
        assets.push(asset);
    }
    iterator.close();
    Ok(assets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledger_api::{LedgerError, ReadWriteSet, StateDatabase, TxSimulator, WorldState};

    const CREATOR: &[u8] = b"Org1MSP::User1";

    /// Stub whose `put_state` fails for one key and records every other put.
    struct FailingPutStub {
        fail_on: &'static str,
        puts: Vec<String>,
    }

    impl ChaincodeStub for FailingPutStub {
        fn get_tx_id(&self) -> &str {
            "tx"
        }

        fn get_channel_id(&self) -> &str {
            "mychannel"
        }

        fn get_creator(&self) -> ledger_api::Result<Vec<u8>> {
            Ok(CREATOR.to_vec())
        }

        fn get_state(&mut self, _key: &str) -> ledger_api::Result<Option<Vec<u8>>> {
            Err(LedgerError::Storage("unavailable".to_string()))
        }

        fn put_state(&mut self, key: &str, _value: Vec<u8>) -> ledger_api::Result<()> {
            if key == self.fail_on {
                return Err(LedgerError::Storage("boom".to_string()));
            }
            self.puts.push(key.to_string());
            Ok(())
        }

        fn get_state_by_range(
            &mut self,
            _start: &str,
            _end: &str,
        ) -> ledger_api::Result<StateIterator> {
            Err(LedgerError::Storage("unavailable".to_string()))
        }

        fn get_query_result(&mut self, _query: &str) -> ledger_api::Result<StateIterator> {
            Err(LedgerError::Storage("unavailable".to_string()))
        }
    }

    /// Runs `f` as one transaction and commits its writes.
    fn transact<T>(
        state: &WorldState,
        f: impl FnOnce(&mut TxSimulator<'_>) -> Result<T>,
    ) -> Result<T> {
        let mut sim = TxSimulator::new(state, "mychannel", "tx", CREATOR.to_vec());
        let out = f(&mut sim)?;
        state
            .commit(&sim.into_rwset())
            .map_err(ContractError::storage("committing"))?;
        Ok(out)
    }

    fn ids(assets: &[Asset]) -> Vec<&str> {
        assets.iter().map(|a| a.id.as_str()).collect()
    }

    #[test]
    fn test_seeded_ledger_queries() -> anyhow::Result<()> {
        let state = WorldState::new(StateDatabase::CouchDb);
        let contract = AssetContract::new();
        transact(&state, |s| contract.init_ledger(s))?;

        let mobile = transact(&state, |s| contract.query_by_id(s, "2"))?;
        assert_eq!(mobile, Asset::new("Asset", "2", "Mobile"));

        let all = transact(&state, |s| contract.query_all(s))?;
        assert_eq!(ids(&all), vec!["1", "2", "3"]);
        assert_eq!(all[0], Asset::new("Asset", "1", "Car"));
        assert_eq!(all[2], Asset::new("Asset", "3", "Laptop"));
        assert_eq!(state.open_iterators(), 0);
        Ok(())
    }

    #[test]
    fn test_create_then_query_by_id_round_trips() -> anyhow::Result<()> {
        let state = WorldState::default();
        let contract = AssetContract::new();
        transact(&state, |s| contract.create(s, "Electronic", "asset-42", "FAN"))?;

        let asset = transact(&state, |s| contract.query_by_id(s, "asset-42"))?;
        assert_eq!(asset, Asset::new("Electronic", "asset-42", "FAN"));
        Ok(())
    }

    #[test]
    fn test_create_overwrites_existing_asset() -> anyhow::Result<()> {
        let state = WorldState::default();
        let contract = AssetContract::new();
        transact(&state, |s| contract.init_ledger(s))?;
        transact(&state, |s| contract.create(s, "Asset", "1", "Bicycle"))?;

        let asset = transact(&state, |s| contract.query_by_id(s, "1"))?;
        assert_eq!(asset.name, "Bicycle");
        assert_eq!(state.len()?, 3);
        Ok(())
    }

    #[test]
    fn test_query_by_id_missing_is_not_found() {
        let state = WorldState::default();
        let contract = AssetContract::new();
        let err = transact(&state, |s| contract.query_by_id(s, "nope")).unwrap_err();
        assert!(matches!(err, ContractError::NotFound { ref id } if id == "nope"));
        assert_eq!(err.to_string(), "asset nope does not exist");
    }

    #[test]
    fn test_query_all_includes_previously_created_assets() -> anyhow::Result<()> {
        let state = WorldState::default();
        let contract = AssetContract::new();
        transact(&state, |s| contract.create(s, "Electronic", "0", "Radio"))?;
        transact(&state, |s| contract.create(s, "Electronic", "4", "Lamp"))?;
        transact(&state, |s| contract.init_ledger(s))?;

        let all = transact(&state, |s| contract.query_all(s))?;
        assert_eq!(ids(&all), vec!["0", "1", "2", "3", "4"]);
        Ok(())
    }

    #[test]
    fn test_query_by_type_excludes_other_doc_types() -> anyhow::Result<()> {
        let state = WorldState::new(StateDatabase::CouchDb);
        let contract = AssetContract::new();
        transact(&state, |s| contract.init_ledger(s))?;
        transact(&state, |s| contract.create(s, "Electronic", "asset-x", "FAN"))?;

        let typed = transact(&state, |s| contract.query_by_type(s))?;
        assert_eq!(ids(&typed), vec!["1", "2", "3"]);
        assert!(typed.iter().all(|a| a.doc_type == "Asset"));
        Ok(())
    }

    #[test]
    fn test_query_by_type_fails_without_rich_queries() {
        let state = WorldState::new(StateDatabase::LevelDb);
        let contract = AssetContract::new();
        let err = transact(&state, |s| contract.query_by_type(s)).unwrap_err();
        assert!(matches!(err, ContractError::Storage { .. }));
        assert!(err.to_string().contains("goleveldb"));
    }

    #[test]
    fn test_malformed_value_fails_and_releases_iterator() -> anyhow::Result<()> {
        let state = WorldState::new(StateDatabase::CouchDb);
        let contract = AssetContract::new();
        transact(&state, |s| contract.init_ledger(s))?;
        let mut corrupt = ReadWriteSet::new();
        corrupt.record_write("2", b"{not json".to_vec());
        state.commit(&corrupt)?;

        let err = transact(&state, |s| contract.query_all(s)).unwrap_err();
        assert!(matches!(err, ContractError::Deserialization { ref id, .. } if id == "2"));
        assert_eq!(state.open_iterators(), 0);

        let err = transact(&state, |s| contract.query_by_id(s, "2")).unwrap_err();
        assert!(err.to_string().contains("assetId:2"));
        Ok(())
    }

    #[test]
    fn test_malformed_typed_value_fails_query_by_type_and_releases_iterator() {
        let state = WorldState::new(StateDatabase::CouchDb);
        let mut missing_id = ReadWriteSet::new();
        missing_id.record_write("x", br#"{"docType":"Asset"}"#.to_vec());
        state.commit(&missing_id).unwrap();

        let err = transact(&state, |s| AssetContract::new().query_by_type(s)).unwrap_err();
        assert!(matches!(err, ContractError::Deserialization { ref id, .. } if id == "x"));
        assert_eq!(state.open_iterators(), 0);
    }

    #[test]
    fn test_init_ledger_stops_at_first_failed_write() {
        let mut stub = FailingPutStub {
            fail_on: "2",
            puts: Vec::new(),
        };
        let err = AssetContract::new().init_ledger(&mut stub).unwrap_err();
        assert!(matches!(err, ContractError::Storage { .. }));
        assert!(err.to_string().contains("assetId:2"));
        assert_eq!(stub.puts, vec!["1"]);
    }

    #[test]
    fn test_create_with_empty_id_is_storage_error() {
        let state = WorldState::default();
        let contract = AssetContract::new();
        let err = transact(&state, |s| contract.create(s, "Asset", "", "Ghost")).unwrap_err();
        assert!(matches!(err, ContractError::Storage { .. }));
        assert!(state.is_empty().unwrap());
    }

    #[test]
    fn test_empty_ledger_query_all_is_empty() -> anyhow::Result<()> {
        let state = WorldState::default();
        let all = transact(&state, |s| AssetContract::new().query_all(s))?;
        assert!(all.is_empty());
        Ok(())
    }
}
