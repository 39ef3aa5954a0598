use ledger_api::{Chaincode, ChaincodeStub, Response};
use serde::Serialize;
use tracing::{debug, warn};

use crate::contract::{AssetContract, CONTRACT_NAME};
use crate::error::{ContractError, Result};

impl AssetContract {
    /// Routes `function` (either `AssetContract:Name` or bare `Name`) to the
    /// matching operation and serializes its result. Unit results produce an
    /// empty payload, queries produce JSON.
    pub fn dispatch(
        &self,
        stub: &mut dyn ChaincodeStub,
        function: &str,
        args: &[Vec<u8>],
    ) -> Result<Vec<u8>> {
        let name = match function.split_once(':') {
            Some((contract, name)) if contract == CONTRACT_NAME => name,
            Some((contract, _)) => return Err(ContractError::UnknownContract(contract.to_string())),
            None => function,
        };

        match name {
            "InitLedger" => {
                string_args::<0>(args)?;
                self.init_ledger(stub)?;
                Ok(Vec::new())
            }
            "Create" => {
                let [asset_type, asset_id, asset_name] = string_args::<3>(args)?;
                self.create(stub, &asset_type, &asset_id, &asset_name)?;
                Ok(Vec::new())
            }
            "QueryById" => {
                let [id] = string_args::<1>(args)?;
                let asset = self.query_by_id(stub, &id)?;
                to_payload(&id, &asset)
            }
            "QueryAll" => {
                string_args::<0>(args)?;
                to_payload("assets", &self.query_all(stub)?)
            }
            "QueryByType" => {
                string_args::<0>(args)?;
                to_payload("assets", &self.query_by_type(stub)?)
            }
            other => Err(ContractError::UnknownFunction {
                contract: CONTRACT_NAME.to_string(),
                function: other.to_string(),
            }),
        }
    }
}

impl Chaincode for AssetContract {
    fn invoke(&self, stub: &mut dyn ChaincodeStub, function: &str, args: &[Vec<u8>]) -> Response {
        debug!("Invoking {} in transaction {}", function, stub.get_tx_id());
        match self.dispatch(stub, function, args) {
            Ok(payload) => Response::success(payload),
            Err(e) => {
                warn!("{} failed in transaction {}: {}", function, stub.get_tx_id(), e);
                Response::error(e.to_string())
            }
        }
    }
}

fn string_args<const N: usize>(args: &[Vec<u8>]) -> Result<[String; N]> {
    if args.len() != N {
        return Err(ContractError::IncorrectParamCount {
            expected: N,
            received: args.len(),
        });
    }
    let decoded = args
        .iter()
        .enumerate()
        .map(|(index, arg)| {
            String::from_utf8(arg.clone()).map_err(|_| ContractError::InvalidArgument { index })
        })
        .collect::<Result<Vec<String>>>()?;
    decoded
        .try_into()
        .map_err(|v: Vec<String>| ContractError::IncorrectParamCount {
            expected: N,
            received: v.len(),
        })
}

fn to_payload<T: Serialize + ?Sized>(key: &str, value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(|source| ContractError::Serialization {
        key: key.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Asset;
    use ledger_api::{StateDatabase, TxSimulator, WorldState};

    const FUNCTIONS: &[&str] = &["InitLedger", "Create", "QueryById", "QueryAll", "QueryByType"];

    fn args(values: &[&str]) -> Vec<Vec<u8>> {
        values.iter().map(|v| v.as_bytes().to_vec()).collect()
    }

    fn invoke(state: &WorldState, function: &str, values: &[&str]) -> Response {
        let mut sim = TxSimulator::new(state, "mychannel", "tx", b"Org1MSP::User1".to_vec());
        let response = AssetContract::new().invoke(&mut sim, function, &args(values));
        if response.is_ok() {
            state.commit(&sim.into_rwset()).unwrap();
        }
        response
    }

    #[test]
    fn test_invoke_create_and_query_by_prefixed_name() {
        let state = WorldState::new(StateDatabase::CouchDb);
        let created = invoke(&state, "AssetContract:Create", &["Electronic", "asset1", "FAN"]);
        assert_eq!(created, Response::success(Vec::new()));

        let queried = invoke(&state, "AssetContract:QueryById", &["asset1"]);
        assert!(queried.is_ok());
        let asset: Asset = serde_json::from_slice(&queried.payload).unwrap();
        assert_eq!(asset, Asset::new("Electronic", "asset1", "FAN"));
    }

    #[test]
    fn test_invoke_bare_names_use_default_contract() {
        let state = WorldState::new(StateDatabase::CouchDb);
        assert!(invoke(&state, "InitLedger", &[]).is_ok());

        let all = invoke(&state, "QueryAll", &[]);
        let assets: Vec<Asset> = serde_json::from_slice(&all.payload).unwrap();
        assert_eq!(assets.len(), 3);

        let typed = invoke(&state, "QueryByType", &[]);
        let assets: Vec<Asset> = serde_json::from_slice(&typed.payload).unwrap();
        assert_eq!(assets.len(), 3);
    }

    #[test]
    fn test_empty_results_serialize_as_empty_array() {
        let state = WorldState::new(StateDatabase::CouchDb);
        assert_eq!(invoke(&state, "QueryAll", &[]).payload, b"[]".to_vec());
    }

    #[test]
    fn test_invoke_rejects_wrong_param_count() {
        let state = WorldState::default();
        let response = invoke(&state, "AssetContract:Create", &["Electronic", "asset1"]);
        assert_eq!(response.status, ledger_api::shim::ERROR);
        assert_eq!(
            response.message,
            "Incorrect number of params. Expected 3, received 2"
        );
        assert!(state.is_empty().unwrap());
    }

    #[test]
    fn test_invoke_rejects_unknown_names() {
        let state = WorldState::default();
        let response = invoke(&state, "AssetContract:Delete", &["1"]);
        assert_eq!(
            response.message,
            "Function Delete not found in contract AssetContract"
        );
        let response = invoke(&state, "CarContract:QueryAll", &[]);
        assert_eq!(response.message, "Contract not found with name CarContract");
    }

    #[test]
    fn test_invoke_rejects_non_utf8_arguments() {
        let state = WorldState::default();
        let mut sim = TxSimulator::new(&state, "mychannel", "tx", Vec::new());
        let response = AssetContract::new().invoke(&mut sim, "QueryById", &[vec![0xff, 0xfe]]);
        assert!(!response.is_ok());
        assert!(response.message.contains("param0"));
    }

    #[test]
    fn test_every_listed_function_is_routed() {
        let state = WorldState::new(StateDatabase::CouchDb);
        let mut sim = TxSimulator::new(&state, "mychannel", "tx", Vec::new());
        for function in FUNCTIONS {
            let err = AssetContract::new()
                .dispatch(&mut sim, function, &args(&["a", "b", "c", "d"]))
                .unwrap_err();
            assert!(matches!(err, ContractError::IncorrectParamCount { received: 4, .. }));
        }
    }
}
