use anyhow::{Context, Result};
use client::{ChannelClient, Peer, Request};
use tracing::info;

/// Submits `request` and waits for it to commit. Returns the transaction id.
pub async fn commit(client: &ChannelClient, request: &Request, targets: &[Peer]) -> Result<String> {
    let response = client
        .execute(request, targets)
        .await
        .with_context(|| format!("error while committing {}", request.fcn))?;
    Ok(response.transaction_id)
}

/// Builds an `AssetContract:Create` request.
pub fn create_request(chaincode_id: &str, asset_type: &str, asset_id: &str, name: &str) -> Request {
    Request::new(
        chaincode_id,
        "AssetContract:Create",
        vec![
            asset_type.as_bytes().to_vec(),
            asset_id.as_bytes().to_vec(),
            name.as_bytes().to_vec(),
        ],
    )
}

pub async fn create_asset(
    client: &ChannelClient,
    targets: &[Peer],
    chaincode_id: &str,
    asset_type: &str,
    asset_id: &str,
    name: &str,
) -> Result<String> {
    let request = create_request(chaincode_id, asset_type, asset_id, name);
    let tx_id = commit(client, &request, targets).await?;
    info!("Created asset {} in transaction {}", asset_id, tx_id);
    Ok(tx_id)
}

/// Seeds the three default assets.
pub async fn init_ledger(client: &ChannelClient, targets: &[Peer], chaincode_id: &str) -> Result<String> {
    let request = Request::new(chaincode_id, "AssetContract:InitLedger", Vec::new());
    let tx_id = commit(client, &request, targets).await?;
    info!("Ledger initialised in transaction {}", tx_id);
    Ok(tx_id)
}
