use anyhow::{Context, Result};
use chaincode::Asset;
use client::{ChannelClient, Peer, Request};
use serde::de::DeserializeOwned;

async fn evaluate<T: DeserializeOwned>(
    client: &ChannelClient,
    targets: &[Peer],
    request: Request,
) -> Result<T> {
    let response = client
        .query(&request, targets)
        .await
        .with_context(|| format!("error while querying {}", request.fcn))?;
    serde_json::from_slice(&response.payload)
        .with_context(|| format!("error while decoding {} payload", request.fcn))
}

pub async fn query_by_id(
    client: &ChannelClient,
    targets: &[Peer],
    chaincode_id: &str,
    id: &str,
) -> Result<Asset> {
    let request = Request::new(
        chaincode_id,
        "AssetContract:QueryById",
        vec![id.as_bytes().to_vec()],
    );
    evaluate(client, targets, request).await
}

pub async fn query_all(client: &ChannelClient, targets: &[Peer], chaincode_id: &str) -> Result<Vec<Asset>> {
    let request = Request::new(chaincode_id, "AssetContract:QueryAll", Vec::new());
    evaluate(client, targets, request).await
}

pub async fn query_by_type(
    client: &ChannelClient,
    targets: &[Peer],
    chaincode_id: &str,
) -> Result<Vec<Asset>> {
    let request = Request::new(chaincode_id, "AssetContract:QueryByType", Vec::new());
    evaluate(client, targets, request).await
}
