use anyhow::{Context, Result, bail};
use client::Request;
use client::config::{DriverConfig, FailurePolicy};
use std::collections::HashSet;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{error, info};

use crate::create_asset::{commit, init_ledger};
use crate::query_assets::query_all;
use crate::sdk::Sdk;

/// Result of one driver task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskOutcome {
    pub sequence: usize,
    pub asset_id: String,
    /// Transaction id, or the error message of the failed commit.
    pub result: Result<String, String>,
}

#[derive(Debug, Clone)]
pub struct DriverReport {
    /// Ordered by task sequence number.
    pub outcomes: Vec<TaskOutcome>,
    pub elapsed: Duration,
}

impl DriverReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn transaction_ids(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_deref().ok())
            .collect()
    }

    /// Asset ids whose transaction committed.
    pub fn committed_asset_ids(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| o.result.is_ok())
            .map(|o| o.asset_id.as_str())
            .collect()
    }
}

/// Fans out `settings.tasks` independent commits and waits for all of them.
///
/// Each task gets its own sequence number and a fresh `asset<uuid>` id.
/// Outcomes flow back over a channel. Under [`FailurePolicy::Collect`] every
/// task runs to completion and failures are reported afterwards; under
/// [`FailurePolicy::FailFast`] the first failure ends the run with an error.
pub async fn run(sdk: &Sdk, settings: &DriverConfig) -> Result<DriverReport> {
    if settings.init_ledger {
        init_ledger(&sdk.client, &sdk.targets, &sdk.chaincode_id).await?;
    }

    let (tx, mut rx) = mpsc::channel::<TaskOutcome>(settings.tasks.max(1));
    let mut tasks = JoinSet::new();
    let start = Instant::now();

    for sequence in 0..settings.tasks {
        let tx = tx.clone();
        let sdk = sdk.clone();
        let settings = settings.clone();
        tasks.spawn(async move {
            let asset_id = format!("asset{}", uuid::Uuid::new_v4());
            let request = Request::new(
                &sdk.chaincode_id,
                &settings.function,
                vec![
                    settings.asset_type.as_bytes().to_vec(),
                    asset_id.as_bytes().to_vec(),
                    settings.asset_name.as_bytes().to_vec(),
                ],
            );

            let result = match commit(&sdk.client, &request, &sdk.targets).await {
                Ok(tx_id) => {
                    info!("task {}: Transaction successful, result: {}", sequence, tx_id);
                    Ok(tx_id)
                }
                Err(e) => {
                    error!("task {}: {:#}", sequence, e);
                    Err(format!("{:#}", e))
                }
            };
            // The receiver is gone only when the run already ended.
            let _ = tx
                .send(TaskOutcome {
                    sequence,
                    asset_id,
                    result,
                })
                .await;
        });
    }
    drop(tx);

    let mut outcomes = Vec::with_capacity(settings.tasks);
    while let Some(outcome) = rx.recv().await {
        if settings.failure_policy == FailurePolicy::FailFast {
            if let Err(e) = &outcome.result {
                bail!("error while commiting, task {}: {}", outcome.sequence, e);
            }
        }
        outcomes.push(outcome);
    }
    while let Some(joined) = tasks.join_next().await {
        joined.context("commit task panicked")?;
    }
    let elapsed = start.elapsed();

    outcomes.sort_by_key(|o| o.sequence);
    let report = DriverReport { outcomes, elapsed };
    info!(
        "time took: {:?} ({} succeeded, {} failed)",
        report.elapsed,
        report.succeeded(),
        report.failed()
    );

    if settings.verify {
        verify(sdk, &report).await?;
    }
    Ok(report)
}

/// Checks every committed asset is visible on the ledger.
async fn verify(sdk: &Sdk, report: &DriverReport) -> Result<()> {
    let assets = query_all(&sdk.client, &sdk.targets, &sdk.chaincode_id).await?;
    let on_ledger: HashSet<&str> = assets.iter().map(|a| a.id.as_str()).collect();
    let missing: Vec<&str> = report
        .committed_asset_ids()
        .into_iter()
        .filter(|id| !on_ledger.contains(id))
        .collect();
    if !missing.is_empty() {
        bail!("{} committed assets missing from the ledger: {:?}", missing.len(), missing);
    }
    info!("Verified {} committed assets on the ledger", report.succeeded());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use client::read_config_from_toml;
    use tracing_subscriber::EnvFilter;

    fn settings(tasks: usize) -> DriverConfig {
        DriverConfig {
            tasks,
            ..Default::default()
        }
    }

    fn sdk() -> Result<Sdk> {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new("info"))
            .pretty()
            .try_init()
            .ok();
        Sdk::from_config(&read_config_from_toml()?)
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_are_all_committed() -> Result<()> {
        let sdk = sdk()?;
        let report = run(&sdk, &settings(16)).await?;

        assert_eq!(report.outcomes.len(), 16);
        assert_eq!(report.succeeded(), 16);
        let sequences: Vec<usize> = report.outcomes.iter().map(|o| o.sequence).collect();
        assert_eq!(sequences, (0..16).collect::<Vec<_>>());

        let tx_ids: HashSet<&str> = report.transaction_ids().into_iter().collect();
        assert_eq!(tx_ids.len(), 16);

        let assets = query_all(&sdk.client, &sdk.targets, &sdk.chaincode_id).await?;
        let ids: HashSet<&str> = assets.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids.len(), 16);
        for id in report.committed_asset_ids() {
            assert!(id.starts_with("asset"));
            assert!(ids.contains(id));
        }
        assert!(assets.iter().all(|a| a.doc_type == "Electronic" && a.name == "FAN"));
        Ok(())
    }

    #[tokio::test]
    async fn test_seed_and_verify() -> Result<()> {
        let sdk = sdk()?;
        let settings = DriverConfig {
            init_ledger: true,
            verify: true,
            ..settings(4)
        };
        let report = run(&sdk, &settings).await?;
        assert_eq!(report.succeeded(), 4);

        let assets = query_all(&sdk.client, &sdk.targets, &sdk.chaincode_id).await?;
        assert_eq!(assets.len(), 7);
        Ok(())
    }

    #[tokio::test]
    async fn test_collect_policy_reports_every_failure() -> Result<()> {
        let sdk = sdk()?;
        let settings = DriverConfig {
            function: "AssetContract:Delete".to_string(),
            ..settings(4)
        };
        let report = run(&sdk, &settings).await?;

        assert_eq!(report.failed(), 4);
        assert!(report.transaction_ids().is_empty());
        for outcome in &report.outcomes {
            let message = outcome.result.as_ref().unwrap_err();
            assert!(message.contains("Function Delete not found in contract AssetContract"));
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_fail_fast_policy_ends_run_with_error() -> Result<()> {
        let sdk = sdk()?;
        let settings = DriverConfig {
            function: "AssetContract:Delete".to_string(),
            failure_policy: FailurePolicy::FailFast,
            ..settings(3)
        };
        let err = run(&sdk, &settings).await.unwrap_err();
        assert!(err.to_string().contains("error while commiting"));
        Ok(())
    }
}
