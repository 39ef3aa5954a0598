use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use client::config::FailurePolicy;
use client::{Config, read_config, read_config_from_toml};
use ledger_api::StateDatabase;
use std::path::PathBuf;
use submit::commit_driver;
use submit::create_asset::init_ledger;
use submit::query_assets::{query_all, query_by_id, query_by_type};
use submit::sdk::Sdk;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "submit")]
#[command(about = "Drives asset chaincode transactions against an in-process ledger network")]
struct Cli {
    /// Path to config.toml; defaults to ./config/config.toml
    #[arg(long, global = true)]
    config_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Submit concurrent Create transactions and report the elapsed time
    Load {
        /// Number of parallel tasks (overrides driver.tasks)
        #[arg(long)]
        tasks: Option<usize>,
        /// Stop at the first failed transaction
        #[arg(long)]
        fail_fast: bool,
        /// Seed the ledger with InitLedger first
        #[arg(long)]
        init_ledger: bool,
    },
    /// Seed the ledger and print QueryById, QueryAll and QueryByType results
    Scenario,
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    match path {
        Some(path) => read_config(path),
        None => read_config_from_toml(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = load_config(cli.config_file.as_ref())?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt()
        .with_writer(std::io::stdout)
        .with_env_filter(filter)
        .init();

    match cli.command {
        Commands::Load {
            tasks,
            fail_fast,
            init_ledger,
        } => {
            if let Some(tasks) = tasks {
                config.driver.tasks = tasks;
            }
            if fail_fast {
                config.driver.failure_policy = FailurePolicy::FailFast;
            }
            config.driver.init_ledger |= init_ledger;
            config.validate()?;

            let sdk = Sdk::from_config(&config)?;
            info!(
                "Running {} tasks of {} against {} peers",
                config.driver.tasks,
                config.driver.function,
                sdk.targets.len()
            );
            let report = commit_driver::run(&sdk, &config.driver).await?;
            for outcome in &report.outcomes {
                if let Err(e) = &outcome.result {
                    error!("task {} ({}) failed: {}", outcome.sequence, outcome.asset_id, e);
                }
            }
            info!("time took: {:?}", report.elapsed);
            if report.failed() > 0 {
                bail!("{} of {} transactions failed", report.failed(), report.outcomes.len());
            }
            Ok(())
        }
        Commands::Scenario => {
            let sdk = Sdk::from_config(&config)?;
            let tx_id = init_ledger(&sdk.client, &sdk.targets, &sdk.chaincode_id).await?;
            info!("InitLedger committed: {}", tx_id);

            let asset = query_by_id(&sdk.client, &sdk.targets, &sdk.chaincode_id, "2").await?;
            info!("QueryById(\"2\"): {:?}", asset);

            let assets = query_all(&sdk.client, &sdk.targets, &sdk.chaincode_id).await?;
            info!("QueryAll: {:#?}", assets);

            if config.network.state_database == StateDatabase::LevelDb {
                warn!("Skipping QueryByType: {} has no rich query support", StateDatabase::LevelDb);
            } else {
                let typed = query_by_type(&sdk.client, &sdk.targets, &sdk.chaincode_id).await?;
                info!("QueryByType: {:#?}", typed);
            }
            Ok(())
        }
    }
}
