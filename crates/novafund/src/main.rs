//! novafund - command-line client for the NovaFund crowdfunding campaign
//!
//! This binary is a thin CLI wrapper around the `novafund-app` crate,
//! which contains the donation orchestration and campaign polling logic.
//!
//! # Quick Start
//!
//! ```bash
//! # Show the campaign state (testnet defaults)
//! novafund status
//!
//! # Donate 25 lumens, signing with a local seed
//! novafund donate --amount 25 --seed S...
//!
//! # Follow the campaign state as it changes
//! novafund watch
//!
//! # Generate a fresh keypair
//! novafund new-keypair
//! ```
//!
//! # Commands
//!
//! - **status**: print the campaign target, raised total and progress
//! - **donate**: run the two-step donation flow (payment, then record)
//! - **watch**: poll the campaign state on the configured interval
//! - **new-keypair**: generate an Ed25519 keypair
//! - **sample-config**: print the default TOML configuration
//!
//! # Configuration
//!
//! Configuration comes from a TOML file (`--config <FILE>`) or the
//! built-in testnet defaults. `RUST_LOG` overrides the log filter.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use novafund_app::watcher::fetch_campaign_state;
use novafund_app::{
    AppConfig, CampaignPhase, CampaignState, CampaignWatcher, DonationOrchestrator,
    EnvelopeSigner, LocalSigner, NetworkGateway,
};
use novafund_crypto::SecretKey;
use novafund_horizon::HorizonClient;
use novafund_rpc::SorobanRpcClient;

/// Command-line client for the NovaFund crowdfunding campaign
#[derive(Parser)]
#[command(name = "novafund")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Print the campaign state
    Status,

    /// Donate lumens to the campaign
    Donate {
        /// Amount in lumens (decimal, e.g. "25" or "12.5")
        #[arg(long)]
        amount: String,

        /// Secret seed (S...) that signs both transactions
        #[arg(long, env = "NOVAFUND_SEED")]
        seed: String,
    },

    /// Poll the campaign state and print changes
    Watch,

    /// Generate a new Ed25519 keypair
    NewKeypair,

    /// Print the default configuration as TOML
    SampleConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => AppConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => AppConfig::testnet(),
    };

    match cli.command {
        Commands::Status => status(&config).await,
        Commands::Donate { amount, seed } => donate(&config, &amount, &seed).await,
        Commands::Watch => watch(&config).await,
        Commands::NewKeypair => new_keypair(),
        Commands::SampleConfig => sample_config(),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn build_gateway(config: &AppConfig) -> anyhow::Result<Arc<NetworkGateway>> {
    let horizon = HorizonClient::new(&config.endpoints.horizon_url)
        .context("creating Horizon client")?;
    let rpc = SorobanRpcClient::new(&config.endpoints.rpc_url)
        .context("creating Soroban RPC client")?;
    Ok(Arc::new(NetworkGateway::new(horizon, rpc)))
}

async fn status(config: &AppConfig) -> anyhow::Result<()> {
    let gateway = build_gateway(config)?;
    let state = fetch_campaign_state(
        gateway.as_ref(),
        gateway.as_ref(),
        &config.campaign,
        &config.donation,
        None,
    )
    .await
    .context("fetching campaign state")?;

    print_state(&state);
    Ok(())
}

fn print_state(state: &CampaignState) {
    let phase = match state.phase {
        CampaignPhase::Running => "running",
        CampaignPhase::Success => "target reached",
        CampaignPhase::Expired => "expired",
    };
    println!("Raised:   {} XLM", state.raised);
    println!("Target:   {} XLM", state.target);
    println!("Progress: {:.1}%", state.progress());
    println!("Phase:    {phase}");
    if state.deadline > 0 {
        println!("Deadline: {} (unix)", state.deadline);
    }
}

async fn donate(config: &AppConfig, amount: &str, seed: &str) -> anyhow::Result<()> {
    let gateway = build_gateway(config)?;
    let signer = Arc::new(LocalSigner::from_seed(seed).context("parsing seed")?);
    let donor = signer.address();

    let orchestrator = DonationOrchestrator::new(
        gateway.clone(),
        gateway,
        signer,
        config.network.network_id(),
        config.campaign.clone(),
        config.donation.clone(),
    );

    // Mirror every status-line change to the terminal while the session
    // runs.
    let mut feed = orchestrator.status_feed();
    let printer = tokio::spawn(async move {
        while feed.changed().await.is_ok() {
            let line = feed.borrow_and_update().clone();
            if !line.is_empty() {
                println!("{line}");
            }
        }
    });

    let result = orchestrator.donate(&donor, amount).await;
    drop(orchestrator);
    let _ = printer.await;

    match result {
        Ok(receipt) => {
            println!("Payment transaction: {}", receipt.payment_hash);
            println!("Record transaction:  {}", receipt.record_hash);
            Ok(())
        }
        Err(error) => Err(anyhow::anyhow!("{error}")),
    }
}

async fn watch(config: &AppConfig) -> anyhow::Result<()> {
    let gateway = build_gateway(config)?;
    let watcher = CampaignWatcher::new(
        gateway.clone(),
        gateway,
        config.campaign.clone(),
        config.donation.clone(),
    );
    let (handle, mut state_rx, task) = watcher.spawn();

    println!(
        "Watching campaign {} (every {}s, Ctrl-C to stop)",
        config.campaign.contract_id, config.campaign.poll_interval_secs
    );

    loop {
        tokio::select! {
            changed = state_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = *state_rx.borrow_and_update();
                if let Some(state) = state {
                    println!("---");
                    print_state(&state);
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    handle.shutdown().await;
    task.await.context("joining watcher task")?;
    Ok(())
}

fn new_keypair() -> anyhow::Result<()> {
    let secret = SecretKey::generate();
    println!("Public key: {}", secret.public_key().to_strkey());
    println!("Secret seed: {}", secret.to_strkey());
    Ok(())
}

fn sample_config() -> anyhow::Result<()> {
    let config = AppConfig::testnet();
    print!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}
