//! ClaimRoot Simulator
//!
//! Drives the governance engine through scripted or random runs on a manual
//! clock, then prints the resulting statistics.

use clap::Parser;
use claimroot_crypto::HashAlgorithm;
use claimroot_governance::GovernanceConfig;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod controller;
mod member;
mod metrics;
mod scenario;

use controller::SimulationController;
use scenario::Scenario;

/// ClaimRoot Simulator CLI
#[derive(Parser, Debug)]
#[command(name = "claimroot-sim")]
#[command(about = "ClaimRoot governance simulation environment")]
struct Args {
    /// Number of random members for a random run
    #[arg(short, long, default_value = "5")]
    members: usize,

    /// Built-in scenario to run (quorum-pass, tie-reject, low-turnout)
    #[arg(short, long)]
    scenario: Option<String>,

    /// Proposals to simulate in a random run
    #[arg(long, default_value = "3")]
    rounds: usize,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Chain hash algorithm (sha256 or checksum); overrides CLAIMROOT_HASH_ALGORITHM
    #[arg(long)]
    hasher: Option<HashAlgorithm>,

    /// Back up and restore the engine after the run
    #[arg(long)]
    backup: bool,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let mut config = GovernanceConfig::from_env();

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| config.log_level.clone()),
    );
    if args.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    if let Some(hasher) = args.hasher {
        config.hash_algorithm = hasher;
    }

    info!("Starting ClaimRoot Simulator");
    info!("Hash algorithm: {}", config.hash_algorithm);

    let mut controller = SimulationController::new(config, args.seed)?;

    match &args.scenario {
        Some(name) => {
            let scenario = Scenario::load(name)?;
            controller.run_scenario(&scenario)?;
        }
        None => {
            info!("Random run: {} members, {} rounds", args.members, args.rounds);
            controller.run_random(args.members, args.rounds)?;
        }
    }

    let stats = controller.service().get_governance_stats();
    println!("{}", serde_json::to_string_pretty(&stats)?);

    if !stats.chain_stats.is_valid {
        anyhow::bail!("chain failed verification");
    }

    if args.backup {
        let summary = controller.backup_and_restore().await?;
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    let metrics = controller.metrics();
    info!("Simulation complete");
    info!("Proposals created: {}", metrics.proposals_created);
    info!("Votes cast: {}", metrics.votes_cast);
    info!("Executed: {}", metrics.proposals_executed);
    info!("Refused operations: {}", metrics.operations_rejected);
    info!("Acceptance rate: {:.2}", metrics.acceptance_rate());

    Ok(())
}
