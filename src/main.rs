//! Batch sender CLI.
//!
//! # Commands
//! - `endpoints`: enabled endpoints of the active network, primary and threshold
//! - `plan`: validate a recipient list and show how it would be batched
//! - `verify`: run the multi-endpoint consensus check for a signature

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use batch_sender::chain::{JsonRpcClient, Signature};
use batch_sender::config::load_config;
use batch_sender::consensus::ConsensusVerifier;
use batch_sender::endpoints::{EndpointRegistry, StaticRegistry};
use batch_sender::observability::init_logging;
use batch_sender::recipients::{format_amount, parse_recipients, partition};

#[derive(Parser)]
#[command(name = "batch-sender")]
#[command(about = "Adaptive batch token sender", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "batch-sender.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List enabled endpoints of the active network
    Endpoints,
    /// Validate a recipient list and print its batches
    Plan {
        /// File with one `address, amount` per line
        #[arg(short, long)]
        recipients: PathBuf,
        /// Mint decimal places
        #[arg(short, long, default_value_t = 6)]
        decimals: u8,
        /// Recipients per batch (defaults to batch.default_size)
        #[arg(short, long)]
        batch_size: Option<usize>,
    },
    /// Check a signature's finality across all enabled endpoints
    Verify { signature: String },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;
    init_logging(&config.observability.log_level);

    let registry = StaticRegistry::from_config(&config)?;

    match cli.command {
        Commands::Endpoints => {
            let enabled = registry.list_enabled_endpoints();
            let primary = registry.primary_endpoint();
            let threshold = registry.min_consensus_threshold();

            println!("network: {}", config.network);
            for endpoint in &enabled {
                let marker = match &primary {
                    Some(p) if p.id == endpoint.id => "*",
                    _ => " ",
                };
                let key = if endpoint.api_key.is_empty() { "" } else { " (api key)" };
                println!("{} {:<16} {}{}", marker, endpoint.id, endpoint.label, key);
            }
            println!("consensus threshold: {}", threshold);
            if enabled.len() < threshold {
                eprintln!(
                    "warning: {} enabled endpoint(s) cannot reach a threshold of {}",
                    enabled.len(),
                    threshold
                );
            }
        }
        Commands::Plan {
            recipients,
            decimals,
            batch_size,
        } => {
            let text = std::fs::read_to_string(&recipients)?;
            let list = parse_recipients(&text, decimals)?;
            let size = batch_size.unwrap_or(config.batch.default_size);
            let batches = partition(&list, size, config.batch.max_size)?;

            let total: u128 = list.iter().map(|r| u128::from(r.amount)).sum();
            println!(
                "{} recipient(s), {} batch(es) of up to {}",
                list.len(),
                batches.len(),
                size
            );
            for (index, batch) in batches.iter().enumerate() {
                println!("batch {}:", index);
                for recipient in batch {
                    println!(
                        "  line {:>4}  {}  {}",
                        recipient.line,
                        recipient.address,
                        format_amount(recipient.amount, decimals)
                    );
                }
            }
            println!("total units: {}", total);
        }
        Commands::Verify { signature } => {
            let primary = registry
                .primary_endpoint()
                .ok_or("no enabled endpoint to query from")?;
            let source = Arc::new(JsonRpcClient::new(&primary, &config.rpc)?);
            let verifier = ConsensusVerifier::new(Arc::new(registry), source, &config.consensus);

            let outcome = verifier.verify(&Signature(signature)).await;
            for result in &outcome.results {
                println!(
                    "{:<16} {:<10} {}",
                    result.endpoint_label,
                    result.status,
                    result.error.as_deref().unwrap_or("")
                );
            }
            println!(
                "consensus {}: {}/{} finalized",
                if outcome.consensus_reached { "reached" } else { "not reached" },
                outcome.confirmed_count,
                outcome.total_count
            );
        }
    }

    Ok(())
}
