//! nodekit command line.
//!
//! ```text
//! nodekit parse localhost:4801 10.0.0.5:80   # normalize addresses
//! nodekit local-ip                           # show the resolved local IP
//! nodekit run --config node.toml             # resolve, then wait for SIGINT/SIGTERM
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use nodekit::config::{load_config, NodeConfig};
use nodekit::lifecycle::Shutdown;
use nodekit::net::{Address, HostPort, HostResolver, SystemResolver};
use nodekit::observability::init_logging;

#[derive(Parser)]
#[command(name = "nodekit")]
#[command(about = "Node address normalization and lifecycle helper", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse and normalize host:port addresses
    Parse {
        addresses: Vec<String>,

        /// Check syntax only, keep loopback aliases as written
        #[arg(long)]
        no_resolve: bool,

        /// Print a JSON array instead of one address per line
        #[arg(long)]
        json: bool,
    },
    /// Print the local IP that loopback aliases resolve to
    LocalIp,
    /// Resolve the configured node address and wait for a shutdown signal
    Run {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Parse {
            addresses,
            no_resolve,
            json,
        } => {
            init_logging("nodekit=warn");
            let resolver = SystemResolver::default();
            let parsed = addresses
                .iter()
                .map(|text| {
                    if no_resolve {
                        HostPort::parse(text).map(Address::from)
                    } else {
                        Address::parse_with(text, &resolver)
                    }
                })
                .collect::<Result<Vec<_>, _>>()?;

            if json {
                println!("{}", serde_json::to_string_pretty(&parsed)?);
            } else {
                for address in parsed {
                    println!("{address}");
                }
            }
        }
        Commands::LocalIp => {
            init_logging("nodekit=warn");
            println!("{}", SystemResolver::default().local_ip()?);
        }
        Commands::Run { config } => {
            let config = match config {
                Some(path) => load_config(&path)?,
                None => NodeConfig::default(),
            };
            init_logging(&config.logging.filter);

            tracing::info!("nodekit v0.1.0 starting");

            let address = config.node_address()?;
            let seeds = config.seed_addresses()?;
            tracing::info!(
                address = %address,
                seeds = seeds.len(),
                "Node address resolved"
            );
            for seed in &seeds {
                tracing::debug!(seed = %seed, "Seed");
            }

            let shutdown = Shutdown::new();
            shutdown.on_os_signal();
            shutdown.wait().await;

            tracing::info!("Shutdown complete");
        }
    }

    Ok(())
}
