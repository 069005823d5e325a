//! InfraGraph CLI entry point

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use infragraph_layout::LayoutAlgorithm;

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "infragraph")]
#[command(about = "Infrastructure graphs from resource configuration: layout, drift and cost", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Config file (defaults to ./infragraph.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse configuration files into a graph
    Import {
        /// Configuration documents
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Lay the graph out after building it
        #[arg(short, long)]
        layout: Option<LayoutAlgorithm>,

        /// Write the result here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Re-run a layout over a graph
    Layout {
        graph: PathBuf,

        /// Overrides the configured algorithm
        #[arg(short, long)]
        algorithm: Option<LayoutAlgorithm>,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Compare a graph with a state export or live inventory
    Drift {
        graph: PathBuf,

        /// State export JSON
        #[arg(long, conflicts_with = "inventory", required_unless_present = "inventory")]
        state: Option<PathBuf>,

        /// Live inventory JSON
        #[arg(long)]
        inventory: Option<PathBuf>,

        /// Match on resource keys only
        #[arg(long)]
        no_fallback: bool,

        /// Also emit the graph with missing resources added
        #[arg(long)]
        reconcile: bool,
    },
    /// Report savings suggestions
    Cost { graph: PathBuf },
    /// Map every node onto another provider
    Convert {
        graph: PathBuf,

        /// Target provider (aws, azure, gcp)
        #[arg(long)]
        to: String,
    },
    /// Cheapest provider for a canonical component
    Cheapest { canonical_id: String },
    /// Show version
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // stdout carries JSON, so logs go to stderr
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!("infragraph={}", log_level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = config::EngineConfig::load(&config::config_path(cli.config))?;

    match cli.command {
        Commands::Import { files, layout, output } => commands::import(&files, layout, output.as_deref(), &config),
        Commands::Layout { graph, algorithm, output } => {
            commands::layout(&graph, algorithm, output.as_deref(), &config)
        }
        Commands::Drift {
            graph,
            state,
            inventory,
            no_fallback,
            reconcile,
        } => {
            let truth = match (state, inventory) {
                (Some(path), _) => commands::TruthFile::State(path),
                (None, Some(path)) => commands::TruthFile::Inventory(path),
                (None, None) => anyhow::bail!("one of --state or --inventory is required"),
            };
            commands::drift(&graph, &truth, no_fallback, reconcile, &config)
        }
        Commands::Cost { graph } => commands::cost(&graph),
        Commands::Convert { graph, to } => commands::convert(&graph, &to),
        Commands::Cheapest { canonical_id } => commands::cheapest(&canonical_id),
        Commands::Version => {
            println!("InfraGraph v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
