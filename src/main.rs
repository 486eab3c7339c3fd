//! limgraph CLI entry point

use clap::Parser;
use limgraph::cli::{Cli, Commands};
use limgraph::core::error::Result;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_env("LIMGRAPH_LOG")
        .unwrap_or_else(|_| EnvFilter::new(cli.verbosity.directive()));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    if let Err(e) = run(cli) {
        tracing::error!(error = %e, "Command failed");
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Build(args) => limgraph::cli::build::run(args),
        Commands::Dump(args) => limgraph::cli::dump::run(args),
        Commands::Info(args) => limgraph::cli::info::run(args),
    }
}
