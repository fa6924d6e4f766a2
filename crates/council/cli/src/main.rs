//! CouncilHaus CLI - operator tooling for councils and their read model
//!
//! - Create councils from TOML configuration into a JSON event log
//! - Apply member allocations on top of a logged council
//! - Replay an event log into the indexed read model

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod config;
mod error;
mod output;

use commands::{allocate, create, index};
use error::CliResult;

#[derive(Parser)]
#[command(name = "councilhaus")]
#[command(about = "CouncilHaus - council budget allocation CLI", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a council and append its creation to an event log
    Create(create::CreateArgs),

    /// Apply a member's budget allocation
    Allocate(allocate::AllocateArgs),

    /// Replay an event log and print the read model as JSON
    Index(index::IndexArgs),
}

fn init_tracing(verbose: bool, json: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| level.into());
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .without_time()
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

fn run(cli: Cli) -> CliResult<()> {
    match cli.command {
        Commands::Create(args) => create::execute(args),
        Commands::Allocate(args) => allocate::execute(args),
        Commands::Index(args) => index::execute(args),
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.json);

    if let Err(e) = run(cli) {
        output::print_error(&e.to_string());
        std::process::exit(1);
    }
}
