//! `councilhaus create` - deploy a council from a configuration file

use super::{created_councils, load_or_new};
use crate::error::CliResult;
use crate::output::{print_detail, print_success};
use clap::Args;
use council_runtime::{CouncilFactory, InMemoryPool};
use council_types::{Address, CouncilConfig};
use std::path::PathBuf;

#[derive(Args)]
pub struct CreateArgs {
    /// Council configuration (TOML)
    #[arg(short, long, env = "COUNCILHAUS_CONFIG")]
    pub config: PathBuf,

    /// Account that receives every council role
    #[arg(long)]
    pub creator: Address,

    /// Factory address councils are derived from
    #[arg(long)]
    pub factory: Option<Address>,

    /// Event log to append to (created if missing)
    #[arg(short, long, default_value = "events.json")]
    pub log: PathBuf,
}

pub fn default_factory() -> Address {
    Address::derive(b"councilhaus/factory")
}

pub fn execute(args: CreateArgs) -> CliResult<()> {
    let config = CouncilConfig::load(&args.config)?;
    let mut log = load_or_new(&args.log)?;

    let nonce = created_councils(&log).len() as u64;
    let mut factory =
        CouncilFactory::with_nonce(args.factory.unwrap_or_else(default_factory), nonce);
    let council = factory.create_council(&args.creator, &config, InMemoryPool::new(), &mut log)?;
    log.save(&args.log)?;

    print_success(&format!("Council {} created", config.council_name));
    print_detail("council", council.id());
    print_detail("pool", council.pool());
    print_detail("members", council.members().len());
    print_detail("grantees", council.grantees().len());
    print_detail("event log", args.log.display());
    println!("{}", council.id());
    Ok(())
}
