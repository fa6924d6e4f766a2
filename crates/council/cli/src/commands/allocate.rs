//! `councilhaus allocate` - apply a member's allocation to a logged council

use super::select_council;
use crate::config::AllocationFile;
use crate::error::CliResult;
use crate::output::{print_detail, print_success};
use clap::Args;
use council_runtime::{Council, EventLog, InMemoryPool};
use council_types::{Address, CouncilId};
use std::path::PathBuf;
use tracing::debug;

#[derive(Args)]
pub struct AllocateArgs {
    /// Allocation request (TOML)
    #[arg(short, long)]
    pub allocation: PathBuf,

    /// Event log holding the council's history
    #[arg(short, long, default_value = "events.json")]
    pub log: PathBuf,

    /// Council address, required when the log holds several councils
    #[arg(long)]
    pub council: Option<Address>,
}

pub fn execute(args: AllocateArgs) -> CliResult<()> {
    let request = AllocationFile::load(&args.allocation)?;
    let mut log = EventLog::load(&args.log)?;
    let id = select_council(&log, args.council.map(CouncilId::new))?;

    let mut council = Council::restore(id, log.events(), InMemoryPool::new())?;
    debug!(
        council = %id,
        members = council.members().len(),
        grantees = council.grantees().len(),
        "Council restored"
    );
    let tx = council.allocate(&request.member, request.to_budget_allocation(), &mut log)?;
    log.save(&args.log)?;

    let view = council.get_allocation(&request.member);
    print_success(&format!("Budget allocated by {}", request.member));
    print_detail("transaction", tx);
    print_detail("allocated", format!("{} / {}", view.total_allocated, view.voting_power));
    print_detail("council total", council.total_allocated());
    Ok(())
}
