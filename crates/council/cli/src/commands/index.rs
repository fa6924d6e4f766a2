//! `councilhaus index` - replay an event log into the read model

use crate::error::CliResult;
use crate::output::{print_detail, print_success};
use clap::Args;
use council_indexer::Indexer;
use council_runtime::EventLog;
use std::path::PathBuf;
use tracing::debug;

#[derive(Args)]
pub struct IndexArgs {
    /// Event log to replay
    #[arg(short, long, default_value = "events.json")]
    pub log: PathBuf,

    /// Write the read model here instead of stdout
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

pub fn execute(args: IndexArgs) -> CliResult<()> {
    let log = EventLog::load(&args.log)?;
    debug!(path = %args.log.display(), events = log.len(), "Event log loaded");

    let mut indexer = Indexer::new();
    let report = indexer.ingest(log.into_events());
    let json = indexer.model().snapshot().to_json()?;

    match &args.out {
        Some(path) => {
            std::fs::write(path, json)?;
            print_success(&format!("Read model written to {}", path.display()));
        }
        None => println!("{}", json),
    }
    print_detail("events applied", report.applied);
    if let Some(cursor) = indexer.cursor() {
        print_detail("cursor", cursor);
    }
    Ok(())
}
