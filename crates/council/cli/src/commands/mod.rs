//! Subcommand implementations

pub mod allocate;
pub mod create;
pub mod index;

use crate::error::{CliError, CliResult};
use council_runtime::EventLog;
use council_types::{CouncilEvent, CouncilId};
use std::path::Path;

/// Load an event log, or start an empty one if the file does not exist yet
pub(crate) fn load_or_new(path: &Path) -> CliResult<EventLog> {
    if path.exists() {
        Ok(EventLog::load(path)?)
    } else {
        Ok(EventLog::new())
    }
}

/// Councils created in `log`, in creation order
pub(crate) fn created_councils(log: &EventLog) -> Vec<CouncilId> {
    log.events()
        .iter()
        .filter_map(|e| match e.event {
            CouncilEvent::CouncilCreated { council, .. } => Some(council),
            _ => None,
        })
        .collect()
}

/// Pick `requested`, or the only council in the log
pub(crate) fn select_council(log: &EventLog, requested: Option<CouncilId>) -> CliResult<CouncilId> {
    let councils = created_councils(log);
    match requested {
        Some(id) if councils.contains(&id) => Ok(id),
        Some(id) => Err(CliError::InvalidInput(format!(
            "council {} not found in event log",
            id
        ))),
        None => match councils.as_slice() {
            [only] => Ok(*only),
            [] => Err(CliError::InvalidInput("event log contains no council".into())),
            _ => Err(CliError::InvalidInput(format!(
                "event log contains {} councils, pass --council",
                councils.len()
            ))),
        },
    }
}
