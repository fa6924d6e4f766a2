//! Event Log - append-only record of every council state change
//!
//! Each successful council operation commits its events as one
//! transaction: a new block number, a derived transaction hash, and
//! consecutive log indices. Failed operations commit nothing.

use chrono::Utc;
use council_types::{CouncilEvent, CouncilId, EventPosition, LoggedEvent, TxHash};
use std::path::Path;

/// Errors raised while exporting or importing a log
#[derive(Debug, thiserror::Error)]
pub enum EventLogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Append-only event log shared by every council writing into it
#[derive(Clone, Debug, Default)]
pub struct EventLog {
    events: Vec<LoggedEvent>,
    next_block: u64,
    last_timestamp: i64,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a log from previously exported events
    pub fn from_events(events: Vec<LoggedEvent>) -> Self {
        let next_block = events
            .iter()
            .map(|e| e.position.block_number + 1)
            .max()
            .unwrap_or(0);
        let last_timestamp = events
            .iter()
            .map(|e| e.position.timestamp)
            .max()
            .unwrap_or(0);
        Self {
            events,
            next_block,
            last_timestamp,
        }
    }

    /// Commit one transaction's events at the current wall-clock time
    pub fn commit(&mut self, council: CouncilId, events: Vec<CouncilEvent>) -> TxHash {
        self.commit_at(council, Utc::now().timestamp(), events)
    }

    /// Commit one transaction's events at `timestamp`.
    ///
    /// Timestamps never go backwards: an earlier value is clamped to the
    /// latest committed one.
    pub fn commit_at(
        &mut self,
        council: CouncilId,
        timestamp: i64,
        events: Vec<CouncilEvent>,
    ) -> TxHash {
        let block_number = self.next_block;
        self.next_block += 1;
        let timestamp = timestamp.max(self.last_timestamp);
        self.last_timestamp = timestamp;

        let mut seed = Vec::with_capacity(28);
        seed.extend_from_slice(council.address().as_bytes());
        seed.extend_from_slice(&block_number.to_be_bytes());
        let tx_hash = TxHash::derive(&seed);

        for (log_index, event) in events.into_iter().enumerate() {
            self.events.push(LoggedEvent {
                council,
                tx_hash,
                position: EventPosition::new(timestamp, block_number, log_index as u32),
                event,
            });
        }

        tx_hash
    }

    pub fn events(&self) -> &[LoggedEvent] {
        &self.events
    }

    pub fn events_for(&self, council: &CouncilId) -> Vec<&LoggedEvent> {
        self.events.iter().filter(|e| &e.council == council).collect()
    }

    /// Events strictly after `position`
    pub fn since(&self, position: &EventPosition) -> Vec<&LoggedEvent> {
        self.events
            .iter()
            .filter(|e| &e.position > position)
            .collect()
    }

    pub fn last(&self) -> Option<&LoggedEvent> {
        self.events.last()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn into_events(self) -> Vec<LoggedEvent> {
        self.events
    }

    pub fn to_json(&self) -> Result<String, EventLogError> {
        Ok(serde_json::to_string_pretty(&self.events)?)
    }

    pub fn from_json(json: &str) -> Result<Self, EventLogError> {
        let events: Vec<LoggedEvent> = serde_json::from_str(json)?;
        Ok(Self::from_events(events))
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), EventLogError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, EventLogError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }
}
