//! Indexer - ordered, at-least-once application of logged events
//!
//! Events are identified by [`EventKey`], which orders by position and
//! breaks ties by council and transaction, so councils logging into
//! separate logs never collide. The most recent events are retained in key
//! order on top of a checkpoint model; an event that arrives behind the
//! cursor is slotted into that history and the model is rebuilt from it.

use crate::handlers;
use crate::store::ReadModel;
use council_types::{CouncilId, EventPosition, LoggedEvent, TxHash};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Events retained for reordering before they are folded into the checkpoint
pub const DEFAULT_REPLAY_WINDOW: usize = 10_000;

/// Identity and total order of a logged event across councils
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventKey {
    pub position: EventPosition,
    pub council: CouncilId,
    pub tx_hash: TxHash,
}

impl EventKey {
    pub fn of(logged: &LoggedEvent) -> Self {
        Self {
            position: logged.position,
            council: logged.council,
            tx_hash: logged.tx_hash,
        }
    }
}

/// Outcome of one [`Indexer::ingest`] call
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub applied: usize,
    /// Events already applied
    pub duplicates: usize,
    /// Unseen events keyed below the cursor
    pub late: usize,
    /// Events at or below the checkpoint, dropped
    pub stale: usize,
}

#[derive(Clone, Debug)]
pub struct Indexer {
    model: ReadModel,
    /// Model state before the first retained event
    checkpoint: ReadModel,
    history: BTreeMap<EventKey, LoggedEvent>,
    /// Highest key folded into the checkpoint
    floor: Option<EventKey>,
    folded: usize,
    replay_window: usize,
}

impl Default for Indexer {
    fn default() -> Self {
        Self {
            model: ReadModel::default(),
            checkpoint: ReadModel::default(),
            history: BTreeMap::new(),
            floor: None,
            folded: 0,
            replay_window: DEFAULT_REPLAY_WINDOW,
        }
    }
}

impl Indexer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Retain at most `window` (at least one) events for reordering
    pub fn with_replay_window(mut self, window: usize) -> Self {
        self.replay_window = window.max(1);
        self
    }

    /// Apply a batch of events.
    ///
    /// The batch is sorted by key first. Already-applied events are skipped,
    /// so redelivering a batch leaves the model unchanged. If any event lands
    /// behind the cursor the model is rebuilt from the checkpoint.
    pub fn ingest<I>(&mut self, batch: I) -> IngestReport
    where
        I: IntoIterator<Item = LoggedEvent>,
    {
        let mut batch: Vec<LoggedEvent> = batch.into_iter().collect();
        batch.sort_by_key(EventKey::of);

        let mut report = IngestReport::default();
        let mut fresh = Vec::with_capacity(batch.len());
        for logged in batch {
            let key = EventKey::of(&logged);

            if self.floor.map(|floor| key <= floor).unwrap_or(false) {
                warn!(
                    council = %key.council,
                    position = %key.position,
                    event = logged.event.name(),
                    "Dropping event behind checkpoint"
                );
                report.stale += 1;
                continue;
            }
            if self.history.contains_key(&key) {
                report.duplicates += 1;
                continue;
            }
            if self
                .history
                .last_key_value()
                .map(|(last, _)| key < *last)
                .unwrap_or(false)
            {
                warn!(
                    council = %key.council,
                    position = %key.position,
                    event = logged.event.name(),
                    "Event older than cursor"
                );
                report.late += 1;
            }

            self.history.insert(key, logged);
            fresh.push(key);
            report.applied += 1;
        }

        if report.late > 0 {
            self.rebuild();
        } else {
            for key in &fresh {
                if let Some(logged) = self.history.get(key) {
                    handlers::apply(&mut self.model, logged);
                }
            }
        }
        self.fold_excess();

        debug!(
            applied = report.applied,
            duplicates = report.duplicates,
            late = report.late,
            stale = report.stale,
            "Batch ingested"
        );
        report
    }

    fn rebuild(&mut self) {
        let mut model = self.checkpoint.clone();
        for logged in self.history.values() {
            handlers::apply(&mut model, logged);
        }
        self.model = model;
        debug!(replayed = self.history.len(), "Read model rebuilt");
    }

    fn fold_excess(&mut self) {
        while self.history.len() > self.replay_window {
            let Some((key, logged)) = self.history.pop_first() else {
                break;
            };
            handlers::apply(&mut self.checkpoint, &logged);
            self.floor = Some(key);
            self.folded += 1;
        }
    }

    /// Highest position applied so far
    pub fn cursor(&self) -> Option<EventPosition> {
        self.history
            .last_key_value()
            .map(|(key, _)| key.position)
            .or(self.floor.map(|key| key.position))
    }

    pub fn applied_count(&self) -> usize {
        self.folded + self.history.len()
    }

    /// Events still available for reordering
    pub fn retained(&self) -> usize {
        self.history.len()
    }

    pub fn model(&self) -> &ReadModel {
        &self.model
    }

    pub fn into_model(self) -> ReadModel {
        self.model
    }
}
