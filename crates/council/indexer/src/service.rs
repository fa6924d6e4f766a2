//! Background indexing service
//!
//! Consumes event batches from a channel and feeds them into a shared
//! [`Indexer`] until the channel closes or the service is stopped.

use crate::indexer::Indexer;
use council_types::LoggedEvent;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Handle to a running [`IndexerService`] task
pub struct IndexerHandle {
    task: JoinHandle<()>,
    stop: mpsc::Sender<()>,
}

impl IndexerHandle {
    /// Ask the task to stop and wait for it
    pub async fn stop(self) {
        // The task may already have exited after its channel closed
        let _ = self.stop.send(()).await;
        if let Err(e) = self.task.await {
            warn!(error = %e, "indexer task failed");
        }
    }

    /// Wait for the task to finish on its own
    pub async fn join(self) {
        if let Err(e) = self.task.await {
            warn!(error = %e, "indexer task failed");
        }
    }
}

pub struct IndexerService {
    indexer: Arc<Mutex<Indexer>>,
}

impl IndexerService {
    pub fn new(indexer: Arc<Mutex<Indexer>>) -> Self {
        Self { indexer }
    }

    pub fn indexer(&self) -> Arc<Mutex<Indexer>> {
        self.indexer.clone()
    }

    /// Spawn a task that ingests every batch received on `events`
    pub fn spawn(&self, mut events: mpsc::Receiver<Vec<LoggedEvent>>) -> IndexerHandle {
        let indexer = self.indexer.clone();
        let (stop_tx, mut stop_rx) = mpsc::channel::<()>(1);

        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    batch = events.recv() => {
                        match batch {
                            Some(batch) => match indexer.lock() {
                                Ok(mut indexer) => {
                                    indexer.ingest(batch);
                                }
                                Err(e) => {
                                    warn!(error = %e, "indexer lock poisoned");
                                    break;
                                }
                            },
                            None => {
                                debug!("event channel closed");
                                break;
                            }
                        }
                    }
                    _ = stop_rx.recv() => {
                        debug!("indexer service stopped");
                        break;
                    }
                }
            }
        });

        IndexerHandle {
            task,
            stop: stop_tx,
        }
    }
}
