//! Deferred-task scheduling for scrape units
//!
//! The driver hands each unit to a `TaskScheduler` and never looks at the
//! outcome. `TokioScheduler` runs units as tokio tasks, with a semaphore
//! bounding how many are in flight.

use crate::crawler::unit::ScrapeUnit;
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

/// Fire-and-forget submission of scrape units
pub trait TaskScheduler {
    fn submit(&self, unit: ScrapeUnit);
}

/// Runs scrape units on the tokio runtime
pub struct TokioScheduler {
    /// Bounds concurrently running units
    semaphore: Arc<Semaphore>,

    /// Handles of units not yet known to be finished
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl TokioScheduler {
    pub fn new(max_concurrent_units: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(max_concurrent_units.max(1))),
            handles: Mutex::new(Vec::new()),
        }
    }

    /// Number of submitted units that have not finished yet
    pub fn in_flight(&self) -> usize {
        self.handles
            .lock()
            .map(|handles| handles.iter().filter(|h| !h.is_finished()).count())
            .unwrap_or(0)
    }

    /// Waits for every submitted unit to finish
    pub async fn drain(&self) {
        loop {
            let pending = match self.handles.lock() {
                Ok(mut handles) => std::mem::take(&mut *handles),
                Err(_) => {
                    tracing::error!("Scheduler handle list poisoned; not waiting for units");
                    return;
                }
            };

            if pending.is_empty() {
                return;
            }

            tracing::debug!("Waiting for {} scrape units", pending.len());
            for handle in pending {
                if let Err(e) = handle.await {
                    tracing::error!("Scrape unit aborted: {}", e);
                }
            }
        }
    }
}

impl TaskScheduler for TokioScheduler {
    fn submit(&self, unit: ScrapeUnit) {
        let semaphore = Arc::clone(&self.semaphore);

        let handle = tokio::spawn(async move {
            let Ok(_permit) = semaphore.acquire_owned().await else {
                tracing::error!("Scheduler closed before {} could run", unit.identifier());
                return;
            };
            // Failures are recorded by the unit itself
            let _ = unit.run().await;
        });

        match self.handles.lock() {
            Ok(mut handles) => {
                handles.retain(|h| !h.is_finished());
                handles.push(handle);
            }
            Err(_) => tracing::error!("Scheduler handle list poisoned; unit runs untracked"),
        }
    }
}
