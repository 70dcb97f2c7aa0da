use crate::errors::ClientResult;
use crate::events::{BoardEvent, EventDispatcher};
use crate::ledger::TaskLedger;
use crate::session::Session;
use std::sync::Arc;
use taskboard_core::Task;

/// Cap on up-front allocation; a bogus `taskCount` must not reserve gigabytes.
const MAX_PREALLOCATED_TASKS: u64 = 1024;

/// Rebuilds the whole task collection from the ledger.
///
/// The result is returned to the caller as one value; nothing is published
/// while reads are in flight, and any failed read discards what was read so
/// far.
pub struct SyncEngine {
    events: Arc<EventDispatcher>,
}

impl SyncEngine {
    pub fn new(events: Arc<EventDispatcher>) -> Self {
        Self { events }
    }

    pub async fn sync(&self, session: &Session) -> ClientResult<Vec<Task>> {
        self.events.emit(BoardEvent::SyncStarted);
        tracing::info!("SESSION {}: sync started", session.id);

        match Self::read_all(session.ledger()).await {
            Ok(tasks) => {
                tracing::info!("SESSION {}: sync completed with {} tasks", session.id, tasks.len());
                self.events.emit(BoardEvent::SyncCompleted {
                    task_count: tasks.len(),
                });
                Ok(tasks)
            }
            Err(e) => {
                tracing::error!("SESSION {}: sync failed: {}", session.id, e);
                self.events.emit(BoardEvent::SyncFailed {
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Reads `taskCount`, then indices `1..=taskCount` one at a time.
    async fn read_all(ledger: &dyn TaskLedger) -> ClientResult<Vec<Task>> {
        let count = ledger.task_count().await?;
        let mut loaded = Vec::with_capacity(count.min(MAX_PREALLOCATED_TASKS) as usize);

        for index in 1..=count {
            let task = ledger.task(index).await?;
            if task.id.is_cleared() {
                tracing::debug!("Skipping cleared slot {}", index);
                continue;
            }
            loaded.push(task);
        }
        Ok(loaded)
    }
}
