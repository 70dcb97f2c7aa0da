use crate::errors::{ClientError, ClientResult};
use crate::events::{BoardEvent, EventDispatcher, MutationKind};
use crate::session::Session;
use crate::sync_engine::SyncEngine;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use taskboard_core::{Task, TaskId, TxHash};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Create(String),
    Toggle(TaskId),
    Delete(TaskId),
}

impl Mutation {
    pub fn kind(&self) -> MutationKind {
        match self {
            Mutation::Create(_) => MutationKind::Create,
            Mutation::Toggle(_) => MutationKind::Toggle,
            Mutation::Delete(_) => MutationKind::Delete,
        }
    }

    pub fn task(&self) -> Option<TaskId> {
        match self {
            Mutation::Create(_) => None,
            Mutation::Toggle(id) | Mutation::Delete(id) => Some(*id),
        }
    }
}

/// Result of a write that went through. The follow-up sync may still fail.
#[derive(Debug)]
pub struct MutationOutcome {
    pub tx_hash: TxHash,
    pub resync: ClientResult<Vec<Task>>,
}

/// Proof that the caller holds the submission flag. Dropping it clears the
/// flag.
pub struct SubmissionGuard {
    flag: Arc<AtomicBool>,
}

impl Drop for SubmissionGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Submits writes one at a time and resyncs after each successful one.
pub struct MutationDispatcher {
    submitting: Arc<AtomicBool>,
    sync: Arc<SyncEngine>,
    events: Arc<EventDispatcher>,
}

impl MutationDispatcher {
    pub fn new(sync: Arc<SyncEngine>, events: Arc<EventDispatcher>) -> Self {
        Self {
            submitting: Arc::new(AtomicBool::new(false)),
            sync,
            events,
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::Acquire)
    }

    /// Take the submission flag, or fail if another mutation holds it.
    pub fn begin(&self) -> ClientResult<SubmissionGuard> {
        self.submitting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ClientError::MutationInFlight)?;
        Ok(SubmissionGuard {
            flag: self.submitting.clone(),
        })
    }

    /// Send `mutation` from the session account. A failed write returns the
    /// error and skips the resync; a successful one always resyncs.
    pub async fn dispatch(
        &self,
        _guard: &SubmissionGuard,
        session: &Session,
        mutation: &Mutation,
    ) -> ClientResult<MutationOutcome> {
        let kind = mutation.kind();
        self.events.emit(BoardEvent::MutationSubmitted {
            kind,
            task: mutation.task(),
        });
        tracing::info!("SESSION {}: submitting {} mutation", session.id, kind);

        let ledger = session.ledger();
        let written = match mutation {
            Mutation::Create(content) => ledger.create_task(session.account, content).await,
            Mutation::Toggle(id) => ledger.toggle_completed(session.account, *id).await,
            Mutation::Delete(id) => ledger.delete_task(session.account, *id).await,
        };

        let tx_hash = match written {
            Ok(tx_hash) => tx_hash,
            Err(e) => {
                tracing::error!("SESSION {}: {} mutation failed: {}", session.id, kind, e);
                self.events.emit(BoardEvent::MutationFailed {
                    kind,
                    message: e.to_string(),
                });
                return Err(e);
            }
        };
        self.events.emit(BoardEvent::MutationConfirmed { kind, tx_hash });

        let resync = self.sync.sync(session).await;
        Ok(MutationOutcome { tx_hash, resync })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_serializes_submissions() {
        let events = Arc::new(EventDispatcher::new());
        let dispatcher = MutationDispatcher::new(Arc::new(SyncEngine::new(events.clone())), events);

        assert!(!dispatcher.is_submitting());
        let guard = dispatcher.begin().unwrap();
        assert!(dispatcher.is_submitting());
        assert!(matches!(dispatcher.begin(), Err(ClientError::MutationInFlight)));

        drop(guard);
        assert!(!dispatcher.is_submitting());
        assert!(dispatcher.begin().is_ok());
    }

    #[test]
    fn test_mutation_metadata() {
        assert_eq!(Mutation::Create("x".into()).kind(), MutationKind::Create);
        assert_eq!(Mutation::Create("x".into()).task(), None);
        assert_eq!(Mutation::Delete(TaskId(3)).task(), Some(TaskId(3)));
    }
}
