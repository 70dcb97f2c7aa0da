//! The TaskBoard controller.
//!
//! Owns the only writable copy of [`BoardState`] and publishes it through a
//! `watch` channel. Every published `tasks` value is the complete result of
//! one finished sync; mutations never edit it locally.

use crate::dispatcher::{Mutation, MutationDispatcher, SubmissionGuard};
use crate::errors::{ClientError, ClientResult};
use crate::events::EventDispatcher;
use crate::provider::WalletProvider;
use crate::session::{ConnectionGate, Session};
use crate::sync_engine::SyncEngine;
use std::sync::{Arc, Mutex};
use taskboard_core::{Address, Task, TaskId};
use tokio::sync::watch;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardError {
    pub message: String,
    pub fatal: bool,
}

impl From<&ClientError> for BoardError {
    fn from(err: &ClientError) -> Self {
        Self {
            message: err.to_string(),
            fatal: err.is_fatal(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoardState {
    pub loading: bool,
    pub error: Option<BoardError>,
    pub has_address: bool,
    /// Raw text in the address field, unvalidated until submitted.
    pub address_input: String,
    pub account: Option<Address>,
    pub tasks: Arc<Vec<Task>>,
    pub is_submitting: bool,
    /// Text of the new-task field.
    pub draft: String,
}

pub struct TaskBoard {
    gate: ConnectionGate,
    sync: Arc<SyncEngine>,
    dispatcher: MutationDispatcher,
    session: Mutex<Option<Session>>,
    state: watch::Sender<BoardState>,
    events: Arc<EventDispatcher>,
}

impl TaskBoard {
    /// `provider` is `None` when no wallet could be found.
    pub fn new(provider: Option<Arc<dyn WalletProvider>>) -> Self {
        Self::with_events(provider, Arc::new(EventDispatcher::new()))
    }

    pub fn with_events(provider: Option<Arc<dyn WalletProvider>>, events: Arc<EventDispatcher>) -> Self {
        let sync = Arc::new(SyncEngine::new(events.clone()));
        let (state, _) = watch::channel(BoardState::default());
        Self {
            gate: ConnectionGate::new(provider, events.clone()),
            dispatcher: MutationDispatcher::new(sync.clone(), events.clone()),
            sync,
            session: Mutex::new(None),
            state,
            events,
        }
    }

    pub fn events(&self) -> Arc<EventDispatcher> {
        self.events.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<BoardState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> BoardState {
        self.state.borrow().clone()
    }

    pub fn session(&self) -> Option<Session> {
        self.session.lock().ok().and_then(|s| s.clone())
    }

    fn replace_session(&self, session: Option<Session>) {
        if let Ok(mut current) = self.session.lock() {
            *current = session;
        }
    }

    fn publish_error(&self, err: &ClientError) {
        let error = BoardError::from(err);
        self.state.send_modify(|s| {
            s.loading = false;
            s.error = Some(error);
        });
    }

    /// Record keystrokes in the address field. No validation happens here.
    pub fn set_address_input(&self, raw: &str) {
        let raw = raw.to_string();
        self.state.send_modify(|s| s.address_input = raw);
    }

    pub fn set_draft(&self, text: &str) {
        let text = text.to_string();
        self.state.send_modify(|s| s.draft = text);
    }

    /// Publish the fatal error up front when there is no provider at all.
    pub fn check_provider(&self) -> ClientResult<()> {
        if self.gate.has_provider() {
            return Ok(());
        }
        let err = ClientError::ProviderAbsent;
        self.publish_error(&err);
        Err(err)
    }

    /// Validate the address field and, if it passes, connect and sync.
    pub async fn submit_address(&self) -> ClientResult<()> {
        self.check_provider()?;
        let guard = self.begin_gate()?;

        let raw = self.state.borrow().address_input.clone();
        let contract = match ConnectionGate::validate(&raw) {
            Ok(contract) => contract,
            Err(err) => {
                tracing::warn!("Rejected contract address {:?}", raw);
                self.publish_error(&err);
                return Err(err);
            }
        };

        self.open(&guard, contract).await
    }

    /// Drop the current session and rebuild it against the same contract.
    pub async fn reload(&self) -> ClientResult<()> {
        let contract = match self.session() {
            Some(session) => session.contract,
            None => return self.submit_address().await,
        };
        let guard = self.begin_gate()?;
        self.open(&guard, contract).await
    }

    /// Gate operations share the submission flag with mutations so only one
    /// of them ever publishes at a time. A refusal leaves the state as is.
    fn begin_gate(&self) -> ClientResult<SubmissionGuard> {
        self.dispatcher.begin().map_err(|_| {
            tracing::warn!("Board operation refused: another one is still running");
            ClientError::Busy
        })
    }

    async fn open(&self, _guard: &SubmissionGuard, contract: Address) -> ClientResult<()> {
        self.replace_session(None);
        self.state.send_modify(|s| {
            s.has_address = true;
            s.loading = true;
            s.error = None;
        });

        let session = match self.gate.connect(contract).await {
            Ok(session) => session,
            Err(err) => {
                let error = BoardError::from(&err);
                self.state.send_modify(|s| {
                    s.has_address = false;
                    s.loading = false;
                    s.account = None;
                    s.error = Some(error);
                });
                return Err(err);
            }
        };
        self.replace_session(Some(session.clone()));
        let account = session.account;
        self.state.send_modify(|s| s.account = Some(account));

        match self.sync.sync(&session).await {
            Ok(tasks) => {
                self.state.send_modify(|s| {
                    s.loading = false;
                    s.error = None;
                    s.tasks = Arc::new(tasks);
                });
                Ok(())
            }
            Err(err) => {
                self.publish_error(&err);
                Err(err)
            }
        }
    }

    /// No-op when `content` is blank.
    pub async fn create_task(&self, content: &str) -> ClientResult<()> {
        if content.trim().is_empty() {
            return Ok(());
        }
        self.mutate(Mutation::Create(content.to_string())).await
    }

    pub async fn toggle_task(&self, id: TaskId) -> ClientResult<()> {
        self.mutate(Mutation::Toggle(id)).await
    }

    pub async fn delete_task(&self, id: TaskId) -> ClientResult<()> {
        self.mutate(Mutation::Delete(id)).await
    }

    async fn mutate(&self, mutation: Mutation) -> ClientResult<()> {
        let session = self.session().ok_or(ClientError::NotConnected)?;
        let guard = self.dispatcher.begin()?;
        self.state.send_modify(|s| s.is_submitting = true);

        let outcome = self.dispatcher.dispatch(&guard, &session, &mutation).await;
        let clears_draft = matches!(mutation, Mutation::Create(_)) && outcome.is_ok();

        let (tasks, result) = match outcome.and_then(|o| o.resync) {
            Ok(tasks) => (Some(tasks), Ok(())),
            Err(err) => (None, Err(err)),
        };
        let error = result.as_ref().err().map(BoardError::from);

        // Release the flag inside the publish so both flip together
        self.state.send_modify(move |s| {
            if clears_draft {
                s.draft.clear();
            }
            match (tasks, error) {
                (Some(tasks), _) => {
                    s.tasks = Arc::new(tasks);
                    s.error = None;
                }
                (None, error) => s.error = error,
            }
            s.is_submitting = false;
            drop(guard);
        });

        result
    }

    /// Clear a recoverable error so the previous view shows again.
    /// Returns false when there was nothing to clear or the error is fatal.
    pub fn dismiss_error(&self) -> bool {
        let mut dismissed = false;
        self.state.send_if_modified(|s| match &s.error {
            Some(error) if !error.fatal => {
                s.error = None;
                dismissed = true;
                true
            }
            _ => false,
        });
        dismissed
    }
}
