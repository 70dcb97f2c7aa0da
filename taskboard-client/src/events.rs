//! Event notifications for board activity.
//!
//! Events are queued from whichever task produces them (connection gate, sync
//! engine, dispatcher) and delivered to registered callbacks only when the
//! owner calls [`EventDispatcher::process_events`]. A render loop can drain
//! the queue once per frame and never sees callbacks fire mid-draw.
//!
//! Nothing drains the queue on its own. Events emitted while no callback is
//! registered are dropped rather than queued, so a dispatcher nobody listens
//! to stays empty.

use crate::errors::{ClientError, ClientResult};
use std::sync::{mpsc, Mutex};
use strum::Display;
use taskboard_core::{Address, TaskId, TxHash};

/// Discriminant of a [`BoardEvent`], used for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum EventType {
    Connected,
    SyncStarted,
    SyncCompleted,
    SyncFailed,
    MutationSubmitted,
    MutationConfirmed,
    MutationFailed,
}

/// What a mutation did, for logging and activity feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum MutationKind {
    Create,
    Toggle,
    Delete,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BoardEvent {
    Connected {
        account: Address,
        contract: Address,
        network_id: u64,
    },
    SyncStarted,
    SyncCompleted {
        task_count: usize,
    },
    SyncFailed {
        message: String,
    },
    MutationSubmitted {
        kind: MutationKind,
        task: Option<TaskId>,
    },
    MutationConfirmed {
        kind: MutationKind,
        tx_hash: TxHash,
    },
    MutationFailed {
        kind: MutationKind,
        message: String,
    },
}

impl BoardEvent {
    pub fn event_type(&self) -> EventType {
        match self {
            BoardEvent::Connected { .. } => EventType::Connected,
            BoardEvent::SyncStarted => EventType::SyncStarted,
            BoardEvent::SyncCompleted { .. } => EventType::SyncCompleted,
            BoardEvent::SyncFailed { .. } => EventType::SyncFailed,
            BoardEvent::MutationSubmitted { .. } => EventType::MutationSubmitted,
            BoardEvent::MutationConfirmed { .. } => EventType::MutationConfirmed,
            BoardEvent::MutationFailed { .. } => EventType::MutationFailed,
        }
    }
}

struct CallbackEntry {
    callback: Box<dyn Fn(&BoardEvent) + Send>,
    event_filter: Option<EventType>,
}

pub struct EventDispatcher {
    callbacks: Mutex<Vec<CallbackEntry>>,
    event_queue: Mutex<mpsc::Receiver<BoardEvent>>,
    event_sender: mpsc::Sender<BoardEvent>,
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl EventDispatcher {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            callbacks: Mutex::new(Vec::new()),
            event_queue: Mutex::new(receiver),
            event_sender: sender,
        }
    }

    pub fn register_callback<F>(&self, callback: F) -> ClientResult<()>
    where
        F: Fn(&BoardEvent) + Send + 'static,
    {
        self.push_entry(Box::new(callback), None)
    }

    /// Register a callback that only receives events of `event_filter` type.
    pub fn register_callback_filtered<F>(&self, callback: F, event_filter: EventType) -> ClientResult<()>
    where
        F: Fn(&BoardEvent) + Send + 'static,
    {
        self.push_entry(Box::new(callback), Some(event_filter))
    }

    fn push_entry(
        &self,
        callback: Box<dyn Fn(&BoardEvent) + Send>,
        event_filter: Option<EventType>,
    ) -> ClientResult<()> {
        let mut callbacks = self
            .callbacks
            .lock()
            .map_err(|_| ClientError::LockPoisoned("callbacks"))?;
        callbacks.push(CallbackEntry {
            callback,
            event_filter,
        });
        Ok(())
    }

    /// Queue `event` for the next [`process_events`](Self::process_events).
    /// Dropped when no callback is registered.
    pub fn emit(&self, event: BoardEvent) {
        let listening = self
            .callbacks
            .lock()
            .map(|callbacks| !callbacks.is_empty())
            .unwrap_or(false);
        if !listening {
            tracing::trace!("No listeners, dropping board event: {:?}", event.event_type());
            return;
        }
        tracing::debug!("Queueing board event: {:?}", event.event_type());
        if self.event_sender.send(event).is_err() {
            tracing::error!("Failed to queue event - receiver may have been dropped");
        }
    }

    /// Deliver every queued event to the matching callbacks. Returns how many
    /// events were drained.
    pub fn process_events(&self) -> ClientResult<usize> {
        let queue = self
            .event_queue
            .lock()
            .map_err(|_| ClientError::LockPoisoned("event_queue"))?;
        let callbacks = self
            .callbacks
            .lock()
            .map_err(|_| ClientError::LockPoisoned("callbacks"))?;

        let mut processed = 0;
        while let Ok(event) = queue.try_recv() {
            let event_type = event.event_type();
            for entry in callbacks.iter() {
                if entry.event_filter.map_or(true, |f| f == event_type) {
                    (entry.callback)(&event);
                }
            }
            processed += 1;
        }
        Ok(processed)
    }
}
