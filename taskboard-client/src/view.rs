//! Render layer: a pure mapping from [`BoardState`] to exactly one view.

use crate::board::BoardState;
use taskboard_core::{Task, TaskId};

pub const EMPTY_BOARD_MESSAGE: &str = "No tasks yet. Add one to get started!";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRow {
    /// Stable identity across re-renders.
    pub key: TaskId,
    pub content: String,
    pub completed: bool,
    pub strikethrough: bool,
}

impl From<&Task> for TaskRow {
    fn from(task: &Task) -> Self {
        Self {
            key: task.id,
            content: task.content.clone(),
            completed: task.completed,
            strikethrough: task.completed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Loading,
    Error {
        message: String,
        fatal: bool,
    },
    AddressEntry {
        input: String,
    },
    TaskBoard {
        /// Abbreviated account, empty when not connected.
        account: String,
        draft: String,
        rows: Vec<TaskRow>,
        is_submitting: bool,
        can_add: bool,
    },
}

/// Priority: loading, then error, then address entry, then the board.
pub fn select_view(state: &BoardState) -> View {
    if state.loading {
        return View::Loading;
    }
    if let Some(error) = &state.error {
        return View::Error {
            message: error.message.clone(),
            fatal: error.fatal,
        };
    }
    if !state.has_address {
        return View::AddressEntry {
            input: state.address_input.clone(),
        };
    }
    View::TaskBoard {
        account: state.account.map(|a| a.short()).unwrap_or_default(),
        draft: state.draft.clone(),
        rows: state.tasks.iter().map(TaskRow::from).collect(),
        is_submitting: state.is_submitting,
        can_add: !state.is_submitting && !state.draft.trim().is_empty(),
    }
}
