//! Terminal front end for the task board: an interactive TUI plus one-shot
//! commands for scripting.

pub mod cli;
pub mod commands;
pub mod errors;
pub mod tui;

pub use errors::{TerminalError, TerminalResult};
