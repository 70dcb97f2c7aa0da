//! One-shot commands: connect, do one thing, print the resynced board.

use crate::errors::{TerminalError, TerminalResult};
use colored::*;
use dialoguer::{theme::ColorfulTheme, Confirm};
use std::sync::Arc;
use taskboard_client::view::EMPTY_BOARD_MESSAGE;
use taskboard_client::{
    select_view, ClientConfig, JsonRpcProvider, TaskBoard, TaskRow, View, WalletProvider,
};
use taskboard_core::{Task, TaskId};

/// Discover the provider and build a board around it. A missing provider is
/// not an error here; the board reports it when the gate is used.
pub async fn open_board(config: &ClientConfig) -> TaskBoard {
    let provider: Option<Arc<dyn WalletProvider>> = match JsonRpcProvider::discover(config).await {
        Ok(provider) => Some(Arc::new(provider)),
        Err(e) => {
            tracing::warn!("Starting without a provider: {}", e);
            None
        }
    };
    TaskBoard::new(provider)
}

async fn connect(board: &TaskBoard, config: &ClientConfig) -> TerminalResult<()> {
    let address = config
        .contract_address
        .as_deref()
        .ok_or(TerminalError::MissingContract)?;
    board.set_address_input(address);
    board.submit_address().await?;
    Ok(())
}

fn find_task(board: &TaskBoard, id: TaskId) -> TerminalResult<Task> {
    board
        .snapshot()
        .tasks
        .iter()
        .find(|t| t.id == id)
        .cloned()
        .ok_or(TerminalError::UnknownTask(id.0))
}

pub async fn list(board: &TaskBoard, config: &ClientConfig) -> TerminalResult<()> {
    connect(board, config).await?;
    print_board(&select_view(&board.snapshot()));
    Ok(())
}

pub async fn add(board: &TaskBoard, config: &ClientConfig, words: &[String]) -> TerminalResult<()> {
    connect(board, config).await?;
    let content = words.join(" ");
    if content.trim().is_empty() {
        println!("{}", "Nothing to add.".yellow());
        return Ok(());
    }

    println!("⏳ Submitting {}", content.cyan());
    board.create_task(&content).await?;
    println!("{}", "✅ Task created".green());
    print_board(&select_view(&board.snapshot()));
    Ok(())
}

pub async fn toggle(board: &TaskBoard, config: &ClientConfig, id: TaskId) -> TerminalResult<()> {
    connect(board, config).await?;
    let task = find_task(board, id)?;

    println!("⏳ Toggling {}", task.content.cyan());
    board.toggle_task(id).await?;
    println!("{}", "✅ Task updated".green());
    print_board(&select_view(&board.snapshot()));
    Ok(())
}

pub async fn delete(
    board: &TaskBoard,
    config: &ClientConfig,
    id: TaskId,
    skip_confirm: bool,
) -> TerminalResult<()> {
    connect(board, config).await?;
    let task = find_task(board, id)?;

    if !skip_confirm
        && !Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("Delete task {} \"{}\"?", id, task.content))
            .default(false)
            .interact()?
    {
        println!("Cancelled.");
        return Ok(());
    }

    println!("⏳ Deleting {}", task.content.cyan());
    board.delete_task(id).await?;
    println!("{}", "🗑️  Task deleted".green());
    print_board(&select_view(&board.snapshot()));
    Ok(())
}

pub fn format_row(row: &TaskRow) -> String {
    let mark = if row.completed { "[x]" } else { "[ ]" };
    let content = if row.strikethrough {
        row.content.strikethrough().dimmed().to_string()
    } else {
        row.content.normal().to_string()
    };
    format!("{} {:>3}  {}", mark, row.key.0, content)
}

/// Plain-text rendering of a view, one line per entry.
pub fn board_lines(view: &View) -> Vec<String> {
    match view {
        View::Loading => vec!["Loading...".to_string()],
        View::Error { message, .. } => vec![format!("❌ {}", message).red().to_string()],
        View::AddressEntry { .. } => vec!["No contract connected.".yellow().to_string()],
        View::TaskBoard { account, rows, .. } => {
            let mut lines = vec![format!("📋 Tasks for {}", account.green())];
            if rows.is_empty() {
                lines.push(EMPTY_BOARD_MESSAGE.dimmed().to_string());
            }
            lines.extend(rows.iter().map(format_row));
            lines
        }
    }
}

pub fn print_board(view: &View) {
    for line in board_lines(view) {
        println!("{}", line);
    }
}
