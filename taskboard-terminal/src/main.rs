use clap::Parser;
use colored::*;
use std::sync::Arc;
use taskboard_terminal::cli::{Cli, Command};
use taskboard_terminal::{commands, tui, TerminalResult};

fn init_logging(command: &Command) {
    // Any log line would tear the TUI, so it stays silent unless RUST_LOG asks
    let default_level = if *command == Command::Tui { "off" } else { "warn" };
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| default_level.to_string());
    if log_level != "off" {
        tracing_subscriber::fmt()
            .with_env_filter(log_level.as_str())
            .with_writer(std::io::stderr)
            .init();
    }
}

async fn run(cli: Cli) -> TerminalResult<()> {
    let command = cli.command();
    let config = cli.config();
    let board = commands::open_board(&config).await;

    match command {
        Command::Tui => tui::run(Arc::new(board), config.contract_address.clone()).await,
        Command::List => commands::list(&board, &config).await,
        Command::Add { content } => commands::add(&board, &config, &content).await,
        Command::Toggle { id } => commands::toggle(&board, &config, id).await,
        Command::Delete { id, yes } => commands::delete(&board, &config, id, yes).await,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(&cli.command());

    if let Err(e) = run(cli).await {
        eprintln!("{} {}", "❌".red(), e.to_string().red());
        std::process::exit(1);
    }
}
