use clap::{Parser, Subcommand};
use std::time::Duration;
use taskboard_client::ClientConfig;
use taskboard_core::TaskId;

#[derive(Parser, Debug)]
#[command(name = "taskboard")]
#[command(about = "Task list stored in a smart contract", long_about = None)]
pub struct Cli {
    /// JSON-RPC endpoint of the wallet node (http(s):// or ws(s)://)
    #[arg(short, long)]
    pub provider: Option<String>,

    /// Address of the task list contract
    #[arg(short, long)]
    pub contract: Option<String>,

    /// Receipt polling interval in milliseconds
    #[arg(long)]
    pub poll_ms: Option<u64>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Interactive board (default)
    Tui,
    /// Print the task list once
    List,
    /// Create a task, then print the list
    Add {
        #[arg(required = true, num_args = 1..)]
        content: Vec<String>,
    },
    /// Toggle a task's completion, then print the list
    Toggle { id: TaskId },
    /// Delete a task, then print the list
    Delete {
        id: TaskId,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Tui)
    }

    /// Build-time defaults overridden by whatever flags were passed.
    pub fn config(&self) -> ClientConfig {
        let mut config = ClientConfig::default();
        if let Some(url) = &self.provider {
            config = config.with_provider(url.clone());
        }
        if let Some(address) = &self.contract {
            config = config.with_contract(address.clone());
        }
        if let Some(ms) = self.poll_ms {
            config = config.with_receipt_poll_interval(Duration::from_millis(ms));
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tui_is_the_default_command() {
        let cli = Cli::parse_from(["taskboard"]);
        assert_eq!(cli.command(), Command::Tui);
    }

    #[test]
    fn test_add_joins_words() {
        let cli = Cli::parse_from(["taskboard", "add", "buy", "milk"]);
        assert_eq!(
            cli.command(),
            Command::Add {
                content: vec!["buy".to_string(), "milk".to_string()]
            }
        );
        assert!(Cli::try_parse_from(["taskboard", "add"]).is_err());
    }

    #[test]
    fn test_ids_parse_as_task_ids() {
        let cli = Cli::parse_from(["taskboard", "delete", "3", "--yes"]);
        assert_eq!(cli.command(), Command::Delete { id: TaskId(3), yes: true });
        assert!(Cli::try_parse_from(["taskboard", "toggle", "abc"]).is_err());
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::parse_from([
            "taskboard",
            "--provider",
            "ws://127.0.0.1:8545",
            "--contract",
            "0x1111111111111111111111111111111111111111",
            "--poll-ms",
            "50",
            "list",
        ]);
        let config = cli.config();
        assert_eq!(config.provider_url.as_deref(), Some("ws://127.0.0.1:8545"));
        assert_eq!(
            config.contract_address.as_deref(),
            Some("0x1111111111111111111111111111111111111111")
        );
        assert_eq!(config.receipt_poll_interval, Duration::from_millis(50));
    }
}
