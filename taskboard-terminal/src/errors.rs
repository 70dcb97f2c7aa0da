use taskboard_client::ClientError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TerminalError {
    #[error("{0}")]
    Client(#[from] ClientError),

    #[error("No contract address configured. Pass --contract or set TASKBOARD_CONTRACT_ADDRESS at build time.")]
    MissingContract,

    #[error("No task with id {0}")]
    UnknownTask(u64),

    #[error("Terminal error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),
}

pub type TerminalResult<T> = Result<T, TerminalError>;
