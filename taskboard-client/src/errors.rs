use taskboard_core::LedgerError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("No wallet provider available. Install a wallet or configure a provider endpoint.")]
    ProviderAbsent,

    #[error("Unsupported provider endpoint: {0}")]
    UnsupportedEndpoint(String),

    #[error("The wallet provider returned no accounts")]
    NoAccounts,

    #[error("Invalid contract address")]
    InvalidAddress(String),

    #[error("{0}")]
    Ledger(#[from] LedgerError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("WebSocket error: {0}")]
    WebSocket(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("A transaction is already being submitted")]
    MutationInFlight,

    #[error("Another board operation is still running")]
    Busy,

    #[error("Not connected: submit a contract address first")]
    NotConnected,

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Failed to acquire lock: {0}")]
    LockPoisoned(&'static str),
}

impl ClientError {
    /// Only a missing provider is unrecoverable within a session.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ClientError::ProviderAbsent)
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
