use thiserror::Error;

/// Failures raised while encoding, decoding or interpreting ledger traffic.
///
/// Display strings are surfaced to the user verbatim, so RPC and revert
/// variants carry the node's message without decoration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("Invalid contract address")]
    InvalidAddress(String),

    #[error("ABI decode error: {0}")]
    AbiDecode(String),

    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),

    #[error("Returned error: {message}")]
    Rpc { code: i64, message: String },

    #[error("Transaction has been reverted by the EVM: {0}")]
    Reverted(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::Serialization(err.to_string())
    }
}

impl From<hex::FromHexError> for LedgerError {
    fn from(err: hex::FromHexError) -> Self {
        LedgerError::Serialization(err.to_string())
    }
}
