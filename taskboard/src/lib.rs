//! TaskBoard - a client for an on-chain task list
//!
//! This crate re-exports the pieces an application needs to drive the board.
//!
//! # Example
//!
//! ```ignore
//! use taskboard::{ClientConfig, JsonRpcProvider, TaskBoard};
//!
//! let config = ClientConfig::default().with_provider("http://127.0.0.1:8545");
//! let provider = JsonRpcProvider::discover(&config).await.ok();
//! let board = TaskBoard::new(provider.map(|p| Arc::new(p) as _));
//! board.set_address_input("0x...");
//! board.submit_address().await?;
//! ```

// Re-export client types
pub use taskboard_client::{
    select_view, BoardError, BoardEvent, BoardState, ClientConfig, ClientError, ClientResult,
    EventDispatcher, JsonRpcProvider, TaskBoard, TaskLedger, View, WalletProvider,
};

// Re-export core types that external applications may need
pub use taskboard_core::{is_address, Address, LedgerError, Task, TaskId, TxHash};
