pub mod board;
pub mod config;
pub mod dispatcher;
pub mod errors;
pub mod events;
pub mod ledger;
pub mod provider;
pub mod session;
pub mod sync_engine;
pub mod transport;
pub mod view;
pub mod websocket;

pub use board::{BoardError, BoardState, TaskBoard};
pub use config::ClientConfig;
pub use errors::{ClientError, ClientResult};
pub use events::{BoardEvent, EventDispatcher};
pub use ledger::{ContractLedger, TaskLedger};
pub use provider::{JsonRpcProvider, WalletProvider};
pub use session::{ConnectionGate, Session};
pub use sync_engine::SyncEngine;
pub use view::{select_view, TaskRow, View};
