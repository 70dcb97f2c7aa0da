pub mod abi;
pub mod address;
pub mod errors;
pub mod models;
pub mod rpc;

pub use address::{is_address, Address};
pub use errors::LedgerError;
pub use models::{Task, TaskId, TxHash};

pub type LedgerResult<T> = Result<T, LedgerError>;
