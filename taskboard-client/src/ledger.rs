use crate::errors::ClientResult;
use crate::transport::RpcTransport;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use taskboard_core::abi::{self, TaskCall};
use taskboard_core::rpc::{methods, Bytes, CallRequest, TransactionReceipt};
use taskboard_core::{Address, LedgerError, Task, TaskId, TxHash};

/// The deployed task-list contract as seen by the client.
///
/// Reads reflect the latest block. Writes are signed by `from` and resolve
/// once the transaction is mined; a reverted transaction is an error.
#[async_trait]
pub trait TaskLedger: Send + Sync {
    async fn task_count(&self) -> ClientResult<u64>;

    async fn task(&self, index: u64) -> ClientResult<Task>;

    async fn create_task(&self, from: Address, content: &str) -> ClientResult<TxHash>;

    async fn toggle_completed(&self, from: Address, id: TaskId) -> ClientResult<TxHash>;

    async fn delete_task(&self, from: Address, id: TaskId) -> ClientResult<TxHash>;
}

/// [`TaskLedger`] backed by `eth_call` / `eth_sendTransaction` on a node.
pub struct ContractLedger {
    transport: Arc<dyn RpcTransport>,
    contract: Address,
    receipt_poll_interval: Duration,
}

impl ContractLedger {
    pub fn new(
        transport: Arc<dyn RpcTransport>,
        contract: Address,
        receipt_poll_interval: Duration,
    ) -> Self {
        Self {
            transport,
            contract,
            receipt_poll_interval,
        }
    }

    async fn call(&self, call: TaskCall) -> ClientResult<Vec<u8>> {
        let request = CallRequest {
            from: None,
            to: self.contract,
            data: Bytes(call.encode()),
        };
        tracing::debug!("eth_call {} on {}", call, self.contract);
        let result = self
            .transport
            .request(methods::CALL, json!([request, "latest"]))
            .await?;
        let data: Bytes = serde_json::from_value(result)?;
        Ok(data.0)
    }

    async fn send(&self, from: Address, call: TaskCall) -> ClientResult<TxHash> {
        let request = CallRequest {
            from: Some(from),
            to: self.contract,
            data: Bytes(call.encode()),
        };
        let result = self
            .transport
            .request(methods::SEND_TRANSACTION, json!([request]))
            .await?;
        let tx_hash: TxHash = serde_json::from_value(result)?;
        tracing::info!("Submitted {} from {} as {}", call, from, tx_hash);

        let receipt = self.wait_for_receipt(tx_hash).await?;
        if !receipt.is_success() {
            tracing::warn!("Transaction {} reverted", tx_hash);
            return Err(LedgerError::Reverted(tx_hash.to_string()).into());
        }
        tracing::info!(
            "Transaction {} mined in block {}",
            tx_hash,
            receipt.block_number.as_deref().unwrap_or("?")
        );
        Ok(tx_hash)
    }

    /// Polls until the node reports a receipt. There is no deadline.
    async fn wait_for_receipt(&self, tx_hash: TxHash) -> ClientResult<TransactionReceipt> {
        loop {
            let result = self
                .transport
                .request(methods::GET_TRANSACTION_RECEIPT, json!([tx_hash]))
                .await?;
            if result != Value::Null {
                return Ok(serde_json::from_value(result)?);
            }
            tokio::time::sleep(self.receipt_poll_interval).await;
        }
    }
}

#[async_trait]
impl TaskLedger for ContractLedger {
    async fn task_count(&self) -> ClientResult<u64> {
        let data = self.call(TaskCall::TaskCount).await?;
        Ok(abi::decode_task_count(&data)?)
    }

    async fn task(&self, index: u64) -> ClientResult<Task> {
        let data = self.call(TaskCall::Tasks(index)).await?;
        Ok(abi::decode_task(&data)?)
    }

    async fn create_task(&self, from: Address, content: &str) -> ClientResult<TxHash> {
        self.send(from, TaskCall::CreateTask(content.to_string())).await
    }

    async fn toggle_completed(&self, from: Address, id: TaskId) -> ClientResult<TxHash> {
        self.send(from, TaskCall::ToggleCompleted(id)).await
    }

    async fn delete_task(&self, from: Address, id: TaskId) -> ClientResult<TxHash> {
        self.send(from, TaskCall::DeleteTask(id)).await
    }
}
