use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use taskboard_client::{ClientError, ClientResult, TaskLedger, WalletProvider};
use taskboard_core::abi::{self, selector};
use taskboard_core::rpc::{methods, Bytes, CallRequest, RpcRequest, RpcResponse, METHOD_NOT_FOUND};
use taskboard_core::{Address, LedgerError, Task, TaskId, TxHash};
use tokio::sync::Notify;

pub const CONTRACT: &str = "0x1111111111111111111111111111111111111111";
pub const ACCOUNT: &str = "0x2222222222222222222222222222222222222222";

#[allow(dead_code)]
pub fn address(raw: &str) -> Address {
    raw.parse().unwrap()
}

fn tx_hash(n: usize) -> TxHash {
    let mut bytes = [0u8; 32];
    bytes[24..].copy_from_slice(&(n as u64).to_be_bytes());
    TxHash(bytes)
}

/// In-memory contract with the same storage shape as the on-chain one:
/// slot `i` holds the task with id `i`, and deletes leave a zeroed slot.
#[derive(Default)]
pub struct MockLedger {
    slots: Mutex<Vec<Task>>,
    calls: Mutex<Vec<String>>,
    fail_read_at: Mutex<Option<u64>>,
    fail_writes: Mutex<Option<String>>,
    write_gate: Mutex<Option<Arc<Notify>>>,
    count_gate: Mutex<Option<Arc<Notify>>>,
}

#[allow(dead_code)]
impl MockLedger {
    pub fn with_tasks(tasks: Vec<Task>) -> Arc<Self> {
        let ledger = Self::default();
        *ledger.slots.lock().unwrap() = tasks;
        Arc::new(ledger)
    }

    pub fn set_slot(&self, index: u64, task: Task) {
        self.slots.lock().unwrap()[index as usize - 1] = task;
    }

    /// Make `tasks(index)` fail until cleared.
    pub fn fail_read_at(&self, index: Option<u64>) {
        *self.fail_read_at.lock().unwrap() = index;
    }

    pub fn fail_writes(&self, message: Option<&str>) {
        *self.fail_writes.lock().unwrap() = message.map(str::to_string);
    }

    /// Park every write until the returned notify is signalled.
    pub fn hold_writes(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.write_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    /// Park the next `taskCount` read until the returned notify is signalled.
    pub fn hold_count(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.count_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn count_calls(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    async fn before_write(&self) -> ClientResult<TxHash> {
        let gate = self.write_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if let Some(message) = self.fail_writes.lock().unwrap().clone() {
            return Err(LedgerError::Rpc {
                code: -32000,
                message,
            }
            .into());
        }
        Ok(tx_hash(self.calls.lock().unwrap().len()))
    }
}

#[async_trait]
impl TaskLedger for MockLedger {
    async fn task_count(&self) -> ClientResult<u64> {
        self.record("taskCount".to_string());
        let gate = self.count_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        Ok(self.slots.lock().unwrap().len() as u64)
    }

    async fn task(&self, index: u64) -> ClientResult<Task> {
        self.record(format!("tasks({})", index));
        if *self.fail_read_at.lock().unwrap() == Some(index) {
            return Err(ClientError::WebSocket("connection reset by peer".to_string()));
        }
        self.slots
            .lock()
            .unwrap()
            .get(index as usize - 1)
            .cloned()
            .ok_or_else(|| LedgerError::AbiDecode("return data too short".to_string()).into())
    }

    async fn create_task(&self, _from: Address, content: &str) -> ClientResult<TxHash> {
        self.record(format!("createTask({})", content));
        let hash = self.before_write().await?;
        let mut slots = self.slots.lock().unwrap();
        let id = slots.len() as u64 + 1;
        slots.push(Task::new(id, content, false));
        Ok(hash)
    }

    async fn toggle_completed(&self, _from: Address, id: TaskId) -> ClientResult<TxHash> {
        self.record(format!("toggleCompleted({})", id));
        let hash = self.before_write().await?;
        if let Some(task) = self.slots.lock().unwrap().get_mut(id.0 as usize - 1) {
            task.completed = !task.completed;
        }
        Ok(hash)
    }

    async fn delete_task(&self, _from: Address, id: TaskId) -> ClientResult<TxHash> {
        self.record(format!("deleteTask({})", id));
        let hash = self.before_write().await?;
        if let Some(slot) = self.slots.lock().unwrap().get_mut(id.0 as usize - 1) {
            *slot = Task::new(0, "", false);
        }
        Ok(hash)
    }
}

pub struct MockWallet {
    pub accounts: Vec<Address>,
    pub network_id: u64,
    pub ledger: Arc<MockLedger>,
    attached: Mutex<Vec<Address>>,
}

#[allow(dead_code)]
impl MockWallet {
    pub fn new(ledger: Arc<MockLedger>) -> Arc<Self> {
        Arc::new(Self {
            accounts: vec![address(ACCOUNT)],
            network_id: 5777,
            ledger,
            attached: Mutex::new(Vec::new()),
        })
    }

    pub fn without_accounts(ledger: Arc<MockLedger>) -> Arc<Self> {
        Arc::new(Self {
            accounts: Vec::new(),
            network_id: 5777,
            ledger,
            attached: Mutex::new(Vec::new()),
        })
    }

    pub fn attached(&self) -> Vec<Address> {
        self.attached.lock().unwrap().clone()
    }
}

#[async_trait]
impl WalletProvider for MockWallet {
    async fn request_accounts(&self) -> ClientResult<Vec<Address>> {
        Ok(self.accounts.clone())
    }

    async fn get_accounts(&self) -> ClientResult<Vec<Address>> {
        Ok(self.accounts.clone())
    }

    async fn get_network_id(&self) -> ClientResult<u64> {
        Ok(self.network_id)
    }

    fn contract_at(&self, address: Address) -> Arc<dyn TaskLedger> {
        self.attached.lock().unwrap().push(address);
        self.ledger.clone()
    }
}

/// A development node answering the JSON-RPC methods the client uses.
///
/// Transactions are mined on the second receipt poll so the client's wait
/// loop is exercised.
pub struct MockNode {
    pub tasks: Mutex<Vec<Task>>,
    pub supports_request_accounts: bool,
    revert_writes: Mutex<bool>,
    receipts: Mutex<Vec<(TxHash, u32, bool)>>,
    methods_seen: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl MockNode {
    fn build(tasks: Vec<Task>, supports_request_accounts: bool) -> Arc<Self> {
        Arc::new(Self {
            tasks: Mutex::new(tasks),
            supports_request_accounts,
            revert_writes: Mutex::new(false),
            receipts: Mutex::new(Vec::new()),
            methods_seen: Mutex::new(Vec::new()),
        })
    }

    pub fn new(tasks: Vec<Task>) -> Arc<Self> {
        Self::build(tasks, true)
    }

    /// Behaves like a bare dev node that has no authorization method.
    pub fn without_request_accounts(tasks: Vec<Task>) -> Arc<Self> {
        Self::build(tasks, false)
    }

    pub fn set_revert_writes(&self, revert: bool) {
        *self.revert_writes.lock().unwrap() = revert;
    }

    pub fn methods_seen(&self) -> Vec<String> {
        self.methods_seen.lock().unwrap().clone()
    }

    pub fn handle(&self, request: RpcRequest) -> RpcResponse {
        self.methods_seen.lock().unwrap().push(request.method.clone());
        let id = request.id;
        match self.dispatch(&request.method, request.params) {
            Ok(result) => RpcResponse::success(id, result),
            Err((code, message)) => RpcResponse::failure(id, code, message),
        }
    }

    fn dispatch(&self, method: &str, params: Value) -> Result<Value, (i64, String)> {
        match method {
            methods::REQUEST_ACCOUNTS if !self.supports_request_accounts => Err((
                METHOD_NOT_FOUND,
                format!("Method {} not found", method),
            )),
            methods::REQUEST_ACCOUNTS | methods::ACCOUNTS => Ok(json!([ACCOUNT])),
            methods::NET_VERSION => Ok(json!("5777")),
            methods::CALL => {
                let call = Self::call_params(params)?;
                self.read(&call.data.0).map(|data| json!(Bytes(data)))
            }
            methods::SEND_TRANSACTION => {
                let call = Self::call_params(params)?;
                // A reverted transaction is still mined but leaves state untouched
                let success = !*self.revert_writes.lock().unwrap();
                if success {
                    self.write(&call.data.0)?;
                }
                let mut receipts = self.receipts.lock().unwrap();
                let hash = tx_hash(receipts.len() + 1);
                receipts.push((hash, 0, success));
                Ok(json!(hash))
            }
            methods::GET_TRANSACTION_RECEIPT => {
                let hash: TxHash = serde_json::from_value(params[0].clone())
                    .map_err(|e| (-32602, e.to_string()))?;
                let mut receipts = self.receipts.lock().unwrap();
                let Some(entry) = receipts.iter_mut().find(|(h, _, _)| *h == hash) else {
                    return Ok(Value::Null);
                };
                entry.1 += 1;
                if entry.1 < 2 {
                    return Ok(Value::Null);
                }
                let status = if entry.2 { "0x1" } else { "0x0" };
                Ok(json!({
                    "transactionHash": hash,
                    "blockNumber": "0x2",
                    "status": status,
                }))
            }
            other => Err((METHOD_NOT_FOUND, format!("Method {} not found", other))),
        }
    }

    fn call_params(params: Value) -> Result<CallRequest, (i64, String)> {
        serde_json::from_value(params[0].clone()).map_err(|e| (-32602, e.to_string()))
    }

    fn read(&self, data: &[u8]) -> Result<Vec<u8>, (i64, String)> {
        let (sel, args) = data.split_at(4);
        let tasks = self.tasks.lock().unwrap();
        if sel == selector("taskCount()") {
            return Ok(abi::encode_uint(tasks.len() as u64).to_vec());
        }
        if sel == selector("tasks(uint256)") {
            let index = abi::decode_uint(args, 0).map_err(|e| (-32602, e.to_string()))?;
            let task = tasks
                .get((index as usize).wrapping_sub(1))
                .cloned()
                .unwrap_or_else(|| Task::new(0, "", false));
            return Ok(abi::encode_task(&task));
        }
        Err((-32000, "execution reverted".to_string()))
    }

    fn write(&self, data: &[u8]) -> Result<(), (i64, String)> {
        let (sel, args) = data.split_at(4);
        let mut tasks = self.tasks.lock().unwrap();
        let bad_args = |e: LedgerError| (-32602, e.to_string());
        if sel == selector("createTask(string)") {
            let content = abi::decode_string(args, 0).map_err(bad_args)?;
            let id = tasks.len() as u64 + 1;
            tasks.push(Task::new(id, content, false));
        } else if sel == selector("toggleCompleted(uint256)") {
            let id = abi::decode_uint(args, 0).map_err(bad_args)?;
            if let Some(task) = tasks.get_mut(id as usize - 1) {
                task.completed = !task.completed;
            }
        } else if sel == selector("deleteTask(uint256)") {
            let id = abi::decode_uint(args, 0).map_err(bad_args)?;
            if let Some(slot) = tasks.get_mut(id as usize - 1) {
                *slot = Task::new(0, "", false);
            }
        } else {
            return Err((-32000, "execution reverted".to_string()));
        }
        Ok(())
    }
}
