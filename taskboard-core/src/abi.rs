//! Calldata encoding and return-data decoding for the task-list contract.
//!
//! Only the handful of shapes the contract uses are supported: `uint256`,
//! `bool` and a single dynamic `string`.

use crate::errors::LedgerError;
use crate::models::{Task, TaskId};
use crate::LedgerResult;
use sha3::{Digest, Keccak256};
use strum::Display;

pub const WORD: usize = 32;

pub fn keccak256(data: &[u8]) -> [u8; 32] {
    Keccak256::digest(data).into()
}

/// First four bytes of the keccak hash of a canonical function signature.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Calls the client makes against the deployed contract.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum TaskCall {
    #[strum(serialize = "taskCount")]
    TaskCount,
    #[strum(serialize = "tasks")]
    Tasks(u64),
    #[strum(serialize = "createTask")]
    CreateTask(String),
    #[strum(serialize = "toggleCompleted")]
    ToggleCompleted(TaskId),
    #[strum(serialize = "deleteTask")]
    DeleteTask(TaskId),
}

impl TaskCall {
    pub fn signature(&self) -> &'static str {
        match self {
            TaskCall::TaskCount => "taskCount()",
            TaskCall::Tasks(_) => "tasks(uint256)",
            TaskCall::CreateTask(_) => "createTask(string)",
            TaskCall::ToggleCompleted(_) => "toggleCompleted(uint256)",
            TaskCall::DeleteTask(_) => "deleteTask(uint256)",
        }
    }

    /// Read calls go through `eth_call`; everything else needs a signer.
    pub fn is_read(&self) -> bool {
        matches!(self, TaskCall::TaskCount | TaskCall::Tasks(_))
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut data = selector(self.signature()).to_vec();
        match self {
            TaskCall::TaskCount => {}
            TaskCall::Tasks(index) => data.extend_from_slice(&encode_uint(*index)),
            TaskCall::ToggleCompleted(id) | TaskCall::DeleteTask(id) => {
                data.extend_from_slice(&encode_uint(id.0))
            }
            TaskCall::CreateTask(content) => {
                // Head holds the offset of the single dynamic argument
                data.extend_from_slice(&encode_uint(WORD as u64));
                data.extend_from_slice(&encode_bytes(content.as_bytes()));
            }
        }
        data
    }
}

pub fn encode_uint(value: u64) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[WORD - 8..].copy_from_slice(&value.to_be_bytes());
    word
}

/// Length word followed by the bytes right-padded to a word boundary.
fn encode_bytes(bytes: &[u8]) -> Vec<u8> {
    let padded = bytes.len().div_ceil(WORD) * WORD;
    let mut out = Vec::with_capacity(WORD + padded);
    out.extend_from_slice(&encode_uint(bytes.len() as u64));
    out.extend_from_slice(bytes);
    out.resize(WORD + padded, 0);
    out
}

fn word_at(data: &[u8], offset: usize) -> LedgerResult<&[u8]> {
    offset
        .checked_add(WORD)
        .and_then(|end| data.get(offset..end))
        .ok_or_else(|| {
            LedgerError::AbiDecode(format!(
                "return data too short: need a word at {}, got {} bytes",
                offset,
                data.len()
            ))
        })
}

/// Reads a `uint256` word that must fit in 64 bits.
pub fn decode_uint(data: &[u8], offset: usize) -> LedgerResult<u64> {
    let word = word_at(data, offset)?;
    if word[..WORD - 8].iter().any(|b| *b != 0) {
        return Err(LedgerError::InvalidQuantity(format!(
            "0x{} does not fit in 64 bits",
            hex::encode(word)
        )));
    }
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&word[WORD - 8..]);
    Ok(u64::from_be_bytes(buf))
}

pub fn decode_bool(data: &[u8], offset: usize) -> LedgerResult<bool> {
    match decode_uint(data, offset)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(LedgerError::AbiDecode(format!("invalid bool word: {}", other))),
    }
}

/// Reads a dynamic `string` whose head word sits at `head`.
pub fn decode_string(data: &[u8], head: usize) -> LedgerResult<String> {
    let start = usize::try_from(decode_uint(data, head)?)
        .map_err(|_| LedgerError::AbiDecode("string offset overflow".to_string()))?;
    let len = usize::try_from(decode_uint(data, start)?)
        .map_err(|_| LedgerError::AbiDecode("string length overflow".to_string()))?;
    let body = start
        .checked_add(WORD)
        .and_then(|body_start| Some(body_start..body_start.checked_add(len)?))
        .and_then(|range| data.get(range))
        .ok_or_else(|| {
            LedgerError::AbiDecode(format!(
                "string of {} bytes overruns return data of {} bytes",
                len,
                data.len()
            ))
        })?;
    String::from_utf8(body.to_vec()).map_err(|e| LedgerError::AbiDecode(e.to_string()))
}

pub fn decode_task_count(data: &[u8]) -> LedgerResult<u64> {
    decode_uint(data, 0)
}

/// Decodes the `(uint256 id, string content, bool completed)` tuple returned
/// by the public `tasks` mapping getter.
pub fn decode_task(data: &[u8]) -> LedgerResult<Task> {
    let id = decode_uint(data, 0)?;
    let content = decode_string(data, WORD)?;
    let completed = decode_bool(data, 2 * WORD)?;
    Ok(Task {
        id: TaskId(id),
        content,
        completed,
    })
}

/// Encodes a task tuple the way the contract getter returns it.
pub fn encode_task(task: &Task) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&encode_uint(task.id.0));
    out.extend_from_slice(&encode_uint(3 * WORD as u64));
    out.extend_from_slice(&encode_uint(task.completed as u64));
    out.extend_from_slice(&encode_bytes(task.content.as_bytes()));
    out
}
