use crate::errors::LedgerError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Ledger-assigned task identifier. Ids are 1-based; `0` marks a cleared slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub u64);

impl TaskId {
    pub fn is_cleared(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TaskId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u64>().map(TaskId)
    }
}

/// Read-only mirror of one entry in the contract's task mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub content: String,
    pub completed: bool,
}

impl Task {
    pub fn new(id: u64, content: impl Into<String>, completed: bool) -> Self {
        Self {
            id: TaskId(id),
            content: content.into(),
            completed,
        }
    }
}

/// Hash of a submitted transaction.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TxHash(pub [u8; 32]);

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxHash({})", self)
    }
}

impl FromStr for TxHash {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .ok_or_else(|| LedgerError::Serialization(format!("missing 0x prefix: {}", s)))?;
        let mut out = [0u8; 32];
        hex::decode_to_slice(digits, &mut out)?;
        Ok(TxHash(out))
    }
}

impl Serialize for TxHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TxHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_serializes_with_plain_id() {
        let task = Task::new(2, "B", true);
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json, serde_json::json!({"id": 2, "content": "B", "completed": true}));
    }

    #[test]
    fn test_tx_hash_parse_and_display() {
        let raw = format!("0x{}", "ab".repeat(32));
        let hash: TxHash = raw.parse().unwrap();
        assert_eq!(hash.to_string(), raw);

        assert!("ab".repeat(32).parse::<TxHash>().is_err());
        assert!("0x1234".parse::<TxHash>().is_err());
    }

    #[test]
    fn test_task_id_parsing() {
        assert_eq!(" 7 ".parse::<TaskId>().unwrap(), TaskId(7));
        assert!("seven".parse::<TaskId>().is_err());
        assert!(TaskId(0).is_cleared());
        assert!(!TaskId(1).is_cleared());
    }
}
