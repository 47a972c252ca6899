use std::path::{Path, PathBuf};

use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::error::Result;

const FILE_PREFIX: &str = "transactions_";
const FILE_SUFFIX: &str = ".json";

/// A raw ingestion response. Missing or non-array keys load as empty lists.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawPayload {
    pub transactions: Vec<Value>,
    pub accounts: Vec<Value>,
}

impl RawPayload {
    pub fn from_value(value: Value) -> Self {
        let Value::Object(mut obj) = value else {
            return Self::default();
        };
        let mut take_list = |key: &str| match obj.remove(key) {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        };
        Self {
            transactions: take_list("transactions"),
            accounts: take_list("accounts"),
        }
    }
}

fn is_bronze_file(name: &str) -> bool {
    name.starts_with(FILE_PREFIX) && name.ends_with(FILE_SUFFIX)
}

/// The lexicographically last `transactions_*.json` file in `bronze_dir`.
/// A missing directory has no latest file.
pub fn latest_bronze_file(bronze_dir: &Path) -> Result<Option<PathBuf>> {
    if !bronze_dir.exists() {
        return Ok(None);
    }
    let mut names: Vec<String> = Vec::new();
    for entry in std::fs::read_dir(bronze_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            if is_bronze_file(name) {
                names.push(name.to_string());
            }
        }
    }
    names.sort();
    Ok(names.pop().map(|name| bronze_dir.join(name)))
}

pub fn load_payload(path: &Path) -> Result<RawPayload> {
    let content = std::fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&content)?;
    Ok(RawPayload::from_value(value))
}

pub fn compute_checksum(file_path: &Path) -> Result<String> {
    let data = std::fs::read(file_path)?;
    let mut hasher = Sha256::new();
    hasher.update(&data);
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn touch(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), "{}").unwrap();
    }

    #[test]
    fn test_latest_picks_last_sorted() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "transactions_2024-01-05_10-00-00.json");
        touch(dir.path(), "transactions_2024-02-01_09-00-00.json");
        touch(dir.path(), "transactions_2023-12-31_23-59-59.json");
        let latest = latest_bronze_file(dir.path()).unwrap().unwrap();
        assert_eq!(
            latest.file_name().unwrap().to_str().unwrap(),
            "transactions_2024-02-01_09-00-00.json"
        );
    }

    #[test]
    fn test_latest_ignores_other_files() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "transactions_2024-01-05_10-00-00.json");
        touch(dir.path(), "zzz_notes.json");
        touch(dir.path(), "transactions_2099-01-01.csv");
        std::fs::create_dir(dir.path().join("transactions_2099.json")).unwrap();
        let latest = latest_bronze_file(dir.path()).unwrap().unwrap();
        assert!(latest.ends_with("transactions_2024-01-05_10-00-00.json"));
    }

    #[test]
    fn test_latest_empty_or_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(latest_bronze_file(dir.path()).unwrap().is_none());
        assert!(latest_bronze_file(&dir.path().join("nope")).unwrap().is_none());
    }

    #[test]
    fn test_payload_missing_keys_are_empty() {
        let payload = RawPayload::from_value(json!({"transactions": [{"amount": 1}]}));
        assert_eq!(payload.transactions.len(), 1);
        assert!(payload.accounts.is_empty());

        let payload = RawPayload::from_value(json!({"transactions": "bad", "accounts": null}));
        assert!(payload.transactions.is_empty());
        assert!(payload.accounts.is_empty());

        assert_eq!(RawPayload::from_value(json!([1, 2])), RawPayload::default());
    }

    #[test]
    fn test_load_payload_invalid_json_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transactions_x.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(load_payload(&path).is_err());
    }

    #[test]
    fn test_checksum_is_stable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.json");
        std::fs::write(&path, "{}").unwrap();
        let a = compute_checksum(&path).unwrap();
        assert_eq!(a.len(), 64);
        assert_eq!(a, compute_checksum(&path).unwrap());
    }
}
