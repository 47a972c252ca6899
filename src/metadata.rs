use std::fs::OpenOptions;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    Success,
    Failed,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::Failed => "Failed",
        }
    }
}

/// One line of the silver metadata log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataEntry {
    pub filename: String,
    pub timestamp: String,
    pub records: usize,
    pub status: RunStatus,
    #[serde(default)]
    pub checksum: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
}

/// Append `entry`, writing the header only when the log is first created.
pub fn append_entry(log_path: &Path, entry: &MetadataEntry) -> Result<()> {
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let is_new = !log_path.exists();
    let file = OpenOptions::new().create(true).append(true).open(log_path)?;
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(is_new)
        .from_writer(file);
    wtr.serialize(entry)?;
    wtr.flush()?;
    Ok(())
}

pub fn read_entries(log_path: &Path) -> Result<Vec<MetadataEntry>> {
    if !log_path.exists() {
        return Ok(Vec::new());
    }
    let mut rdr = csv::Reader::from_path(log_path)?;
    let entries = rdr
        .deserialize()
        .collect::<std::result::Result<Vec<MetadataEntry>, _>>()?;
    Ok(entries)
}
