use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{BankflowError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub data_dir: String,
    /// SQLite warehouse file. Defaults to `<data_dir>/warehouse.db`.
    #[serde(default)]
    pub warehouse_path: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir().to_string_lossy().to_string(),
            warehouse_path: None,
        }
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("bankflow")
}

fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Documents")
        .join("bankflow")
}

pub fn load_settings() -> Settings {
    let path = settings_path();
    if path.exists() {
        let content = std::fs::read_to_string(&path).unwrap_or_default();
        serde_json::from_str(&content).unwrap_or_default()
    } else {
        Settings::default()
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| BankflowError::Settings(e.to_string()))?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    Ok(())
}

pub fn shellexpand_path(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| PathBuf::from(path))
        .to_string_lossy()
        .to_string()
}

/// Directory layout of one data dir.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub bronze_dir: PathBuf,
    pub silver_dir: PathBuf,
    pub log_dir: PathBuf,
    pub metadata_log: PathBuf,
    pub warehouse: PathBuf,
}

impl Layout {
    pub fn new(data_dir: &Path, warehouse: Option<&str>) -> Self {
        let log_dir = data_dir.join("logs").join("silver");
        Self {
            bronze_dir: data_dir.join("data").join("bronze"),
            silver_dir: data_dir.join("data").join("silver"),
            metadata_log: log_dir.join("metadata_log.csv"),
            log_dir,
            warehouse: warehouse
                .map(PathBuf::from)
                .unwrap_or_else(|| data_dir.join("warehouse.db")),
        }
    }
}

/// Layout from saved settings, with `data_dir` overriding the saved one.
pub fn resolve_layout(data_dir: Option<&str>) -> Layout {
    let settings = load_settings();
    let dir = match data_dir {
        Some(d) => PathBuf::from(shellexpand_path(d)),
        None => PathBuf::from(&settings.data_dir),
    };
    Layout::new(&dir, settings.warehouse_path.as_deref())
}
