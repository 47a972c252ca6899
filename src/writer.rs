use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::models::Table;

#[derive(Debug, Clone, PartialEq)]
pub struct WrittenFile {
    pub path: PathBuf,
    pub rows: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SilverOutput {
    pub transactions: WrittenFile,
    pub accounts: WrittenFile,
}

pub fn transactions_path(silver_dir: &Path, timestamp: &str) -> PathBuf {
    silver_dir.join(format!("transactions_clean_{timestamp}.csv"))
}

pub fn accounts_path(silver_dir: &Path, timestamp: &str) -> PathBuf {
    silver_dir.join(format!("accounts_clean_{timestamp}.csv"))
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".partial");
    path.with_file_name(name)
}

/// Write `table` as CSV with a header row. Null cells are empty fields.
pub fn write_csv(table: &Table, path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(&table.columns)?;
    for row in &table.rows {
        wtr.write_record(row.iter().map(|cell| cell.to_string()))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write both cleaned tables into `silver_dir`. Either both final files
/// exist afterwards or neither does. Existing files are never replaced or
/// removed.
pub fn write_silver(
    silver_dir: &Path,
    timestamp: &str,
    transactions: &Table,
    accounts: &Table,
) -> Result<SilverOutput> {
    std::fs::create_dir_all(silver_dir)?;

    let targets = [
        (transactions, transactions_path(silver_dir, timestamp)),
        (accounts, accounts_path(silver_dir, timestamp)),
    ];
    if let Some((_, existing)) = targets.iter().find(|(_, p)| p.exists()) {
        return Err(std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            format!("{} already exists", existing.display()),
        )
        .into());
    }
    let staged: Vec<PathBuf> = targets.iter().map(|(_, p)| staging_path(p)).collect();

    let mut renamed: Vec<&Path> = Vec::new();
    let result = (|| -> Result<()> {
        for ((table, _), staging) in targets.iter().zip(&staged) {
            write_csv(table, staging)?;
        }
        for ((_, path), staging) in targets.iter().zip(&staged) {
            std::fs::rename(staging, path)?;
            renamed.push(path);
        }
        Ok(())
    })();

    if let Err(e) = result {
        for staging in &staged {
            let _ = std::fs::remove_file(staging);
        }
        for path in renamed {
            let _ = std::fs::remove_file(path);
        }
        return Err(e);
    }

    let [(tx, tx_path), (acc, acc_path)] = targets;
    Ok(SilverOutput {
        transactions: WrittenFile {
            path: tx_path,
            rows: tx.len(),
        },
        accounts: WrittenFile {
            path: acc_path,
            rows: acc.len(),
        },
    })
}
