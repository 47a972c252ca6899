use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::bronze::latest_bronze_file;
use crate::error::Result;
use crate::fmt::format_bytes;
use crate::metadata::{read_entries, RunStatus};
use crate::settings::resolve_layout;

pub fn run(data_dir: Option<&str>, limit: usize) -> Result<()> {
    let layout = resolve_layout(data_dir);

    println!("Bronze:     {}", layout.bronze_dir.display());
    println!("Silver:     {}", layout.silver_dir.display());
    println!("Warehouse:  {}", layout.warehouse.display());

    match latest_bronze_file(&layout.bronze_dir)? {
        Some(path) => {
            let size = std::fs::metadata(&path)?.len();
            println!("Latest:     {} ({})", path.display(), format_bytes(size));
        }
        None => println!("Latest:     (none)"),
    }

    let entries = read_entries(&layout.metadata_log)?;
    if entries.is_empty() {
        println!();
        println!("No silver runs recorded yet.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Timestamp", "File", "Records", "Status", "Error"]);
    let skip = entries.len().saturating_sub(limit);
    for entry in entries.into_iter().skip(skip) {
        let status = match entry.status {
            RunStatus::Success => entry.status.as_str().green().to_string(),
            RunStatus::Failed => entry.status.as_str().red().to_string(),
        };
        table.add_row(vec![
            Cell::new(entry.timestamp),
            Cell::new(entry.filename),
            Cell::new(entry.records),
            Cell::new(status),
            Cell::new(entry.error_message.unwrap_or_default()),
        ]);
    }
    println!();
    println!("Recent runs\n{table}");
    Ok(())
}
