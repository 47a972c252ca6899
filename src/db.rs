use std::path::Path;

use rusqlite::types::{ToSqlOutput, Value as SqlValue};
use rusqlite::{Connection, ToSql};

use crate::error::Result;
use crate::models::{Cell, Table, ACCOUNT_COLUMNS, TRANSACTION_COLUMNS};

pub const TRANSACTIONS_TABLE: &str = "silver_stg_transactions";
pub const ACCOUNTS_TABLE: &str = "silver_stg_accounts";

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    Ok(conn)
}

fn create_table_sql(table: &str, columns: &[&str]) -> String {
    let cols: Vec<String> = columns.iter().map(|c| format!("    \"{c}\"")).collect();
    format!(
        "CREATE TABLE IF NOT EXISTS {table} (\n    id INTEGER PRIMARY KEY,\n{},\n    loaded_at TEXT DEFAULT (datetime('now'))\n);\n",
        cols.join(",\n")
    )
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(&create_table_sql(TRANSACTIONS_TABLE, TRANSACTION_COLUMNS))?;
    conn.execute_batch(&create_table_sql(ACCOUNTS_TABLE, ACCOUNT_COLUMNS))?;
    Ok(())
}

impl ToSql for Cell {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        let value = match self {
            Cell::Null => SqlValue::Null,
            Cell::Bool(b) => SqlValue::Integer(i64::from(*b)),
            Cell::Int(i) => SqlValue::Integer(*i),
            Cell::Float(f) if f.is_nan() => SqlValue::Null,
            Cell::Float(f) => SqlValue::Real(*f),
            Cell::Text(s) => SqlValue::Text(s.clone()),
            Cell::Date(d) => SqlValue::Text(d.format("%Y-%m-%d").to_string()),
        };
        Ok(ToSqlOutput::Owned(value))
    }
}

/// Insert every row of `table` into `dest` inside one transaction. Column
/// names are taken from the table, so it must already match the schema.
pub fn insert_table(conn: &mut Connection, dest: &str, table: &Table) -> Result<usize> {
    let columns: Vec<String> = table.columns.iter().map(|c| format!("\"{c}\"")).collect();
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{i}")).collect();
    let sql = format!(
        "INSERT INTO {dest} ({}) VALUES ({})",
        columns.join(", "),
        placeholders.join(", ")
    );

    let txn = conn.transaction()?;
    {
        let mut stmt = txn.prepare(&sql)?;
        for row in &table.rows {
            stmt.execute(rusqlite::params_from_iter(row.iter()))?;
        }
    }
    txn.commit()?;
    Ok(table.len())
}
