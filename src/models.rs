use std::fmt;

use chrono::NaiveDate;
use serde_json::Value;

pub const TRANSACTION_COLUMNS: &[&str] = &[
    "transaction_id",
    "account_id",
    "name",
    "amount",
    "date",
    "authorized_date",
    "merchant_name",
    "category",
    "category_id",
    "iso_currency_code",
    "payment_channel",
    "pending",
    "counterparty_name",
    "counterparty_type",
    "location_city",
    "location_region",
    "location_country",
    "payment_meta_reference_number",
    "payment_meta_payee",
    "personal_finance_category_primary",
    "personal_finance_category_detailed",
];

pub const ACCOUNT_COLUMNS: &[&str] = &[
    "account_id",
    "mask",
    "name",
    "official_name",
    "type",
    "subtype",
    "holder_category",
    "balances_available",
    "balances_current",
    "balances_limit",
    "balances_iso_currency_code",
    "balances_unofficial_currency_code",
];

pub const BALANCE_COLUMNS: &[&str] = &["balances_available", "balances_current", "balances_limit"];

/// A single scalar table value. There is no nested variant.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
}

impl Cell {
    /// Convert a JSON value into a cell. Arrays and objects keep their
    /// compact JSON text so no nested value ever reaches a table.
    pub fn from_json(value: &Value) -> Cell {
        match value {
            Value::Null => Cell::Null,
            Value::Bool(b) => Cell::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Cell::Int(i),
                None => n.as_f64().map(Cell::Float).unwrap_or(Cell::Null),
            },
            Value::String(s) => Cell::Text(s.clone()),
            Value::Array(_) | Value::Object(_) => Cell::Text(value.to_string()),
        }
    }

    /// Null, NaN, and the `"nan"` / `"NaN"` text literals.
    pub fn is_missing(&self) -> bool {
        match self {
            Cell::Null => true,
            Cell::Float(f) => f.is_nan(),
            Cell::Text(s) => s == "nan" || s == "NaN",
            _ => false,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// Numeric value of an `Int` or `Float` cell. Booleans do not count.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Int(i) => Some(*i as f64),
            Cell::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Cell::Date(d) => Some(*d),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => Ok(()),
            Cell::Bool(b) => write!(f, "{b}"),
            Cell::Int(i) => write!(f, "{i}"),
            Cell::Float(x) => write!(f, "{x}"),
            Cell::Text(s) => f.write_str(s),
            Cell::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<f64> for Cell {
    fn from(x: f64) -> Self {
        Cell::Float(x)
    }
}

impl From<i64> for Cell {
    fn from(i: i64) -> Self {
        Cell::Int(i)
    }
}

/// One flattened record: column names paired with cells, in column order.
pub type Record = Vec<(String, Cell)>;

/// Column-ordered rows of cells. Every row has exactly `columns.len()` cells.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Build a table whose columns are the superset of all record keys in
    /// first-seen order. Keys a record lacks become `Cell::Null`.
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for record in &records {
            for (key, _) in record {
                if !columns.contains(key) {
                    columns.push(key.clone());
                }
            }
        }

        let mut table = Table::new(columns);
        for record in records {
            let mut row = vec![Cell::Null; table.columns.len()];
            for (key, cell) in record {
                if let Some(idx) = table.column_index(&key) {
                    row[idx] = cell;
                }
            }
            table.rows.push(row);
        }
        table
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[allow(dead_code)]
    pub fn get(&self, row: usize, column: &str) -> Option<&Cell> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[idx])
    }

    /// Apply `f` to every cell of `column`. A missing column is a no-op.
    pub fn map_column(&mut self, column: &str, mut f: impl FnMut(Cell) -> Cell) {
        let Some(idx) = self.column_index(column) else {
            return;
        };
        for row in &mut self.rows {
            let cell = std::mem::take(&mut row[idx]);
            row[idx] = f(cell);
        }
    }

    /// Keep only the rows for which `keep` returns true on the cell in
    /// `column`. A missing column is treated as all-null.
    pub fn retain_by(&mut self, column: &str, keep: impl Fn(&Cell) -> bool) {
        match self.column_index(column) {
            Some(idx) => self.rows.retain(|row| keep(&row[idx])),
            None => {
                if !keep(&Cell::Null) {
                    self.rows.clear();
                }
            }
        }
    }
}
