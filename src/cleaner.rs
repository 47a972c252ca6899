use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::models::{Cell, Table, BALANCE_COLUMNS};

pub const DEFAULT_CURRENCY: &str = "USD";
pub const DEFAULT_PAYMENT_CHANNEL: &str = "online";

/// Rows removed by the transaction filters.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CleaningReport {
    pub dropped_amount: usize,
    pub dropped_date: usize,
}

impl CleaningReport {
    pub fn dropped(&self) -> usize {
        self.dropped_amount + self.dropped_date
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse the date forms upstream payloads use. Anything else is `None`.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    for fmt in ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(d);
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.date());
        }
    }
    None
}

fn to_date(cell: Cell) -> Cell {
    match cell {
        Cell::Date(d) => Cell::Date(d),
        Cell::Text(s) => parse_date(&s).map(Cell::Date).unwrap_or(Cell::Null),
        _ => Cell::Null,
    }
}

/// Numeric coercion: unparseable or non-finite values become null.
pub fn to_numeric(cell: Cell) -> Cell {
    let value = match cell {
        Cell::Int(i) => Some(i as f64),
        Cell::Float(f) => Some(f),
        Cell::Text(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match value {
        Some(f) if f.is_finite() => Cell::Float(f),
        _ => Cell::Null,
    }
}

fn lowercase(cell: Cell, trim: bool) -> Cell {
    let text = match cell {
        Cell::Null => return Cell::Null,
        Cell::Text(s) => s,
        other => other.to_string(),
    };
    let text = if trim { text.trim() } else { text.as_str() };
    Cell::Text(text.to_lowercase())
}

fn fill_null(cell: Cell, default: &str) -> Cell {
    if cell.is_null() {
        Cell::from(default)
    } else {
        cell
    }
}

fn is_valid_amount(cell: &Cell) -> bool {
    cell.as_number().is_some_and(|n| n >= 0.0)
}

// ---------------------------------------------------------------------------
// Pipelines
// ---------------------------------------------------------------------------

/// Clean an enforced transactions table. Steps run in a fixed order:
/// amount filter, date parsing, text normalization, defaults, date filter.
pub fn clean_transactions(mut table: Table) -> (Table, CleaningReport) {
    let mut report = CleaningReport::default();

    let before = table.len();
    table.retain_by("amount", is_valid_amount);
    report.dropped_amount = before - table.len();

    table.map_column("date", to_date);
    table.map_column("authorized_date", to_date);

    table.map_column("merchant_name", |c| lowercase(c, true));
    table.map_column("category", |c| lowercase(c, false));

    table.map_column("iso_currency_code", |c| fill_null(c, DEFAULT_CURRENCY));
    table.map_column("payment_channel", |c| fill_null(c, DEFAULT_PAYMENT_CHANNEL));

    let before = table.len();
    table.retain_by("date", |c| c.as_date().is_some());
    report.dropped_date = before - table.len();

    (table, report)
}

/// Replace every missing representation in the table with `Cell::Null`.
pub fn normalize_missing(table: &mut Table) {
    for row in &mut table.rows {
        for cell in row.iter_mut() {
            if cell.is_missing() {
                *cell = Cell::Null;
            }
        }
    }
}

/// Clean an enforced accounts table: numeric balances, canonical nulls,
/// and balance columns holding only floats or nulls.
pub fn clean_accounts(mut table: Table) -> Table {
    for col in BALANCE_COLUMNS {
        table.map_column(col, to_numeric);
    }

    normalize_missing(&mut table);

    for col in BALANCE_COLUMNS {
        table.map_column(col, |c| match c {
            Cell::Float(f) => Cell::Float(f),
            Cell::Int(i) => Cell::Float(i as f64),
            _ => Cell::Null,
        });
    }
    table
}
