use crate::models::{Cell, Table};

/// Reshape `table` to exactly `expected` columns, in that order. Missing
/// columns are filled with nulls and extra columns are dropped. Rows keep
/// their count and order.
pub fn enforce_schema(table: Table, expected: &[&str]) -> Table {
    let source: Vec<Option<usize>> = expected
        .iter()
        .map(|col| table.column_index(col))
        .collect();

    let rows: Vec<Vec<Cell>> = table
        .rows
        .into_iter()
        .map(|row| {
            source
                .iter()
                .map(|idx| idx.map(|i| row[i].clone()).unwrap_or(Cell::Null))
                .collect()
        })
        .collect();

    Table {
        columns: expected.iter().map(|c| c.to_string()).collect(),
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Record;

    fn sample() -> Table {
        let rows: Vec<Record> = vec![
            vec![("b".into(), Cell::Int(1)), ("extra".into(), Cell::from("x"))],
            vec![("b".into(), Cell::Int(2)), ("a".into(), Cell::from("y"))],
            vec![("b".into(), Cell::Int(3))],
        ];
        Table::from_records(rows)
    }

    #[test]
    fn test_adds_missing_and_drops_extra() {
        let out = enforce_schema(sample(), &["a", "b", "c"]);
        assert_eq!(out.columns, vec!["a", "b", "c"]);
        assert_eq!(out.rows[0], vec![Cell::Null, Cell::Int(1), Cell::Null]);
        assert_eq!(out.rows[1], vec![Cell::from("y"), Cell::Int(2), Cell::Null]);
        assert!(out.column_index("extra").is_none());
    }

    #[test]
    fn test_preserves_row_count_and_order() {
        let out = enforce_schema(sample(), &["b"]);
        assert_eq!(out.len(), 3);
        let values: Vec<&Cell> = out.rows.iter().map(|r| &r[0]).collect();
        assert_eq!(values, vec![&Cell::Int(1), &Cell::Int(2), &Cell::Int(3)]);
    }

    #[test]
    fn test_idempotent() {
        let cols = ["c", "a", "b"];
        let once = enforce_schema(sample(), &cols);
        let twice = enforce_schema(once.clone(), &cols);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_table_gets_columns() {
        let out = enforce_schema(Table::default(), &["x", "y"]);
        assert_eq!(out.columns, vec!["x", "y"]);
        assert!(out.is_empty());
    }
}
