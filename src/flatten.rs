use serde_json::{Map, Value};

use crate::models::{Cell, Record, Table};

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

/// One transaction with every nested field lifted to a scalar. Each field
/// defaults to `Cell::Null` except `category`, which defaults to `""`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlatTransactionRow {
    pub transaction_id: Cell,
    pub account_id: Cell,
    pub name: Cell,
    pub amount: Cell,
    pub date: Cell,
    pub authorized_date: Cell,
    pub merchant_name: Cell,
    pub category: String,
    pub category_id: Cell,
    pub iso_currency_code: Cell,
    pub payment_channel: Cell,
    pub pending: Cell,
    pub counterparty_name: Cell,
    pub counterparty_type: Cell,
    pub location_city: Cell,
    pub location_region: Cell,
    pub location_country: Cell,
    pub payment_meta_reference_number: Cell,
    pub payment_meta_payee: Cell,
    pub personal_finance_category_primary: Cell,
    pub personal_finance_category_detailed: Cell,
}

impl FlatTransactionRow {
    /// Field values in `TRANSACTION_COLUMNS` order.
    pub fn into_record(self) -> Record {
        vec![
            ("transaction_id".into(), self.transaction_id),
            ("account_id".into(), self.account_id),
            ("name".into(), self.name),
            ("amount".into(), self.amount),
            ("date".into(), self.date),
            ("authorized_date".into(), self.authorized_date),
            ("merchant_name".into(), self.merchant_name),
            ("category".into(), Cell::Text(self.category)),
            ("category_id".into(), self.category_id),
            ("iso_currency_code".into(), self.iso_currency_code),
            ("payment_channel".into(), self.payment_channel),
            ("pending".into(), self.pending),
            ("counterparty_name".into(), self.counterparty_name),
            ("counterparty_type".into(), self.counterparty_type),
            ("location_city".into(), self.location_city),
            ("location_region".into(), self.location_region),
            ("location_country".into(), self.location_country),
            ("payment_meta_reference_number".into(), self.payment_meta_reference_number),
            ("payment_meta_payee".into(), self.payment_meta_payee),
            ("personal_finance_category_primary".into(), self.personal_finance_category_primary),
            ("personal_finance_category_detailed".into(), self.personal_finance_category_detailed),
        ]
    }
}

/// Scalar lookup on an optional mapping; absent key or absent mapping is null.
fn field(obj: Option<&Map<String, Value>>, key: &str) -> Cell {
    obj.and_then(|o| o.get(key))
        .map(Cell::from_json)
        .unwrap_or(Cell::Null)
}

fn nested<'a>(obj: Option<&'a Map<String, Value>>, key: &str) -> Option<&'a Map<String, Value>> {
    obj.and_then(|o| o.get(key)).and_then(Value::as_object)
}

/// Name and type of the first counterparty only.
fn first_counterparty(tx: Option<&Map<String, Value>>) -> (Cell, Cell) {
    let first = tx
        .and_then(|o| o.get("counterparties"))
        .and_then(Value::as_array)
        .and_then(|list| list.first());
    match first {
        Some(cp) => {
            let cp = cp.as_object();
            (field(cp, "name"), field(cp, "type"))
        }
        None => (Cell::Null, Cell::Null),
    }
}

fn join_category(value: Option<&Value>) -> String {
    let Some(Value::Array(items)) = value else {
        return String::new();
    };
    items
        .iter()
        .map(|item| match item {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn flatten_transaction(tx: &Value) -> FlatTransactionRow {
    let tx = tx.as_object();
    let (counterparty_name, counterparty_type) = first_counterparty(tx);
    let location = nested(tx, "location");
    let payment_meta = nested(tx, "payment_meta");
    let pfc = nested(tx, "personal_finance_category");

    FlatTransactionRow {
        transaction_id: field(tx, "transaction_id"),
        account_id: field(tx, "account_id"),
        name: field(tx, "name"),
        amount: field(tx, "amount"),
        date: field(tx, "date"),
        authorized_date: field(tx, "authorized_date"),
        merchant_name: field(tx, "merchant_name"),
        category: join_category(tx.and_then(|o| o.get("category"))),
        category_id: field(tx, "category_id"),
        iso_currency_code: field(tx, "iso_currency_code"),
        payment_channel: field(tx, "payment_channel"),
        pending: field(tx, "pending"),
        counterparty_name,
        counterparty_type,
        location_city: field(location, "city"),
        location_region: field(location, "region"),
        location_country: field(location, "country"),
        payment_meta_reference_number: field(payment_meta, "reference_number"),
        payment_meta_payee: field(payment_meta, "payee"),
        personal_finance_category_primary: field(pfc, "primary"),
        personal_finance_category_detailed: field(pfc, "detailed"),
    }
}

pub fn transactions_table(transactions: &[Value]) -> Table {
    let records = transactions
        .iter()
        .map(|tx| flatten_transaction(tx).into_record())
        .collect();
    Table::from_records(records)
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

fn flatten_into(prefix: &str, obj: &Map<String, Value>, out: &mut Record) {
    for (key, value) in obj {
        let key = key.replace('.', "_");
        let column = if prefix.is_empty() {
            key
        } else {
            format!("{prefix}_{key}")
        };
        match value {
            Value::Object(inner) => flatten_into(&column, inner, out),
            other => out.push((column, Cell::from_json(other))),
        }
    }
}

/// Flatten one account: nested mappings become `parent_child` columns.
pub fn flatten_account(account: &Value) -> Record {
    let mut record = Record::new();
    if let Some(obj) = account.as_object() {
        flatten_into("", obj, &mut record);
    }
    record
}

/// Normalize the account list into one table over the superset of columns.
pub fn normalize_accounts(accounts: &[Value]) -> Table {
    Table::from_records(accounts.iter().map(flatten_account).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ACCOUNT_COLUMNS, TRANSACTION_COLUMNS};
    use crate::schema::enforce_schema;
    use serde_json::json;

    #[test]
    fn test_flatten_full_transaction() {
        let tx = json!({
            "transaction_id": "t1",
            "account_id": "a1",
            "name": "Starbucks",
            "amount": 4.33,
            "date": "2024-01-05",
            "authorized_date": "2024-01-04",
            "merchant_name": "Starbucks",
            "category": ["Food and Drink", "Coffee"],
            "category_id": "13005043",
            "iso_currency_code": "USD",
            "payment_channel": "in store",
            "pending": false,
            "counterparties": [
                {"name": "Starbucks", "type": "merchant"},
                {"name": "Visa", "type": "payment_processor"}
            ],
            "location": {"city": "Seattle", "region": "WA", "country": "US"},
            "payment_meta": {"reference_number": "r-1", "payee": null},
            "personal_finance_category": {"primary": "FOOD_AND_DRINK", "detailed": "FOOD_AND_DRINK_COFFEE"}
        });
        let row = flatten_transaction(&tx);
        assert_eq!(row.amount, Cell::Float(4.33));
        assert_eq!(row.category, "Food and Drink, Coffee");
        assert_eq!(row.counterparty_name, Cell::from("Starbucks"));
        assert_eq!(row.counterparty_type, Cell::from("merchant"));
        assert_eq!(row.location_region, Cell::from("WA"));
        assert_eq!(row.payment_meta_reference_number, Cell::from("r-1"));
        assert_eq!(row.payment_meta_payee, Cell::Null);
        assert_eq!(row.pending, Cell::Bool(false));
        assert_eq!(row.personal_finance_category_detailed, Cell::from("FOOD_AND_DRINK_COFFEE"));
    }

    #[test]
    fn test_flatten_empty_transaction() {
        let row = flatten_transaction(&json!({}));
        assert_eq!(row.category, "");
        assert_eq!(row.counterparty_name, Cell::Null);
        assert_eq!(row.location_city, Cell::Null);
        assert_eq!(row.amount, Cell::Null);
    }

    #[test]
    fn test_flatten_non_object_transaction() {
        let row = flatten_transaction(&json!("garbage"));
        assert_eq!(row, FlatTransactionRow::default());
    }

    #[test]
    fn test_category_not_a_list_is_empty_string() {
        let row = flatten_transaction(&json!({"category": "Food"}));
        assert_eq!(row.category, "");
        let row = flatten_transaction(&json!({"category": null}));
        assert_eq!(row.category, "");
    }

    #[test]
    fn test_category_non_string_items() {
        let row = flatten_transaction(&json!({"category": ["Shops", 7]}));
        assert_eq!(row.category, "Shops, 7");
    }

    #[test]
    fn test_empty_counterparties() {
        let row = flatten_transaction(&json!({"counterparties": []}));
        assert_eq!(row.counterparty_name, Cell::Null);
        assert_eq!(row.counterparty_type, Cell::Null);
        let row = flatten_transaction(&json!({"counterparties": {"name": "x"}}));
        assert_eq!(row.counterparty_name, Cell::Null);
    }

    #[test]
    fn test_nested_fields_null_or_wrong_shape() {
        let row = flatten_transaction(&json!({
            "location": null,
            "payment_meta": "oops",
            "personal_finance_category": []
        }));
        assert_eq!(row.location_country, Cell::Null);
        assert_eq!(row.payment_meta_payee, Cell::Null);
        assert_eq!(row.personal_finance_category_primary, Cell::Null);
    }

    #[test]
    fn test_record_has_every_column_in_order() {
        let record = flatten_transaction(&json!({})).into_record();
        let keys: Vec<&str> = record.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, TRANSACTION_COLUMNS);
    }

    #[test]
    fn test_transactions_table_columns() {
        let table = transactions_table(&[json!({"amount": 1}), json!({"amount": 2})]);
        assert_eq!(table.columns.len(), TRANSACTION_COLUMNS.len());
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(1, "amount"), Some(&Cell::Int(2)));
        assert_eq!(table.get(0, "category"), Some(&Cell::from("")));
    }

    #[test]
    fn test_flatten_account_nested_keys() {
        let record = flatten_account(&json!({
            "account_id": "a1",
            "balances": {"available": 100, "current": 110.5, "iso_currency_code": "USD"}
        }));
        let keys: Vec<&str> = record.iter().map(|(k, _)| k.as_str()).collect();
        assert!(keys.contains(&"balances_available"));
        assert!(keys.contains(&"balances_current"));
        assert!(keys.contains(&"balances_iso_currency_code"));
        assert!(!keys.contains(&"balances"));
    }

    #[test]
    fn test_flatten_account_deep_nesting_and_arrays() {
        let record = flatten_account(&json!({
            "owners": ["x"],
            "meta": {"limits": {"daily": 5}}
        }));
        assert!(record.contains(&("meta_limits_daily".to_string(), Cell::Int(5))));
        assert!(record.contains(&("owners".to_string(), Cell::from(r#"["x"]"#))));
    }

    #[test]
    fn test_normalize_accounts_superset_and_order() {
        let table = normalize_accounts(&[
            json!({"account_id": "a1", "balances": {"available": 10}}),
            json!({"account_id": "a2", "balances": {"limit": 500}}),
        ]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(0, "account_id"), Some(&Cell::from("a1")));
        assert_eq!(table.get(0, "balances_limit"), Some(&Cell::Null));
        assert_eq!(table.get(1, "balances_available"), Some(&Cell::Null));
        assert_eq!(table.get(1, "balances_limit"), Some(&Cell::Int(500)));
    }

    #[test]
    fn test_normalize_non_object_account() {
        let table = normalize_accounts(&[json!({"account_id": "a1"}), json!(5)]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(1, "account_id"), Some(&Cell::Null));
    }

    #[test]
    fn test_flatten_account_dotted_keys() {
        let record = flatten_account(&json!({
            "balances.available": 5,
            "meta": {"iso.code": "USD"}
        }));
        assert!(record.contains(&("balances_available".to_string(), Cell::Int(5))));
        assert!(record.contains(&("meta_iso_code".to_string(), Cell::from("USD"))));

        let table = enforce_schema(normalize_accounts(&[json!({"balances.current": 7})]), ACCOUNT_COLUMNS);
        assert_eq!(table.get(0, "balances_current"), Some(&Cell::Int(7)));
    }
}
