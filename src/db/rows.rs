//! Generic row conversion for ad-hoc queries.

use rusqlite::{Row, Statement};
use rusqlite::types::ValueRef;
use serde_json::{Map, Value};

/// Convert a row into a JSON object keyed by column name.
/// Blobs are rendered as lowercase hex.
pub fn row_to_json(row: &Row<'_>) -> rusqlite::Result<Value> {
    let stmt: &Statement<'_> = row.as_ref();
    let names: Vec<String> = stmt
        .column_names()
        .into_iter()
        .map(str::to_string)
        .collect();

    let mut obj = Map::with_capacity(names.len());
    for (idx, name) in names.into_iter().enumerate() {
        let value = match row.get_ref(idx)? {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(i) => Value::from(i),
            ValueRef::Real(f) => Value::from(f),
            ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => Value::String(b.iter().map(|byte| format!("{byte:02x}")).collect()),
        };
        obj.insert(name, value);
    }

    Ok(Value::Object(obj))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;
    use serde_json::json;

    #[test]
    fn converts_every_storage_class() {
        let conn = Connection::open_in_memory().unwrap();
        let value = conn
            .query_row(
                "SELECT 1 AS i, 2.5 AS r, 'txt' AS t, NULL AS n, x'0aff' AS b",
                [],
                row_to_json,
            )
            .unwrap();

        assert_eq!(
            value,
            json!({ "i": 1, "r": 2.5, "t": "txt", "n": null, "b": "0aff" })
        );
    }
}
