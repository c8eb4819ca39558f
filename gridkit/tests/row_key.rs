//! Tests for row key normalization.

use gridkit::row_key::{RowKey, normalize_keys, normalize_records};
use serde_json::{Value, json};

#[test]
fn test_every_row_gets_a_key() {
    let input = json!([
        { "id": 7, "name": "a" },
        { "uuid": "c0ffee", "name": "b" },
        { "key": "", "name": "c" },
        { "key": "undefined" },
        "not a record",
        { "bot_id": 12 },
    ]);

    let rows = normalize_keys(&input, None);
    assert_eq!(rows.len(), 6);
    assert_eq!(rows[0]["key"], json!(7));
    assert_eq!(rows[1]["key"], json!("c0ffee"));
    assert_eq!(rows[2]["key"], json!("table-row-2"));
    assert_eq!(rows[3]["key"], json!("table-row-3"));
    assert_eq!(rows[4]["key"], json!("table-row-empty-4"));
    assert_eq!(rows[5]["key"], json!(12));
    assert!(rows.iter().all(|r| match &r["key"] {
        Value::String(s) => !s.is_empty(),
        other => !other.is_null(),
    }));
}

#[test]
fn test_normalization_is_idempotent() {
    let input = json!([{ "name": "a" }, { "id": 3 }, { "key": "keep-me", "id": 4 }]);
    let once = normalize_keys(&input, Some(&RowKey::field("name")));
    let twice = normalize_records(once.clone(), Some(&RowKey::field("name")));

    assert_eq!(once, twice);
    assert_eq!(once[0]["key"], json!("a"));
    assert_eq!(once[2]["key"], json!("keep-me"));
}

#[test]
fn test_panicking_key_function_falls_through() {
    let key = RowKey::func(|record| {
        if record.contains_key("boom") {
            panic!("no key for you");
        }
        json!(format!("fn-{}", record["name"].as_str().unwrap_or_default()))
    });
    let input = json!([{ "name": "x" }, { "boom": true, "id": 9 }]);

    let rows = normalize_keys(&input, Some(&key));
    assert_eq!(rows[0]["key"], json!("fn-x"));
    assert_eq!(rows[1]["key"], json!(9));
}

#[test]
fn test_non_array_input_is_empty() {
    assert!(normalize_keys(&json!({ "id": 1 }), None).is_empty());
    assert!(normalize_keys(&Value::Null, None).is_empty());
}
