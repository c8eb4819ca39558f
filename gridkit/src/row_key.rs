//! Row key normalisation.
//!
//! Every record handed to the rendering primitive must carry a non-empty
//! `key`. [`normalize_keys`] attaches one without ever panicking and without
//! dropping rows.

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use log::debug;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::diagnostics::panic_message;
use crate::model::Record;

/// Field every normalised record carries.
pub const KEY_FIELD: &str = "key";

/// Prefix of synthesised positional keys.
pub const FALLBACK_PREFIX: &str = "table-row";

/// Conventional identity fields, tried in order.
const IDENTITY_FIELDS: [&str; 5] = ["id", "key", "uuid", "account_id", "bot_id"];

type RowKeyFn = dyn Fn(&Record) -> Value + Send + Sync;

/// How to derive a row's key.
#[derive(Clone)]
pub enum RowKey {
    /// Read the key from a record field.
    Field(String),
    /// Compute the key from the record.
    Func(Arc<RowKeyFn>),
}

impl RowKey {
    /// Key taken from `field`.
    pub fn field(field: impl Into<String>) -> Self {
        RowKey::Field(field.into())
    }

    /// Key computed by `f`.
    pub fn func<F>(f: F) -> Self
    where
        F: Fn(&Record) -> Value + Send + Sync + 'static,
    {
        RowKey::Func(Arc::new(f))
    }
}

impl fmt::Debug for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowKey::Field(name) => f.debug_tuple("Field").field(name).finish(),
            RowKey::Func(_) => f.write_str("Func(..)"),
        }
    }
}

impl From<&str> for RowKey {
    fn from(field: &str) -> Self {
        RowKey::field(field)
    }
}

impl From<String> for RowKey {
    fn from(field: String) -> Self {
        RowKey::Field(field)
    }
}

impl<'de> Deserialize<'de> for RowKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(RowKey::Field)
    }
}

/// Returns the value as a key if it is usable, `None` otherwise.
///
/// Strings must be non-blank and must not read `"undefined"` or `"null"`.
/// Numbers are used verbatim; booleans are stringified. Null, arrays and
/// objects are never keys.
pub fn usable_key(value: &Value) -> Option<Value> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() || trimmed == "undefined" || trimmed == "null" {
                None
            } else {
                Some(value.clone())
            }
        }
        Value::Number(_) => Some(value.clone()),
        Value::Bool(b) => Some(Value::String(b.to_string())),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Normalise an arbitrary JSON value into keyed records.
///
/// Non-array input yields an empty vec. Non-object elements become
/// `{ "key": "table-row-empty-<index>" }`. The output always has as many
/// elements as the input array.
pub fn normalize_keys(input: &Value, row_key: Option<&RowKey>) -> Vec<Record> {
    let Value::Array(items) = input else {
        if !input.is_null() {
            debug!("normalize_keys: non-array data ignored ({})", type_name(input));
        }
        return Vec::new();
    };

    items
        .iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(record) => normalize_record(record.clone(), index, row_key),
            _ => empty_row(index),
        })
        .collect()
}

/// Normalise already-typed records.
pub fn normalize_records(records: Vec<Record>, row_key: Option<&RowKey>) -> Vec<Record> {
    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| normalize_record(record, index, row_key))
        .collect()
}

fn normalize_record(mut record: Record, index: usize, row_key: Option<&RowKey>) -> Record {
    if record.get(KEY_FIELD).and_then(usable_key).is_some() {
        return record;
    }
    let key = compute_key(&record, index, row_key);
    record.insert(KEY_FIELD.to_string(), key);
    record
}

fn compute_key(record: &Record, index: usize, row_key: Option<&RowKey>) -> Value {
    match row_key {
        Some(RowKey::Func(f)) => match catch_unwind(AssertUnwindSafe(|| f(record))) {
            Ok(value) => {
                if let Some(key) = usable_key(&value) {
                    return key;
                }
            }
            Err(panic) => {
                debug!(
                    "normalize_keys: row key function panicked at row {}: {}",
                    index,
                    panic_message(panic.as_ref())
                );
            }
        },
        Some(RowKey::Field(field)) => {
            if let Some(key) = record.get(field).and_then(usable_key) {
                return key;
            }
        }
        None => {}
    }

    IDENTITY_FIELDS
        .iter()
        .find_map(|field| record.get(*field).and_then(usable_key))
        .unwrap_or_else(|| Value::String(format!("{FALLBACK_PREFIX}-{index}")))
}

fn empty_row(index: usize) -> Record {
    let mut record = Record::new();
    record.insert(
        KEY_FIELD.to_string(),
        Value::String(format!("{FALLBACK_PREFIX}-empty-{index}")),
    );
    record
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_usable_key_rejects_placeholders() {
        assert_eq!(usable_key(&json!("undefined")), None);
        assert_eq!(usable_key(&json!("null")), None);
        assert_eq!(usable_key(&json!("  ")), None);
        assert_eq!(usable_key(&json!(0)), Some(json!(0)));
        assert_eq!(usable_key(&json!(true)), Some(json!("true")));
        assert_eq!(usable_key(&json!({ "a": 1 })), None);
    }

    #[test]
    fn test_identity_field_order() {
        let rows = normalize_keys(&json!([{ "uuid": "u-1", "bot_id": "b-1" }]), None);
        assert_eq!(rows[0]["key"], json!("u-1"));

        let rows = normalize_keys(&json!([{ "bot_id": 9 }]), None);
        assert_eq!(rows[0]["key"], json!(9));
    }

    #[test]
    fn test_empty_existing_key_is_replaced() {
        let rows = normalize_keys(&json!([{ "key": "", "id": 4 }]), None);
        assert_eq!(rows[0]["key"], json!(4));
    }
}
