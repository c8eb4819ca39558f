//! Column inference from sample data.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::model::{Column, Record, ValueType};
use crate::row_key::KEY_FIELD;

static DATE_LIKE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}").expect("Invalid date pattern"));
static URL_LIKE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://").expect("Invalid url pattern"));
static IMAGE_LIKE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\.(png|jpe?g|gif|webp|svg|bmp)(\?.*)?$").expect("Invalid image pattern")
});

/// Guess the value type of a sample value.
///
/// Strings are checked for a leading `YYYY-MM-DD`, then an `http(s)://`
/// prefix, then an image extension. Anything else is text.
pub fn infer_column_type(value: &Value) -> ValueType {
    match value {
        Value::Number(_) => ValueType::Number,
        Value::Bool(_) => ValueType::Boolean,
        Value::String(s) if DATE_LIKE.is_match(s) => ValueType::Date,
        Value::String(s) if URL_LIKE.is_match(s) => ValueType::Url,
        Value::String(s) if IMAGE_LIKE.is_match(s) => ValueType::Image,
        _ => ValueType::Text,
    }
}

/// Per-key replacements for generated columns.
pub type ColumnOverrides = HashMap<String, Column>;

/// Synthesize columns from the fields of the first record.
///
/// The `key` field is skipped. A column in `overrides` replaces the generated
/// one for that key. Columns follow the iteration order of the record map.
pub fn generate_columns_from_data(records: &[Record], overrides: &ColumnOverrides) -> Vec<Column> {
    let Some(sample) = records.first() else {
        return Vec::new();
    };

    sample
        .iter()
        .filter(|(field, _)| field.as_str() != KEY_FIELD)
        .map(|(field, value)| match overrides.get(field) {
            Some(column) => column.clone(),
            None => {
                let value_type = infer_column_type(value);
                let mut column = Column::new(field.clone(), humanize(field)).value_type(value_type);
                if matches!(value_type, ValueType::Number | ValueType::Date) {
                    column = column.sortable();
                }
                column
            }
        })
        .collect()
}

/// `created_at` / `createdAt` → `Created At`.
fn humanize(field: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for ch in field.chars() {
        if ch == '_' || ch == '-' || ch == ' ' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if ch.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
        current.push(ch);
    }
    if !current.is_empty() {
        words.push(current);
    }

    words
        .iter()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
