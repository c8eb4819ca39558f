//! Core table data types.

mod change;
mod column;
mod pagination;
mod selection;

pub use change::*;
pub use column::*;
pub use pagination::*;
pub use selection::*;

/// One table row: an opaque field name → value mapping.
///
/// The engine never touches domain fields; it only attaches or normalises
/// the `key` field (see [`crate::row_key`]).
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Loosely typed rendering properties handed to the rendering primitive.
pub type PropMap = serde_json::Map<String, serde_json::Value>;

/// Render a value the way a cell shows it: strings unquoted, null empty.
pub fn display_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Bool(b) => (if *b { "Yes" } else { "No" }).to_string(),
        other => other.to_string(),
    }
}
