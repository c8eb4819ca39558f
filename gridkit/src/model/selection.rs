//! Row selection configuration.

use serde::Deserialize;
use serde_json::Value;

/// Selection mode for table rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SelectionMode {
    /// At most one row selected (radio).
    Single,
    /// Any number of rows selected (checkbox).
    #[default]
    Multiple,
}

/// Row selection state passed through to the rendering primitive.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowSelection {
    /// Selection mode.
    #[serde(default)]
    pub mode: SelectionMode,
    /// Keys of the selected rows.
    #[serde(default)]
    pub selected_keys: Vec<Value>,
}

impl RowSelection {
    /// Create a selection config with the given mode and nothing selected.
    pub fn new(mode: SelectionMode) -> Self {
        Self {
            mode,
            selected_keys: Vec::new(),
        }
    }

    /// Returns `true` if the row with `key` is selected.
    pub fn is_selected(&self, key: &Value) -> bool {
        self.selected_keys.iter().any(|k| k == key)
    }

    /// Toggle selection of `key`, honouring the selection mode.
    pub fn toggle(&mut self, key: Value) {
        if let Some(pos) = self.selected_keys.iter().position(|k| *k == key) {
            self.selected_keys.remove(pos);
            return;
        }
        if self.mode == SelectionMode::Single {
            self.selected_keys.clear();
        }
        self.selected_keys.push(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_mode_replaces_selection() {
        let mut selection = RowSelection::new(SelectionMode::Single);
        selection.toggle(Value::from("a"));
        selection.toggle(Value::from("b"));
        assert_eq!(selection.selected_keys, vec![Value::from("b")]);
    }

    #[test]
    fn test_multiple_mode_toggles() {
        let mut selection = RowSelection::new(SelectionMode::Multiple);
        selection.toggle(Value::from(1));
        selection.toggle(Value::from(2));
        selection.toggle(Value::from(1));
        assert!(!selection.is_selected(&Value::from(1)));
        assert!(selection.is_selected(&Value::from(2)));
    }
}
